// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    application::dto::{
        job_request::JobRequestDto,
        job_response::{JobAcceptedDto, JobResponseDto},
    },
    domain::repositories::link_repository::{LinkRepository, RepositoryError},
    presentation::errors::AppError,
    workers::JobManager,
};

/// 提交新的爬取作业
///
/// 验证请求负载后立即返回作业ID，作业体在后台异步运行。
pub async fn submit_job<R>(
    Extension(manager): Extension<Arc<JobManager<R>>>,
    Json(payload): Json<JobRequestDto>,
) -> Result<impl IntoResponse, AppError>
where
    R: LinkRepository + 'static,
{
    payload.validate()?;

    let id = manager.submit(payload.into_config());
    let body = JobAcceptedDto {
        id,
        status: Default::default(),
    };
    Ok((StatusCode::ACCEPTED, Json(body)))
}

/// 获取作业状态与统计
pub async fn get_job<R>(
    Extension(manager): Extension<Arc<JobManager<R>>>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobResponseDto>, AppError>
where
    R: LinkRepository + 'static,
{
    let job = manager
        .status(&job_id)
        .await
        .ok_or(RepositoryError::NotFound)?;
    let stats = job.stats.clone();
    Ok(Json(JobResponseDto::from_job(&job, stats)))
}

/// 请求取消作业
///
/// 取消是协作式的，在途抓取排空后作业进入终态。
pub async fn cancel_job<R>(
    Extension(manager): Extension<Arc<JobManager<R>>>,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, AppError>
where
    R: LinkRepository + 'static,
{
    if manager.cancel(&job_id) {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(RepositoryError::NotFound.into())
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 包含爬取作业、任务与评分链接等核心业务实体
pub mod job;
pub mod link;

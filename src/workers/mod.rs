// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供后台作业处理和生命周期管理功能
/// 包括作业提交、状态查询、协作式取消和并发控制
pub mod manager;

pub use manager::JobManager;

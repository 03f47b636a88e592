// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 定义存储协作方的窄契约，实现位于infrastructure层
pub mod link_repository;

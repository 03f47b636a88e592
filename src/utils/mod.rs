// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
/// 包括错误分类、URL规范化、爬取策略和遥测监控
pub mod errors;
pub mod robots;
pub mod telemetry;
pub mod url_utils;

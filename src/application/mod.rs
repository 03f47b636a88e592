// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 负责在API表示层与领域层之间转换数据，
/// 该模块遵循领域驱动设计（DDD）原则，将业务逻辑与基础设施分离
pub mod dto;

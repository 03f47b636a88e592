// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供领域仓库接口的具体实现：
/// - 内存实现（memory_link_repo）：易失的并发映射，数据库缺席时的退路
/// - SQLite实现（sqlite_link_repo）：基于sqlx的持久化存储
pub mod memory_link_repo;
pub mod sqlite_link_repo;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 引擎模块
///
/// 实现对外部HTTP协作方的抓取适配
pub mod reqwest_engine;
pub mod traits;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含系统的核心业务逻辑服务，这些服务封装了复杂的
/// 业务规则和领域逻辑，协调多个领域对象来完成业务操作。
///
/// 包含的服务：
/// - 爬取协调服务（crawl_service）：按深度分层调度抓取任务并汇总结果
/// - 提取服务（extraction_service）：从 HTML 中提取并规范化候选链接
/// - 规则评分服务（relevance_scorer）：基于关键词与 URL 模式的确定性打分
/// - LLM服务（llm_service）：对边界分数链接进行批量语义精排
/// - 聚合服务（aggregator)：去重并按最终分数排序产出结果
pub mod aggregator;
pub mod crawl_service;
pub mod extraction_service;
pub mod llm_service;
pub mod relevance_scorer;

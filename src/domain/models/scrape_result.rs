// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 抓取结果
///
/// 渲染引擎输出经过标记清理后的最终结果。
/// 每个结果仅存在于单个请求的生命周期内，按值在管道中流转。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// 清理后的页面标记文本
    pub html: String,
    /// 样式文本：内联style标签内容、外部样式表占位注释，
    /// 以及可选的按class合成的计算样式规则
    pub css: String,
}

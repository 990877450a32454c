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

use async_trait::async_trait;
use thiserror::Error;

/// 渲染错误类型
#[derive(Error, Debug)]
pub enum RenderError {
    /// 浏览器启动失败
    #[error("Browser launch failed: {0}")]
    Launch(String),
    /// 页面导航失败
    #[error("Navigation failed: {0}")]
    Navigation(String),
    /// 页面脚本求值失败
    #[error("Page evaluation failed: {0}")]
    Evaluation(String),
    /// 渲染超时
    #[error("Render timed out")]
    Timeout,
}

/// 渲染请求
///
/// URL由调用方先行验证，这里不再做语法检查。
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// 目标URL（绝对http/https地址）
    pub url: String,
}

/// 渲染结果
///
/// 引擎输出的原始页面序列化，未经标记清理。
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// 序列化的文档标记
    pub html: String,
    /// 样式文本（style标签内容、外部样式表占位注释、可选的计算样式规则）
    pub css: String,
}

/// 渲染引擎特质
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// 渲染页面并提取标记与样式
    async fn render(&self, request: &RenderRequest) -> Result<RenderedPage, RenderError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}

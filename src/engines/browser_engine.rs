// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::RenderSettings;
use crate::engines::traits::{RenderEngine, RenderError, RenderRequest, RenderedPage};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde::Deserialize;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::{debug, warn};

/// 每次滚动后的等待时间（毫秒）
const SCROLL_PAUSE_MS: u64 = 200;

/// 采集style标签内容和外部样式表href
const STYLE_COLLECTION_JS: &str = r#"
(() => {
    const styles = [];
    for (const el of document.querySelectorAll('style')) {
        if (el.textContent && el.textContent.trim()) {
            styles.push(el.textContent);
        }
    }
    const links = [];
    for (const el of document.querySelectorAll('link[rel="stylesheet"]')) {
        const href = el.getAttribute('href');
        if (href) {
            links.push(href);
        }
    }
    return { styles, links };
})()
"#;

/// 遍历所有元素，为每个首次出现的class采集计算样式快照。
/// 属性允许列表与无操作默认值过滤在页面内完成，避免往返传输整个样式表。
const COMPUTED_STYLE_JS: &str = r#"
(() => {
    const PROPS = [
        'color', 'background-color', 'background-image', 'font-size', 'font-family',
        'font-weight', 'line-height', 'text-align', 'text-decoration', 'letter-spacing',
        'margin', 'padding', 'border', 'border-radius', 'display', 'position',
        'width', 'height', 'box-shadow', 'opacity', 'z-index', 'overflow'
    ];
    const NOOP = ['none', 'normal', 'auto', 'rgba(0, 0, 0, 0)', 'normal normal'];
    const seen = new Set();
    const out = [];
    for (const el of document.querySelectorAll('*')) {
        for (const name of el.classList) {
            if (seen.has(name)) continue;
            seen.add(name);
            const cs = window.getComputedStyle(el);
            const decls = [];
            for (const prop of PROPS) {
                const value = cs.getPropertyValue(prop);
                if (!value || NOOP.includes(value)) continue;
                decls.push([prop, value]);
            }
            if (decls.length) {
                out.push({ name, decls });
            }
        }
    }
    return out;
})()
"#;

/// 单步滚动并报告是否已到达页面底部
const SCROLL_STEP_JS: &str = "(() => { \
    window.scrollBy(0, 600); \
    return (window.innerHeight + window.scrollY) >= document.body.scrollHeight; \
})()";

#[derive(Debug, Deserialize)]
struct StyleCollection {
    styles: Vec<String>,
    links: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ClassStyle {
    name: String,
    decls: Vec<(String, String)>,
}

/// 浏览器渲染引擎
///
/// 基于chromiumoxide实现的无头浏览器页面渲染引擎。
/// 每次调用启动独立的浏览器进程，不在请求之间复用，
/// 进程在所有退出路径上（包括超时和导航失败）都会被关闭。
pub struct BrowserEngine {
    settings: RenderSettings,
}

impl BrowserEngine {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    /// 导航、等待并序列化页面
    ///
    /// 浏览器进程的生命周期由调用方`render`负责，这里只操作页面。
    async fn render_page(
        &self,
        browser: &Browser,
        request: &RenderRequest,
    ) -> Result<RenderedPage, RenderError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        // goto waits for the load event by default
        page.goto(request.url.as_str())
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        // Fixed settle delay for late-arriving dynamic content
        tokio::time::sleep(Duration::from_millis(self.settings.settle_ms)).await;

        if self.settings.auto_scroll {
            self.scroll_to_bottom(&page).await?;
        }

        let html = if self.settings.full_document {
            page.content()
                .await
                .map_err(|e| RenderError::Evaluation(e.to_string()))?
        } else {
            page.evaluate("document.body ? document.body.outerHTML : ''")
                .await
                .map_err(|e| RenderError::Evaluation(e.to_string()))?
                .into_value::<String>()
                .map_err(|e| RenderError::Evaluation(e.to_string()))?
        };

        let css = self.collect_css(&page).await?;

        Ok(RenderedPage { html, css })
    }

    /// 按固定步长滚动到页面底部，触发懒加载内容
    async fn scroll_to_bottom(&self, page: &Page) -> Result<(), RenderError> {
        for step in 0..self.settings.max_scroll_steps {
            let at_bottom: bool = page
                .evaluate(SCROLL_STEP_JS)
                .await
                .map_err(|e| RenderError::Evaluation(e.to_string()))?
                .into_value()
                .map_err(|e| RenderError::Evaluation(e.to_string()))?;

            if at_bottom {
                debug!("Reached page bottom after {} scroll steps", step + 1);
                break;
            }
            tokio::time::sleep(Duration::from_millis(SCROLL_PAUSE_MS)).await;
        }

        page.evaluate("window.scrollTo(0, 0);")
            .await
            .map_err(|e| RenderError::Evaluation(e.to_string()))?;

        Ok(())
    }

    /// 采集页面样式文本
    ///
    /// 包含style标签内容和每个外部样式表的占位注释（不抓取外部文件）。
    /// 启用`capture_computed_styles`时，追加按class合成的计算样式规则。
    async fn collect_css(&self, page: &Page) -> Result<String, RenderError> {
        let collected: StyleCollection = page
            .evaluate(STYLE_COLLECTION_JS)
            .await
            .map_err(|e| RenderError::Evaluation(e.to_string()))?
            .into_value()
            .map_err(|e| RenderError::Evaluation(e.to_string()))?;

        let mut css = String::new();
        for text in &collected.styles {
            css.push_str(text.trim());
            css.push('\n');
        }
        for href in &collected.links {
            let _ = writeln!(css, "/* external stylesheet (not fetched): {} */", href);
        }

        if self.settings.capture_computed_styles {
            let classes: Vec<ClassStyle> = page
                .evaluate(COMPUTED_STYLE_JS)
                .await
                .map_err(|e| RenderError::Evaluation(e.to_string()))?
                .into_value()
                .map_err(|e| RenderError::Evaluation(e.to_string()))?;

            debug!("Collected computed styles for {} classes", classes.len());
            for class in &classes {
                if let Some(rule) = synthesize_rule(class) {
                    css.push_str(&rule);
                }
            }
        }

        Ok(css)
    }
}

/// 将一个class的计算样式快照合成为CSS规则文本
///
/// 含特殊字符的class名无法安全地写成选择器，直接跳过。
fn synthesize_rule(class: &ClassStyle) -> Option<String> {
    if class.name.is_empty() || class.decls.is_empty() {
        return None;
    }
    let name_ok = class
        .name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !name_ok || class.name.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let mut rule = format!(".{} {{\n", class.name);
    for (prop, value) in &class.decls {
        let _ = writeln!(rule, "  {}: {};", prop, value);
    }
    rule.push_str("}\n");
    Some(rule)
}

#[async_trait]
impl RenderEngine for BrowserEngine {
    /// 执行页面渲染
    ///
    /// # 参数
    ///
    /// * `request` - 渲染请求
    ///
    /// # 返回值
    ///
    /// * `Ok(RenderedPage)` - 序列化的页面标记与样式
    /// * `Err(RenderError)` - 启动、导航、求值或超时错误
    async fn render(&self, request: &RenderRequest) -> Result<RenderedPage, RenderError> {
        let timeout_secs = self.settings.timeout_secs.clamp(30, 45);

        let config = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .request_timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(RenderError::Launch)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let outcome = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            self.render_page(&browser, request),
        )
        .await;

        // The process must not outlive the request, error paths included.
        if let Err(e) = browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        let _ = browser.wait().await;
        handler_task.abort();

        match outcome {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout),
        }
    }

    /// 获取引擎名称
    fn name(&self) -> &'static str {
        "browser"
    }
}

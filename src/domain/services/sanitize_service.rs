// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;

/// 已知跟踪脚本标记列表
///
/// 固定的小列表，仅做尽力而为的清除，不追求完整性，
/// 也不构成任何安全边界。
const TRACKING_MARKERS: &[&str] = &[
    "google analytics",
    "googletagmanager",
    "google tag manager",
    "gtag",
    "facebook pixel",
    "fbq(",
    "hotjar",
];

/// 标记清理器
///
/// 持有预编译的正则表达式集合
struct MarkupCleaner {
    block_patterns: Vec<Regex>,
    stray_tag_pattern: Regex,
    comment_pattern: Regex,
    tracking_attr_pattern: Regex,
    whitespace_runs: Regex,
    intertag_whitespace: Regex,
}

/// 全局清理器实例
static CLEANER: Lazy<MarkupCleaner> = Lazy::new(MarkupCleaner::new);

impl MarkupCleaner {
    fn new() -> Self {
        let block_patterns = ["script", "iframe", "noscript"]
            .iter()
            .map(|tag| {
                Regex::new(&format!(r"(?is)<{tag}[^>]*>.*?</{tag}[^>]*>")).expect("valid pattern")
            })
            .collect();

        Self {
            block_patterns,
            // Leftover open/close tags from malformed or nested markup. The
            // trailing `>` is optional so truncated tags still match.
            stray_tag_pattern: Regex::new(r"(?i)</?(?:script|iframe|noscript)[^>]*>?")
                .expect("valid pattern"),
            comment_pattern: Regex::new(r"(?s)<!--.*?-->").expect("valid pattern"),
            tracking_attr_pattern: Regex::new(
                r#"(?i)\s(?:data-gtm|data-ga|data-analytics)[\w-]*\s*=\s*(?:"[^"]*"|'[^']*')"#,
            )
            .expect("valid pattern"),
            whitespace_runs: Regex::new(r"\s+").expect("valid pattern"),
            intertag_whitespace: Regex::new(r">\s+<").expect("valid pattern"),
        }
    }

    fn clean(&self, html: &str) -> String {
        let mut text = html.to_string();

        for pattern in &self.block_patterns {
            text = pattern.replace_all(&text, "").into_owned();
        }

        // Removing an enclosing block can reassemble a tag from the pieces
        // around it, so strip stray tags until a fixpoint is reached.
        loop {
            let next = self.stray_tag_pattern.replace_all(&text, "").into_owned();
            if next == text {
                break;
            }
            text = next;
        }

        text = self
            .comment_pattern
            .replace_all(&text, |caps: &regex::Captures| {
                let comment = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                let lowered = comment.to_lowercase();
                if TRACKING_MARKERS.iter().any(|m| lowered.contains(m)) {
                    String::new()
                } else {
                    comment.to_string()
                }
            })
            .into_owned();

        text = self.tracking_attr_pattern.replace_all(&text, "").into_owned();

        let text = self.whitespace_runs.replace_all(&text, " ");
        let text = self.intertag_whitespace.replace_all(&text, "><");

        text.trim().to_string()
    }
}

/// 清理页面标记
///
/// 纯文本转换，无失败路径：
/// - 移除script、iframe、noscript块及其残留标签
/// - 移除含已知跟踪标记的注释和跟踪属性
/// - 折叠空白并移除标签之间的空白
///
/// 对已清理的输出重复调用是无操作（幂等）。
pub fn sanitize_markup(html: &str) -> String {
    CLEANER.clean(html)
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::GenerationSettings;
use crate::domain::models::generated_code::GeneratedCode;
use reqwest::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// 嵌入提示词的标记文本字符预算
const MAX_PROMPT_HTML_CHARS: usize = 8000;

/// 生成请求失败时返回的回退SQL schema
pub const FALLBACK_SQL_SCHEMA: &str = r#"-- Example schema generated as a fallback
CREATE TABLE users (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) UNIQUE NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE submissions (
    id SERIAL PRIMARY KEY,
    user_id INTEGER REFERENCES users(id),
    content TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;

/// 生成请求失败时返回的回退路由代码
pub const FALLBACK_NODE_ROUTE: &str = r#"// Example CRUD routes generated as a fallback
const express = require('express');
const router = express.Router();
const db = require('../db');

router.get('/submissions', async (req, res) => {
    const rows = await db.query('SELECT * FROM submissions ORDER BY created_at DESC');
    res.json(rows);
});

router.get('/submissions/:id', async (req, res) => {
    const row = await db.query('SELECT * FROM submissions WHERE id = $1', [req.params.id]);
    if (!row) return res.status(404).json({ error: 'Not found' });
    res.json(row);
});

router.post('/submissions', async (req, res) => {
    const { userId, content } = req.body;
    const row = await db.query(
        'INSERT INTO submissions (user_id, content) VALUES ($1, $2) RETURNING *',
        [userId, content]
    );
    res.status(201).json(row);
});

router.put('/submissions/:id', async (req, res) => {
    const { content } = req.body;
    const row = await db.query(
        'UPDATE submissions SET content = $1 WHERE id = $2 RETURNING *',
        [content, req.params.id]
    );
    if (!row) return res.status(404).json({ error: 'Not found' });
    res.json(row);
});

router.delete('/submissions/:id', async (req, res) => {
    await db.query('DELETE FROM submissions WHERE id = $1', [req.params.id]);
    res.status(204).end();
});

module.exports = router;
"#;

/// 生成错误类型
///
/// 所有变体在处理上等价（替换为回退代码），
/// 区分仅用于日志归类。
#[derive(Error, Debug)]
pub enum GenerationError {
    /// API密钥未配置
    #[error("Generation API key not configured")]
    MissingApiKey,
    /// API密钥无效
    #[error("Generation API key is invalid")]
    InvalidApiKey,
    /// 触发速率限制
    #[error("Generation rate limit exceeded")]
    RateLimited,
    /// 配额耗尽
    #[error("Generation quota exceeded")]
    QuotaExceeded,
    /// 内容被安全过滤器拦截
    #[error("Generation blocked by content safety filter")]
    ContentBlocked,
    /// 请求发送失败
    #[error("Generation request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API返回错误状态
    #[error("Generation API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// 模型回复无法解析为预期结构
    #[error("Malformed generation reply: {0}")]
    MalformedReply(String),
}

/// 代码生成服务 - 处理与模型提供商的交互
///
/// # 功能
///
/// 将清理后的页面标记嵌入提示词，调用OpenAI兼容的
/// chat completions接口，并将自由文本回复强制转换为
/// `GeneratedCode`结构。任何内部失败都在此边界内被吸收，
/// 调用方始终得到结果（失败时为固定回退代码）。
///
/// 服务在进程启动时构造一次，通过依赖注入传入请求处理器。
pub struct GenerationService {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base_url: String,
    temperature: f32,
    max_tokens: u32,
}

impl GenerationService {
    pub fn from_settings(settings: &GenerationSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_base_url: settings.api_base_url.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }

    /// 回退代码对
    pub fn fallback_code() -> GeneratedCode {
        GeneratedCode {
            sql_schema: FALLBACK_SQL_SCHEMA.to_string(),
            node_route: FALLBACK_NODE_ROUTE.to_string(),
        }
    }

    /// 从清理后的标记生成schema和路由代码
    ///
    /// 生成失败对调用方不可见：内部错误记录日志后
    /// 返回回退代码对，此方法永不失败。
    pub async fn generate(&self, html: &str) -> GeneratedCode {
        match self.request_generation(html).await {
            Ok(code) => code,
            Err(e) => {
                warn!("Code generation failed, substituting fallback code: {}", e);
                Self::fallback_code()
            }
        }
    }

    async fn request_generation(&self, html: &str) -> Result<GeneratedCode, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey)?;

        let prompt = build_prompt(html);
        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a code generation assistant. You output only valid JSON."
                },
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens
        });

        let url = format!("{}/chat/completions", self.api_base_url);
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_api_failure(status, &error_text));
        }

        let body: Value = response.json().await?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                GenerationError::MalformedReply("response has no message content".to_string())
            })?;

        debug!("Model reply length: {} chars", content.len());
        coerce_reply(content)
    }
}

/// 构造生成提示词
fn build_prompt(html: &str) -> String {
    let truncated = truncate_on_char_boundary(html, MAX_PROMPT_HTML_CHARS);
    format!(
        "You are given the rendered HTML of a web page. Identify the form and input fields \
         it contains, propose a relational database schema for the data behind the page, and \
         write a Node.js Express route module implementing CRUD endpoints against that schema. \
         Respond with ONLY a JSON object with exactly two string keys: \"sqlSchema\" containing \
         the CREATE TABLE statements and \"nodeRoute\" containing the Express route code. \
         No markdown, no commentary.\n\nHTML:\n{}",
        truncated
    )
}

/// 在字符边界上截断文本
fn truncate_on_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// 将模型的自由文本回复强制转换为结构化结果
///
/// 尽力而为的恢复启发式：去除首尾空白和markdown代码围栏，
/// 收窄到首个`{`与最后一个`}`之间的子串，再按JSON解析并
/// 校验两个键均存在且非空。对字符串值中包含大括号的
/// 病态回复不提供保证。
pub fn coerce_reply(raw: &str) -> Result<GeneratedCode, GenerationError> {
    let stripped = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let narrowed = match (stripped.find('{'), stripped.rfind('}')) {
        (Some(start), Some(end)) if start < end => &stripped[start..=end],
        _ => stripped,
    };

    let value: Value = serde_json::from_str(narrowed)
        .map_err(|e| GenerationError::MalformedReply(format!("not valid JSON: {}", e)))?;

    let sql_schema = require_text_field(&value, "sqlSchema")?;
    let node_route = require_text_field(&value, "nodeRoute")?;

    Ok(GeneratedCode {
        sql_schema,
        node_route,
    })
}

fn require_text_field(value: &Value, key: &str) -> Result<String, GenerationError> {
    match value.get(key).and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        Some(_) => Err(GenerationError::MalformedReply(format!(
            "key '{}' is empty",
            key
        ))),
        None => Err(GenerationError::MalformedReply(format!(
            "missing key '{}'",
            key
        ))),
    }
}

/// 按状态码和响应正文中的关键字对API失败归类
fn classify_api_failure(status: StatusCode, body: &str) -> GenerationError {
    let lowered = body.to_lowercase();

    if status == StatusCode::UNAUTHORIZED
        || lowered.contains("invalid api key")
        || lowered.contains("incorrect api key")
    {
        return GenerationError::InvalidApiKey;
    }
    if lowered.contains("insufficient_quota") || lowered.contains("quota") {
        return GenerationError::QuotaExceeded;
    }
    if status == StatusCode::TOO_MANY_REQUESTS || lowered.contains("rate limit") {
        return GenerationError::RateLimited;
    }
    if lowered.contains("content_filter")
        || lowered.contains("safety")
        || lowered.contains("content policy")
    {
        return GenerationError::ContentBlocked;
    }

    GenerationError::Api {
        status: status.as_u16(),
        message: body.chars().take(300).collect(),
    }
}

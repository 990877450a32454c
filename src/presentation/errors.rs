// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::engines::traits::RenderError;

/// API错误封装
///
/// 将管道中的失败统一映射为HTTP错误信封。
/// 400响应为`{error, message}`；500响应为
/// `{success:false, error, message, details?}`，
/// 其中`details`仅在非生产模式下包含内部错误信息。
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    message: String,
    details: Option<String>,
}

impl ApiError {
    /// 请求体缺少URL字段
    pub fn missing_url() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "URL is required",
            message: "Provide a url field in the request body".to_string(),
            details: None,
        }
    }

    /// URL不是合法的绝对http(s)地址
    pub fn invalid_url() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "Invalid URL",
            message: "The url must be an absolute http or https URL".to_string(),
            details: None,
        }
    }

    /// 页面渲染失败
    pub fn render_failed(err: &RenderError, include_details: bool) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: "Failed to clone website",
            message: "Sorry, something went wrong while processing the page. Please try again."
                .to_string(),
            details: include_details.then(|| err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.error,
            "message": self.message,
        });

        if self.status.is_server_error() {
            body["success"] = json!(false);
            if let Some(details) = self.details {
                body["details"] = json!(details);
            }
        }

        (self.status, Json(body)).into_response()
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::presentation::handlers::clone_handler;
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由，未匹配的路径统一落入404处理器
pub fn routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/clone", post(clone_handler::clone_site))
        .fallback(not_found)
}

/// 健康检查端点
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "clonrs is running"
    }))
}

/// 未匹配路由的统一404响应
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not Found",
            "message": "The requested resource does not exist"
        })),
    )
}

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

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::{
    application::dto::{
        clone_request::CloneRequestDto,
        clone_response::{CloneData, CloneMetadata, CloneResponseDto},
    },
    config::settings::Settings,
    domain::models::scrape_result::ScrapeResult,
    domain::services::generation_service::GenerationService,
    domain::services::sanitize_service::sanitize_markup,
    engines::traits::{RenderEngine, RenderRequest},
    presentation::errors::ApiError,
    utils::validators::{self, ValidationError},
};

/// 克隆端点处理器
///
/// 按顺序执行：URL验证 → 页面渲染 → 标记清理 → 代码生成。
/// 渲染与生成之间无并行（生成依赖渲染输出）。
/// 验证失败时管道不会启动。
pub async fn clone_site(
    Extension(engine): Extension<Arc<dyn RenderEngine>>,
    Extension(generation): Extension<Arc<GenerationService>>,
    Extension(settings): Extension<Arc<Settings>>,
    Json(payload): Json<CloneRequestDto>,
) -> Result<(StatusCode, Json<CloneResponseDto>), ApiError> {
    let started = Instant::now();

    let raw_url = payload.url.as_deref().unwrap_or_default();
    let url = match validators::validate_url(raw_url) {
        Ok(url) => url,
        Err(ValidationError::MissingUrl) => return Err(ApiError::missing_url()),
        Err(ValidationError::InvalidUrl) => return Err(ApiError::invalid_url()),
    };

    info!("Cloning {} via {} engine", url, engine.name());

    let request = RenderRequest {
        url: url.to_string(),
    };
    let page = match engine.render(&request).await {
        Ok(page) => page,
        Err(e) => {
            error!("Render failed for {}: {}", url, e);
            return Err(ApiError::render_failed(&e, !settings.is_production()));
        }
    };

    let scrape = ScrapeResult {
        html: sanitize_markup(&page.html),
        css: page.css,
    };

    // Generation failures are absorbed below this call; the request still
    // succeeds with fallback code.
    let code = generation.generate(&scrape.html).await;

    let elapsed = started.elapsed();
    info!(
        "Cloned {} in {:.2}s ({} bytes of markup)",
        url,
        elapsed.as_secs_f64(),
        scrape.html.len()
    );

    let response = CloneResponseDto {
        success: true,
        data: CloneData {
            html: scrape.html,
            css: scrape.css,
            sql_schema: code.sql_schema,
            node_route: code.node_route,
            metadata: CloneMetadata {
                source_url: raw_url.trim().to_string(),
                processing_time: format!("{:.2}s", elapsed.as_secs_f64()),
                timestamp: Utc::now().to_rfc3339(),
            },
        },
    };

    Ok((StatusCode::OK, Json(response)))
}

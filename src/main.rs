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

use axum::Extension;
use clonrs::config::settings::Settings;
use clonrs::domain::services::generation_service::GenerationService;
use clonrs::engines::browser_engine::BrowserEngine;
use clonrs::engines::traits::RenderEngine;
use clonrs::presentation::routes;
use clonrs::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting clonrs...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // 3. Initialize components; the generation client is built once here and
    //    injected into the handlers.
    let engine: Arc<dyn RenderEngine> = Arc::new(BrowserEngine::new(settings.render.clone()));
    let generation = Arc::new(GenerationService::from_settings(&settings.generation));
    if settings.generation.api_key.is_none() {
        warn!("No generation API key configured; all responses will carry fallback code");
    }

    // 4. Start HTTP server
    let app = routes::routes()
        .layer(Extension(engine))
        .layer(Extension(generation))
        .layer(Extension(settings.clone()))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含服务器、页面渲染和代码生成等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 页面渲染配置
    pub render: RenderSettings,
    /// 代码生成配置
    pub generation: GenerationSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
    /// 运行模式 (development, production)
    ///
    /// 生产模式下错误响应不包含内部细节
    pub environment: String,
}

/// 页面渲染配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RenderSettings {
    /// 页面导航超时时间（秒）
    pub timeout_secs: u64,
    /// 导航完成后的固定等待时间（毫秒）
    pub settle_ms: u64,
    /// 是否自动滚动页面以触发懒加载内容
    pub auto_scroll: bool,
    /// 自动滚动的最大步数
    pub max_scroll_steps: u32,
    /// 是否序列化完整文档（包含head），否则仅序列化body
    pub full_document: bool,
    /// 是否采集每个class的计算样式快照
    pub capture_computed_styles: bool,
}

/// 代码生成配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationSettings {
    /// 模型提供商API密钥
    ///
    /// 未配置时所有生成请求返回回退代码
    pub api_key: Option<String>,
    /// 使用的模型名称
    pub model: String,
    /// API基础URL
    pub api_base_url: String,
    /// 采样温度
    pub temperature: f32,
    /// 输出令牌上限
    pub max_tokens: u32,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.environment", "development")?
            // Default render settings
            .set_default("render.timeout_secs", 35)?
            .set_default("render.settle_ms", 1500)?
            .set_default("render.auto_scroll", true)?
            .set_default("render.max_scroll_steps", 20)?
            .set_default("render.full_document", true)?
            .set_default("render.capture_computed_styles", false)?
            // Default generation settings (api_key stays unset unless provided)
            .set_default("generation.model", "gpt-4o-mini")?
            .set_default("generation.api_base_url", "https://api.openai.com/v1")?
            .set_default("generation.temperature", 0.4)?
            .set_default("generation.max_tokens", 4096)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("CLONRS").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// 是否为生产模式
    pub fn is_production(&self) -> bool {
        self.server.environment.eq_ignore_ascii_case("production")
    }
}

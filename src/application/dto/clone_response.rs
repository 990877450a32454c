// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 克隆响应数据传输对象
///
/// 用于封装服务器对克隆请求的成功响应结果
#[derive(Debug, Deserialize, Serialize)]
pub struct CloneResponseDto {
    /// 请求处理是否成功
    pub success: bool,
    /// 克隆结果数据
    pub data: CloneData,
}

/// 克隆结果数据
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneData {
    /// 清理后的页面标记
    pub html: String,
    /// 提取的样式文本
    pub css: String,
    /// 生成的SQL schema文本
    pub sql_schema: String,
    /// 生成的服务端路由代码文本
    pub node_route: String,
    /// 请求元数据
    pub metadata: CloneMetadata,
}

/// 克隆请求元数据
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneMetadata {
    /// 客户端请求的原始URL
    pub source_url: String,
    /// 处理耗时，格式为"<seconds>s"
    pub processing_time: String,
    /// 响应组装时间戳（RFC 3339）
    pub timestamp: String,
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 生成代码结果
///
/// 模型生成的两段不透明文本。内容不做结构化校验，
/// 仅在解析模型回复时检查非空。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCode {
    /// SQL schema文本
    pub sql_schema: String,
    /// 服务端CRUD路由代码文本
    pub node_route: String,
}

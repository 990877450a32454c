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

use serde::{Deserialize, Serialize};

/// 克隆请求数据传输对象
///
/// 用于封装客户端发起的网页克隆请求的相关参数
#[derive(Debug, Deserialize, Serialize)]
pub struct CloneRequestDto {
    /// 要克隆的网页URL
    ///
    /// 使用Option以区分"字段缺失"和"URL格式错误"两种失败
    pub url: Option<String>,
}

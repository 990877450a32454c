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

use thiserror::Error;
use url::Url;

/// 验证错误类型
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// URL缺失
    #[error("URL is required")]
    MissingUrl,
    /// URL无效
    #[error("Invalid URL")]
    InvalidUrl,
}

/// 验证URL
///
/// 仅做语法层面的校验：必须是绝对的http或https URL。
///
/// # 参数
///
/// * `raw` - 客户端提交的URL字符串
///
/// # 返回值
///
/// * `Ok(Url)` - 解析后的URL
/// * `Err(ValidationError)` - URL缺失或无效
pub fn validate_url(raw: &str) -> Result<Url, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingUrl);
    }

    let parsed = Url::parse(trimmed).map_err(|_| ValidationError::InvalidUrl)?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ValidationError::InvalidUrl);
    }

    if parsed.host_str().is_none() {
        return Err(ValidationError::InvalidUrl);
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://example.com/page?x=1").is_ok());
    }

    #[test]
    fn test_rejects_empty_and_whitespace() {
        assert_eq!(validate_url(""), Err(ValidationError::MissingUrl));
        assert_eq!(validate_url("   "), Err(ValidationError::MissingUrl));
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(validate_url("not a url"), Err(ValidationError::InvalidUrl));
        assert_eq!(validate_url("example.com"), Err(ValidationError::InvalidUrl));
        assert_eq!(
            validate_url("htp:/broken"),
            Err(ValidationError::InvalidUrl)
        );
    }

    #[test]
    fn test_rejects_non_http_schemes() {
        assert_eq!(
            validate_url("ftp://example.com"),
            Err(ValidationError::InvalidUrl)
        );
        assert_eq!(
            validate_url("file:///etc/passwd"),
            Err(ValidationError::InvalidUrl)
        );
        assert_eq!(
            validate_url("javascript:alert(1)"),
            Err(ValidationError::InvalidUrl)
        );
    }
}

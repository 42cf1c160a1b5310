// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 主机名是否属于目标站点（相同或为其子域名）
pub fn host_matches(host: &str, target: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let target = target.trim_end_matches('.').to_ascii_lowercase();
    !target.is_empty() && (host == target || host.ends_with(&format!(".{}", target)))
}

//! 导入浏览器 Cookie

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use reqwest::cookie::Jar;
use tracing::debug;
use url::Url;

use crate::RuntimeError;

/// 解析 `document.cookie` 格式的串, 跳过空项与没有 `=` 的项
pub fn parse_cookie(cookie_str: &str) -> Vec<(String, String)> {
    cookie_str
        .split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(|p| {
            let (k, v) = p.split_once('=')?;
            let k = k.trim();
            (!k.is_empty()).then(|| (k.to_string(), v.trim().to_string()))
        })
        .collect()
}

/// 把 Cookie 写入 `jar`, 归属 `origin` 所在的站点
pub fn load_cookies(jar: &Jar, cookie_str: &str, origin: &str) -> Result<usize, RuntimeError> {
    let origin = Url::parse(origin)
        .map_err(|e| RuntimeError::Config(format!("invalid cookie origin {origin}: {e}")))?;
    let cookies = parse_cookie(cookie_str);
    for (k, v) in &cookies {
        debug!(name = %k, origin = %origin, "cookie");
        jar.add_cookie_str(&format!("{k}={v}; Path=/"), &origin);
    }
    Ok(cookies.len())
}

#[cfg(test)]
mod tests {
    use reqwest::cookie::CookieStore;

    use super::*;

    #[test]
    fn test_parse_cookie() {
        assert_eq!(
            parse_cookie(" JSESSIONID=abc ; ; 39ce7=CFh=x; broken ;=v"),
            vec![
                ("JSESSIONID".to_string(), "abc".to_string()),
                ("39ce7".to_string(), "CFh=x".to_string()),
            ]
        );
        assert!(parse_cookie("").is_empty());
    }

    #[test]
    fn test_load_cookies() -> Result<(), RuntimeError> {
        let jar = Jar::default();
        let n = load_cookies(&jar, "JSESSIONID=abc; X-User=tourist", "https://codeforces.com")?;
        assert_eq!(n, 2);

        let url = Url::parse("https://codeforces.com/enter")
            .map_err(|e| RuntimeError::Config(e.to_string()))?;
        let header = jar.cookies(&url).unwrap();
        let header = header.to_str().unwrap();
        assert!(header.contains("JSESSIONID=abc"));
        assert!(header.contains("X-User=tourist"));

        assert!(matches!(
            load_cookies(&jar, "a=b", "not a url"),
            Err(RuntimeError::Config(_))
        ));
        Ok(())
    }
}

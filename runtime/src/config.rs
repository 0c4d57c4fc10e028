//! 运行时配置

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::RuntimeError;

/// 部分站点 (HackerRank) 拒绝默认 UA
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// 运行时配置, 所有字段都有默认值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub user_agent: String,
    /// 0 表示不限时
    pub timeout_secs: u64,
    /// `document.cookie` 格式的 Cookie 串
    pub cookies: Option<String>,
    /// Cookie 所属的站点, 如 `https://codeforces.com`
    pub cookie_origin: Option<String>,
    /// `RUST_LOG` 未设置时使用
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            cookies: None,
            cookie_origin: None,
            log_filter: "info".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_json_str(s: &str) -> Result<Self, RuntimeError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

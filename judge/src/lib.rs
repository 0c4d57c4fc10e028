//! 评测站点 URL 解析与样例配对

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod factory;
pub mod models;
pub mod services;
pub mod session;
pub mod traits;
mod utils;
pub mod zipper;

#[cfg(test)]
mod test_utils;

pub use factory::{Factory, Registry, RegistryItem};
pub use models::*;
pub use session::{Body, Credentials, Method, Request, Response, Session};
pub use traits::*;
pub use zipper::{ArchiveFormat, LabelMarkers, SampleZipper, zip_archive};

pub mod error {
    //! 错误类型

    pub type Result<T> = std::result::Result<T, Error>;

    /// 通用错误
    ///
    /// 未匹配到适配器不是错误, 以 `None` 表示.
    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error("fetch error: {0}")]
        Fetch(#[from] FetchError),
        #[error("content extraction error: {0}")]
        ContentExtraction(#[from] ContentExtractionError),
        #[error("authentication required: {0}")]
        AuthenticationRequired(String),
        #[error("login failed: {0}")]
        LoginFailed(String),
        #[error("submission rejected: {0}")]
        Submission(String),
        #[error("{adapter} does not support {capability}")]
        UnsupportedCapability {
            adapter: &'static str,
            capability: &'static str,
        },
    }

    /// 传输错误, 原样上抛
    #[derive(Debug, thiserror::Error)]
    #[error("{url}: {kind}")]
    pub struct FetchError {
        pub url: String,
        #[source]
        pub kind: FetchErrorKind,
    }

    impl FetchError {
        pub fn new(url: impl Into<String>, kind: FetchErrorKind) -> Self {
            Self {
                url: url.into(),
                kind,
            }
        }
    }

    /// 传输错误类型
    #[derive(Debug, thiserror::Error)]
    pub enum FetchErrorKind {
        #[error("transport: {0}")]
        Transport(String),
        #[error("unexpected status {0}")]
        Status(u16),
        #[error("decode: {0}")]
        Decode(String),
    }

    /// 已识别的标签后内容无法提取
    #[derive(Debug, thiserror::Error)]
    #[error("{adapter}: {reason}")]
    pub struct ContentExtractionError {
        pub adapter: &'static str,
        pub label: Option<String>,
        pub reason: String,
    }

    impl ContentExtractionError {
        pub fn new(adapter: &'static str, reason: impl Into<String>) -> Self {
            Self {
                adapter,
                label: None,
                reason: reason.into(),
            }
        }

        pub fn with_label(mut self, label: impl Into<String>) -> Self {
            self.label = Some(label.into());
            self
        }
    }

    impl Error {
        pub(crate) fn unsupported(adapter: &'static str, capability: &'static str) -> Self {
            Self::UnsupportedCapability {
                adapter,
                capability,
            }
        }

        pub(crate) fn extraction(adapter: &'static str, reason: impl Into<String>) -> Self {
            Self::ContentExtraction(ContentExtractionError::new(adapter, reason))
        }
    }
}

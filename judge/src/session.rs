//! HTTP 协作方接口
//!
//! 传输、Cookie 与超时都由实现方负责; 本 crate 只构造请求并读取响应.

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::borrow::Cow;

use serde::de::DeserializeOwned;

use crate::error::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

/// HTTP 请求
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
    pub follow_redirects: bool,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            follow_redirects: true,
        }
    }

    pub fn post_form(url: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            body: Some(Body::Form(fields)),
            ..Self::get(url)
        }
    }

    pub fn post_json(url: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            body: Some(Body::Json(value)),
            ..Self::get(url)
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn no_redirect(mut self) -> Self {
        self.follow_redirects = false;
        self
    }
}

/// HTTP 响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// 跟随重定向后的最终地址
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FetchError::new(self.url, FetchErrorKind::Status(self.status)).into())
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            FetchError::new(self.url.clone(), FetchErrorKind::Decode(e.to_string())).into()
        })
    }
}

/// 登录凭据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// 只在确实要提交登录表单时才调用, 以支持即时询问
pub type CredentialsProvider<'a> = &'a mut dyn FnMut() -> Result<Credentials>;

/// HTTP 会话
///
/// 传输失败返回 `Error::Fetch`; 非 2xx 状态照常返回, 由调用方决定如何处理.
pub trait Session {
    fn send(&self, request: Request) -> Result<Response>;
}

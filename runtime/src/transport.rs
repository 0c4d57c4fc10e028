//! 基于 reqwest 的阻塞会话

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::Arc;
use std::time::Duration;

use judge::error::{FetchError, FetchErrorKind};
use judge::{Body, Method, Request, Response, Session};
use reqwest::blocking::Client;
use reqwest::cookie::Jar;
use reqwest::redirect::Policy;
use tracing::debug;

use crate::RuntimeError;
use crate::config::RuntimeConfig;
use crate::cookie::load_cookies;

/// 两个客户端共用一个 Cookie 罐: 一个跟随重定向, 一个不跟随
#[derive(Debug, Clone)]
pub struct HttpSession {
    follow: Client,
    manual: Client,
    jar: Arc<Jar>,
}

impl HttpSession {
    pub fn new(config: &RuntimeConfig) -> Result<Self, RuntimeError> {
        let jar = Arc::new(Jar::default());
        if let Some(cookies) = &config.cookies {
            let Some(origin) = &config.cookie_origin else {
                return Err(RuntimeError::Config(
                    "cookies given without cookie_origin".to_string(),
                ));
            };
            let n = load_cookies(&jar, cookies, origin)?;
            debug!(count = n, %origin, "cookies loaded");
        }

        Ok(Self {
            follow: build_client(config, &jar, Policy::limited(10))?,
            manual: build_client(config, &jar, Policy::none())?,
            jar,
        })
    }

    pub fn jar(&self) -> &Arc<Jar> {
        &self.jar
    }
}

fn build_client(
    config: &RuntimeConfig,
    jar: &Arc<Jar>,
    policy: Policy,
) -> Result<Client, RuntimeError> {
    let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
    Ok(Client::builder()
        .user_agent(config.user_agent.as_str())
        .cookie_provider(Arc::clone(jar))
        .redirect(policy)
        .timeout(timeout)
        .build()?)
}

impl Session for HttpSession {
    fn send(&self, request: Request) -> judge::error::Result<Response> {
        let client = if request.follow_redirects {
            &self.follow
        } else {
            &self.manual
        };
        let transport = |e: reqwest::Error| {
            FetchError::new(request.url.clone(), FetchErrorKind::Transport(e.to_string()))
        };

        let mut builder = match request.method {
            Method::Get => client.get(&request.url),
            Method::Post => client.post(&request.url),
        };
        for (k, v) in &request.headers {
            builder = builder.header(k.as_str(), v.as_str());
        }
        builder = match &request.body {
            Some(Body::Form(fields)) => builder.form(fields),
            Some(Body::Json(value)) => builder.json(value),
            None => builder,
        };

        let resp = builder.send().map_err(transport)?;
        let url = resp.url().to_string();
        let status = resp.status().as_u16();
        let body = resp.bytes().map_err(transport)?.to_vec();
        Ok(Response { url, status, body })
    }
}

//! 评测站点客户端的默认运行环境
//!
//! 提供基于 reqwest 的会话, Cookie 导入, 配置与日志初始化, 以及按 URL 调用适配器的 `Runtime`.

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod config;
pub mod cookie;
pub mod logging;
pub mod transport;

use judge::session::CredentialsProvider;
use judge::{Contest, Language, Problem, Registry, Service, Session, Submission, TestCase};
use serde::{Deserialize, Serialize};
use tracing::info;

pub use config::RuntimeConfig;
pub use transport::HttpSession;

/// 运行时错误
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("没有找到适用于URL的适配器: {0}")]
    Unresolved(String),
    #[error(transparent)]
    Judge(#[from] judge::error::Error),
    #[error("配置无效: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("HTTP 客户端: {0}")]
    Client(#[from] reqwest::Error),
}

/// 下载用例后的输出, 便于序列化给调用方
#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadOutput {
    pub success: bool,
    pub error: Option<String>,
    pub cases: Vec<TestCase>,
}

impl From<Result<Vec<TestCase>, RuntimeError>> for DownloadOutput {
    fn from(res: Result<Vec<TestCase>, RuntimeError>) -> Self {
        match res {
            Ok(cases) => DownloadOutput {
                success: true,
                error: None,
                cases,
            },
            Err(e) => DownloadOutput {
                success: false,
                error: Some(format!("{e}")),
                cases: Vec::new(),
            },
        }
    }
}

/// 注册表与会话的组合
pub struct Runtime {
    registry: Registry,
    session: Box<dyn Session>,
}

impl Runtime {
    /// 内置适配器 + reqwest 会话, 并按配置初始化日志
    pub fn new(config: &RuntimeConfig) -> Result<Self, RuntimeError> {
        logging::init(&config.log_filter);
        let session = HttpSession::new(config)?;
        Ok(Self::with_session(Registry::with_builtin_adapters(), session))
    }

    pub fn with_session(registry: Registry, session: impl Session + 'static) -> Self {
        Self {
            registry,
            session: Box::new(session),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn session(&self) -> &dyn Session {
        self.session.as_ref()
    }

    pub fn resolve_service(&self, url: &str) -> Result<Box<dyn Service>, RuntimeError> {
        self.registry
            .resolve_service(url)
            .ok_or_else(|| RuntimeError::Unresolved(url.to_string()))
    }

    pub fn resolve_contest(&self, url: &str) -> Result<Box<dyn Contest>, RuntimeError> {
        self.registry
            .resolve_contest(url)
            .ok_or_else(|| RuntimeError::Unresolved(url.to_string()))
    }

    pub fn resolve_problem(&self, url: &str) -> Result<Box<dyn Problem>, RuntimeError> {
        self.registry
            .resolve_problem(url)
            .ok_or_else(|| RuntimeError::Unresolved(url.to_string()))
    }

    pub fn download_sample_cases(&self, url: &str) -> Result<Vec<TestCase>, RuntimeError> {
        let problem = self.resolve_problem(url)?;
        let cases = problem.download_sample_cases(self.session())?;
        info!(url, count = cases.len(), "sample cases downloaded");
        Ok(cases)
    }

    pub fn download_system_cases(&self, url: &str) -> Result<Vec<TestCase>, RuntimeError> {
        let problem = self.resolve_problem(url)?;
        let cases = problem.download_system_cases(self.session())?;
        info!(url, count = cases.len(), "system cases downloaded");
        Ok(cases)
    }

    pub fn get_available_languages(&self, url: &str) -> Result<Vec<Language>, RuntimeError> {
        let problem = self.resolve_problem(url)?;
        Ok(problem.get_available_languages(self.session())?)
    }

    pub fn submit_code(
        &self,
        url: &str,
        code: &[u8],
        language: &str,
    ) -> Result<Submission, RuntimeError> {
        let problem = self.resolve_problem(url)?;
        Ok(problem.submit_code(code, language, self.session())?)
    }

    /// 比赛中全部题目的 URL
    pub fn list_problems(&self, url: &str) -> Result<Vec<String>, RuntimeError> {
        let contest = self.resolve_contest(url)?;
        let problems = contest.list_problems(self.session())?;
        Ok(problems.iter().map(|p| p.url()).collect())
    }

    pub fn login(
        &self,
        url: &str,
        get_credentials: CredentialsProvider<'_>,
    ) -> Result<(), RuntimeError> {
        let service = self.resolve_service(url)?;
        Ok(service.login(get_credentials, self.session())?)
    }

    pub fn is_logged_in(&self, url: &str) -> Result<bool, RuntimeError> {
        let service = self.resolve_service(url)?;
        Ok(service.is_logged_in(self.session())?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use judge::error::Error;
    use judge::{Request, Response};

    use super::*;

    /// 按 URL 返回固定内容
    struct StubSession(HashMap<String, String>);

    impl Session for StubSession {
        fn send(&self, request: Request) -> judge::error::Result<Response> {
            let (status, body) = match self.0.get(&request.url) {
                Some(body) => (200, body.clone().into_bytes()),
                None => (404, Vec::new()),
            };
            Ok(Response {
                url: request.url,
                status,
                body,
            })
        }
    }

    fn runtime(routes: &[(&str, &str)]) -> Runtime {
        let routes = routes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Runtime::with_session(Registry::with_builtin_adapters(), StubSession(routes))
    }

    const GOLF: &str = "http://golf.shinh.org/p.rb?echo";

    #[test]
    fn test_download() -> Result<(), RuntimeError> {
        let rt = runtime(&[(
            GOLF,
            "<h2>Sample input:</h2><pre>hi\n</pre><h2>Sample output:</h2><pre>hi\n</pre>",
        )]);
        let cases = rt.download_sample_cases(GOLF)?;
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].input_data, b"hi\n");

        let output = DownloadOutput::from(rt.download_sample_cases(GOLF));
        assert!(output.success);
        assert_eq!(output.cases, cases);
        Ok(())
    }

    #[test]
    fn test_unresolved() {
        let rt = runtime(&[]);
        let res = rt.download_sample_cases("https://example.com/problem/1");
        assert!(matches!(res, Err(RuntimeError::Unresolved(_))));

        let output = DownloadOutput::from(res);
        assert!(!output.success);
        assert!(output.error.unwrap().contains("example.com"));
    }

    #[test]
    fn test_unsupported_capability() {
        let rt = runtime(&[]);
        assert!(matches!(
            rt.get_available_languages(GOLF),
            Err(RuntimeError::Judge(Error::UnsupportedCapability { .. }))
        ));
        assert!(matches!(
            rt.is_logged_in("http://golf.shinh.org/"),
            Err(RuntimeError::Judge(Error::UnsupportedCapability { .. }))
        ));
    }

    #[test]
    fn test_fetch_error_propagates() {
        let rt = runtime(&[]);
        assert!(matches!(
            rt.download_sample_cases(GOLF),
            Err(RuntimeError::Judge(Error::Fetch(_)))
        ));
    }

    #[test]
    fn test_output_serializes() -> Result<(), RuntimeError> {
        let output = DownloadOutput::from(Err(RuntimeError::Config("bad".to_string())));
        let value = serde_json::to_value(&output)?;
        assert_eq!(value["success"], false);
        assert_eq!(value["cases"], serde_json::json!([]));
        Ok(())
    }
}

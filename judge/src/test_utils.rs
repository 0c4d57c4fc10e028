//! 测试用的假会话

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::*;
use crate::session::{Method, Request, Response, Session};

/// 按 (方法, URL) 返回预设响应, 并记录收到的请求
#[derive(Default)]
pub(crate) struct MockSession {
    routes: HashMap<(Method, String), Response>,
    pub(crate) requests: RefCell<Vec<Request>>,
}

impl MockSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(
        mut self,
        method: Method,
        url: &str,
        status: u16,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        self.routes.insert(
            (method, url.to_string()),
            Response {
                url: url.to_string(),
                status,
                body: body.into(),
            },
        );
        self
    }

    pub(crate) fn get(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.on(Method::Get, url, 200, body)
    }

    /// 模拟重定向后的最终地址
    pub(crate) fn redirect(
        mut self,
        method: Method,
        from: &str,
        to: &str,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        self.routes.insert(
            (method, from.to_string()),
            Response {
                url: to.to_string(),
                status: 200,
                body: body.into(),
            },
        );
        self
    }

    pub(crate) fn sent(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }
}

impl Session for MockSession {
    fn send(&self, request: Request) -> Result<Response> {
        let key = (request.method, request.url.clone());
        self.requests.borrow_mut().push(request);
        match self.routes.get(&key) {
            Some(resp) => Ok(resp.clone()),
            None => Ok(Response {
                url: key.1,
                status: 404,
                body: Vec::new(),
            }),
        }
    }
}

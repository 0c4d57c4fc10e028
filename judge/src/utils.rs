//! 辅助工具

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use scraper::node::Node;
use scraper::{ElementRef, Selector};
use tracing::debug;
use url::Url;

use crate::error::*;
use crate::session::{Method, Request, Response, Session};

/// 解析评测站点的 URL
///
/// 只接受 http/https, 缺省协议的 `//host/path` 视为 http.
pub fn parse_url(url: &str) -> Option<Url> {
    let url = url.trim();
    let parsed = if url.starts_with("//") {
        Url::parse(&format!("http:{url}")).ok()?
    } else {
        Url::parse(url).ok()?
    };
    matches!(parsed.scheme(), "http" | "https").then_some(parsed)
}

/// 主机 (含非默认端口)
pub fn netloc(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

/// 解析 URL 并检查主机是否在白名单中
pub fn parse_with_hosts(url: &str, hosts: &[&str]) -> Option<Url> {
    let parsed = parse_url(url)?;
    let loc = netloc(&parsed);
    hosts.iter().any(|h| *h == loc).then_some(parsed)
}

/// 规范化路径: 合并重复的 `/`, 处理 `.` 与 `..`, 去掉末尾 `/`
pub fn normpath(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    format!("/{}", parts.join("/"))
}

/// CRLF 转 LF
pub fn dos2unix(s: &str) -> String {
    s.replace("\r\n", "\n")
}

/// 非空文本保证以换行结尾
pub fn textfile(s: &str) -> String {
    if s.is_empty() || s.ends_with('\n') {
        s.to_string()
    } else {
        format!("{s}\n")
    }
}

/// 样例的规范形式: 每行去掉首尾空白, 以换行结尾; 全空白视为空
pub fn format_sample_case(s: &str) -> String {
    if s.trim().is_empty() {
        return String::new();
    }
    s.trim()
        .lines()
        .map(|line| format!("{}\n", line.trim()))
        .collect()
}

/// 提取 `pre` 等块中的文本, `<br>` 与行级 `<div>` 视为换行
pub fn parse_content(element: ElementRef) -> String {
    let mut buf = String::new();
    collect_content(element, &mut buf);
    buf
}

fn collect_content(element: ElementRef, buf: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => buf.push_str(text),
            Node::Element(el) if el.name() == "br" => buf.push('\n'),
            Node::Element(el) => {
                if let Some(inner) = ElementRef::wrap(child) {
                    collect_content(inner, buf);
                }
                if el.name() == "div" && !buf.ends_with('\n') {
                    buf.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// 元素的直接文本是否为空 (只含空白)
pub fn has_no_text(element: ElementRef) -> bool {
    element.text().all(|t| t.trim().is_empty())
}

/// 下一个元素兄弟, 跳过空白文本; 遇到非空文本返回 `None`
pub fn next_element_sibling(element: ElementRef) -> Option<ElementRef> {
    for sibling in element.next_siblings() {
        match sibling.value() {
            Node::Text(text) if text.trim().is_empty() => continue,
            Node::Element(_) => return ElementRef::wrap(sibling),
            Node::Comment(_) => continue,
            _ => return None,
        }
    }
    None
}

/// 上一个元素兄弟
pub fn previous_element_sibling(element: ElementRef) -> Option<ElementRef> {
    element.prev_siblings().find_map(ElementRef::wrap)
}

pub fn selector(adapter: &'static str, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::extraction(adapter, format!("selector {css}: {e}")))
}

/// 发送请求并记录日志, 非 2xx 状态转为 `FetchError`
pub fn request(session: &dyn Session, request: Request) -> Result<Response> {
    send(session, request)?.error_for_status()
}

/// 发送请求, 不检查状态
pub fn send(session: &dyn Session, request: Request) -> Result<Response> {
    let method = match request.method {
        Method::Get => "GET",
        Method::Post => "POST",
    };
    debug!(method, url = %request.url, "request");
    let resp = session.send(request)?;
    debug!(status = resp.status, url = %resp.url, "response");
    Ok(resp)
}

/// HTML 表单, 保留隐藏字段
#[derive(Debug, Clone)]
pub struct HtmlForm {
    pub action: String,
    pub fields: Vec<(String, String)>,
}

impl HtmlForm {
    /// 从 `form` 元素构造, `action` 相对 `base` 解析
    pub fn parse(form: ElementRef, base: &str) -> Self {
        let action = form
            .value()
            .attr("action")
            .and_then(|a| Url::parse(base).ok()?.join(a).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| base.to_string());

        let mut fields = Vec::new();
        if let Ok(input_sel) = Selector::parse("input[name]") {
            for input in form.select(&input_sel) {
                let el = input.value();
                if let Some(name) = el.attr("name") {
                    fields.push((
                        name.to_string(),
                        el.attr("value").unwrap_or_default().to_string(),
                    ));
                }
            }
        }

        Self { action, fields }
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn into_request(self) -> Request {
        Request::post_form(self.action, self.fields)
    }
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;

    #[test]
    fn test_normpath() {
        assert_eq!(normpath("/contest/538/"), "/contest/538");
        assert_eq!(normpath("//problems//0423"), "/problems/0423");
        assert_eq!(normpath("/a/./b/../c"), "/a/c");
        assert_eq!(normpath(""), "/");
    }

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://codeforces.com/").is_some());
        assert!(parse_url("//codeforces.com/contest/1").is_some());
        assert!(parse_url("ftp://codeforces.com/").is_none());
        assert!(parse_url("not a url").is_none());
        let u = parse_url("http://localhost:8080/x").unwrap();
        assert_eq!(netloc(&u), "localhost:8080");
    }

    #[test]
    fn test_format_sample_case() {
        assert_eq!(format_sample_case("  1 2 \r\n3  \n\n"), "1 2\n3\n");
        assert_eq!(format_sample_case(" \n "), "");
        assert_eq!(textfile("a"), "a\n");
        assert_eq!(textfile(""), "");
        assert_eq!(dos2unix("a\r\nb\r\n"), "a\nb\n");
    }

    #[test]
    fn test_parse_content() {
        let html = Html::parse_fragment(
            r#"<pre>1<br>2<br/>3</pre><pre><div class="test-example-line">4 5</div><div class="test-example-line">6</div></pre>"#,
        );
        let sel = Selector::parse("pre").unwrap();
        let blocks: Vec<String> = html.select(&sel).map(parse_content).collect();
        assert_eq!(blocks, vec!["1\n2\n3".to_string(), "4 5\n6\n".to_string()]);
    }

    #[test]
    fn test_form() {
        let html = Html::parse_document(
            r#"<form id="f" action="/enter?back=%2F"><input type="hidden" name="csrf_token" value="abc"><input name="handleOrEmail"><input type="submit"></form>"#,
        );
        let sel = Selector::parse("form#f").unwrap();
        let mut form =
            HtmlForm::parse(html.select(&sel).next().unwrap(), "https://codeforces.com/enter");
        form.set("handleOrEmail", "tourist");
        form.set("remember", "on");
        assert_eq!(form.action, "https://codeforces.com/enter?back=%2F");
        assert_eq!(
            form.fields,
            vec![
                ("csrf_token".to_string(), "abc".to_string()),
                ("handleOrEmail".to_string(), "tourist".to_string()),
                ("remember".to_string(), "on".to_string()),
            ]
        );
    }
}

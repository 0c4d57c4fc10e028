//! Aizu Online Judge 适配器
//!
//! 官方 API: http://developers.u-aizu.ac.jp/index

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use registry::SiteAdapter;
use scraper::Html;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::*;
use crate::models::*;
use crate::session::{Request, Session};
use crate::traits::*;
use crate::utils::*;
use crate::zipper;

const NAME: &str = "Aizu Online Judge";
const OLD_HOST: &str = "judge.u-aizu.ac.jp";
const NEW_HOST: &str = "onlinejudge.u-aizu.ac.jp";

// /challenges/sources/JAG/Prelim/2881, /courses/library/4/CGL/3/CGL_3_B
static COURSE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/(challenges|courses)/(sources|library/\d+|lesson/\d+)/(\w+)/(\w+)/(\w+)$")
        .unwrap()
});

// /problems/0423
static PROBLEM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/problems/(\w+)$").unwrap());

// 样例标题
const SAMPLE_HEADINGS: [&str; 4] = ["入力例", "出力例", "Sample Input", "Sample Output"];

/// Aizu Online Judge
#[derive(Debug, Clone, PartialEq, Eq, SiteAdapter)]
#[adapter(kind = "service", name = "Aizu Online Judge", hosts = ["judge.u-aizu.ac.jp", "onlinejudge.u-aizu.ac.jp"])]
pub struct AojService;

impl Resolvable for AojService {
    fn from_url(url: &str) -> Option<Self> {
        parse_with_hosts(url, Self::hosts()).map(|_| Self)
    }

    fn get_url(&self) -> String {
        "http://judge.u-aizu.ac.jp/onlinejudge/".to_string()
    }
}

impl Service for AojService {
    fn url(&self) -> String {
        self.get_url()
    }

    fn as_login_probe(&self) -> Option<&dyn LoginProbe> {
        Some(self)
    }
}

impl LoginProbe for AojService {
    fn is_logged_in(&self, session: &dyn Session) -> Result<bool> {
        let resp = send(session, Request::get("https://judgeapi.u-aizu.ac.jp/self"))?;
        if resp.status != 200 {
            return Ok(false);
        }
        let data: serde_json::Value = resp.json()?;
        debug!(%data, "self");
        Ok(data.get("id").is_some())
    }
}

#[derive(Debug, Deserialize)]
struct SampleRecord {
    serial: u64,
    #[serde(rename = "in")]
    input: String,
    #[serde(rename = "out")]
    output: String,
}

#[derive(Debug, Deserialize)]
struct Description {
    html: String,
}

#[derive(Debug, Deserialize)]
struct CaseHeaders {
    headers: Vec<CaseHeader>,
}

#[derive(Debug, Deserialize)]
struct CaseHeader {
    serial: u64,
    name: String,
}

/// AOJ 题目, 编号形如 `DSL_1_A` 或 `2256`
#[derive(Debug, Clone, PartialEq, Eq, SiteAdapter)]
#[adapter(kind = "problem", name = "Aizu Online Judge", hosts = ["judge.u-aizu.ac.jp", "onlinejudge.u-aizu.ac.jp"])]
pub struct AojProblem {
    pub problem_id: String,
}

impl AojProblem {
    pub fn new(problem_id: impl Into<String>) -> Self {
        Self {
            problem_id: problem_id.into(),
        }
    }
}

impl Resolvable for AojProblem {
    fn from_url(url: &str) -> Option<Self> {
        let parsed = parse_with_hosts(url, Self::hosts())?;
        let path = normpath(parsed.path());

        // description.jsp?id=1169, description.jsp?id=DSL_1_A&lang=jp
        if netloc(&parsed) == OLD_HOST && path == "/onlinejudge/description.jsp" {
            let ids: Vec<String> = parsed
                .query_pairs()
                .filter(|(k, _)| k == "id")
                .map(|(_, v)| v.into_owned())
                .collect();
            return match ids.as_slice() {
                [id] if !id.is_empty() => Some(Self::new(id.as_str())),
                _ => None,
            };
        }

        if netloc(&parsed) == NEW_HOST {
            if let Some(caps) = COURSE_REGEX.captures(&path) {
                return Some(Self::new(&caps[5]));
            }
            if let Some(caps) = PROBLEM_REGEX.captures(&path) {
                return Some(Self::new(&caps[1]));
            }
        }
        None
    }

    fn get_url(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("id", &self.problem_id)
            .finish();
        format!("http://judge.u-aizu.ac.jp/onlinejudge/description.jsp?{query}")
    }
}

impl Problem for AojProblem {
    fn url(&self) -> String {
        self.get_url()
    }

    fn service(&self) -> Box<dyn Service> {
        Box::new(AojService)
    }

    fn as_sample_downloadable(&self) -> Option<&dyn SampleDownloadable> {
        Some(self)
    }

    fn as_system_case_downloadable(&self) -> Option<&dyn SystemCaseDownloadable> {
        Some(self)
    }
}

impl SampleDownloadable for AojProblem {
    fn download_sample_cases(&self, session: &dyn Session) -> Result<Vec<TestCase>> {
        let url = format!(
            "https://judgedat.u-aizu.ac.jp/testcases/samples/{}",
            self.problem_id
        );
        let records: Vec<SampleRecord> = request(session, Request::get(url))?.json()?;
        let samples: Vec<TestCase> = records
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                let serial = r.serial.to_string();
                TestCase::new(
                    format!("sample-{}", i + 1),
                    serial.clone(),
                    r.input,
                    serial,
                    r.output,
                )
            })
            .collect();

        if !samples.is_empty() {
            return Ok(samples);
        }

        // 官方 API 没有登记样例时解析题面
        warn!("sample cases are not registered in the official API");
        info!("fallback: parsing HTML");
        zipper::download_samples(self, session)
    }
}

impl FragmentSource for AojProblem {
    fn fetch_fragments(&self, session: &dyn Session) -> Result<Vec<LabeledFragment>> {
        let url = format!(
            "https://judgeapi.u-aizu.ac.jp/resources/descriptions/ja/{}",
            self.problem_id
        );
        let description: Description = request(session, Request::get(url))?.json()?;
        let document = Html::parse_fragment(&description.html);

        // h3 + pre
        let pre_sel = selector(NAME, "pre")?;
        let mut fragments = Vec::new();
        for (position, pre) in document.select(&pre_sel).enumerate() {
            let Some(heading) = previous_element_sibling(pre) else {
                continue;
            };
            if heading.value().name() != "h3" {
                continue;
            }
            let label = heading.text().collect::<String>();
            if !SAMPLE_HEADINGS.iter().any(|s| label.contains(s)) {
                continue;
            }
            let content = textfile(parse_content(pre).trim_start());
            fragments.push(LabeledFragment::new(label.trim(), content, position));
        }
        Ok(fragments)
    }
}

impl SystemCaseDownloadable for AojProblem {
    fn download_system_cases(&self, session: &dyn Session) -> Result<Vec<TestCase>> {
        let url = format!(
            "https://judgedat.u-aizu.ac.jp/testcases/{}/header",
            self.problem_id
        );
        let header: CaseHeaders = request(session, Request::get(url))?.json()?;

        // 单条数据走 /in /out, JSON 接口会截断大文件
        let mut cases = Vec::with_capacity(header.headers.len());
        for h in header.headers {
            let base = format!(
                "https://judgedat.u-aizu.ac.jp/testcases/{}/{}",
                self.problem_id, h.serial
            );
            let input = request(session, Request::get(format!("{base}/in")))?.body;
            let output = request(session, Request::get(format!("{base}/out")))?.body;
            cases.push(TestCase::new(
                h.name.clone(),
                h.name.clone(),
                input,
                h.name,
                output,
            ));
        }
        Ok(cases)
    }
}

#[derive(Debug, Deserialize)]
struct ArenaProblem {
    id: String,
    #[serde(rename = "problemId")]
    problem_id: String,
}

/// 比赛房间中的题目, 如 `RitsCamp19Day2` 的 `A`
///
/// 背后的题目编号在第一次使用时查询并缓存.
#[derive(Debug, Clone, SiteAdapter)]
#[adapter(kind = "problem", name = "Aizu Online Judge Arena", hosts = ["onlinejudge.u-aizu.ac.jp"])]
pub struct AojArenaProblem {
    pub arena_id: String,
    pub alphabet: char,
    problem_id: OnceCell<String>,
}

impl PartialEq for AojArenaProblem {
    fn eq(&self, other: &Self) -> bool {
        self.arena_id == other.arena_id && self.alphabet == other.alphabet
    }
}

impl Eq for AojArenaProblem {}

impl AojArenaProblem {
    /// `alphabet` 必须是大写字母
    pub fn new(arena_id: impl Into<String>, alphabet: char) -> Option<Self> {
        alphabet.is_ascii_uppercase().then(|| Self {
            arena_id: arena_id.into(),
            alphabet,
            problem_id: OnceCell::new(),
        })
    }

    /// 查询背后的题目编号
    pub fn get_problem_id(&self, session: &dyn Session) -> Result<&str> {
        self.problem_id
            .get_or_try_init(|| {
                let url = format!(
                    "https://judgeapi.u-aizu.ac.jp/arenas/{}/problems",
                    self.arena_id
                );
                let problems: Vec<ArenaProblem> = request(session, Request::get(url))?.json()?;
                let alphabet = self.alphabet.to_string();
                let found = problems
                    .into_iter()
                    .find(|p| p.id == alphabet)
                    .ok_or_else(|| {
                        Error::extraction(
                            NAME,
                            format!(
                                "problem {} not found in arena {}",
                                self.alphabet, self.arena_id
                            ),
                        )
                    })?;
                debug!(problem_id = %found.problem_id, "arena problem resolved");
                Ok(found.problem_id)
            })
            .map(String::as_str)
    }

    fn backing_problem(&self, session: &dyn Session) -> Result<AojProblem> {
        self.get_problem_id(session).map(AojProblem::new)
    }
}

impl Resolvable for AojArenaProblem {
    fn from_url(url: &str) -> Option<Self> {
        // room.html#RitsCamp19Day2/problems/A
        let parsed = parse_with_hosts(url, Self::hosts())?;
        if normpath(parsed.path()) != "/services/room.html" {
            return None;
        }
        let fragment: Vec<&str> = parsed.fragment()?.split('/').collect();
        let [arena_id, "problems", letter] = fragment.as_slice() else {
            return None;
        };
        let mut chars = letter.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return None;
        };
        Self::new(*arena_id, c.to_ascii_uppercase())
    }

    fn get_url(&self) -> String {
        format!(
            "https://onlinejudge.u-aizu.ac.jp/services/room.html#{}/problems/{}",
            self.arena_id, self.alphabet
        )
    }
}

impl Problem for AojArenaProblem {
    fn url(&self) -> String {
        self.get_url()
    }

    fn service(&self) -> Box<dyn Service> {
        Box::new(AojService)
    }

    fn as_sample_downloadable(&self) -> Option<&dyn SampleDownloadable> {
        Some(self)
    }

    fn as_system_case_downloadable(&self) -> Option<&dyn SystemCaseDownloadable> {
        Some(self)
    }
}

impl SampleDownloadable for AojArenaProblem {
    fn download_sample_cases(&self, session: &dyn Session) -> Result<Vec<TestCase>> {
        self.backing_problem(session)?.download_sample_cases(session)
    }
}

impl SystemCaseDownloadable for AojArenaProblem {
    fn download_system_cases(&self, session: &dyn Session) -> Result<Vec<TestCase>> {
        self.backing_problem(session)?.download_system_cases(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Method;
    use crate::test_utils::MockSession;

    #[test]
    fn test_problem_from_url() {
        let cases = [
            ("http://judge.u-aizu.ac.jp/onlinejudge/description.jsp?id=1169", "1169"),
            (
                "http://judge.u-aizu.ac.jp/onlinejudge/description.jsp?id=DSL_1_A&lang=jp",
                "DSL_1_A",
            ),
            (
                "https://onlinejudge.u-aizu.ac.jp/challenges/sources/JAG/Prelim/2881",
                "2881",
            ),
            (
                "https://onlinejudge.u-aizu.ac.jp/courses/library/4/CGL/3/CGL_3_B",
                "CGL_3_B",
            ),
            ("https://onlinejudge.u-aizu.ac.jp/problems/0423", "0423"),
        ];
        for (url, id) in cases {
            assert_eq!(AojProblem::from_url(url), Some(AojProblem::new(id)), "{url}");
        }
        assert_eq!(AojProblem::from_url("https://onlinejudge.u-aizu.ac.jp/home"), None);
        assert_eq!(
            AojProblem::from_url("http://judge.u-aizu.ac.jp/onlinejudge/description.jsp"),
            None
        );
        assert_eq!(AojProblem::from_url("https://example.com/problems/0423"), None);
    }

    #[test]
    fn test_round_trip() {
        let problem = AojProblem::new("DSL_1_A");
        assert_eq!(
            problem.get_url(),
            "http://judge.u-aizu.ac.jp/onlinejudge/description.jsp?id=DSL_1_A"
        );
        assert_eq!(AojProblem::from_url(&problem.get_url()), Some(problem));

        // 查询串中的特殊字符需要转义
        let problem = AojProblem::new("a&b+c#d e");
        assert_eq!(AojProblem::from_url(&problem.get_url()), Some(problem));

        let arena = AojArenaProblem::new("RitsCamp19Day2", 'A').unwrap();
        assert_eq!(AojArenaProblem::from_url(&arena.get_url()), Some(arena));

        assert_eq!(AojService::from_url(&AojService.get_url()), Some(AojService));
        assert_eq!(
            AojService::from_url("https://onlinejudge.u-aizu.ac.jp/home"),
            Some(AojService)
        );
    }

    #[test]
    fn test_arena_from_url() {
        let url = "https://onlinejudge.u-aizu.ac.jp/services/room.html#RitsCamp19Day2/problems/b";
        let arena = AojArenaProblem::from_url(url).unwrap();
        assert_eq!(arena.arena_id, "RitsCamp19Day2");
        assert_eq!(arena.alphabet, 'B');
        assert!(
            AojArenaProblem::from_url(
                "https://onlinejudge.u-aizu.ac.jp/services/room.html#RitsCamp19Day2/standings/B"
            )
            .is_none()
        );
        assert!(
            AojArenaProblem::from_url(
                "https://onlinejudge.u-aizu.ac.jp/services/room.html#RitsCamp19Day2/problems/AB"
            )
            .is_none()
        );
    }

    #[test]
    fn test_samples_from_api() -> Result<()> {
        let session = MockSession::new().get(
            "https://judgedat.u-aizu.ac.jp/testcases/samples/1169",
            r#"[{"problemId":"1169","serial":1,"in":"3\n","out":"6\n"},{"problemId":"1169","serial":2,"in":"0\n","out":"0\n"}]"#,
        );
        let cases = AojProblem::new("1169").download_sample_cases(&session)?;
        assert_eq!(
            cases,
            vec![
                TestCase::new("sample-1", "1", "3\n", "1", "6\n"),
                TestCase::new("sample-2", "2", "0\n", "2", "0\n"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_samples_fallback_to_html() -> Result<()> {
        let html = r#"<h2>Problem</h2><pre>not a sample</pre>
<h3>Sample Input 1</h3><pre>
1 2
</pre>
<h3>Output for the Sample Input 1</h3><pre>
3
</pre>
<h3>入力例 2</h3><pre>5 5</pre>
<h3>出力例 2</h3><pre>10</pre>"#;
        let description = serde_json::json!({ "html": html }).to_string();
        let session = MockSession::new()
            .get("https://judgedat.u-aizu.ac.jp/testcases/samples/0001", "[]")
            .get(
                "https://judgeapi.u-aizu.ac.jp/resources/descriptions/ja/0001",
                description,
            );
        let cases = AojProblem::new("0001").download_sample_cases(&session)?;
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].name, "sample-1");
        assert_eq!(cases[0].input_data, b"1 2\n");
        assert_eq!(cases[0].output_data, b"3\n");
        assert_eq!(cases[1].name, "sample-2");
        assert_eq!(cases[1].input_data, b"5 5\n");
        assert_eq!(cases[1].output_data, b"10\n");
        Ok(())
    }

    #[test]
    fn test_system_cases() -> Result<()> {
        let session = MockSession::new()
            .get(
                "https://judgedat.u-aizu.ac.jp/testcases/ITP1_1_A/header",
                r#"{"problemId":"ITP1_1_A","headers":[{"serial":1,"name":"in1.txt"}]}"#,
            )
            .get("https://judgedat.u-aizu.ac.jp/testcases/ITP1_1_A/1/in", "")
            .get(
                "https://judgedat.u-aizu.ac.jp/testcases/ITP1_1_A/1/out",
                "Hello World\n",
            );
        let cases = AojProblem::new("ITP1_1_A").download_system_cases(&session)?;
        assert_eq!(
            cases,
            vec![TestCase::new("in1.txt", "in1.txt", "", "in1.txt", "Hello World\n")]
        );
        Ok(())
    }

    #[test]
    fn test_arena_memoizes_problem_id() -> Result<()> {
        let session = MockSession::new()
            .get(
                "https://judgeapi.u-aizu.ac.jp/arenas/RitsCamp19Day2/problems",
                r#"[{"id":"A","problemId":"2999"},{"id":"B","problemId":"3000"}]"#,
            )
            .get(
                "https://judgedat.u-aizu.ac.jp/testcases/samples/3000",
                r#"[{"serial":1,"in":"x\n","out":"y\n"}]"#,
            );
        let arena = AojArenaProblem::new("RitsCamp19Day2", 'B').unwrap();
        assert_eq!(arena.get_problem_id(&session)?, "3000");
        assert_eq!(arena.download_sample_cases(&session)?.len(), 1);
        assert_eq!(arena.download_sample_cases(&session)?.len(), 1);

        let lookups = session
            .sent()
            .iter()
            .filter(|r| r.url.contains("/arenas/"))
            .count();
        assert_eq!(lookups, 1);
        Ok(())
    }

    #[test]
    fn test_arena_unknown_letter() {
        let session = MockSession::new().get(
            "https://judgeapi.u-aizu.ac.jp/arenas/Camp/problems",
            r#"[{"id":"A","problemId":"2999"}]"#,
        );
        let arena = AojArenaProblem::new("Camp", 'Z').unwrap();
        assert!(matches!(
            arena.get_problem_id(&session),
            Err(Error::ContentExtraction(_))
        ));
    }

    #[test]
    fn test_is_logged_in() -> Result<()> {
        let url = "https://judgeapi.u-aizu.ac.jp/self";
        let yes = MockSession::new().get(url, r#"{"id":"tourist"}"#);
        assert!(AojService.is_logged_in(&yes)?);
        let no = MockSession::new().on(Method::Get, url, 401, "{}");
        assert!(!AojService.is_logged_in(&no)?);
        Ok(())
    }
}

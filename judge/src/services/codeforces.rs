//! Codeforces 适配器
//!
//! 官方 API: https://codeforces.com/api/help

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use registry::SiteAdapter;
use scraper::node::Node;
use scraper::{ElementRef, Html};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::error::*;
use crate::models::*;
use crate::session::{CredentialsProvider, Request, Session};
use crate::traits::*;
use crate::utils::*;
use crate::zipper;

const NAME: &str = "Codeforces";
const LOGIN_URL: &str = "https://codeforces.com/enter";

// 编号 `0` 也会出现 (contest/1000/problem/0), 有时带数字 (contest/1133/problem/F2)
const INDEX: &str = r"(?P<index>0|[A-Za-z][1-9]?)";

static CONTEST_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(?P<kind>contest|gym)/(?P<contest>[0-9]+)").unwrap());

static PROBLEM_REGEXES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        // contest/538/problem/H
        ("contest", format!(r"^/contest/(?P<contest>[0-9]+)/problem/{INDEX}$")),
        // problemset/problem/700/B
        ("problemset", format!(r"^/problemset/problem/(?P<contest>[0-9]+)/{INDEX}$")),
        // gym/101021/problem/A
        ("gym", format!(r"^/gym/(?P<contest>[0-9]+)/problem/{INDEX}$")),
        // edu/course/2/lesson/2/1/practice/contest/269100/problem/A
        (
            "edu",
            format!(
                r"^/edu/course/(?P<course>[0-9]+)/lesson/(?P<lesson>[0-9]+)/(?P<step>[0-9]+)/practice/contest/(?P<contest>[0-9]+)/problem/{INDEX}$"
            ),
        ),
    ]
    .into_iter()
    .map(|(kind, expr)| (kind, Regex::new(&expr).unwrap()))
    .collect()
});

/// 官方 API 的外层
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    status: String,
    comment: Option<String>,
    result: Option<T>,
}

fn api<T: DeserializeOwned>(session: &dyn Session, url: String) -> Result<T> {
    let resp = request(session, Request::get(url.clone()))?;
    let data: ApiResponse<T> = resp.json()?;
    if data.status == "OK"
        && let Some(result) = data.result
    {
        return Ok(result);
    }
    let reason = format!(
        "api status {}: {}",
        data.status,
        data.comment.unwrap_or_default()
    );
    Err(FetchError::new(url, FetchErrorKind::Decode(reason)).into())
}

/// Codeforces
#[derive(Debug, Clone, PartialEq, Eq, SiteAdapter)]
#[adapter(kind = "service", name = "Codeforces", hosts = ["codeforces.com", "m1.codeforces.com", "m2.codeforces.com", "m3.codeforces.com"])]
pub struct CodeforcesService;

/// 比赛信息 (`contest.list` 或 `contest.standings` 中的 `contest`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeforcesContestData {
    pub contest: CodeforcesContest,
    pub name: String,
    /// `CF`, `IOI`, `ICPC`
    pub contest_type: String,
    pub phase: String,
    pub frozen: bool,
    pub duration_seconds: i64,
    /// 未公布开始时间时为空
    pub start_time_seconds: Option<i64>,
    pub relative_time_seconds: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContestRow {
    id: u64,
    name: String,
    #[serde(rename = "type", default)]
    contest_type: String,
    phase: String,
    frozen: bool,
    duration_seconds: i64,
    start_time_seconds: Option<i64>,
    relative_time_seconds: Option<i64>,
}

impl CodeforcesContestData {
    fn from_row(row: ContestRow, kind: ContestKind) -> Self {
        Self {
            contest: CodeforcesContest {
                contest_id: row.id,
                kind,
            },
            name: row.name,
            contest_type: row.contest_type,
            phase: row.phase,
            frozen: row.frozen,
            duration_seconds: row.duration_seconds,
            start_time_seconds: row.start_time_seconds,
            relative_time_seconds: row.relative_time_seconds,
        }
    }
}

impl CodeforcesService {
    /// 列出全部比赛 (或 gym)
    pub fn list_contests(
        &self,
        is_gym: bool,
        session: &dyn Session,
    ) -> Result<Vec<CodeforcesContestData>> {
        let url = format!("https://codeforces.com/api/contest.list?gym={is_gym}");
        let rows: Vec<ContestRow> = api(session, url)?;
        let kind = if is_gym {
            ContestKind::Gym
        } else {
            ContestKind::Contest
        };
        Ok(rows
            .into_iter()
            .map(|row| CodeforcesContestData::from_row(row, kind))
            .collect())
    }
}

impl Resolvable for CodeforcesService {
    fn from_url(url: &str) -> Option<Self> {
        parse_with_hosts(url, Self::hosts()).map(|_| Self)
    }

    fn get_url(&self) -> String {
        "https://codeforces.com/".to_string()
    }
}

impl Service for CodeforcesService {
    fn url(&self) -> String {
        self.get_url()
    }

    fn as_login_probe(&self) -> Option<&dyn LoginProbe> {
        Some(self)
    }

    fn as_login_capable(&self) -> Option<&dyn LoginCapable> {
        Some(self)
    }
}

impl LoginProbe for CodeforcesService {
    fn is_logged_in(&self, session: &dyn Session) -> Result<bool> {
        // 已登录时 /enter 会重定向
        let resp = send(session, Request::get(LOGIN_URL).no_redirect())?;
        Ok(resp.status == 302)
    }
}

impl LoginCapable for CodeforcesService {
    fn login(
        &self,
        get_credentials: CredentialsProvider<'_>,
        session: &dyn Session,
    ) -> Result<()> {
        let resp = request(session, Request::get(LOGIN_URL))?;
        if resp.url != LOGIN_URL {
            info!("You have already signed in.");
            return Ok(());
        }

        let mut form = {
            let document = Html::parse_document(&resp.text());
            let form_sel = selector(NAME, "form#enterForm")?;
            let form = document
                .select(&form_sel)
                .next()
                .ok_or_else(|| Error::extraction(NAME, "login form not found"))?;
            HtmlForm::parse(form, &resp.url)
        };
        let names: Vec<&str> = form.fields.iter().map(|(k, _)| k.as_str()).collect();
        debug!(action = %form.action, ?names, "login form");

        let credentials = get_credentials()?;
        form.set("handleOrEmail", credentials.username.as_str());
        form.set("password", credentials.password);
        form.set("remember", "on");

        let resp = request(session, form.into_request())?;
        if resp.url != LOGIN_URL {
            info!(username = %credentials.username, "Welcome.");
            Ok(())
        } else {
            error!("Invalid handle or password.");
            Err(Error::LoginFailed("Invalid handle or password.".to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContestKind {
    Contest,
    Gym,
}

impl ContestKind {
    /// 编号不小于 100000 的是 gym
    pub fn infer(contest_id: u64) -> Self {
        if contest_id < 100000 {
            Self::Contest
        } else {
            Self::Gym
        }
    }
}

impl fmt::Display for ContestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Contest => "contest",
            Self::Gym => "gym",
        })
    }
}

/// Codeforces 比赛
#[derive(Debug, Clone, PartialEq, Eq, Hash, SiteAdapter)]
#[adapter(kind = "contest", name = "Codeforces", hosts = ["codeforces.com", "m1.codeforces.com", "m2.codeforces.com", "m3.codeforces.com"])]
pub struct CodeforcesContest {
    pub contest_id: u64,
    pub kind: ContestKind,
}

impl CodeforcesContest {
    pub fn new(contest_id: u64) -> Self {
        Self {
            contest_id,
            kind: ContestKind::infer(contest_id),
        }
    }

    fn problem_kind(&self) -> ProblemKind {
        match self.kind {
            ContestKind::Contest => ProblemKind::Contest,
            ContestKind::Gym => ProblemKind::Gym,
        }
    }

    fn fetch_standings(&self, session: &dyn Session) -> Result<Standings> {
        let url = format!(
            "https://codeforces.com/api/contest.standings?contestId={}&from=1&count=1",
            self.contest_id
        );
        api(session, url)
    }

    /// 比赛信息
    pub fn download_data(&self, session: &dyn Session) -> Result<CodeforcesContestData> {
        let standings = self.fetch_standings(session)?;
        Ok(CodeforcesContestData::from_row(standings.contest, self.kind))
    }

    /// 题目信息, 按 API 给出的顺序
    pub fn list_problem_data(&self, session: &dyn Session) -> Result<Vec<CodeforcesProblemData>> {
        let standings = self.fetch_standings(session)?;
        let kind = self.problem_kind();
        Ok(standings
            .problems
            .into_iter()
            .map(|row| {
                debug!(index = %row.index, name = %row.name, "problem");
                CodeforcesProblemData {
                    problem: CodeforcesProblem {
                        contest_id: row.contest_id.unwrap_or(self.contest_id),
                        index: row.index,
                        kind: kind.clone(),
                    },
                    name: row.name,
                    problem_type: row.problem_type,
                    points: row.points,
                    rating: row.rating,
                    tags: row.tags,
                }
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct Standings {
    contest: ContestRow,
    problems: Vec<ProblemRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProblemRow {
    contest_id: Option<u64>,
    index: String,
    name: String,
    #[serde(rename = "type", default)]
    problem_type: String,
    points: Option<f64>,
    rating: Option<u32>,
    #[serde(default)]
    tags: Vec<String>,
}

/// `contest.standings` 中的一道题
#[derive(Debug, Clone, PartialEq)]
pub struct CodeforcesProblemData {
    pub problem: CodeforcesProblem,
    pub name: String,
    /// `PROGRAMMING` 或 `QUESTION`
    pub problem_type: String,
    pub points: Option<f64>,
    pub rating: Option<u32>,
    pub tags: Vec<String>,
}

impl Resolvable for CodeforcesContest {
    fn from_url(url: &str) -> Option<Self> {
        // contest/538, gym/101021
        let parsed = parse_with_hosts(url, Self::hosts())?;
        let path = normpath(parsed.path());
        let caps = CONTEST_REGEX.captures(&path)?;
        let contest_id = caps["contest"].parse().ok()?;
        let kind = match &caps["kind"] {
            "gym" => ContestKind::Gym,
            _ => ContestKind::Contest,
        };
        Some(Self { contest_id, kind })
    }

    fn get_url(&self) -> String {
        format!("https://codeforces.com/{}/{}", self.kind, self.contest_id)
    }
}

impl Contest for CodeforcesContest {
    fn url(&self) -> String {
        self.get_url()
    }

    fn service(&self) -> Box<dyn Service> {
        Box::new(CodeforcesService)
    }

    fn list_problems(&self, session: &dyn Session) -> Result<Vec<Box<dyn Problem>>> {
        Ok(self
            .list_problem_data(session)?
            .into_iter()
            .map(|data| Box::new(data.problem) as Box<dyn Problem>)
            .collect())
    }
}

/// 题目所在的入口, `contest` 与 `problemset` 实际是同一题
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    Contest,
    Gym,
    Problemset,
    Edu { course: u64, lesson: u64, step: u64 },
}

/// Codeforces 题目
#[derive(Debug, Clone, PartialEq, Eq, Hash, SiteAdapter)]
#[adapter(kind = "problem", name = "Codeforces", hosts = ["codeforces.com", "m1.codeforces.com", "m2.codeforces.com", "m3.codeforces.com"])]
pub struct CodeforcesProblem {
    pub contest_id: u64,
    /// 如 `A`, `F2`
    pub index: String,
    pub kind: ProblemKind,
}

impl CodeforcesProblem {
    pub fn new(contest_id: u64, index: impl Into<String>) -> Self {
        let kind = match ContestKind::infer(contest_id) {
            ContestKind::Contest => ProblemKind::Contest,
            ContestKind::Gym => ProblemKind::Gym,
        };
        Self {
            contest_id,
            index: index.into(),
            kind,
        }
    }

    /// problemset 与 edu 题目没有对应的比赛
    pub fn get_contest(&self) -> Option<CodeforcesContest> {
        let kind = match self.kind {
            ProblemKind::Contest => ContestKind::Contest,
            ProblemKind::Gym => ContestKind::Gym,
            ProblemKind::Problemset | ProblemKind::Edu { .. } => return None,
        };
        Some(CodeforcesContest {
            contest_id: self.contest_id,
            kind,
        })
    }

    /// 在所属比赛的题目列表中查找本题
    pub fn download_data(&self, session: &dyn Session) -> Result<CodeforcesProblemData> {
        let contest = match (self.get_contest(), &self.kind) {
            (Some(contest), _) => contest,
            (None, ProblemKind::Problemset) => CodeforcesContest::new(self.contest_id),
            (None, _) => {
                return Err(Error::extraction(NAME, "edu problems have no contest data"));
            }
        };
        contest
            .list_problem_data(session)?
            .into_iter()
            .find(|data| {
                data.problem.contest_id == self.contest_id && data.problem.index == self.index
            })
            .map(|mut data| {
                data.problem = self.clone();
                data
            })
            .ok_or_else(|| {
                Error::extraction(
                    NAME,
                    format!("problem {}{} not found in contest", self.contest_id, self.index),
                )
            })
    }

    /// `div.input` / `div.output` 中只能有标题与 `pre`
    fn parse_block(block: ElementRef) -> Result<(String, String)> {
        let children: Vec<_> = block
            .children()
            .filter(|c| match c.value() {
                Node::Element(_) => true,
                Node::Text(t) => !t.trim().is_empty(),
                _ => false,
            })
            .collect();
        debug!(count = children.len(), "sample block children");

        let [title, pre] = children.as_slice() else {
            return Err(Error::extraction(
                NAME,
                format!("expected title and pre, got {} nodes", children.len()),
            ));
        };
        let (Some(title), Some(pre)) = (ElementRef::wrap(*title), ElementRef::wrap(*pre)) else {
            return Err(Error::extraction(NAME, "sample block contains bare text"));
        };
        let label = title.text().collect::<String>().trim().to_string();
        if !title.value().classes().any(|c| c == "title") || pre.value().name() != "pre" {
            return Err(ContentExtractionError::new(NAME, "malformed sample block")
                .with_label(label)
                .into());
        }
        Ok((label, format_sample_case(&parse_content(pre))))
    }
}

impl Resolvable for CodeforcesProblem {
    fn from_url(url: &str) -> Option<Self> {
        let parsed = parse_with_hosts(url, Self::hosts())?;
        let path = normpath(parsed.path());
        for (kind, regex) in PROBLEM_REGEXES.iter() {
            let Some(caps) = regex.captures(&path) else {
                continue;
            };
            let contest_id = caps["contest"].parse().ok()?;
            let index = match &caps["index"] {
                "0" => "A".to_string(), // 有 "A1" 时会出错
                other => other.to_uppercase(),
            };
            let number = |name: &str| caps[name].parse::<u64>().ok();
            let kind = match *kind {
                "contest" => ProblemKind::Contest,
                "problemset" => ProblemKind::Problemset,
                "gym" => ProblemKind::Gym,
                _ => ProblemKind::Edu {
                    course: number("course")?,
                    lesson: number("lesson")?,
                    step: number("step")?,
                },
            };
            return Some(Self {
                contest_id,
                index,
                kind,
            });
        }
        None
    }

    fn get_url(&self) -> String {
        let (id, index) = (self.contest_id, &self.index);
        match &self.kind {
            ProblemKind::Contest => format!("https://codeforces.com/contest/{id}/problem/{index}"),
            ProblemKind::Problemset => {
                format!("https://codeforces.com/problemset/problem/{id}/{index}")
            }
            ProblemKind::Gym => format!("https://codeforces.com/gym/{id}/problem/{index}"),
            ProblemKind::Edu {
                course,
                lesson,
                step,
            } => format!(
                "https://codeforces.com/edu/course/{course}/lesson/{lesson}/{step}/practice/contest/{id}/problem/{index}"
            ),
        }
    }
}

impl Problem for CodeforcesProblem {
    fn url(&self) -> String {
        self.get_url()
    }

    fn service(&self) -> Box<dyn Service> {
        Box::new(CodeforcesService)
    }

    fn as_sample_downloadable(&self) -> Option<&dyn SampleDownloadable> {
        Some(self)
    }

    fn as_language_listable(&self) -> Option<&dyn LanguageListable> {
        Some(self)
    }

    fn as_submittable(&self) -> Option<&dyn Submittable> {
        Some(self)
    }
}

impl SampleDownloadable for CodeforcesProblem {
    fn download_sample_cases(&self, session: &dyn Session) -> Result<Vec<TestCase>> {
        zipper::download_samples(self, session)
    }
}

impl FragmentSource for CodeforcesProblem {
    fn fetch_fragments(&self, session: &dyn Session) -> Result<Vec<LabeledFragment>> {
        let resp = request(session, Request::get(self.get_url()))?;
        let document = Html::parse_document(&resp.text());
        let block_sel = selector(NAME, "div.input, div.output")?;

        document
            .select(&block_sel)
            .enumerate()
            .map(|(position, block)| {
                let (label, content) = Self::parse_block(block)?;
                Ok(LabeledFragment::new(label, content, position))
            })
            .collect()
    }
}

impl LanguageListable for CodeforcesProblem {
    fn get_available_languages(&self, session: &dyn Session) -> Result<Vec<Language>> {
        let resp = request(session, Request::get(self.get_url()))?;
        let document = Html::parse_document(&resp.text());
        let select_sel = selector(NAME, "select[name=programTypeId]")?;
        let option_sel = selector(NAME, "option")?;

        // 未登录时页面上没有提交表单
        let Some(select) = document.select(&select_sel).next() else {
            return Err(Error::AuthenticationRequired(
                "the language list is only shown to logged-in users".to_string(),
            ));
        };
        Ok(select
            .select(&option_sel)
            .filter_map(|option| {
                let id = option.value().attr("value")?;
                let name = option.text().collect::<String>();
                Some(Language::new(id, name.trim()))
            })
            .collect())
    }
}

impl Submittable for CodeforcesProblem {
    fn submit_code(
        &self,
        _code: &[u8],
        _language: &str,
        _session: &dyn Session,
    ) -> Result<Submission> {
        let msg = "The feature to submit to Codeforces is now removed. Please read https://github.com/online-judge-tools/api-client/issues/127";
        error!("{msg}");
        Err(Error::Submission(msg.to_string()))
    }
}

#[cfg(test)]
use crate::session::{Body, Credentials, Method};
#[cfg(test)]
use crate::test_utils::MockSession;

#[test]
fn test_problem_from_url() {
    let cases = [
        ("https://codeforces.com/contest/538/problem/H", CodeforcesProblem::new(538, "H")),
        ("http://codeforces.com/contest/1133/problem/F2", CodeforcesProblem::new(1133, "F2")),
        ("https://codeforces.com/contest/1000/problem/0", CodeforcesProblem::new(1000, "A")),
        ("https://m1.codeforces.com/contest/538/problem/h", CodeforcesProblem::new(538, "H")),
        (
            "https://codeforces.com/problemset/problem/700/B",
            CodeforcesProblem {
                contest_id: 700,
                index: "B".to_string(),
                kind: ProblemKind::Problemset,
            },
        ),
        ("https://codeforces.com/gym/101021/problem/A", CodeforcesProblem::new(101021, "A")),
        (
            "https://codeforces.com/edu/course/2/lesson/2/1/practice/contest/269100/problem/A",
            CodeforcesProblem {
                contest_id: 269100,
                index: "A".to_string(),
                kind: ProblemKind::Edu {
                    course: 2,
                    lesson: 2,
                    step: 1,
                },
            },
        ),
    ];
    for (url, expected) in cases {
        assert_eq!(CodeforcesProblem::from_url(url), Some(expected), "{url}");
    }
    assert_eq!(CodeforcesProblem::from_url("https://codeforces.com/contest/538"), None);
    assert_eq!(CodeforcesProblem::from_url("https://codeforces.com/contest/538/problem/AB"), None);
    assert_eq!(CodeforcesProblem::from_url("https://example.com/contest/538/problem/A"), None);
}

#[test]
fn test_round_trip() {
    let problems = [
        "https://codeforces.com/contest/538/problem/H",
        "https://codeforces.com/problemset/problem/700/B",
        "https://codeforces.com/gym/101021/problem/A",
        "https://codeforces.com/edu/course/2/lesson/2/1/practice/contest/269100/problem/A",
    ];
    for url in problems {
        let problem = CodeforcesProblem::from_url(url).unwrap();
        assert_eq!(problem.get_url(), url);
        assert_eq!(CodeforcesProblem::from_url(&problem.get_url()), Some(problem));
    }

    let contest =
        CodeforcesContest::from_url("https://codeforces.com/gym/101021/standings").unwrap();
    assert_eq!(contest, CodeforcesContest::new(101021));
    assert_eq!(contest.get_url(), "https://codeforces.com/gym/101021");
    assert_eq!(CodeforcesContest::from_url(&contest.get_url()), Some(contest));
    assert_eq!(CodeforcesContest::new(538).kind, ContestKind::Contest);
}

#[test]
fn test_get_contest() {
    let problem =
        CodeforcesProblem::from_url("https://codeforces.com/contest/538/problem/H").unwrap();
    assert_eq!(problem.get_contest(), Some(CodeforcesContest::new(538)));
    let problem =
        CodeforcesProblem::from_url("https://codeforces.com/problemset/problem/700/B").unwrap();
    assert_eq!(problem.get_contest(), None);
}

#[test]
fn test_download_sample_cases() -> Result<()> {
    let url = "https://codeforces.com/contest/1/problem/A";
    let content = r#"
        <!DOCTYPE html>
        <html>
        <body>
            <div class="sample-tests">
                <div class="section-title">Examples</div>
                <div class="sample-test">
                    <div class="input">
                        <div class="title">Input</div>
                        <pre>6 6 4<br />1 2</pre>
                    </div>
                    <div class="output">
                        <div class="title">Output</div>
                        <pre>4
</pre>
                    </div>
                    <div class="input">
                        <div class="title">Input</div>
                        <pre><div class="test-example-line test-example-line-even">3</div><div class="test-example-line test-example-line-odd">1 2 3 </div></pre>
                    </div>
                    <div class="output">
                        <div class="title">Output</div>
                        <pre>6</pre>
                    </div>
                </div>
            </div>
        </body>
        </html>"#;

    let session = MockSession::new().get(url, content);
    let cases = CodeforcesProblem::new(1, "A").download_sample_cases(&session)?;

    assert_eq!(
        cases,
        vec![
            TestCase::new("sample-1", "Input", "6 6 4\n1 2\n", "Output", "4\n"),
            TestCase::new("sample-2", "Input", "3\n1 2 3\n", "Output", "6\n"),
        ]
    );
    Ok(())
}

#[test]
fn test_malformed_sample_block() {
    let url = "https://codeforces.com/contest/1/problem/A";
    let content = r#"<div class="input"><div class="title">Input</div><p>oops</p></div>"#;
    let session = MockSession::new().get(url, content);
    let err = CodeforcesProblem::new(1, "A")
        .download_sample_cases(&session)
        .unwrap_err();
    assert!(matches!(err, Error::ContentExtraction(e) if e.label.as_deref() == Some("Input")));
}

#[test]
fn test_available_languages() -> Result<()> {
    let url = "https://codeforces.com/contest/1/problem/A";
    let content = r#"<form><select name="programTypeId">
        <option value="43">GNU GCC C11 5.1.0</option>
        <option value="54" selected="selected">GNU G++17 7.3.0</option>
    </select></form>"#;
    let session = MockSession::new().get(url, content);
    let languages = CodeforcesProblem::new(1, "A").get_available_languages(&session)?;
    assert_eq!(
        languages,
        vec![
            Language::new("43", "GNU GCC C11 5.1.0"),
            Language::new("54", "GNU G++17 7.3.0"),
        ]
    );

    let session = MockSession::new().get(url, "<html></html>");
    assert!(matches!(
        CodeforcesProblem::new(1, "A").get_available_languages(&session),
        Err(Error::AuthenticationRequired(_))
    ));
    Ok(())
}

#[cfg(test)]
const STANDINGS_1133: &str = r#"{"status":"OK","result":{
    "contest":{"id":1133,"name":"Codeforces Round #544 (Div. 3)","type":"ICPC","phase":"FINISHED",
        "frozen":false,"durationSeconds":7200,"startTimeSeconds":1551971700,
        "relativeTimeSeconds":240000000},
    "problems":[
        {"contestId":1133,"index":"A","name":"Middle of the Contest","type":"PROGRAMMING",
            "rating":1000,"tags":["implementation"]},
        {"contestId":1133,"index":"F2","name":"Spanning Tree with One Fixed Degree",
            "type":"PROGRAMMING","rating":1900,"tags":["dsu","graphs","greedy"]},
        {"contestId":1133,"index":"F1","name":"Spanning Tree with Maximum Degree",
            "type":"PROGRAMMING","points":1.0,"tags":[]}
    ],
    "rows":[]}}"#;

#[test]
fn test_list_problems() -> Result<()> {
    let session = MockSession::new().get(
        "https://codeforces.com/api/contest.standings?contestId=1133&from=1&count=1",
        STANDINGS_1133,
    );
    let problems = CodeforcesContest::new(1133).list_problems(&session)?;
    let urls: Vec<String> = problems.iter().map(|p| p.url()).collect();
    // 保持 API 给出的顺序
    assert_eq!(
        urls,
        vec![
            "https://codeforces.com/contest/1133/problem/A",
            "https://codeforces.com/contest/1133/problem/F2",
            "https://codeforces.com/contest/1133/problem/F1",
        ]
    );
    Ok(())
}

#[test]
fn test_list_problem_data() -> Result<()> {
    let session = MockSession::new().get(
        "https://codeforces.com/api/contest.standings?contestId=1133&from=1&count=1",
        STANDINGS_1133,
    );
    let data = CodeforcesContest::new(1133).list_problem_data(&session)?;
    let indices: Vec<&str> = data.iter().map(|d| d.problem.index.as_str()).collect();
    assert_eq!(indices, vec!["A", "F2", "F1"]);
    assert_eq!(data[0].problem, CodeforcesProblem::new(1133, "A"));
    assert_eq!(data[0].name, "Middle of the Contest");
    assert_eq!(data[0].problem_type, "PROGRAMMING");
    assert_eq!(data[0].rating, Some(1000));
    assert_eq!(data[1].tags, vec!["dsu", "graphs", "greedy"]);
    // 未评级的题目没有 rating
    assert_eq!(data[2].rating, None);
    assert_eq!(data[2].points, Some(1.0));
    Ok(())
}

#[test]
fn test_download_contest_data() -> Result<()> {
    let session = MockSession::new().get(
        "https://codeforces.com/api/contest.standings?contestId=1133&from=1&count=1",
        STANDINGS_1133,
    );
    let data = CodeforcesContest::new(1133).download_data(&session)?;
    assert_eq!(data.contest, CodeforcesContest::new(1133));
    assert_eq!(data.name, "Codeforces Round #544 (Div. 3)");
    assert_eq!(data.contest_type, "ICPC");
    assert_eq!(data.phase, "FINISHED");
    assert!(!data.frozen);
    assert_eq!(data.duration_seconds, 7200);
    assert_eq!(data.start_time_seconds, Some(1551971700));
    assert_eq!(data.relative_time_seconds, Some(240000000));
    Ok(())
}

#[test]
fn test_download_problem_data() -> Result<()> {
    let session = MockSession::new().get(
        "https://codeforces.com/api/contest.standings?contestId=1133&from=1&count=1",
        STANDINGS_1133,
    );
    let problem = CodeforcesProblem::new(1133, "F2");
    let data = problem.download_data(&session)?;
    assert_eq!(data.problem, problem);
    assert_eq!(data.name, "Spanning Tree with One Fixed Degree");
    assert_eq!(data.rating, Some(1900));

    // problemset 的题目通过同编号的比赛查找, 但保留原来的入口
    let problem =
        CodeforcesProblem::from_url("https://codeforces.com/problemset/problem/1133/A").unwrap();
    let data = problem.download_data(&session)?;
    assert_eq!(data.problem, problem);
    assert_eq!(data.name, "Middle of the Contest");

    assert!(matches!(
        CodeforcesProblem::new(1133, "G").download_data(&session),
        Err(Error::ContentExtraction(_))
    ));
    Ok(())
}

#[test]
fn test_edu_problem_has_no_data() {
    let problem = CodeforcesProblem::from_url(
        "https://codeforces.com/edu/course/2/lesson/2/1/practice/contest/269100/problem/A",
    )
    .unwrap();
    let session = MockSession::new();
    assert!(matches!(problem.download_data(&session), Err(Error::ContentExtraction(_))));
    assert!(session.sent().is_empty());
}

#[test]
fn test_contest_from_url() {
    let cases = [
        ("https://codeforces.com/contest/1133", CodeforcesContest::new(1133)),
        ("https://codeforces.com/contest/1133/problem/A", CodeforcesContest::new(1133)),
        ("https://m2.codeforces.com/contest/538/", CodeforcesContest::new(538)),
        ("https://codeforces.com/gym/101021/standings", CodeforcesContest::new(101021)),
    ];
    for (url, expected) in cases {
        assert_eq!(CodeforcesContest::from_url(url), Some(expected), "{url}");
    }
    assert_eq!(CodeforcesContest::from_url("https://codeforces.com/problemset"), None);
    assert_eq!(CodeforcesContest::from_url("https://example.com/contest/1133"), None);
}

#[test]
fn test_api_failure() {
    let session = MockSession::new().get(
        "https://codeforces.com/api/contest.standings?contestId=9&from=1&count=1",
        r#"{"status":"FAILED","comment":"contestId: Contest with id 9 has not started"}"#,
    );
    let err = CodeforcesContest::new(9).list_problems(&session).unwrap_err();
    assert!(matches!(
        err,
        Error::Fetch(FetchError {
            kind: FetchErrorKind::Decode(_),
            ..
        })
    ));
}

#[test]
fn test_list_contests() -> Result<()> {
    let session = MockSession::new().get(
        "https://codeforces.com/api/contest.list?gym=false",
        r#"{"status":"OK","result":[
            {"id":2000,"name":"Round","type":"CF","phase":"BEFORE","frozen":false,"durationSeconds":7200,"startTimeSeconds":1700000000},
            {"id":1,"name":"Beta Round #1","type":"CF","phase":"FINISHED","frozen":false,"durationSeconds":7200}
        ]}"#,
    );
    let contests = CodeforcesService.list_contests(false, &session)?;
    assert_eq!(contests.len(), 2);
    assert_eq!(contests[0].contest, CodeforcesContest::new(2000));
    assert_eq!(contests[0].start_time_seconds, Some(1700000000));
    assert_eq!(contests[1].name, "Beta Round #1");
    assert_eq!(contests[1].start_time_seconds, None);
    Ok(())
}

#[test]
fn test_login() -> Result<()> {
    let form = r#"<form method="post" id="enterForm">
        <input type="hidden" name="csrf_token" value="c0ffee"/>
        <input type="hidden" name="action" value="enter"/>
        <input name="handleOrEmail"/><input type="password" name="password"/>
    </form>"#;

    // 成功: 提交后被重定向离开 /enter
    let session = MockSession::new()
        .get(LOGIN_URL, form)
        .redirect(Method::Post, LOGIN_URL, "https://codeforces.com/", "");
    let mut asked = 0;
    let mut provider = || -> Result<Credentials> {
        asked += 1;
        Ok(Credentials::new("tourist", "hunter2"))
    };
    CodeforcesService.login(&mut provider, &session)?;
    assert_eq!(asked, 1);

    let sent = session.sent();
    assert_eq!(sent.len(), 2);
    let Some(Body::Form(fields)) = &sent[1].body else {
        panic!("login must post a form");
    };
    assert!(fields.contains(&("csrf_token".to_string(), "c0ffee".to_string())));
    assert!(fields.contains(&("handleOrEmail".to_string(), "tourist".to_string())));
    assert!(fields.contains(&("password".to_string(), "hunter2".to_string())));
    assert!(fields.contains(&("remember".to_string(), "on".to_string())));

    // 失败: 停留在 /enter
    let session = MockSession::new()
        .get(LOGIN_URL, form)
        .on(Method::Post, LOGIN_URL, 200, form);
    let mut provider = || -> Result<Credentials> { Ok(Credentials::new("tourist", "wrong")) };
    assert!(matches!(
        CodeforcesService.login(&mut provider, &session),
        Err(Error::LoginFailed(_))
    ));
    Ok(())
}

#[test]
fn test_login_skips_credentials_when_signed_in() -> Result<()> {
    let session =
        MockSession::new().redirect(Method::Get, LOGIN_URL, "https://codeforces.com/", "");
    let mut provider = || -> Result<Credentials> { panic!("credentials must not be requested") };
    CodeforcesService.login(&mut provider, &session)?;
    Ok(())
}

#[test]
fn test_is_logged_in() -> Result<()> {
    let session = MockSession::new().on(Method::Get, LOGIN_URL, 302, "");
    assert!(CodeforcesService.is_logged_in(&session)?);
    assert!(!session.sent()[0].follow_redirects);

    let session = MockSession::new().get(LOGIN_URL, "<form id=\"enterForm\"></form>");
    assert!(!CodeforcesService.is_logged_in(&session)?);
    Ok(())
}

#[test]
fn test_submit_is_rejected() {
    let session = MockSession::new();
    let problem: Box<dyn Problem> = Box::new(CodeforcesProblem::new(1, "A"));
    assert!(matches!(
        problem.submit_code(b"int main() {}", "54", &session),
        Err(Error::Submission(_))
    ));
    assert!(session.sent().is_empty());
}

//! HackerRank 适配器

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use registry::SiteAdapter;
use scraper::Html;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::error::*;
use crate::models::*;
use crate::session::{Request, Session};
use crate::traits::*;
use crate::utils::*;
use crate::zipper::{self, ArchiveFormat};

const NAME: &str = "HackerRank";
const LOGIN_URL: &str = "https://www.hackerrank.com/auth/login";
const MASTER: &str = "master";

// 语言显示名所在的脚本 (2019-02 的版本)
const CODESHELL_URL: &str =
    "https://hrcdn.net/hackerrank/assets/codeshell/dist/codeshell-cdffcdf1564c6416e1a2eb207a4521ce.js";

static CONTEST_CHALLENGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/contests/([0-9A-Za-z-]+)/challenges/([0-9A-Za-z-]+)(/problem)?$").unwrap()
});

static CHALLENGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/challenges/([0-9A-Za-z-]+)(/problem)?$").unwrap());

// lang_display_mapping:{c:"C",cpp:"C++",...} (不是 JSON)
static DISPLAY_ENTRY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\w+):"([^"]*)""#).unwrap());

/// HackerRank
#[derive(Debug, Clone, PartialEq, Eq, SiteAdapter)]
#[adapter(kind = "service", name = "HackerRank", hosts = ["hackerrank.com", "www.hackerrank.com"])]
pub struct HackerRankService;

impl Resolvable for HackerRankService {
    fn from_url(url: &str) -> Option<Self> {
        parse_with_hosts(url, Self::hosts()).map(|_| Self)
    }

    fn get_url(&self) -> String {
        "https://www.hackerrank.com/".to_string()
    }
}

impl Service for HackerRankService {
    fn url(&self) -> String {
        self.get_url()
    }

    fn as_login_probe(&self) -> Option<&dyn LoginProbe> {
        Some(self)
    }
}

impl LoginProbe for HackerRankService {
    fn is_logged_in(&self, session: &dyn Session) -> Result<bool> {
        // 已登录时登录页会跳走
        let resp = request(session, Request::get(LOGIN_URL))?;
        Ok(!resp.url.contains("/auth"))
    }
}

/// HackerRank 题目; 不在比赛中的题目属于 `master`
#[derive(Debug, Clone, PartialEq, Eq, SiteAdapter)]
#[adapter(kind = "problem", name = "HackerRank", hosts = ["hackerrank.com", "www.hackerrank.com"])]
pub struct HackerRankProblem {
    pub contest_slug: String,
    pub challenge_slug: String,
}

#[derive(Debug, Deserialize)]
struct RestResponse<T> {
    status: bool,
    model: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ChallengeModel {
    #[serde(default)]
    languages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SubmissionModel {
    id: u64,
}

impl HackerRankProblem {
    pub fn new(contest_slug: impl Into<String>, challenge_slug: impl Into<String>) -> Self {
        Self {
            contest_slug: contest_slug.into(),
            challenge_slug: challenge_slug.into(),
        }
    }

    fn rest_url(&self) -> String {
        format!(
            "https://www.hackerrank.com/rest/contests/{}/challenges/{}",
            self.contest_slug, self.challenge_slug
        )
    }

    fn get_model(&self, session: &dyn Session) -> Result<ChallengeModel> {
        let resp = request(session, Request::get(self.rest_url()))?;
        let data: RestResponse<ChallengeModel> = resp.json()?;
        match data {
            RestResponse {
                status: true,
                model: Some(model),
            } => Ok(model),
            _ => {
                error!(challenge = %self.challenge_slug, "get model: failed");
                Err(Error::extraction(NAME, "challenge model not available"))
            }
        }
    }

    fn get_lang_display_mapping(&self, session: &dyn Session) -> Result<HashMap<String, String>> {
        let resp = request(session, Request::get(CODESHELL_URL))?;
        let text = resp.text();
        let Some(start) = text.find("lang_display_mapping:{") else {
            return Err(Error::extraction(NAME, "lang_display_mapping not found"));
        };
        let body = &text[start + "lang_display_mapping:".len()..];
        let end = body.find('}').unwrap_or(body.len());
        let mapping: HashMap<String, String> = DISPLAY_ENTRY_REGEX
            .captures_iter(&body[..end])
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
            .collect();
        debug!(count = mapping.len(), "lang_display_mapping");
        Ok(mapping)
    }
}

impl Resolvable for HackerRankProblem {
    fn from_url(url: &str) -> Option<Self> {
        // contests/university-codesprint-2/challenges/the-story-of-a-tree
        // challenges/fp-hello-world
        let parsed = parse_with_hosts(url, Self::hosts())?;
        let path = normpath(parsed.path());
        if let Some(caps) = CONTEST_CHALLENGE_REGEX.captures(&path) {
            return Some(Self::new(&caps[1], &caps[2]));
        }
        CHALLENGE_REGEX
            .captures(&path)
            .map(|caps| Self::new(MASTER, &caps[1]))
    }

    fn get_url(&self) -> String {
        if self.contest_slug == MASTER {
            format!("https://www.hackerrank.com/challenges/{}", self.challenge_slug)
        } else {
            format!(
                "https://www.hackerrank.com/contests/{}/challenges/{}",
                self.contest_slug, self.challenge_slug
            )
        }
    }
}

impl Problem for HackerRankProblem {
    fn url(&self) -> String {
        self.get_url()
    }

    fn service(&self) -> Box<dyn Service> {
        Box::new(HackerRankService)
    }

    fn as_sample_downloadable(&self) -> Option<&dyn SampleDownloadable> {
        Some(self)
    }

    fn as_system_case_downloadable(&self) -> Option<&dyn SystemCaseDownloadable> {
        Some(self)
    }

    fn as_language_listable(&self) -> Option<&dyn LanguageListable> {
        Some(self)
    }

    fn as_submittable(&self) -> Option<&dyn Submittable> {
        Some(self)
    }
}

/// 站点不区分样例与全部数据
impl SampleDownloadable for HackerRankProblem {
    fn download_sample_cases(&self, session: &dyn Session) -> Result<Vec<TestCase>> {
        self.download_system_cases(session)
    }
}

impl SystemCaseDownloadable for HackerRankProblem {
    fn download_system_cases(&self, session: &dyn Session) -> Result<Vec<TestCase>> {
        let url = format!("{}/download_testcases", self.rest_url());
        let resp = send(session, Request::get(url))?;
        if resp.status == 403 {
            debug!(html = %resp.text(), "access denied");
            return Err(Error::extraction(
                NAME,
                "Access Denied. Did you set your User-Agent?",
            ));
        }
        let resp = resp.error_for_status()?;
        let blobs = zipper::unpack_zip(NAME, &resp.body)?;
        zipper::zip_archive(blobs, &ArchiveFormat::new("%eput/%eput%s.txt", "in", "out"))
    }
}

impl LanguageListable for HackerRankProblem {
    fn get_available_languages(&self, session: &dyn Session) -> Result<Vec<Language>> {
        let model = self.get_model(session)?;
        let mapping = self.get_lang_display_mapping(session)?;
        Ok(model
            .languages
            .into_iter()
            .map(|id| {
                let name = match mapping.get(&id) {
                    Some(name) => name.clone(),
                    None => {
                        warn!(language = %id, "display mapping for language not found");
                        id.clone()
                    }
                };
                Language::new(id, name)
            })
            .collect())
    }
}

impl Submittable for HackerRankProblem {
    fn submit_code(
        &self,
        code: &[u8],
        language: &str,
        session: &dyn Session,
    ) -> Result<Submission> {
        // 非法字节不能悄悄替换后提交
        let code = std::str::from_utf8(code)
            .map_err(|e| Error::Submission(format!("source code is not valid UTF-8: {e}")))?;
        if !HackerRankService.is_logged_in(session)? {
            return Err(Error::AuthenticationRequired(
                "login to HackerRank before submitting".to_string(),
            ));
        }

        let csrf_token = {
            let resp = request(session, Request::get(self.get_url()))?;
            let document = Html::parse_document(&resp.text());
            let meta_sel = selector(NAME, r#"meta[name="csrf-token"]"#)?;
            document
                .select(&meta_sel)
                .next()
                .and_then(|meta| meta.value().attr("content"))
                .map(str::to_string)
                .ok_or_else(|| Error::extraction(NAME, "csrf-token not found"))?
        };

        let payload = json!({
            "code": code,
            "language": language,
            "contest_slug": self.contest_slug,
        });
        debug!(%payload, "payload");
        let req = Request::post_json(format!("{}/submissions", self.rest_url()), payload)
            .header("X-CSRF-Token", csrf_token);
        let resp = request(session, req)?;

        let data: RestResponse<SubmissionModel> = resp.json()?;
        let RestResponse {
            status: true,
            model: Some(model),
        } = data
        else {
            error!("Submit Code: failed");
            return Err(Error::Submission("HackerRank rejected the submission".to_string()));
        };
        let url = format!(
            "{}/submissions/code/{}",
            self.get_url().trim_end_matches('/'),
            model.id
        );
        info!(%url, "success");
        Ok(Submission { url })
    }
}

//! Anarchy Golf 适配器

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use registry::SiteAdapter;
use scraper::Html;
use scraper::node::Node;

use crate::error::*;
use crate::models::*;
use crate::session::{Request, Session};
use crate::traits::*;
use crate::utils::*;
use crate::zipper::{self, LabelMarkers};

const NAME: &str = "Anarchy Golf";

/// Anarchy Golf
#[derive(Debug, Clone, PartialEq, Eq, SiteAdapter)]
#[adapter(kind = "service", name = "Anarchy Golf", hosts = ["golf.shinh.org"])]
pub struct AnarchyGolfService;

impl Resolvable for AnarchyGolfService {
    fn from_url(url: &str) -> Option<Self> {
        parse_with_hosts(url, Self::hosts()).map(|_| Self)
    }

    fn get_url(&self) -> String {
        "http://golf.shinh.org/".to_string()
    }
}

impl Service for AnarchyGolfService {
    fn url(&self) -> String {
        self.get_url()
    }
}

/// Anarchy Golf 题目, 编号即查询串 (如 `The+B+Programming+Language`)
#[derive(Debug, Clone, PartialEq, Eq, SiteAdapter)]
#[adapter(kind = "problem", name = "Anarchy Golf", hosts = ["golf.shinh.org"])]
pub struct AnarchyGolfProblem {
    pub problem_id: String,
}

impl AnarchyGolfProblem {
    pub fn new(problem_id: impl Into<String>) -> Self {
        Self {
            problem_id: problem_id.into(),
        }
    }
}

impl Resolvable for AnarchyGolfProblem {
    fn from_url(url: &str) -> Option<Self> {
        // p.rb?The+B+Programming+Language
        let parsed = parse_with_hosts(url, Self::hosts())?;
        if normpath(parsed.path()) != "/p.rb" {
            return None;
        }
        parsed
            .query()
            .filter(|q| !q.is_empty())
            .map(Self::new)
    }

    fn get_url(&self) -> String {
        format!("http://golf.shinh.org/p.rb?{}", self.problem_id)
    }
}

impl Problem for AnarchyGolfProblem {
    fn url(&self) -> String {
        self.get_url()
    }

    fn service(&self) -> Box<dyn Service> {
        Box::new(AnarchyGolfService)
    }

    fn as_sample_downloadable(&self) -> Option<&dyn SampleDownloadable> {
        Some(self)
    }
}

impl SampleDownloadable for AnarchyGolfProblem {
    fn download_sample_cases(&self, session: &dyn Session) -> Result<Vec<TestCase>> {
        zipper::download_samples(self, session)
    }
}

impl FragmentSource for AnarchyGolfProblem {
    fn fetch_fragments(&self, session: &dyn Session) -> Result<Vec<LabeledFragment>> {
        let resp = request(session, Request::get(self.get_url()))?;
        parse_fragments(&resp.text())
    }

    fn markers(&self) -> LabelMarkers {
        LabelMarkers::new(["sample input"], ["sample output"])
    }
}

/// `<h2>Sample input:</h2>` 之后的 `pre`; `<p>` (什么都没有) 表示空输入, 不是 "\n"
fn parse_fragments(html: &str) -> Result<Vec<LabeledFragment>> {
    let document = Html::parse_document(html);
    let h2_sel = selector(NAME, "h2")?;

    let mut fragments = Vec::new();
    for (position, h2) in document.select(&h2_sel).enumerate() {
        // 只看第一个文本节点, 冒号后面是附注
        let Some(Node::Text(first)) = h2.first_child().map(|c| c.value()) else {
            continue;
        };
        let name = first.split(':').next().unwrap_or_default().trim();
        if name != "Sample input" && name != "Sample output" {
            continue;
        }

        let Some(block) = next_element_sibling(h2) else {
            continue;
        };
        let content = match block.value().name() {
            "pre" => dos2unix(&block.text().collect::<String>()),
            _ if has_no_text(block) => String::new(),
            other => {
                return Err(ContentExtractionError::new(
                    NAME,
                    format!("unexpected <{other}> after sample heading"),
                )
                .with_label(name)
                .into());
            }
        };
        fragments.push(LabeledFragment::new(name, content, position));
    }
    Ok(fragments)
}

//! 标签分类

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::*;

// 第一段连续数字
static INDEX_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// 输入/输出标记短语, 大小写不敏感
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelMarkers {
    pub input: Vec<String>,
    pub output: Vec<String>,
}

impl Default for LabelMarkers {
    fn default() -> Self {
        Self {
            input: [
                "sample input",
                "input example",
                "example input",
                "input",
                "入力例",
                "输入样例",
                "样例输入",
                "输入示例",
            ]
            .map(String::from)
            .to_vec(),
            output: [
                "sample output",
                "output example",
                "example output",
                "output",
                "出力例",
                "输出样例",
                "样例输出",
                "输出示例",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl LabelMarkers {
    pub fn new<I, O, S, T>(input: I, output: O) -> Self
    where
        I: IntoIterator<Item = S>,
        O: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            input: input.into_iter().map(Into::into).collect(),
            output: output.into_iter().map(Into::into).collect(),
        }
    }

    /// 分类标签
    ///
    /// 取最早出现的标记决定方向 (同位置取更长者), 例如 "Output for the Sample Input 1" 是输出.
    /// 去掉该标记后, 第一段数字作为显式编号.
    pub fn classify(&self, label: &str, position: usize) -> ClassifiedLabel {
        let lower = label.to_lowercase();

        // (起始位置, 标记长度, 方向)
        let mut best: Option<(usize, usize, Direction)> = None;
        let candidates = self
            .input
            .iter()
            .map(|m| (m, Direction::Input))
            .chain(self.output.iter().map(|m| (m, Direction::Output)));
        for (marker, direction) in candidates {
            let marker = marker.to_lowercase();
            if marker.is_empty() {
                continue;
            }
            if let Some(at) = lower.find(&marker) {
                let better = match best {
                    None => true,
                    Some((b_at, b_len, _)) => at < b_at || (at == b_at && marker.len() > b_len),
                };
                if better {
                    best = Some((at, marker.len(), direction));
                }
            }
        }

        let Some((at, len, direction)) = best else {
            return ClassifiedLabel {
                direction: Direction::Unknown,
                index: None,
                position,
            };
        };

        let rest = format!("{}{}", &lower[..at], &lower[at + len..]);
        let index = INDEX_REGEX
            .find(&rest)
            .and_then(|m| m.as_str().parse::<u32>().ok());

        ClassifiedLabel {
            direction,
            index,
            position,
        }
    }
}

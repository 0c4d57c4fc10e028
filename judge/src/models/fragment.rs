//! 抓取片段

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};

/// 一次抓取中得到的 (标题, 内容) 对, 不做持久化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledFragment {
    pub label: String,
    pub content: Vec<u8>,
    /// 在文档中的顺序
    pub position: usize,
}

impl LabeledFragment {
    pub fn new(label: impl Into<String>, content: impl Into<Vec<u8>>, position: usize) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
            position,
        }
    }
}

/// 片段方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
    Unknown,
}

/// 分类后的标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedLabel {
    pub direction: Direction,
    /// 标签中显式给出的编号
    pub index: Option<u32>,
    pub position: usize,
}

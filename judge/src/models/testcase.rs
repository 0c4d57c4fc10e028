//! 测试用例

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};

/// 一组完整的输入/输出
///
/// 内容是抓取到的原始字节, 只允许换行规范化.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub input_name: String,
    pub input_data: Vec<u8>,
    pub output_name: String,
    pub output_data: Vec<u8>,
}

impl TestCase {
    pub fn new(
        name: impl Into<String>,
        input_name: impl Into<String>,
        input_data: impl Into<Vec<u8>>,
        output_name: impl Into<String>,
        output_data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            input_name: input_name.into(),
            input_data: input_data.into(),
            output_name: output_name.into(),
            output_data: output_data.into(),
        }
    }
}

/// 压缩包内的一个文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedBlob {
    pub name: String,
    pub data: Vec<u8>,
}

impl NamedBlob {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

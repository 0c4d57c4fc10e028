//! 打包好的测试数据
//!
//! 站点直接给出成对文件时, 按文件名配对: `%e` 是方向标记, `%s` 是共同的数字后缀.

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use regex::Regex;
use tracing::{debug, warn};

use crate::error::*;
use crate::models::*;

/// 文件命名规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFormat {
    /// 例如 `%eput/%eput%s.txt`
    pub pattern: String,
    pub input_token: String,
    pub output_token: String,
}

impl ArchiveFormat {
    pub fn new(
        pattern: impl Into<String>,
        input_token: impl Into<String>,
        output_token: impl Into<String>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            input_token: input_token.into(),
            output_token: output_token.into(),
        }
    }

    /// 编译为正则, 每个占位符一个命名分组
    fn compile(&self) -> std::result::Result<(Regex, usize, usize), regex::Error> {
        let tokens = format!(
            "{}|{}",
            regex::escape(&self.input_token),
            regex::escape(&self.output_token)
        );
        let mut expr = String::from("^");
        let (mut directions, mut suffixes) = (0, 0);
        let mut chars = self.pattern.chars().peekable();
        while let Some(c) = chars.next() {
            match (c, chars.peek()) {
                ('%', Some('e')) => {
                    chars.next();
                    expr.push_str(&format!("(?P<e{directions}>{tokens})"));
                    directions += 1;
                }
                ('%', Some('s')) => {
                    chars.next();
                    expr.push_str(&format!("(?P<s{suffixes}>[0-9]+)"));
                    suffixes += 1;
                }
                _ => expr.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
            }
        }
        expr.push('$');
        Ok((Regex::new(&expr)?, directions, suffixes))
    }
}

#[derive(Default)]
struct Group {
    input: Option<NamedBlob>,
    output: Option<NamedBlob>,
}

/// 按命名规则把文件配成用例, 按后缀的数值排序
///
/// 不符合规则的文件忽略; 只有一侧的组丢弃并记录警告.
pub fn zip_archive(
    blobs: impl IntoIterator<Item = NamedBlob>,
    format: &ArchiveFormat,
) -> Result<Vec<TestCase>> {
    let (regex, directions, suffixes) = format
        .compile()
        .map_err(|e| Error::extraction("archive", format!("bad pattern {}: {e}", format.pattern)))?;

    let mut groups: BTreeMap<(u128, String), Group> = BTreeMap::new();
    for blob in blobs {
        let Some(caps) = regex.captures(&blob.name) else {
            debug!(name = %blob.name, "file does not follow the archive pattern");
            continue;
        };

        let pick = |prefix: char, count: usize| -> Option<String> {
            let mut values = (0..count).filter_map(|i| caps.name(&format!("{prefix}{i}")));
            let first = values.next()?.as_str();
            values.all(|m| m.as_str() == first).then(|| first.to_string())
        };
        let (Some(token), Some(suffix)) = (pick('e', directions), pick('s', suffixes)) else {
            debug!(name = %blob.name, "inconsistent placeholders in file name");
            continue;
        };

        let key = (suffix.parse::<u128>().unwrap_or(u128::MAX), suffix);
        let group = groups.entry(key).or_default();
        let slot = if token == format.input_token {
            &mut group.input
        } else {
            &mut group.output
        };
        if slot.is_some() {
            warn!(name = %blob.name, "duplicate file in archive, ignored");
            continue;
        }
        *slot = Some(blob);
    }

    let mut cases = Vec::new();
    for ((_, suffix), group) in groups {
        match (group.input, group.output) {
            (Some(input), Some(output)) => cases.push(TestCase::new(
                suffix,
                input.name,
                input.data,
                output.name,
                output.data,
            )),
            (Some(only), None) | (None, Some(only)) => {
                warn!(name = %only.name, "archive file without counterpart, dropped");
            }
            (None, None) => {}
        }
    }
    Ok(cases)
}

/// 解开 zip 压缩包, 跳过目录
pub fn unpack_zip(adapter: &'static str, bytes: &[u8]) -> Result<Vec<NamedBlob>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::extraction(adapter, format!("broken zip archive: {e}")))?;

    let mut blobs = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| Error::extraction(adapter, format!("broken zip entry {i}: {e}")))?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| Error::extraction(adapter, format!("{name}: {e}")))?;
        blobs.push(NamedBlob::new(name, data));
    }
    Ok(blobs)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn hackerrank() -> ArchiveFormat {
        ArchiveFormat::new("%eput/%eput%s.txt", "in", "out")
    }

    #[test]
    fn test_zip_archive() -> Result<()> {
        let blobs = vec![
            NamedBlob::new("output/output10.txt", "o10"),
            NamedBlob::new("input/input02.txt", "i2"),
            NamedBlob::new("input/input10.txt", "i10"),
            NamedBlob::new("output/output02.txt", "o2"),
            NamedBlob::new("input/input03.txt", "lonely"),
            NamedBlob::new("input/output04.txt", "mixed"),
            NamedBlob::new("README", "ignored"),
        ];
        let cases = zip_archive(blobs, &hackerrank())?;
        assert_eq!(
            cases,
            vec![
                TestCase::new("02", "input/input02.txt", "i2", "output/output02.txt", "o2"),
                TestCase::new("10", "input/input10.txt", "i10", "output/output10.txt", "o10"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_zip_archive_escapes_literals() -> Result<()> {
        let format = ArchiveFormat::new("sample.%s.%e", "in", "ans");
        let blobs = vec![
            NamedBlob::new("sample.1.in", "a"),
            NamedBlob::new("sample.1.ans", "b"),
            NamedBlob::new("sampleX1Xin", "c"),
        ];
        let cases = zip_archive(blobs, &format)?;
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].input_data, b"a");
        assert_eq!(cases[0].output_data, b"b");
        Ok(())
    }

    #[test]
    fn test_unpack_zip() -> Result<()> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = || {
            zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored)
        };
        writer.add_directory("input/", options()).unwrap();
        writer.start_file("input/input00.txt", options()).unwrap();
        writer.write_all(b"1 2\n").unwrap();
        writer.start_file("output/output00.txt", options()).unwrap();
        writer.write_all(b"3\n").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let blobs = unpack_zip("test", &bytes)?;
        assert_eq!(blobs.len(), 2);
        let cases = zip_archive(blobs, &hackerrank())?;
        assert_eq!(
            cases,
            vec![TestCase::new(
                "00",
                "input/input00.txt",
                "1 2\n",
                "output/output00.txt",
                "3\n"
            )]
        );
        Ok(())
    }

    #[test]
    fn test_unpack_broken_zip() {
        let err = unpack_zip("test", b"not a zip").unwrap_err();
        assert!(matches!(err, Error::ContentExtraction(e) if e.adapter == "test"));
    }
}

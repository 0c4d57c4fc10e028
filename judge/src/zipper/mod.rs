//! 样例配对
//!
//! 把抓取到的输入/输出片段配成 `TestCase`. 两侧编号相同的先配对 (按编号升序),
//! 其余按文档顺序逐一配对, 多出来的丢弃并记录警告, 从不产生半个用例.

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

mod archive;
mod label;

use std::collections::{BTreeMap, HashSet};

use tracing::warn;

use crate::error::*;
use crate::models::*;
use crate::session::Session;
use crate::traits::FragmentSource;

pub use archive::{ArchiveFormat, unpack_zip, zip_archive};
pub use label::LabelMarkers;

/// 配对过程中的警告
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZipWarning {
    /// 标签无法判断方向
    UnknownLabel { label: String, position: usize },
    /// 同侧编号重复, 后出现者按位置配对
    DuplicateIndex {
        direction: Direction,
        index: u32,
        label: String,
        position: usize,
    },
    /// 没有对应的另一侧
    Unmatched {
        direction: Direction,
        label: String,
        position: usize,
    },
}

#[derive(Debug, Clone)]
struct Entry {
    index: Option<u32>,
    label: String,
    content: Vec<u8>,
    position: usize,
}

enum CaseName {
    Explicit(u32),
    Positional,
}

/// 样例配对器
///
/// 抓取时逐个 `add`, 最后 `finish`. `finish` 的结果会被缓存, 重复调用返回相同结果.
#[derive(Debug, Clone, Default)]
pub struct SampleZipper {
    markers: LabelMarkers,
    inputs: Vec<Entry>,
    outputs: Vec<Entry>,
    next_position: usize,
    warnings: Vec<ZipWarning>,
    finished: Option<(Vec<TestCase>, Vec<ZipWarning>)>,
}

impl SampleZipper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markers(markers: LabelMarkers) -> Self {
        Self {
            markers,
            ..Self::default()
        }
    }

    /// 按到达顺序加入一个片段
    pub fn add(&mut self, label: impl Into<String>, content: impl Into<Vec<u8>>) {
        let position = self.next_position;
        self.push(label.into(), content.into(), position);
    }

    /// 加入带文档位置的片段
    pub fn add_fragment(&mut self, fragment: LabeledFragment) {
        self.push(fragment.label, fragment.content, fragment.position);
    }

    fn push(&mut self, label: String, content: Vec<u8>, position: usize) {
        self.next_position = self.next_position.max(position + 1);
        self.finished = None;

        let classified = self.markers.classify(&label, position);
        let entry = Entry {
            index: classified.index,
            label,
            content,
            position,
        };
        match classified.direction {
            Direction::Input => self.inputs.push(entry),
            Direction::Output => self.outputs.push(entry),
            Direction::Unknown => {
                warn!(label = %entry.label, position, "unrecognized sample label, dropped");
                self.warnings.push(ZipWarning::UnknownLabel {
                    label: entry.label,
                    position,
                });
            }
        }
    }

    /// 完成配对
    pub fn finish(&mut self) -> Vec<TestCase> {
        if let Some((cases, _)) = &self.finished {
            return cases.clone();
        }
        let (cases, warnings) = self.pair();
        self.finished = Some((cases.clone(), warnings));
        cases
    }

    /// 到目前为止记录的全部警告
    pub fn warnings(&self) -> Vec<ZipWarning> {
        let mut all = self.warnings.clone();
        if let Some((_, pairing)) = &self.finished {
            all.extend(pairing.iter().cloned());
        }
        all
    }

    fn pair(&self) -> (Vec<TestCase>, Vec<ZipWarning>) {
        let mut warnings = Vec::new();
        let inputs = demote_duplicates(&self.inputs, Direction::Input, &mut warnings);
        let outputs = demote_duplicates(&self.outputs, Direction::Output, &mut warnings);

        let by_index = |side: &[Entry]| -> BTreeMap<u32, usize> {
            side.iter()
                .enumerate()
                .filter_map(|(i, e)| e.index.map(|idx| (idx, i)))
                .collect()
        };
        let input_index = by_index(&inputs);
        let output_index = by_index(&outputs);

        let mut used_in = vec![false; inputs.len()];
        let mut used_out = vec![false; outputs.len()];
        let mut pending: Vec<(CaseName, usize, usize)> = Vec::new();

        for (&idx, &i) in &input_index {
            if let Some(&o) = output_index.get(&idx) {
                used_in[i] = true;
                used_out[o] = true;
                pending.push((CaseName::Explicit(idx), i, o));
            }
        }

        let remaining = |side: &[Entry], used: &[bool]| -> Vec<usize> {
            let mut rest: Vec<usize> = (0..side.len()).filter(|&i| !used[i]).collect();
            rest.sort_by_key(|&i| side[i].position);
            rest
        };
        let rest_in = remaining(&inputs, &used_in);
        let rest_out = remaining(&outputs, &used_out);

        for (&i, &o) in rest_in.iter().zip(rest_out.iter()) {
            pending.push((CaseName::Positional, i, o));
        }

        let paired = rest_in.len().min(rest_out.len());
        for (direction, side, rest) in [
            (Direction::Input, &inputs, &rest_in),
            (Direction::Output, &outputs, &rest_out),
        ] {
            for &i in &rest[paired..] {
                let e = &side[i];
                warn!(
                    ?direction,
                    label = %e.label,
                    position = e.position,
                    "unmatched sample fragment, dropped"
                );
                warnings.push(ZipWarning::Unmatched {
                    direction,
                    label: e.label.clone(),
                    position: e.position,
                });
            }
        }

        let mut names: HashSet<String> = pending
            .iter()
            .filter_map(|(name, _, _)| match name {
                CaseName::Explicit(idx) => Some(format!("sample-{idx}")),
                CaseName::Positional => None,
            })
            .collect();

        let cases = pending
            .into_iter()
            .enumerate()
            .map(|(k, (name, i, o))| {
                let name = match name {
                    CaseName::Explicit(idx) => format!("sample-{idx}"),
                    CaseName::Positional => {
                        let mut ordinal = k + 1;
                        while names.contains(&format!("sample-{ordinal}")) {
                            ordinal += 1;
                        }
                        let name = format!("sample-{ordinal}");
                        names.insert(name.clone());
                        name
                    }
                };
                let (input, output) = (&inputs[i], &outputs[o]);
                TestCase::new(
                    name,
                    input.label.clone(),
                    input.content.clone(),
                    output.label.clone(),
                    output.content.clone(),
                )
            })
            .collect();

        (cases, warnings)
    }
}

/// 同侧重复编号只保留文档中最早的一个, 其余去掉编号留给位置配对
fn demote_duplicates(
    side: &[Entry],
    direction: Direction,
    warnings: &mut Vec<ZipWarning>,
) -> Vec<Entry> {
    let mut sorted = side.to_vec();
    sorted.sort_by_key(|e| e.position);

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .map(|mut e| {
            if let Some(idx) = e.index
                && !seen.insert(idx)
            {
                warn!(?direction, index = idx, label = %e.label, "duplicate sample index");
                warnings.push(ZipWarning::DuplicateIndex {
                    direction,
                    index: idx,
                    label: e.label.clone(),
                    position: e.position,
                });
                e.index = None;
            }
            e
        })
        .collect()
}

/// 一次性配对一组片段
pub fn zip_fragments(
    markers: LabelMarkers,
    fragments: impl IntoIterator<Item = LabeledFragment>,
) -> Vec<TestCase> {
    let mut zipper = SampleZipper::with_markers(markers);
    for fragment in fragments {
        zipper.add_fragment(fragment);
    }
    zipper.finish()
}

/// 抓取片段并配对
pub fn download_samples<S: FragmentSource + ?Sized>(
    source: &S,
    session: &dyn Session,
) -> Result<Vec<TestCase>> {
    let fragments = source.fetch_fragments(session)?;
    Ok(zip_fragments(source.markers(), fragments))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(cases: &[TestCase]) -> Vec<(String, Vec<u8>, Vec<u8>)> {
        cases
            .iter()
            .map(|c| (c.name.clone(), c.input_data.clone(), c.output_data.clone()))
            .collect()
    }

    fn case(name: &str, input: &str, output: &str) -> (String, Vec<u8>, Vec<u8>) {
        (name.to_string(), input.into(), output.into())
    }

    #[test]
    fn test_index_matched_any_interleaving() {
        let fragments = [
            ("Sample Input 1", "a"),
            ("Sample Output 1", "b"),
            ("Sample Input 2", "c"),
            ("Sample Output 2", "d"),
        ];
        let orders: [[usize; 4]; 4] = [[0, 1, 2, 3], [2, 3, 0, 1], [0, 2, 1, 3], [3, 1, 2, 0]];
        for order in orders {
            let mut zipper = SampleZipper::new();
            for i in order {
                zipper.add(fragments[i].0, fragments[i].1);
            }
            assert_eq!(
                summary(&zipper.finish()),
                vec![case("sample-1", "a", "b"), case("sample-2", "c", "d")],
                "order {order:?}"
            );
            assert!(zipper.warnings().is_empty());
        }
    }

    #[test]
    fn test_positional_fallback() {
        let mut zipper = SampleZipper::new();
        zipper.add("Sample Input", "x");
        zipper.add("Sample Output", "y");
        zipper.add("Sample Input", "z");
        zipper.add("Sample Output", "w");
        let cases = zipper.finish();
        assert_eq!(
            summary(&cases),
            vec![case("sample-1", "x", "y"), case("sample-2", "z", "w")]
        );
        assert_eq!(cases[0].input_name, "Sample Input");
        assert_eq!(cases[0].output_name, "Sample Output");
    }

    #[test]
    fn test_mismatched_numbers_pair_by_position() {
        // 输出编号整体错位
        let mut zipper = SampleZipper::new();
        zipper.add("Input 1", "a");
        zipper.add("Output 2", "b");
        zipper.add("Input 2", "c");
        zipper.add("Output 3", "d");
        // 编号 2 两侧都有, 先配; 剩下的 Input 1 与 Output 3 按位置配
        assert_eq!(
            summary(&zipper.finish()),
            vec![case("sample-2", "c", "b"), case("sample-3", "a", "d")]
        );
    }

    #[test]
    fn test_lone_fragment_is_dropped_with_warning() {
        let mut zipper = SampleZipper::new();
        zipper.add("Sample Input 3", "q");
        assert!(zipper.finish().is_empty());
        let warnings = zipper.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            ZipWarning::Unmatched {
                direction: Direction::Input,
                label,
                ..
            } if label == "Sample Input 3"
        ));
    }

    #[test]
    fn test_unequal_counts_drop_remainder() {
        let mut zipper = SampleZipper::new();
        zipper.add("Sample Input", "1");
        zipper.add("Sample Output", "2");
        zipper.add("Sample Input", "3");
        let cases = zipper.finish();
        assert_eq!(summary(&cases), vec![case("sample-1", "1", "2")]);
        assert_eq!(zipper.warnings().len(), 1);
    }

    #[test]
    fn test_explicit_empty_content() {
        let mut zipper = SampleZipper::new();
        zipper.add("Sample Input", "");
        zipper.add("Sample Output", "");
        let cases = zipper.finish();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].input_data, b"");
        assert_eq!(cases[0].output_data, b"");
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut zipper = SampleZipper::new();
        zipper.add("Sample Input 1", "a");
        zipper.add("Sample Output 1", "b");
        zipper.add("Sample Output 9", "stray");
        let first = zipper.finish();
        let warnings = zipper.warnings();
        let second = zipper.finish();
        assert_eq!(first, second);
        assert_eq!(warnings, zipper.warnings());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_add_after_finish_recomputes() {
        let mut zipper = SampleZipper::new();
        zipper.add("Sample Input 1", "a");
        assert!(zipper.finish().is_empty());
        zipper.add("Sample Output 1", "b");
        assert_eq!(summary(&zipper.finish()), vec![case("sample-1", "a", "b")]);
        assert!(zipper.warnings().is_empty());
    }

    #[test]
    fn test_duplicate_index_keeps_first() {
        let mut zipper = SampleZipper::new();
        zipper.add("Sample Input 1", "a");
        zipper.add("Sample Input 1", "c");
        zipper.add("Sample Output 1", "b");
        zipper.add("Sample Output 1", "d");
        let cases = zipper.finish();
        assert_eq!(
            summary(&cases),
            vec![case("sample-1", "a", "b"), case("sample-2", "c", "d")]
        );
        let duplicates = zipper
            .warnings()
            .into_iter()
            .filter(|w| matches!(w, ZipWarning::DuplicateIndex { index: 1, .. }))
            .count();
        assert_eq!(duplicates, 2);
    }

    #[test]
    fn test_duplicate_index_keeps_earliest_position() {
        let fragments = vec![
            LabeledFragment::new("Sample Input 1", "late", 5),
            LabeledFragment::new("Sample Input 1", "early", 0),
            LabeledFragment::new("Sample Output 1", "out1", 1),
            LabeledFragment::new("Sample Output 1", "out1b", 6),
        ];
        let cases = zip_fragments(LabelMarkers::default(), fragments);
        assert_eq!(
            summary(&cases),
            vec![case("sample-1", "early", "out1"), case("sample-2", "late", "out1b")]
        );
    }

    #[test]
    fn test_synthetic_names_avoid_explicit_ones() {
        let mut zipper = SampleZipper::new();
        zipper.add("Sample Input 2", "a");
        zipper.add("Sample Output 2", "b");
        zipper.add("Sample Input", "c");
        zipper.add("Sample Output", "d");
        let names: Vec<String> = zipper.finish().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["sample-2", "sample-3"]);
    }

    #[test]
    fn test_unknown_label_is_dropped() {
        let mut zipper = SampleZipper::new();
        zipper.add("Explanation", "blah");
        zipper.add("Sample Input", "x");
        zipper.add("Sample Output", "y");
        assert_eq!(zipper.finish().len(), 1);
        assert!(matches!(
            zipper.warnings().as_slice(),
            [ZipWarning::UnknownLabel { position: 0, .. }]
        ));
    }

    #[test]
    fn test_fragments_ordered_by_position() {
        let fragments = vec![
            LabeledFragment::new("Sample Output", "second-out", 3),
            LabeledFragment::new("Sample Input", "second-in", 2),
            LabeledFragment::new("Sample Input", "first-in", 0),
            LabeledFragment::new("Sample Output", "first-out", 1),
        ];
        let cases = zip_fragments(LabelMarkers::default(), fragments);
        assert_eq!(
            summary(&cases),
            vec![
                case("sample-1", "first-in", "first-out"),
                case("sample-2", "second-in", "second-out"),
            ]
        );
    }
}

// Sat Oct 17 2026 - Alex

use crate::dumper::format::{summary_header, summary_line};
use crate::dumper::region::{RegionNode, PADDING_NAME};
use crate::walker::SlotType;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub path: String,
    pub bytes: u64,
    pub kilobytes: f64,
    pub percent: f64,
}

impl SummaryEntry {
    pub fn depth(&self) -> usize {
        self.path.matches('/').count()
    }
}

/// Accumulates section and padding sizes across many class layouts, keyed by
/// their nesting path (`/methods/method`).
#[derive(Debug, Default)]
pub struct ClassSummaryHelper {
    preferred_order: Vec<String>,
    totals: IndexMap<String, u64>,
    class_count: usize,
}

impl ClassSummaryHelper {
    pub fn new(preferred_order: &[String]) -> Self {
        Self {
            preferred_order: preferred_order.to_vec(),
            totals: IndexMap::new(),
            class_count: 0,
        }
    }

    pub fn class_count(&self) -> usize {
        self.class_count
    }

    pub fn add_regions_for_class(&mut self, root: &RegionNode) {
        self.class_count += 1;
        self.add_children(root, "");
    }

    fn add_children(&mut self, node: &RegionNode, parent: &str) {
        for child in node.children() {
            let Some(region) = child.region() else {
                continue;
            };
            match region.kind() {
                SlotType::SectionStart => {
                    let path = format!("{}/{}", parent, region.name());
                    *self.totals.entry(path.clone()).or_default() += region.length();
                    self.add_children(child, &path);
                }
                SlotType::Padding => {
                    *self.totals.entry(format!("{}/{}", parent, PADDING_NAME)).or_default() += region.length();
                }
                _ => {}
            }
        }
    }

    fn top_level_rank(&self, name: &str) -> usize {
        self.preferred_order
            .iter()
            .position(|n| n == name)
            .unwrap_or(self.preferred_order.len())
    }

    fn compare_paths(&self, a: &str, b: &str) -> Ordering {
        let mut left = a.split('/').skip(1);
        let mut right = b.split('/').skip(1);
        let mut top = true;
        loop {
            match (left.next(), right.next()) {
                (Some(x), Some(y)) => {
                    let ordering = if top {
                        self.top_level_rank(x).cmp(&self.top_level_rank(y)).then_with(|| x.cmp(y))
                    } else {
                        x.cmp(y)
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                    top = false;
                }
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (None, None) => return Ordering::Equal,
            }
        }
    }

    /// Entries in report order. Top-level sections follow the preferred order
    /// and then the alphabet; nested entries sit under their parent.
    pub fn entries(&self) -> Vec<SummaryEntry> {
        let top_total: u64 = self
            .totals
            .iter()
            .filter(|(path, _)| path.matches('/').count() == 1)
            .map(|(_, bytes)| *bytes)
            .sum();

        self.totals
            .iter()
            .sorted_by(|(a, _), (b, _)| self.compare_paths(a, b))
            .map(|(path, bytes)| SummaryEntry {
                path: path.clone(),
                bytes: *bytes,
                kilobytes: *bytes as f64 / 1024.0,
                percent: if top_total == 0 {
                    0.0
                } else {
                    *bytes as f64 * 100.0 / top_total as f64
                },
            })
            .collect()
    }

    pub fn print_statistics(&self) -> String {
        let body = self
            .entries()
            .iter()
            .map(|e| summary_line(&e.path, e.bytes, e.kilobytes, e.percent))
            .join("\n");
        format!("Summary for {} classes\n{}\n{}\n", self.class_count, summary_header(), body)
    }
}

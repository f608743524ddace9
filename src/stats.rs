use serde::Serialize;
use std::collections::HashMap;

use crate::model::VehicleRecord;

/// Number of vehicles currently running on one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineCount {
    pub line: String,
    pub count: usize,
}

impl LineCount {
    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    /// This line's share of all vehicles, in percent.
    pub fn share_pct(&self, total: usize) -> f64 {
        Self::pct(self.count, total)
    }
}

/// Counts vehicles per line, most populated line first.
///
/// Lines with equal counts are ordered by label so the output is stable
/// between refreshes.
pub fn count_by_line(records: &[VehicleRecord]) -> Vec<LineCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.line()).or_default() += 1;
    }

    let mut out: Vec<LineCount> = counts
        .into_iter()
        .map(|(line, count)| LineCount {
            line: line.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.line.cmp(&b.line)));
    out
}

pub fn total(counts: &[LineCount]) -> usize {
    counts.iter().map(|c| c.count).sum()
}

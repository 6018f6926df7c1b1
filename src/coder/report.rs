//! Comparison report for coder results.
//!
//! The report is plain data (rows); rendering is a separate function so the same
//! rows can go to a terminal, a CSV file or anywhere else.

use super::matcher::CoderMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const REPORT_HEADER: [&str; 3] = ["ORIGINAL NAME", "WBG NAME", "ISO_CODE"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub original: String,
    pub wbg_name: String,
    pub iso_code: String,
}

impl ReportRow {
    pub fn header() -> Self {
        let [original, wbg_name, iso_code] = REPORT_HEADER.map(String::from);
        Self {
            original,
            wbg_name,
            iso_code,
        }
    }

    pub fn cells(&self) -> [&str; 3] {
        [&self.original, &self.wbg_name, &self.iso_code]
    }
}

/// Header row followed by one row per coded name. Unresolved codes and codes
/// without a known canonical name render as empty cells.
pub fn report(result: &CoderMap, names: &HashMap<String, String>) -> Vec<ReportRow> {
    let mut rows = vec![ReportRow::header()];
    rows.extend(result.iter().map(|(original, code)| {
        let code = code.as_deref().unwrap_or_default();
        ReportRow {
            original: original.clone(),
            wbg_name: names.get(code).cloned().unwrap_or_default(),
            iso_code: code.to_string(),
        }
    }));
    rows
}

/// Keep only the interesting entries: names that did not resolve, and names whose
/// canonical name differs (ignoring case) from what was asked for.
pub fn summarize(result: &CoderMap, names: &HashMap<String, String>) -> CoderMap {
    result
        .iter()
        .filter(|(original, code)| match code {
            None => true,
            Some(code) => names
                .get(code)
                .is_none_or(|name| name.to_lowercase() != original.to_lowercase()),
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Render rows as an aligned text table; the first row is the header.
pub fn format_table(rows: &[ReportRow]) -> String {
    let mut widths = [0usize; 3];
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.cells()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 3]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{:<w$}", c, w = w))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 1);
    let mut iter = rows.iter();
    if let Some(header) = iter.next() {
        out.push(line(header.cells()));
        out.push(widths.map(|w| "-".repeat(w)).join("  "));
    }
    out.extend(iter.map(|r| line(r.cells())));
    out.join("\n")
}

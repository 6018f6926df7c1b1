use crate::coder::{CoderMap, ReportRow};
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::borrow::Cow;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prefix cells that a spreadsheet would evaluate as a formula.
fn neutralize(cell: &str) -> Cow<'_, str> {
    if cell.starts_with(['=', '+', '-', '@']) {
        Cow::Owned(format!("'{cell}"))
    } else {
        Cow::Borrowed(cell)
    }
}

/// Save report rows as CSV. The first row (the report header) becomes the CSV header.
pub fn save_report_csv<P: AsRef<Path>>(rows: &[ReportRow], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    for row in rows {
        wtr.write_record(row.cells().map(neutralize).iter().map(|c| c.as_ref()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save the coder mapping as a pretty JSON object (`null` for unresolved names).
pub fn save_coder_json<P: AsRef<Path>>(result: &CoderMap, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(result)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let result = CoderMap::from([("Swaziland".to_string(), Some("SWZ".to_string()))]);
        let rows = vec![
            ReportRow::header(),
            ReportRow {
                original: "Swaziland".into(),
                wbg_name: "Eswatini".into(),
                iso_code: "SWZ".into(),
            },
        ];
        save_report_csv(&rows, &csvp).unwrap();
        save_coder_json(&result, &jsonp).unwrap();
        assert!(csvp.exists());
        assert!(jsonp.exists());
    }

    #[test]
    fn formula_cells_are_prefixed() {
        assert_eq!(neutralize("=1+1"), "'=1+1");
        assert_eq!(neutralize("France"), "France");
    }
}

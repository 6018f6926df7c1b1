use std::fs;
use wbgapi_rs::coder::{CoderMap, ReportRow, report};
use wbgapi_rs::storage;

fn sample() -> CoderMap {
    CoderMap::from([
        ("Swaziland".to_string(), Some("SWZ".to_string())),
        ("Toronto".to_string(), None),
    ])
}

fn names() -> std::collections::HashMap<String, String> {
    std::collections::HashMap::from([("SWZ".to_string(), "Eswatini".to_string())])
}

#[test]
fn save_csv_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let result = sample();
    let rows = report(&result, &names());

    let csv_path = dir.path().join("codes.csv");
    storage::save_report_csv(&rows, &csv_path).unwrap();
    let csv_txt = fs::read_to_string(&csv_path).unwrap();
    assert!(csv_txt.starts_with("ORIGINAL NAME,WBG NAME,ISO_CODE"));
    assert_eq!(csv_txt.lines().count(), rows.len());
    assert!(csv_txt.contains("Swaziland,Eswatini,SWZ"));

    let json_path = dir.path().join("codes.json");
    storage::save_coder_json(&result, &json_path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(v["Swaziland"], "SWZ");
    assert!(v["Toronto"].is_null());
}

//test if the CSV file is save and won't include executable formulas
//names come from user input, so a name like "=HYPERLINK(...)" must not be
//evaluated when the report is opened in a spreadsheet
#[test]
fn csv_cells_are_prefixed_to_avoid_formulas() {
    let rows = vec![
        ReportRow::header(),
        ReportRow {
            original: "=HYPERLINK(\"http://evil\")".into(),
            wbg_name: "".into(),
            iso_code: "".into(),
        },
        ReportRow {
            original: "@foo".into(),
            wbg_name: "+SUM(A1:A9)".into(),
            iso_code: "".into(),
        },
    ];

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("csv_injection.csv");
    storage::save_report_csv(&rows, &path).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);

    let first = records[0].get(0).unwrap();
    assert!(first.starts_with('\''), "not prefixed: {first}");
    assert!(first.contains("=HYPERLINK"), "content changed: {first}");

    assert_eq!(records[1].get(0), Some("'@foo"));
    assert_eq!(records[1].get(1), Some("'+SUM(A1:A9)"));
    assert_eq!(records[1].get(2), Some(""));
}

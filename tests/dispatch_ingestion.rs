use upload_insights::ingestion::{
    ingest_upload, select_format, FormatMatcher, IngestOutcome, IngestionOptions, UploadFormat,
};
use upload_insights::types::Value;
use upload_insights::{IngestionError, UploadPayload};

#[test]
fn csv_upload_extracts_a_table() {
    let upload = UploadPayload::from_path("tests/fixtures/people.csv").unwrap();
    assert_eq!(upload.filename, "people.csv");
    assert!(upload.contents.starts_with("data:text/csv;base64,"));

    let ds = ingest_upload(&upload, &IngestionOptions::default())
        .into_table()
        .unwrap();
    assert_eq!(ds.row_count(), 2);
    assert_eq!(ds.rows[1][1], Value::Utf8("Grace".to_string()));
}

#[test]
fn unrecognized_names_produce_no_table() {
    let upload = UploadPayload::from_bytes("notes.txt.bak", "text/plain", b"A,B\n1,2\n");
    let outcome = ingest_upload(&upload, &IngestionOptions::default());
    assert!(matches!(outcome, IngestOutcome::Unrecognized));
}

#[test]
fn names_are_matched_by_substring() {
    let opts = IngestionOptions::default();
    assert_eq!(select_format("backup.csv.old", &opts), Some(UploadFormat::DelimitedText));
    assert_eq!(select_format("DATA.CSV", &opts), Some(UploadFormat::DelimitedText));
    assert_eq!(select_format("budget.ods", &opts), Some(UploadFormat::Spreadsheet));
    assert_eq!(select_format("pdf_to_csv.txt", &opts), Some(UploadFormat::DelimitedText));
}

#[test]
fn custom_matchers_replace_the_defaults() {
    let opts = IngestionOptions {
        matchers: vec![FormatMatcher::new(UploadFormat::DelimitedText, &["TSV", "txt"])],
        ..Default::default()
    };
    assert_eq!(select_format("export.tsv", &opts), Some(UploadFormat::DelimitedText));
    assert_eq!(select_format("data.csv", &opts), None);

    let upload = UploadPayload::from_bytes("export.txt", "text/plain", b"x\n1\n2\n");
    let ds = ingest_upload(&upload, &opts).into_table().unwrap();
    assert_eq!(ds.rows, vec![vec![Value::Int64(1)], vec![Value::Int64(2)]]);
}

#[test]
fn invalid_base64_is_a_failure_not_a_panic() {
    let upload = UploadPayload::new("data.csv", "data:text/csv;base64,@@@");
    let outcome = ingest_upload(&upload, &IngestionOptions::default());
    assert!(matches!(outcome, IngestOutcome::Failed(IngestionError::Decode(_))));
}

#[test]
fn malformed_csv_is_a_failure() {
    let upload = UploadPayload::from_bytes("data.csv", "text/csv", b"A,B\n1,2,3\n");
    let outcome = ingest_upload(&upload, &IngestionOptions::default());
    assert!(matches!(outcome, IngestOutcome::Failed(IngestionError::MalformedTable { .. })));
}

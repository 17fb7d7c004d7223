//! CLI command tests
//!
//! These exercise the command functions directly with temp files; none of
//! them touch a model backend (analysis runs with `no_model = true`).

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::commands::{self, truncate};

fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ========== Analyze Command Tests ==========

#[tokio::test]
async fn test_cmd_analyze_csv_file() {
    let file = temp_file(".csv", "date,goals\n2024-03-01,2\n2024-03-08,3\n");
    let result = commands::cmd_analyze(&[file.path().to_path_buf()], true, "text").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_analyze_json_output() {
    let file = temp_file(".csv", "date,steps\n2024-03-01,4000\n2024-03-02,6000\n");
    let result = commands::cmd_analyze(&[file.path().to_path_buf()], true, "json").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_analyze_mixed_files() {
    let csv = temp_file(".csv", "date,amount\n2024-03-01,12.50\n2024-03-02,9.99\n");
    let txt = temp_file(".txt", "Scored 2 goals and 1 assist today. Ran 7 miles.\n");
    let result = commands::cmd_analyze(
        &[csv.path().to_path_buf(), txt.path().to_path_buf()],
        true,
        "text",
    )
    .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_analyze_missing_file() {
    let result =
        commands::cmd_analyze(&[PathBuf::from("/nonexistent/stats.csv")], true, "text").await;
    assert!(result.is_err());
}

// ========== Extract Command Tests ==========

#[test]
fn test_cmd_extract_text_output() {
    let result = commands::cmd_extract("2 goals, 2 assists. 7 miles.", "text");
    assert!(result.is_ok());
}

#[test]
fn test_cmd_extract_json_output() {
    let result = commands::cmd_extract("12000 steps and a great workout", "json");
    assert!(result.is_ok());
}

#[test]
fn test_cmd_extract_empty_text() {
    let result = commands::cmd_extract("", "text");
    assert!(result.is_ok());
}

// ========== Classify Command Tests ==========

#[tokio::test]
async fn test_cmd_classify_csv() {
    let file = temp_file(".csv", "date,goals,assists\n2024-03-01,2,1\n");
    let result = commands::cmd_classify(file.path(), "text").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_classify_text_file() {
    let file = temp_file(".txt", "Spent $45.50 on groceries. Budget is tight.\n");
    let result = commands::cmd_classify(file.path(), "json").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_classify_missing_file() {
    let result = commands::cmd_classify(std::path::Path::new("/nonexistent/notes.txt"), "text").await;
    assert!(result.is_err());
}

// ========== Helper Tests ==========

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
}

#[test]
fn test_load_dataset_extension_routing() {
    let csv = temp_file(".csv", "date,steps\n2024-03-01,4000\n");
    let dataset = commands::load_dataset(csv.path()).unwrap();
    assert_eq!(dataset.columns, vec!["date", "steps"]);
    assert_eq!(dataset.rows.len(), 1);

    let txt = temp_file(".txt", "First entry.\n\nSecond entry.\n");
    let dataset = commands::load_dataset(txt.path()).unwrap();
    assert_eq!(dataset.columns, vec!["entry"]);
    assert_eq!(dataset.rows.len(), 2);
}

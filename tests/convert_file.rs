//! Integration tests: file conversion, output regeneration and failure modes.

use ember_csv::{ExtractConfig, ExtractError, Extractor, OutputMode};
use std::fs;
use std::path::Path;

const GOOD_RECORDS: &str = concat!(
    r#"{"sha256": "aa", "md5": "abc", "header": {"coff": {"machine": "I386"}}, "section": {"entry": ".text", "sections": [{"name": ".text", "size": 10, "entropy": 1.0, "vsize": 100}, {"name": ".data", "size": 30, "entropy": 3.0, "vsize": 50}]}, "label": 0}"#,
    "\n",
    r#"{"sha256": "bb", "md5": "def", "header": {"coff": {"machine": "AMD64"}}, "section": {"entry": ".text", "sections": [{"name": ".text", "size": 4, "entropy": 6.5, "vsize": 8}]}, "label": 1}"#,
    "\n",
);

fn config(features: &[&str], mode: OutputMode) -> ExtractConfig {
    ExtractConfig {
        features: features.iter().map(|s| s.to_string()).collect(),
        output_mode: mode,
        ..ExtractConfig::default()
    }
}

fn write_input(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("train_features_0.jsonl");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn end_to_end_single_record() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "{\"md5\": \"abc\", \"sections\": [{\"entropy\": 1.0, \"size\": 10, \"vsize\": 100}], \"label\": 0}\n",
    );

    let extractor = Extractor::new(&config(
        &["md5", "sections_mean_entropy", "label"],
        OutputMode::Truncate,
    ));
    let summary = extractor.convert_file(&input, None).unwrap();

    assert_eq!(summary.rows, 1);
    assert_eq!(summary.output, dir.path().join("train_features_0.csv"));
    assert_eq!(
        fs::read_to_string(&summary.output).unwrap(),
        "md5,sections_mean_entropy,label\r\nabc,1.0,0\r\n"
    );
}

#[test]
fn label_is_last_column() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), GOOD_RECORDS);

    let extractor = Extractor::new(&config(
        &["label", "md5", "machine", "sections_min_rawsize", "sections_max_entropy"],
        OutputMode::Truncate,
    ));
    let summary = extractor.convert_file(&input, None).unwrap();

    let output = fs::read_to_string(&summary.output).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            "md5,machine,sections_min_rawsize,sections_max_entropy,label",
            "abc,I386,10,3.0,0",
            "def,AMD64,4,6.5,1",
        ]
    );
}

#[test]
fn regeneration_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), GOOD_RECORDS);
    let extractor = Extractor::new(&config(
        &["md5", "sections_mean_virtualsize"],
        OutputMode::Truncate,
    ));

    let first = extractor.convert_file(&input, None).unwrap();
    let first_bytes = fs::read(&first.output).unwrap();

    let second = extractor.convert_file(&input, None).unwrap();
    let second_bytes = fs::read(&second.output).unwrap();

    assert_eq!(first_bytes, second_bytes);
}

#[test]
fn previous_output_is_replaced_not_appended() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), GOOD_RECORDS);
    let output = dir.path().join("train_features_0.csv");
    fs::write(&output, "stale,data\r\n1,2\r\n3,4\r\n5,6\r\n").unwrap();

    let extractor = Extractor::new(&config(&["md5"], OutputMode::Truncate));
    extractor.convert_file(&input, None).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "md5,label\r\nabc,0\r\ndef,1\r\n"
    );
}

#[test]
fn truncate_mode_leaves_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        &format!("{}{}\n", GOOD_RECORDS, r#"{"md5": "ghi", "sections": [], "label": 1}"#),
    );

    let extractor = Extractor::new(&config(&["md5", "sections_mean_entropy"], OutputMode::Truncate));
    let err = extractor.convert_file(&input, None).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::EmptyAggregation { .. })
    ));
    assert_eq!(
        fs::read_to_string(dir.path().join("train_features_0.csv")).unwrap(),
        "md5,sections_mean_entropy,label\r\nabc,2.0,0\r\ndef,6.5,1\r\n"
    );
}

#[test]
fn atomic_mode_keeps_previous_output_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), &format!("{}{{broken\n", GOOD_RECORDS));
    let output = dir.path().join("train_features_0.csv");
    fs::write(&output, "previous\r\n").unwrap();

    let extractor = Extractor::new(&config(&["md5"], OutputMode::Atomic));
    let err = extractor.convert_file(&input, None).unwrap_err();

    match err.downcast_ref::<ExtractError>() {
        Some(ExtractError::Parse { line, .. }) => assert_eq!(*line, 3),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous\r\n");
    assert!(!dir.path().join("train_features_0.csv.partial").exists());
}

#[test]
fn atomic_mode_replaces_output_on_success() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), GOOD_RECORDS);
    let output = dir.path().join("features.csv");
    fs::write(&output, "previous\r\n").unwrap();

    let extractor = Extractor::new(&config(&["md5"], OutputMode::Atomic));
    let summary = extractor.convert_file(&input, Some(output.as_path())).unwrap();

    assert_eq!(summary.rows, 2);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "md5,label\r\nabc,0\r\ndef,1\r\n"
    );
}

#[test]
fn complex_feature_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), GOOD_RECORDS);

    let extractor = Extractor::new(&config(&["md5", "coff"], OutputMode::Truncate));
    let err = extractor.convert_file(&input, None).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::ComplexValue { feature }) if feature == "coff"
    ));
    assert_eq!(
        fs::read_to_string(dir.path().join("train_features_0.csv")).unwrap(),
        "md5,coff,label\r\n"
    );
}

#[test]
fn missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("absent.jsonl");

    let extractor = Extractor::new(&ExtractConfig::default());
    let err = extractor.convert_file(&input, None).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::InputNotFound { .. })
    ));
    assert!(!dir.path().join("absent.csv").exists());
}

#[test]
fn output_must_differ_from_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("records.csv");
    fs::write(&input, GOOD_RECORDS).unwrap();

    let extractor = Extractor::new(&config(&["md5"], OutputMode::Truncate));
    assert!(extractor.convert_file(&input, None).is_err());
    assert_eq!(fs::read_to_string(&input).unwrap(), GOOD_RECORDS);
}

#[test]
fn output_spelled_differently_still_guards_input() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    let input = write_input(dir.path(), GOOD_RECORDS);
    let output = dir.path().join("sub").join("..").join("train_features_0.jsonl");

    let extractor = Extractor::new(&config(&["md5"], OutputMode::Truncate));
    assert!(extractor.convert_file(&input, Some(output.as_path())).is_err());
    assert_eq!(fs::read_to_string(&input).unwrap(), GOOD_RECORDS);
}

use assert_cmd::cargo::cargo_bin_cmd;
use serde::Deserialize;
use serde_json::Value;
use std::error::Error;
use std::path::PathBuf;

#[derive(Deserialize)]
struct Entry {
    key: String,
    label: String,
    order: u8,
    value: Value,
}

fn run_stats(args: &[&str]) -> Result<Vec<Entry>, Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("somnus");
    cmd.arg("hypno-stats").args(args);
    let output = cmd.assert().success().get_output().stdout.clone();
    Ok(serde_json::from_slice(&output)?)
}

fn value_of<'a>(entries: &'a [Entry], key: &str) -> &'a Value {
    &entries
        .iter()
        .find(|e| e.key == key)
        .unwrap_or_else(|| panic!("missing {key}"))
        .value
}

#[test]
fn stats_are_ordered_and_match_hand_computation() -> Result<(), Box<dyn Error>> {
    let input = sample_path("test_data/hypno_epochs.txt");
    let entries = run_stats(&[
        "--input", &input, "--n", "300", "--sf", "1", "--sfori", "1", "--time-window", "30",
    ])?;

    assert_eq!(entries.len(), 20);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.order as usize, i);
    }
    assert_eq!(entries[0].label, "Filename");
    assert_eq!(entries[0].value, Value::from("hypno_epochs.txt"));
    assert_eq!(value_of(&entries, "sampling_frequency"), &Value::from("1 Hz"));
    assert_eq!(value_of(&entries, "total_dark_time").as_f64(), Some(3.5));
    assert_eq!(value_of(&entries, "wake").as_f64(), Some(2.5));
    assert_eq!(value_of(&entries, "total_sleep_time").as_f64(), Some(2.5));
    assert_eq!(value_of(&entries, "sleep_efficiency").as_f64(), Some(71.43));
    assert_eq!(value_of(&entries, "time_in_bed").as_f64(), Some(5.0));
    Ok(())
}

#[test]
fn config_file_and_csv_column() -> Result<(), Box<dyn Error>> {
    let input = sample_path("test_data/hypno_epochs.csv");
    let config = sample_path("test_data/stats_config.toml");
    let entries = run_stats(&[
        "--input", &input, "--column", "stage", "--config", &config, "--n", "300",
    ])?;
    assert_eq!(value_of(&entries, "latency_rem").as_f64(), Some(3.5));
    assert_eq!(value_of(&entries, "down_sampling"), &Value::from("1 Hz"));
    Ok(())
}

#[test]
fn missing_stage_is_null() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("somnus");
    cmd.args([
        "hypno-stats", "--n", "120", "--sf", "1", "--sfori", "1", "--time-window", "30",
    ])
    .write_stdin("0\n2\n2\n0\n");
    let output = cmd.assert().success().get_output().stdout.clone();
    let entries: Vec<Entry> = serde_json::from_slice(&output)?;
    assert!(value_of(&entries, "latency_n3").is_null());
    assert!(value_of(&entries, "sleep_period_time").is_null());
    assert!(value_of(&entries, "sleep_efficiency").is_null());
    assert_eq!(value_of(&entries, "filename"), &Value::from(""));
    Ok(())
}

#[test]
fn table_output_lists_every_row() {
    let input = sample_path("test_data/hypno_epochs.txt");
    let mut cmd = cargo_bin_cmd!("somnus");
    cmd.args([
        "hypno-stats", "--input", &input, "--n", "300", "--sf", "1", "--sfori", "1", "--format",
        "table",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(output).expect("utf8 output");
    assert_eq!(text.lines().count(), 20);
    assert!(text.lines().next().unwrap().starts_with("Filename"));
    assert!(text.lines().last().unwrap().starts_with("SE (%)"));
}

#[test]
fn empty_input_fails() {
    let mut cmd = cargo_bin_cmd!("somnus");
    cmd.args(["hypno-stats", "--n", "300"]).write_stdin("# nothing\n");
    cmd.assert().failure();
}

fn sample_path(relative: &str) -> String {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join(relative);
    root.to_string_lossy().to_string()
}

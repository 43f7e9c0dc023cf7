//! Integration tests for the tscat commands, driven through the library.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::TempDir;
use tscat::cli::{
    cmd_check, cmd_compile, cmd_export, cmd_list, cmd_lookup, cmd_prune, cmd_stats,
};
use tscat::config::Settings;
use tscat_core::{LoadOptions, catalog_from_str};

const FINNISH: &str = include_str!("../../../crates/tscat-core/tests/fixtures/dustrac-game_fi.ts");

const BROKEN: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="fi_FI">
<context>
    <name>MainMenu</name>
    <message>
        <source>Play</source>
        <translation>Pelaa</translation>
    </message>
    <message>
        <source>Play</source>
        <translation>Pelaa uudestaan</translation>
    </message>
</context>
</TS>
"#;

fn write_catalog(dir: &TempDir, name: &str, text: &str) -> Settings {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    Settings {
        catalog: path,
        options: LoadOptions::default(),
    }
}

fn fixture(dir: &TempDir) -> Settings {
    write_catalog(dir, "dustrac-game_fi.ts", FINNISH)
}

fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

fn json(buf: Vec<u8>) -> serde_json::Value {
    serde_json::from_slice(&buf).unwrap()
}

fn out_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

// =============================================================================
// LOOKUP TESTS
// =============================================================================

#[test]
fn test_lookup_prints_translation() {
    let dir = TempDir::new().unwrap();
    let settings = fixture(&dir);
    let mut buf = Vec::new();

    let code = cmd_lookup(&settings, "QObject", "", "GO!!!", false, &mut buf).unwrap();

    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(output(buf), "AJA!!!\n");
}

#[test]
fn test_lookup_obsolete_falls_back() {
    let dir = TempDir::new().unwrap();
    let settings = fixture(&dir);
    let mut buf = Vec::new();

    cmd_lookup(&settings, "QObject", "", "60 fps", true, &mut buf).unwrap();

    let value = json(buf);
    assert_eq!(value["translation"], "60 fps");
    assert_eq!(value["resolved"], false);
}

#[test]
fn test_lookup_json_reports_resolution() {
    let dir = TempDir::new().unwrap();
    let settings = fixture(&dir);
    let mut buf = Vec::new();

    cmd_lookup(&settings, "MainMenu", "", "Play", true, &mut buf).unwrap();

    let value = json(buf);
    assert_eq!(value["context"], "MainMenu");
    assert_eq!(value["source"], "Play");
    assert_eq!(value["translation"], "Pelaa");
    assert_eq!(value["resolved"], true);
}

#[test]
fn test_lookup_unknown_disambiguation_retries_without_it() {
    let dir = TempDir::new().unwrap();
    let settings = fixture(&dir);
    let mut buf = Vec::new();

    cmd_lookup(&settings, "MainMenu", "button", "Play", true, &mut buf).unwrap();

    let value = json(buf);
    assert_eq!(value["disambiguation"], "button");
    assert_eq!(value["translation"], "Pelaa");
    assert_eq!(value["resolved"], true);
}

#[test]
fn test_lookup_reads_compiled_catalog() {
    let dir = TempDir::new().unwrap();
    let settings = fixture(&dir);
    let compiled = out_path(&dir, "dustrac-game_fi.tsc");
    cmd_compile(&settings, &compiled, &mut Vec::new()).unwrap();

    let compiled_settings = Settings {
        catalog: compiled,
        options: LoadOptions::default(),
    };
    let mut buf = Vec::new();
    cmd_lookup(&compiled_settings, "MainMenu", "", "Play", false, &mut buf).unwrap();

    assert_eq!(output(buf), "Pelaa\n");
}

#[test]
fn test_lookup_missing_catalog_is_error() {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        catalog: out_path(&dir, "missing.ts"),
        options: LoadOptions::default(),
    };

    assert!(cmd_lookup(&settings, "QObject", "", "GO!!!", false, &mut Vec::new()).is_err());
}

// =============================================================================
// LIST TESTS
// =============================================================================

#[test]
fn test_list_hides_retired_by_default() {
    let dir = TempDir::new().unwrap();
    let settings = fixture(&dir);

    let mut active = Vec::new();
    cmd_list(&settings, None, false, true, &mut active).unwrap();
    let mut all = Vec::new();
    cmd_list(&settings, None, true, true, &mut all).unwrap();

    let active = json(active);
    let all = json(all);
    assert_eq!(active.as_array().unwrap().len(), 90);
    assert_eq!(all.as_array().unwrap().len(), 104);
    assert!(
        active
            .as_array()
            .unwrap()
            .iter()
            .all(|entry| entry["status"] != "Obsolete")
    );
}

#[test]
fn test_list_filters_by_context() {
    let dir = TempDir::new().unwrap();
    let settings = fixture(&dir);
    let mut buf = Vec::new();

    cmd_list(&settings, Some("MainMenu"), false, false, &mut buf).unwrap();

    let text = output(buf);
    assert!(text.contains("[MainMenu] \"Play\" -> \"Pelaa\""));
    assert!(!text.contains("[QObject]"));
}

// =============================================================================
// STATS TESTS
// =============================================================================

#[test]
fn test_stats_json() {
    let dir = TempDir::new().unwrap();
    let settings = fixture(&dir);
    let mut buf = Vec::new();

    cmd_stats(&settings, true, &mut buf).unwrap();

    let value = json(buf);
    assert_eq!(value["language"], "fi_FI");
    assert_eq!(value["totals"]["active"], 90);
    assert_eq!(value["totals"]["obsolete"], 14);
    assert_eq!(value["contexts"].as_array().unwrap().len(), 2);
}

#[test]
fn test_stats_text() {
    let dir = TempDir::new().unwrap();
    let settings = fixture(&dir);
    let mut buf = Vec::new();

    cmd_stats(&settings, false, &mut buf).unwrap();

    let text = output(buf);
    assert!(text.contains("Language: fi_FI"));
    assert!(text.contains("Obsolete:     14"));
    assert!(text.contains("MainMenu"));
}

// =============================================================================
// CHECK TESTS
// =============================================================================

#[test]
fn test_check_clean_catalog_succeeds() {
    let dir = TempDir::new().unwrap();
    let settings = fixture(&dir);
    let mut buf = Vec::new();

    let code = cmd_check(&settings, false, &mut buf).unwrap();

    assert_eq!(code, ExitCode::SUCCESS);
    assert!(output(buf).starts_with("OK: 104 messages"));
}

#[test]
fn test_check_reports_duplicates() {
    let dir = TempDir::new().unwrap();
    let settings = write_catalog(&dir, "broken.ts", BROKEN);
    let mut buf = Vec::new();

    let code = cmd_check(&settings, true, &mut buf).unwrap();

    assert_eq!(code, ExitCode::FAILURE);
    let value = json(buf);
    assert_eq!(value["ok"], false);
    assert_eq!(value["diagnostics"].as_array().unwrap().len(), 1);
}

#[test]
fn test_check_rejects_compiled_input() {
    let dir = TempDir::new().unwrap();
    let settings = fixture(&dir);
    let compiled = out_path(&dir, "fi.tsc");
    cmd_compile(&settings, &compiled, &mut Vec::new()).unwrap();

    let compiled_settings = Settings {
        catalog: compiled,
        options: LoadOptions::default(),
    };
    let err = cmd_check(&compiled_settings, false, &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("compiled catalog"));
}

// =============================================================================
// EXPORT / PRUNE TESTS
// =============================================================================

#[test]
fn test_export_ts_is_bit_exact() {
    let dir = TempDir::new().unwrap();
    let settings = fixture(&dir);
    let target = out_path(&dir, "copy.ts");

    cmd_export(&settings, &target, "ts", &mut Vec::new()).unwrap();

    assert_eq!(read(&target), FINNISH);
}

#[test]
fn test_export_json() {
    let dir = TempDir::new().unwrap();
    let settings = fixture(&dir);
    let target = out_path(&dir, "catalog.json");

    cmd_export(&settings, &target, "json", &mut Vec::new()).unwrap();

    let value: serde_json::Value = serde_json::from_str(&read(&target)).unwrap();
    assert_eq!(value["language"], "fi_FI");
    assert_eq!(value["contexts"][0]["name"], "MainMenu");
}

#[test]
fn test_export_unknown_format_is_error() {
    let dir = TempDir::new().unwrap();
    let settings = fixture(&dir);
    let target = out_path(&dir, "catalog.po");

    let err = cmd_export(&settings, &target, "po", &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("Unknown format"));
    assert!(!target.exists());
}

#[test]
fn test_export_into_missing_directory_is_error() {
    let dir = TempDir::new().unwrap();
    let settings = fixture(&dir);
    let target = dir.path().join("nope").join("copy.ts");

    assert!(cmd_export(&settings, &target, "ts", &mut Vec::new()).is_err());
}

#[test]
fn test_prune_drops_retired_entries() {
    let dir = TempDir::new().unwrap();
    let settings = fixture(&dir);
    let target = out_path(&dir, "pruned.ts");
    let mut buf = Vec::new();

    cmd_prune(&settings, &target, &mut buf).unwrap();

    assert!(output(buf).starts_with("Removed 14 retired entries, 90 remain"));
    let pruned = catalog_from_str(&read(&target)).unwrap();
    assert_eq!(pruned.message_count(), 90);
    assert!(pruned.messages().all(|(_, m)| !m.is_retired()));
}

//! End-to-end tests for the odr binary.
//!
//! Every test runs with an empty config home and without `ODR_CONFIG`, so
//! the developer's own configuration never leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    fn usage_csv(&self) -> PathBuf {
        self.write("usage.csv", "User,Size\nalice,10\nbob,2\ncarol,30\n")
    }

    fn odr(&self) -> Command {
        let mut cmd = Command::cargo_bin("odr").expect("odr binary should exist");
        cmd.env_remove("ODR_CONFIG")
            .env_remove("RUST_LOG")
            .env_remove("ODR_LOG")
            .env("XDG_CONFIG_HOME", self.path("config-home"))
            .current_dir(self.dir.path());
        cmd
    }
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout should be JSON")
}

fn column(table: &Value, index: usize) -> Vec<String> {
    table["rows"]
        .as_array()
        .expect("rows")
        .iter()
        .map(|row| {
            row["cells"][index]
                .as_str()
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

fn read_csv_text(path: &Path) -> String {
    let bytes = fs::read(path).expect("export file");
    assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF], "missing byte-order mark");
    String::from_utf8(bytes[3..].to_vec()).expect("utf-8")
}

// ============================================================================
// Version
// ============================================================================

mod version {
    use super::*;

    #[test]
    fn version_json() {
        let ws = Workspace::new();
        let output = ws.odr().arg("version").assert().success().get_output().clone();
        let json = stdout_json(&output.stdout);
        assert_eq!(json["schema_version"], "1.0.0");
        assert!(json["odr_version"].is_string());
    }

    #[test]
    fn version_md() {
        Workspace::new()
            .odr()
            .args(["-f", "md", "version"])
            .assert()
            .success()
            .stdout(predicate::str::contains("odr "));
    }
}

// ============================================================================
// Sort
// ============================================================================

mod sort {
    use super::*;

    #[test]
    fn first_click_sorts_ascending_numerically() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        let output = ws
            .odr()
            .args(["sort", input.to_str().unwrap(), "--column", "1"])
            .assert()
            .success()
            .get_output()
            .clone();

        let json = stdout_json(&output.stdout);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["command"], "sort");
        assert_eq!(json["result"]["sort"]["direction"], "ascending");
        assert_eq!(column(&json["result"]["table"], 1), vec!["2", "10", "30"]);
        assert_eq!(json["result"]["order"], serde_json::json!([1, 0, 2]));
    }

    #[test]
    fn second_click_sorts_descending() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        let output = ws
            .odr()
            .args(["sort", input.to_str().unwrap(), "--column", "1", "--clicks", "2"])
            .assert()
            .success()
            .get_output()
            .clone();

        let json = stdout_json(&output.stdout);
        assert_eq!(json["result"]["sort"]["direction"], "descending");
        assert_eq!(column(&json["result"]["table"], 1), vec!["30", "10", "2"]);
    }

    #[test]
    fn saved_markers_make_the_next_click_toggle() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        let saved = ws.path("sorted.json");
        ws.odr()
            .args(["sort", input.to_str().unwrap(), "--column", "1"])
            .args(["--output", saved.to_str().unwrap()])
            .assert()
            .success();

        let output = ws
            .odr()
            .args(["sort", saved.to_str().unwrap(), "--column", "1"])
            .assert()
            .success()
            .get_output()
            .clone();
        let json = stdout_json(&output.stdout);
        assert_eq!(json["result"]["sort"]["direction"], "descending");
    }

    #[test]
    fn japanese_text_uses_collation() {
        let ws = Workspace::new();
        let input = ws.write(
            "names.json",
            r#"{"headers": ["名前"], "rows": [["あ"], ["ん"], ["い"]]}"#,
        );
        let output = ws
            .odr()
            .args(["sort", input.to_str().unwrap(), "--column", "0"])
            .assert()
            .success()
            .get_output()
            .clone();
        let json = stdout_json(&output.stdout);
        assert_eq!(column(&json["result"]["table"], 0), vec!["あ", "い", "ん"]);
    }

    #[test]
    fn short_rows_are_reported_not_fatal() {
        let ws = Workspace::new();
        let input = ws.write("ragged.csv", "User,Note\nalice,b\nbob\ncarol,a\n");
        let output = ws
            .odr()
            .args(["sort", input.to_str().unwrap(), "--column", "1"])
            .assert()
            .success()
            .get_output()
            .clone();
        let json = stdout_json(&output.stdout);
        assert_eq!(json["result"]["sort"]["short_rows"], 1);
        assert_eq!(
            column(&json["result"]["table"], 0),
            vec!["bob", "carol", "alice"]
        );
    }

    #[test]
    fn descending_flag_conflicts_with_clicks() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        ws.odr()
            .args(["sort", input.to_str().unwrap(), "--column", "1"])
            .args(["--descending", "--clicks", "3"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot be used with"));
    }

    #[test]
    fn markdown_shows_marker() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        ws.odr()
            .args(["-f", "md", "sort", input.to_str().unwrap(), "--column", "1"])
            .args(["--descending"])
            .assert()
            .success()
            .stdout(predicate::str::contains("| User | Size ▼ |"))
            .stdout(predicate::str::contains("| carol | 30 |"));
    }

    #[test]
    fn csv_output_is_an_export() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        let out = ws.path("sorted.csv");
        ws.odr()
            .args(["sort", input.to_str().unwrap(), "--column", "1"])
            .args(["--output", out.to_str().unwrap()])
            .assert()
            .success();
        assert_eq!(
            read_csv_text(&out),
            "\"User\",\"Size\"\n\"bob\",\"2\"\n\"alice\",\"10\"\n\"carol\",\"30\""
        );
    }
}

// ============================================================================
// Export and print
// ============================================================================

mod export_and_print {
    use super::*;

    #[test]
    fn export_writes_dated_file() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        let out = ws.path("out");
        let output = ws
            .odr()
            .args(["export", input.to_str().unwrap(), "--date", "2024-03-05"])
            .args(["--sort-column", "1", "--out-dir", out.to_str().unwrap()])
            .assert()
            .success()
            .get_output()
            .clone();

        let json = stdout_json(&output.stdout);
        assert_eq!(json["result"]["filename"], "onedrive_report_20240305.csv");
        assert_eq!(json["result"]["sorted_column"], 1);

        let text = read_csv_text(&out.join("onedrive_report_20240305.csv"));
        assert!(text.starts_with("\"User\",\"Size\"\n\"bob\",\"2\""));
    }

    #[test]
    fn export_quotes_are_doubled() {
        let ws = Workspace::new();
        let input = ws.write(
            "quotes.json",
            r#"{"headers": ["Name", "Comment"], "rows": [["a", "He said \"hi\", ok"]]}"#,
        );
        ws.odr()
            .args(["export", input.to_str().unwrap(), "--date", "2024-03-05"])
            .assert()
            .success();
        let text = read_csv_text(&ws.path("onedrive_report_20240305.csv"));
        assert!(text.contains(r#""He said ""hi"", ok""#));
    }

    #[test]
    fn config_prefix_names_the_export() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        let config = ws.write("odr.toml", "[table.export]\nprefix = \"usage\"\n");
        ws.odr()
            .args(["--config", config.to_str().unwrap()])
            .args(["export", input.to_str().unwrap(), "--date", "2024-03-05"])
            .assert()
            .success();
        assert!(ws.path("usage_20240305.csv").exists());
    }

    #[test]
    fn print_writes_standalone_view() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        let output = ws
            .odr()
            .args(["print", input.to_str().unwrap(), "--sort-column", "1"])
            .assert()
            .success()
            .get_output()
            .clone();

        let json = stdout_json(&output.stdout);
        assert_eq!(json["result"]["title"], "usage");

        let html = fs::read_to_string(ws.path("print_usage.html")).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("window.print()"));
        assert!(html.contains("sort-asc"));
    }

    #[test]
    fn summary_is_one_line() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        ws.odr()
            .args(["-f", "summary", "export", input.to_str().unwrap()])
            .args(["--date", "2024-03-05"])
            .assert()
            .success()
            .stdout(predicate::str::contains("export: exported 'usage'"));
    }
}

// ============================================================================
// Render
// ============================================================================

mod render {
    use super::*;

    #[test]
    fn render_puts_toolbar_before_table() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        let output = ws
            .odr()
            .args(["-f", "md", "render", input.to_str().unwrap()])
            .assert()
            .success()
            .get_output()
            .clone();

        let html = String::from_utf8(output.stdout).unwrap();
        let toolbar = html.find(r#"class="export-container""#).expect("toolbar");
        let table = html.find("<table").expect("table");
        assert!(toolbar < table);
        assert!(html.contains("CSVエクスポート"));
        assert!(html.contains("印刷"));
    }

    #[test]
    fn render_to_file() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        let out = ws.path("table.html");
        let output = ws
            .odr()
            .args(["render", input.to_str().unwrap(), "--output", out.to_str().unwrap()])
            .assert()
            .success()
            .get_output()
            .clone();

        let json = stdout_json(&output.stdout);
        assert_eq!(json["result"]["binding"]["toolbar"]["buttons"][0]["action"], "export_csv");
        let html = fs::read_to_string(out).unwrap();
        assert!(html.contains("data-table"));
        assert!(html.contains("@page { margin: 2cm; }"));
        assert!(html.contains(".export-container { display: none; }"));
    }
}

// ============================================================================
// Errors and exit codes
// ============================================================================

mod errors {
    use super::*;

    #[test]
    fn column_out_of_range_is_an_args_error() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        ws.odr()
            .args(["sort", input.to_str().unwrap(), "--column", "5"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("ERR_ARGS"))
            .stderr(predicate::str::contains("エラーが発生しました"));
    }

    #[test]
    fn descending_out_of_range_raises_alert() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        ws.odr()
            .args(["sort", input.to_str().unwrap(), "--column", "9", "--descending"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("ERR_ARGS"))
            .stderr(predicate::str::contains("エラーが発生しました"));
    }

    #[test]
    fn missing_input_is_an_input_error() {
        let ws = Workspace::new();
        ws.odr()
            .args(["sort", "missing.csv", "--column", "0"])
            .assert()
            .code(11)
            .stderr(predicate::str::contains("not found"));
    }

    #[test]
    fn unsupported_extension_is_an_input_error() {
        let ws = Workspace::new();
        let input = ws.write("table.txt", "a,b\n");
        ws.odr()
            .args(["-f", "md", "sort", input.to_str().unwrap(), "--column", "0"])
            .assert()
            .code(11)
            .stderr(predicate::str::contains("Invalid Table Input"));
    }

    #[test]
    fn invalid_config_is_a_config_error() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        let config = ws.write("bad.toml", "[table]\nlocale = \"not a locale!\"\n");
        ws.odr()
            .args(["--config", config.to_str().unwrap()])
            .args(["sort", input.to_str().unwrap(), "--column", "0"])
            .assert()
            .code(12);
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        ws.odr()
            .args(["--config", "nope.toml"])
            .args(["sort", input.to_str().unwrap(), "--column", "0"])
            .assert()
            .code(12)
            .stderr(predicate::str::contains("ERR_CONFIG"));
    }

    #[test]
    fn unknown_command_fails() {
        Workspace::new()
            .odr()
            .arg("nonexistent-command")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn zero_clicks_rejected() {
        let ws = Workspace::new();
        let input = ws.usage_csv();
        ws.odr()
            .args(["sort", input.to_str().unwrap(), "--column", "0", "--clicks", "0"])
            .assert()
            .failure();
    }
}

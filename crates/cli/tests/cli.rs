//! CLI integration tests
//!
//! Runs the built `deckhand` binary against throwaway project trees and
//! checks exit codes and produced files.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn deckhand(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_deckhand"))
        .args(["--config", root.join("deckhand.toml").to_str().unwrap()])
        .args(args)
        .env_remove("DECKHAND_CONFIG")
        .env("RUST_LOG", "warn")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run deckhand")
}

fn project(config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("deckhand.toml"), config).unwrap();
    dir
}

#[test]
fn test_missing_subcommand_is_a_usage_error() {
    let dir = project("");
    let output = deckhand(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_invalid_config_is_a_usage_error() {
    let dir = project("[test]\nconcurrency = 0\n");
    let output = deckhand(dir.path(), &["zip"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("concurrency"));
}

#[test]
fn test_zip_packages_the_tree() {
    let dir = project("[package]\nfiles = [\"index.html\", \"css/**\"]\noutput = \"dist/deck.zip\"\n");
    fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
    fs::create_dir_all(dir.path().join("css")).unwrap();
    fs::write(dir.path().join("css/reveal.css"), "body {}").unwrap();

    let output = deckhand(dir.path(), &["zip"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(dir.path().join("dist/deck.zip").is_file());
}

#[cfg(unix)]
#[test]
fn test_failing_lint_exits_one() {
    let dir = project("[lint]\nfiles = [\"js/reveal.js\"]\ncommand = [\"false\"]\n");
    let output = deckhand(dir.path(), &["lint"]);
    assert_eq!(output.status.code(), Some(1));
}

#[cfg(unix)]
#[test]
fn test_composite_stops_at_first_failure() {
    let dir = project("[lint]\ncommand = [\"false\"]\n");
    let output = deckhand(dir.path(), &["package"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Starting 'lint'"));
    assert!(!stdout.contains("Starting 'build'"));
}

//! Integration tests for top-level CLI behavior.

use std::path::Path;
use std::process::Command;

use serde_json::json;

use repocontext::cassette::recorder::CassetteRecorder;

/// Runs the binary from `cwd` with a scrubbed repocontext environment.
fn run_repocontext(cwd: &Path, args: &[&str], envs: &[(&str, &str)]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_repocontext");
    let mut cmd = Command::new(bin);
    cmd.current_dir(cwd).args(args);
    for var in [
        "ANTHROPIC_API_KEY",
        "REPOCONTEXT_MAX_SIZE",
        "REPOCONTEXT_MODEL",
        "REPOCONTEXT_HOME",
        "REPOCONTEXT_RECORD",
        "REPOCONTEXT_REPLAY",
    ] {
        cmd.env_remove(var);
    }
    cmd.envs(envs.iter().copied());
    cmd.output().expect("failed to run repocontext binary")
}

#[test]
fn missing_repository_shows_usage() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_repocontext(dir.path(), &[], &[]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("Usage"));
    assert!(stderr.contains("user/repo[@tag]"));
}

#[test]
fn help_lists_options() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_repocontext(dir.path(), &["--help"], &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("--verbose"));
    assert!(stdout.contains("--section"));
}

#[test]
fn missing_api_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().to_string_lossy().into_owned();
    let output = run_repocontext(dir.path(), &["octo/widget"], &[("REPOCONTEXT_HOME", home.as_str())]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("ANTHROPIC_API_KEY"));
}

#[test]
fn malformed_repository_fails() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().to_string_lossy().into_owned();
    let envs = [("ANTHROPIC_API_KEY", "sk-test"), ("REPOCONTEXT_HOME", home.as_str())];
    for bad in ["octo", "a/b/c", "/widget", "octo/widget@", "../etc", "octo/widget@../../outside"] {
        let output = run_repocontext(dir.path(), &[bad], &envs);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(!output.status.success(), "{bad} accepted");
        assert!(stderr.contains("invalid repository path"), "{bad}: {stderr}");
    }
}

#[test]
fn unknown_section_fails_before_any_work() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().to_string_lossy().into_owned();
    let envs = [("ANTHROPIC_API_KEY", "sk-test"), ("REPOCONTEXT_HOME", home.as_str())];
    let output = run_repocontext(dir.path(), &["--section", "faq", "octo/widget"], &envs);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("unknown section: faq"));
    assert!(!dir.path().join("octo").exists());
}

/// Writes a working copy and a cassette answering one cold run.
fn replay_fixture(home: &Path) -> std::path::PathBuf {
    let src = home.join("octo/widget/latest/src");
    std::fs::create_dir_all(src.join("src")).unwrap();
    std::fs::write(src.join("README.md"), "# Widget\nA tiny widget.\n").unwrap();
    std::fs::write(src.join("src/lib.rs"), "pub fn widget() -> u32 { 42 }\n").unwrap();
    std::fs::write(src.join("icon.png"), b"\x89PNG\r\n\x1a\n\x00\x00").unwrap();

    let cassette = home.join("cassettes/widget.cassette.yaml");
    let mut recorder = CassetteRecorder::new(&cassette, "octo/widget", "c0ffee");
    recorder.record("git", "fetch", json!({"repo": "octo/widget"}), json!({"ok": null}));
    recorder.record("git", "current_commit", json!({}), json!({"ok": "c0ffee"}));
    recorder.record("clock", "now", json!({}), json!("2024-06-15T10:30:00Z"));
    for text in ["## Overview\nWidgets.", "## Getting Started\nAdd it.", "## Usage\nCall widget()."] {
        recorder.record("llm", "complete", json!({}), json!({"ok": {"text": text}}));
    }
    recorder.record(
        "llm",
        "complete",
        json!({}),
        json!({"ok": {"text": "# Widget\nWidgets. Add it. Call widget()."}}),
    );
    recorder.finish().unwrap();
    cassette
}

#[test]
fn replayed_run_writes_all_docs_and_prints_merged_document() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().to_string_lossy().into_owned();
    let cassette = replay_fixture(dir.path());
    let cassette = cassette.to_string_lossy().into_owned();

    let envs = [
        ("ANTHROPIC_API_KEY", "sk-test"),
        ("REPOCONTEXT_HOME", home.as_str()),
        ("REPOCONTEXT_MODEL", "claude-test"),
        ("REPOCONTEXT_REPLAY", cassette.as_str()),
    ];
    let output = run_repocontext(dir.path(), &["octo/widget"], &envs);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");

    let docs = dir.path().join("octo/widget/latest/docs");
    for name in ["01_overview.md", "02_getting_started.md", "03_usage.md", "full.md", "metadata.json"] {
        assert!(docs.join(name).exists(), "{name} missing");
    }
    assert_eq!(std::fs::read_to_string(docs.join("03_usage.md")).unwrap(), "## Usage\nCall widget().");

    let meta: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(docs.join("metadata.json")).unwrap()).unwrap();
    assert_eq!(meta["commit_hash"], "c0ffee");
    assert_eq!(meta["model_used"], "claude-test");
    assert_eq!(meta["deduplicated"], true);

    // Streamed sections come first, then the banner and merged document.
    let banner = stdout.find("=== Generated Documentation ===").expect("banner missing");
    assert!(stdout[..banner].contains("## Getting Started"));
    assert!(stdout[banner..].contains("Version: latest"));
    assert!(stdout[banner..].contains("Model: claude-test"));
    assert!(stdout[banner..].contains("# Widget\nWidgets. Add it. Call widget()."));
}

#[test]
fn second_replayed_run_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().to_string_lossy().into_owned();
    let cassette = replay_fixture(dir.path()).to_string_lossy().into_owned();
    let envs = [
        ("ANTHROPIC_API_KEY", "sk-test"),
        ("REPOCONTEXT_HOME", home.as_str()),
        ("REPOCONTEXT_REPLAY", cassette.as_str()),
    ];
    assert!(run_repocontext(dir.path(), &["octo/widget"], &envs).status.success());

    // Only git answers are needed once metadata.json is in place.
    let cached = dir.path().join("cassettes/cached.cassette.yaml");
    let mut recorder = CassetteRecorder::new(&cached, "octo/widget", "c0ffee");
    recorder.record("git", "fetch", json!({}), json!({"ok": null}));
    recorder.record("git", "current_commit", json!({}), json!({"ok": "c0ffee"}));
    recorder.finish().unwrap();
    let cached = cached.to_string_lossy().into_owned();

    let envs = [
        ("ANTHROPIC_API_KEY", "sk-test"),
        ("REPOCONTEXT_HOME", home.as_str()),
        ("REPOCONTEXT_REPLAY", cached.as_str()),
    ];
    let output = run_repocontext(dir.path(), &["--section", "usage", "octo/widget"], &envs);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("## Usage\nCall widget()."));
    assert!(!stdout.contains("## Overview"));
}

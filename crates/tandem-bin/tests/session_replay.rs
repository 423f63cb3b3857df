//! Drives the `tandem` binary end to end inside a scratch directory.

use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::tempdir;

fn tandem_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tandem"))
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(tandem_bin())
        .current_dir(dir)
        .env("RUST_LOG", "info")
        .args(["--config", "no-such-config.toml"])
        .args(args)
        .output()
        .expect("spawn tandem")
}

fn stdout(out: &Output) -> String {
    assert!(
        out.status.success(),
        "tandem failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout.clone()).expect("utf-8 stdout")
}

#[test]
fn two_views_edit_and_undo_across_views() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "first\nsecond").unwrap();
    fs::write(
        dir.path().join("session.tandem"),
        "\
# view 0 edits the first row, view 1 the second
0 click 5
0 type !!
1 click 14
1 type ?
0 undo
",
    )
    .unwrap();
    let out = run(
        dir.path(),
        &["notes.txt", "--views", "2", "--script", "session.tandem"],
    );
    assert_eq!(stdout(&out), "first!!\nsecond");
}

#[test]
fn crlf_input_is_saved_with_lf() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("dos.txt"), "a\r\nb\r\n").unwrap();
    fs::write(dir.path().join("s"), "0 click 1\n0 type x\n").unwrap();
    let out = run(dir.path(), &["dos.txt", "--script", "s"]);
    assert_eq!(stdout(&out), "ax\nb\n");
}

#[test]
fn write_flag_saves_back_to_path() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("f.txt"), "hello").unwrap();
    fs::write(dir.path().join("s"), "0 select 1 4\n0 backspace\n").unwrap();
    let out = run(dir.path(), &["f.txt", "--script", "s", "--write"]);
    assert_eq!(stdout(&out), "");
    assert_eq!(fs::read_to_string(dir.path().join("f.txt")).unwrap(), "ho");
}

#[test]
fn output_flag_writes_elsewhere() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("s"), "0 type abc\nattach\n1 undo\n1 redo\n").unwrap();
    let out = run(dir.path(), &["--script", "s", "--output", "out.txt"]);
    assert!(out.status.success());
    assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "abc");
}

#[test]
fn missing_file_starts_empty() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("s"), "0 type new\\nfile\n").unwrap();
    let out = run(dir.path(), &["absent.txt", "--script", "s"]);
    assert_eq!(stdout(&out), "new\nfile");
    let log = fs::read_to_string(dir.path().join("tandem.log")).unwrap_or_default();
    assert!(log.contains("file_not_found_new_document"), "{log}");
}

#[test]
fn write_creates_missing_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("s"), "0 type fresh\n").unwrap();
    let out = run(dir.path(), &["new.txt", "--script", "s", "--write"]);
    assert!(out.status.success());
    assert_eq!(fs::read_to_string(dir.path().join("new.txt")).unwrap(), "fresh");
}

#[test]
fn unreadable_file_is_never_overwritten() {
    let dir = tempdir().unwrap();
    let mut original = vec![0xffu8, 0xfe];
    original.extend_from_slice(b"keep");
    fs::write(dir.path().join("bin.dat"), &original).unwrap();
    fs::write(dir.path().join("s"), "0 type x\n").unwrap();
    let out = run(dir.path(), &["bin.dat", "--script", "s", "--write"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("reading bin.dat"));
    assert_eq!(fs::read(dir.path().join("bin.dat")).unwrap(), original);
}

#[test]
fn history_config_disables_grouping() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("cfg.toml"), "[history]\ngroup_edits = false\n").unwrap();
    fs::write(dir.path().join("s"), "0 type a\n0 type b\n0 undo\n").unwrap();
    let out = Command::new(tandem_bin())
        .current_dir(dir.path())
        .args(["--config", "cfg.toml", "--script", "s"])
        .output()
        .unwrap();
    assert_eq!(stdout(&out), "a");
}

#[test]
fn script_errors_name_the_line() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("s"), "0 type ok\n0 delete 1 99\n").unwrap();
    let out = run(dir.path(), &["--script", "s"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("script line 2"), "{stderr}");
}

#[test]
fn unknown_view_index_is_rejected() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("s"), "3 undo\n").unwrap();
    let out = run(dir.path(), &["--script", "s"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("no view with index 3"));
}

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end tests of the `pathy` binary.
//!
//! Each test works on its own variable name (`-V`) so `PATH` stays intact
//! for finding `sh`.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const PATHY: &str = env!("CARGO_BIN_EXE_pathy");

struct Env {
    root: TempDir,
}

impl Env {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        for (dir, files) in [("one", &["tool", "shared"][..]), ("two", &["shared", "other"][..])] {
            let dir = root.path().join(dir);
            fs::create_dir(&dir).unwrap();
            for file in files {
                fs::write(dir.join(file), "").unwrap();
            }
        }
        Self { root }
    }

    fn dir(&self, name: &str) -> String {
        self.root.path().join(name).to_str().unwrap().to_string()
    }

    fn value(&self) -> String {
        format!("{}:{}/:{}", self.dir("one"), self.dir("two"), self.dir("one"))
    }

    fn pathy(&self, args: &[&str]) -> Output {
        Command::new(PATHY)
            .args(["-V", "PATHY_TEST_PATH"])
            .args(args)
            .env("PATHY_TEST_PATH", self.value())
            .env("PATHY_CONFIG", self.root.path().join("no-config.yaml"))
            .env_remove("PATHY_LOG")
            .output()
            .unwrap()
    }

    /// Run pathy through `sh` so descriptor 3 can be set up with
    /// redirections.
    fn pathy_sh(&self, args: &str, redirections: &str) -> Output {
        Command::new("/bin/sh")
            .arg("-c")
            .arg(format!(
                "'{}' -V PATHY_TEST_PATH {} {}",
                PATHY, args, redirections
            ))
            .env("PATHY_TEST_PATH", self.value())
            .env("PATHY_CONFIG", self.root.path().join("no-config.yaml"))
            .env_remove("EDITOR")
            .output()
            .unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn test_export_prints_clean_list() {
    let env = Env::new();
    let output = env.pathy(&["export"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        format!("export PATHY_TEST_PATH={}:{}\n", env.dir("one"), env.dir("two"))
    );
}

#[test]
fn test_ls_prints_raw_entries() {
    let env = Env::new();
    let output = env.pathy(&["ls"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        format!("{}\n{}/\n{}\n", env.dir("one"), env.dir("two"), env.dir("one"))
    );
}

#[test]
fn test_shadow_and_ls_names() {
    let env = Env::new();

    let output = env.pathy(&["shadow"]);
    assert_eq!(
        stdout(&output),
        format!("shared\n* {}\n* {}\n", env.dir("one"), env.dir("two"))
    );

    let output = env.pathy(&["ls-names", "O"]);
    assert_eq!(stdout(&output), "other\ntool\n");
}

#[test]
fn test_which_missing_name_fails() {
    let env = Env::new();
    let output = env.pathy(&["which", "other", "absent"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), format!("{}/other\n", env.dir("two")));
    assert_eq!(
        stderr(&output),
        "pathy: error: not found in PATHY_TEST_PATH: absent\n"
    );
}

#[test]
fn test_doctor_reports_duplicate() {
    let env = Env::new();
    let output = env.pathy(&["doctor"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("* [style] Duplicate entry.\n"), "{}", text);
}

#[test]
fn test_put_first_writes_to_fd3() {
    let env = Env::new();
    let output = env.pathy_sh("put-first /opt/bin", "3>&1 >/dev/null");
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        format!(
            "export PATHY_TEST_PATH=/opt/bin:{}:{}\n",
            env.dir("one"),
            env.dir("two")
        )
    );
}

#[test]
fn test_put_last_requires_fd3_pipe() {
    let env = Env::new();
    let output = env.pathy_sh("put-last /opt/bin", "3</dev/null");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "pathy: error: fd 3 is not a pipe\n");
}

#[test]
fn test_rm_sends_remaining_entries() {
    let env = Env::new();
    let output = env.pathy_sh("rm two", "3>&1 >/dev/null <<'EOF'\ny\nEOF\n");
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), format!("export PATHY_TEST_PATH={}\n", env.dir("one")));
}

#[test]
fn test_rm_requires_fd3_pipe() {
    let env = Env::new();
    let output = env.pathy_sh("rm", "3</dev/null </dev/null");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "pathy: error: fd 3 is not a pipe\n");
}

#[test]
fn test_edit_sends_edited_list() {
    let env = Env::new();
    let output = env.pathy_sh(
        r#"edit sh -c 'printf "/opt/bin\n/opt/bin/\n" >> "$1"' sh"#,
        "3>&1 >/dev/null",
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        format!(
            "export PATHY_TEST_PATH={}:{}:/opt/bin\n",
            env.dir("one"),
            env.dir("two")
        )
    );
}

#[test]
fn test_edit_without_editor_fails() {
    let env = Env::new();
    let output = env.pathy_sh("edit", "3>&1 >/dev/null");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "pathy: error: no editor given and EDITOR is not set\n");
}

#[test]
fn test_complete_prints_bash_script() {
    let env = Env::new();
    let output = env.pathy(&["complete"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("_pathy()"));

    let output = env.pathy(&["complete", "fish"]);
    assert!(stdout(&output).contains("complete -c pathy"));
}

#[test]
fn test_run_files_feeds_paths() {
    let env = Env::new();
    let received = env.root.path().join("received");
    let script = format!("cat > '{}'", received.display());

    let output = env.pathy(&["run-files", "sh", "-c", &script]);
    assert!(output.status.success(), "{}", stderr(&output));

    let expected: Vec<String> = [("one", "shared"), ("one", "tool"), ("two", "other"), ("two", "shared")]
        .iter()
        .map(|(dir, file)| Path::new(&env.dir(dir)).join(file).display().to_string())
        .collect();
    let text = fs::read_to_string(&received).unwrap();
    assert_eq!(text.lines().collect::<Vec<_>>(), expected);
}

#[test]
fn test_run_files_reports_child_failure() {
    let env = Env::new();
    let output = env.pathy(&["run-files", "sh", "-c", "cat > /dev/null; exit 4"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "pathy: error: sh: exit status 4\n");
}

#[test]
fn test_unknown_command_fails() {
    let env = Env::new();
    let output = env.pathy(&["frobnicate"]);
    assert!(!output.status.success());
}

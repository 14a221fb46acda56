use std::fs;
use std::path::Path;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mish(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mish").unwrap();
    cmd.env("HOME", home).env_remove("MISH_CONFIG").env_remove("MISH_LOG");
    cmd
}

fn script(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("script.mish");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn script_pipeline_writes_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let path = script(&dir, "# greet\necho \"hello world\" | tr a-z A-Z\n");
    mish(dir.path())
        .arg(&path)
        .assert()
        .success()
        .stdout("HELLO WORLD\n");
}

#[test]
fn script_redirects_into_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.txt");
    let path = script(&dir, &format!("echo one > {0}\necho two >> {0}\n", out.display()));
    mish(dir.path()).arg(&path).assert().success();
    assert_eq!(fs::read_to_string(&out).unwrap(), "one\ntwo\n");
}

#[test]
fn background_job_is_announced() {
    let dir = tempfile::tempdir().unwrap();
    let path = script(&dir, "sleep 0 &\n");
    mish(dir.path())
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\[\d+\] sleep &\n$").unwrap());
}

#[test]
fn cd_changes_directory_for_later_commands() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().canonicalize().unwrap();
    let path = script(&dir, &format!("cd {}\npwd\n", target.display()));
    mish(dir.path())
        .arg(&path)
        .assert()
        .success()
        .stdout(format!("{}\n", target.display()));
}

#[test]
fn assignment_reaches_children_until_unset() {
    let dir = tempfile::tempdir().unwrap();
    let path = script(&dir, "MISH_VALUE=hello\nprintenv MISH_VALUE\nMISH_VALUE=\nprintenv MISH_VALUE\n");
    mish(dir.path())
        .arg(&path)
        .assert()
        .success()
        .stdout("hello\n")
        .stderr(predicate::str::contains("Command exited with status: 1"));
}

#[test]
fn bad_lines_are_numbered_and_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = script(&dir, "echo \"open\n| wc\necho after\n");
    mish(dir.path())
        .arg(&path)
        .assert()
        .success()
        .stdout("after\n")
        .stderr(predicate::str::contains("Error: Line 1: Unterminated quote"))
        .stderr(predicate::str::contains("Error: Line 2: "));
}

#[test]
fn missing_script_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    mish(dir.path())
        .arg(dir.path().join("missing.mish"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cannot open file"));
}

#[test]
fn two_scripts_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    mish(dir.path()).args(["a.mish", "b.mish"]).assert().code(1);
}

#[test]
fn bad_config_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let rc = dir.path().join("rc");
    fs::write(&rc, "colour=red\n").unwrap();
    mish(dir.path())
        .env("MISH_CONFIG", &rc)
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown key: colour"));
}

#[test]
fn interactive_reads_stdin_until_exit() {
    let dir = tempfile::tempdir().unwrap();
    mish(dir.path())
        .write_stdin("echo first\n\nnosuch-program-xyz\nexit\necho never\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("mish> first\n"))
        .stdout(predicate::str::contains("never").not())
        .stdout(predicate::str::contains("WELCOME").not())
        .stderr(predicate::str::contains("Error: Command not found: nosuch-program-xyz"));
}

#[test]
fn interactive_end_of_input_exits_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    mish(dir.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout("mish> \n");
}

#[test]
fn rc_file_sets_prompt_and_environment() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".mishrc"), "prompt=test\nenv.MISH_SEEDED=yes\n").unwrap();
    mish(dir.path())
        .write_stdin("printenv MISH_SEEDED\n")
        .assert()
        .success()
        .stdout("test> yes\ntest> \n");
}

#[test]
fn interactive_invalid_utf8_line_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    mish(dir.path())
        .write_stdin(&b"echo \xff\necho after\n"[..])
        .assert()
        .success()
        .stdout(predicate::str::contains("after\n"))
        .stderr(predicate::str::contains("Error: Input line is not valid UTF-8"));
}

#[test]
fn script_invalid_utf8_line_is_reported_by_number() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("script.mish");
    fs::write(&path, b"echo before\necho \xff\necho after\n").unwrap();
    mish(dir.path())
        .arg(&path)
        .assert()
        .success()
        .stdout("before\nafter\n")
        .stderr(predicate::str::contains("Error: Line 2: Input line is not valid UTF-8"));
}

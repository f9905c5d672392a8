use std::path::Path;

use assert_cmd::Command;
use tempfile::tempdir;

// keep the user's real config and logs out of the run
fn formcoach(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("formcoach").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_DATA_HOME", home.join(".local/share"));
    cmd
}

#[test]
fn unknown_exercise_fails_with_not_found() {
    let home = tempdir().unwrap();
    let output = formcoach(home.path())
        .args(["unknown-move", "--server", "127.0.0.1:9"])
        .assert()
        .failure()
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Exercise not found: unknown-move"),
        "stderr was: {stderr}"
    );
}

#[test]
fn list_prints_every_exercise() {
    let home = tempdir().unwrap();
    let output = formcoach(home.path())
        .arg("--list")
        .assert()
        .success()
        .get_output()
        .clone();
    let stdout = String::from_utf8_lossy(&output.stdout);
    for key in [
        "left-bicep",
        "right-bicep",
        "pushup",
        "squat",
        "sun-salutation",
        "mountain-climbers",
        "jump-rope",
        "yoga-blocks",
    ] {
        assert!(stdout.contains(key), "missing {key} in: {stdout}");
    }
    assert!(stdout.contains("Mountain Climbers"));
}

#[test]
fn missing_exercise_is_a_usage_error() {
    let home = tempdir().unwrap();
    let output = formcoach(home.path()).assert().failure().get_output().clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("an exercise is required"), "stderr was: {stderr}");
}

#[test]
fn zero_second_sets_are_rejected() {
    let home = tempdir().unwrap();
    formcoach(home.path())
        .args(["squat", "--active-secs", "0"])
        .assert()
        .failure();
}

#[test]
fn unreadable_config_is_reported_in_the_log() {
    let home = tempdir().unwrap();
    let config_dir = home.path().join(".config").join("formcoach");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.json"), b"{not json").unwrap();
    let log = home.path().join("formcoach.log");

    formcoach(home.path())
        .args(["unknown-move", "--log-file"])
        .arg(&log)
        .assert()
        .failure();

    let logged = std::fs::read_to_string(&log).unwrap();
    assert!(logged.contains("ignoring unreadable config"), "log was: {logged}");
}

use std::{fs, process::Command};

#[test]
fn builtin_scenario_runs_to_completion() {
    let output = Command::new(env!("CARGO_BIN_EXE_grid-siege"))
        .args(["--log", "warn"])
        .output()
        .expect("failed to launch grid-siege binary");

    assert!(output.status.success(), "grid-siege should exit cleanly");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("spawned=13"), "unexpected summary: {stdout}");
}

#[test]
fn scenario_file_is_loaded_from_disk() {
    let dir = std::env::temp_dir().join(format!("grid-siege-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("corridor.toml");
    fs::write(
        &path,
        r#"
spawn = [0, 0]
goal = [0, 3]
map = [[0, 0, 0, 0]]

[[waves]]
kind = "FastScout"
count = 2
interval = 0.5
"#,
    )
    .expect("write scenario");

    let output = Command::new(env!("CARGO_BIN_EXE_grid-siege"))
        .arg("--scenario")
        .arg(&path)
        .args(["--log", "off"])
        .output()
        .expect("failed to launch grid-siege binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("leaks=2"), "unexpected summary: {stdout}");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn malformed_scenario_fails_with_context() {
    let output = Command::new(env!("CARGO_BIN_EXE_grid-siege"))
        .args(["--scenario", "does/not/exist.toml", "--log", "off"])
        .output()
        .expect("failed to launch grid-siege binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read scenario"), "{stderr}");
}

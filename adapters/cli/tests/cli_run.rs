use std::{io::Write as _, process::Command};

#[test]
fn generated_field_run_prints_summary_and_grid() {
    let output = Command::new(env!("CARGO_BIN_EXE_moldfarm"))
        .args([
            "--width",
            "8",
            "--height",
            "8",
            "--ticks",
            "120",
            "--seed",
            "7",
            "--walk",
            "5,4;5,5",
            "--print-grid",
        ])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch moldfarm binary");

    assert!(output.status.success(), "moldfarm run failed: {output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("Welcome to Moldfarm."));
    let summary = lines.next().expect("summary line");
    assert!(summary.starts_with("ticks=120 "), "{summary}");
    let grid: Vec<&str> = lines.collect();
    assert_eq!(grid.len(), 8);
    assert!(grid.iter().all(|row| row.chars().count() == 8));
    assert_eq!(grid[0], "########");
    assert_eq!(grid.iter().filter(|row| row.contains('@')).count(), 1);
}

#[test]
fn turn_mode_config_file_is_honoured() {
    let mut config = tempfile::NamedTempFile::new().expect("temp config");
    writeln!(config, "[scheduler]\nmode = \"turn\"\nturn_length_ms = 500").expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_moldfarm"))
        .args(["--ticks", "10", "--config"])
        .arg(config.path())
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch moldfarm binary");

    assert!(output.status.success(), "moldfarm run failed: {output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.contains("ticks=10 time=5.00s"), "{stdout}");
}

#[test]
fn malformed_walk_script_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_moldfarm"))
        .args(["--ticks", "1", "--walk", "nowhere"])
        .env("RUST_LOG", "error")
        .output()
        .expect("failed to launch moldfarm binary");

    assert!(!output.status.success());
}

#[test]
fn logs_stay_off_stdout() {
    let output = Command::new(env!("CARGO_BIN_EXE_moldfarm"))
        .args(["--width", "6", "--height", "6", "--ticks", "5"])
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to launch moldfarm binary");

    assert!(output.status.success(), "moldfarm run failed: {output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "{stdout}");
    assert_eq!(lines[0], "Welcome to Moldfarm.");
    assert!(lines[1].starts_with("ticks=5 "), "{stdout}");
    let stderr = String::from_utf8(output.stderr).expect("utf-8 logs");
    assert!(stderr.contains("run finished"), "{stderr}");
}

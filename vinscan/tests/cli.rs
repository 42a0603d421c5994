use std::path::Path;

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use predicates::str::contains;
use tempfile::TempDir;

const VIN: &str = "1HGCM82633A004352";

fn vinscan(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("vinscan");
    cmd.current_dir(dir)
        .env_remove("VINSCAN_CONFIG_PATH")
        .env_remove("API_URL")
        .env_remove("API_KEY")
        .env("RUST_LOG", "warn")
        .args(["--no-env-file", "--no-color", "--store"])
        .arg(dir.join("vins.json"));
    cmd
}

#[test]
fn help_lists_subcommands() {
    let mut cmd = cargo_bin_cmd!("vinscan");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(contains("scan"))
        .stdout(contains("check"))
        .stdout(contains("enroll"));

    let mut cmd = cargo_bin_cmd!("vinscan");
    cmd.args(["scan", "--help"])
        .assert()
        .success()
        .stdout(contains("--cooldown-ms"))
        .stdout(contains("--frame-dir"));
}

#[test]
fn enrolled_vin_checks_out() {
    let dir = TempDir::new().unwrap();

    vinscan(dir.path())
        .args(["enroll", VIN, "--description", "Silver Accord"])
        .assert()
        .success()
        .stdout(contains(format!("Enrolled {VIN}")));

    vinscan(dir.path())
        .args(["check", "1hgcm82633a004352"])
        .assert()
        .success()
        .stdout(contains("Found match: Silver Accord"));

    vinscan(dir.path())
        .args(["enroll", VIN, "-d", "Silver Accord EX"])
        .assert()
        .success()
        .stdout(contains(format!("Updated {VIN}")));
}

#[test]
fn unknown_and_malformed_vins_fail() {
    let dir = TempDir::new().unwrap();

    vinscan(dir.path())
        .args(["check", "JH4KA8260MC000000"])
        .assert()
        .code(1)
        .stdout(contains("VIN NOT FOUND IN DATABASE"));

    vinscan(dir.path())
        .args(["check", "BAD"])
        .assert()
        .code(1)
        .stdout(contains("invalid VIN format"));

    vinscan(dir.path())
        .args(["enroll", "NOT-A-VIN-AT-ALL!"])
        .assert()
        .code(1);
}

#[test]
fn scan_reads_codes_from_stdin_until_eof() {
    let dir = TempDir::new().unwrap();

    vinscan(dir.path())
        .args(["enroll", VIN, "-d", "Silver Accord"])
        .assert()
        .success();

    // End of input means the scanner went away.
    vinscan(dir.path())
        .args(["scan", "--display-delay-ms", "0"])
        .write_stdin(format!("{VIN}\nBAD\nJH4KA8260MC000000\n"))
        .assert()
        .code(2)
        .stdout(contains("Ready to scan VIN QR Code..."))
        .stdout(contains("Found match: Silver Accord"))
        .stdout(contains("Rejected scan \"BAD\""))
        .stdout(contains("VIN NOT FOUND IN DATABASE"))
        .stdout(contains("Scanner stopped"));
}

#[test]
fn missing_frame_directory_is_reported() {
    let dir = TempDir::new().unwrap();

    vinscan(dir.path())
        .args(["scan", "--frame-dir"])
        .arg(dir.path().join("no-such-dir"))
        .assert()
        .code(2)
        .stderr(contains("cannot open frame directory"));
}

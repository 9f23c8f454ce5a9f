use assert_cmd::Command;
use tempfile::TempDir;

fn run_help(home: &TempDir, args: &[&str]) {
    let mut cmd = Command::cargo_bin("proxyctl").expect("proxyctl binary");
    cmd.env("HOME", home.path())
        .args(args)
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn every_cli_command_has_help_path() {
    let home = TempDir::new().expect("temp home");

    // top-level
    run_help(&home, &[]);

    run_help(&home, &["upgrade"]);

    run_help(&home, &["auth"]);
    run_help(&home, &["auth", "login"]);
    run_help(&home, &["auth", "adc"]);
    run_help(&home, &["auth", "set-service-account"]);

    run_help(&home, &["policy"]);
    run_help(&home, &["policy", "show"]);
}

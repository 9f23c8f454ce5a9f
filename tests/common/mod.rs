#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Isolated environment for one CLI test: its own HOME, its own policy file
/// location, and a version/feed pinned through env vars.
pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");
        Self { _tmp: tmp, home }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("proxyctl").expect("proxyctl binary");
        cmd.env("HOME", &self.home)
            // Point at an (absent) policy inside the sandbox so the host's
            // system policy can never leak into a test.
            .env("PROXYCTL_POLICY_PATH", self.policy_path())
            // An unroutable feed: tests that need the network mount wiremock
            // and override this.
            .env("PROXYCTL_FEED_URL", "http://127.0.0.1:1");
        cmd
    }

    pub fn policy_path(&self) -> PathBuf {
        self.home.join("policy.json")
    }

    pub fn write_policy(&self, body: &str) {
        fs::write(self.policy_path(), body).expect("write policy fixture");
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join(".config").join("proxyctl").join("config.json")
    }

    pub fn read_config_doc(&self) -> Value {
        let raw = fs::read_to_string(self.config_path()).expect("config file present");
        serde_json::from_str(&raw).expect("valid config json")
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    /// Runs a command expected to fail; returns the `{"error": ...}` payload.
    pub fn run_json_err(&self, args: &[&str]) -> String {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .failure()
            .get_output()
            .stdout
            .clone();
        let doc: Value = serde_json::from_slice(&out).expect("valid json error output");
        doc["error"]
            .as_str()
            .expect("error field is a string")
            .to_string()
    }
}

pub const EXE_BODY: &[u8] = b"proxyctl portable binary v1.0.0";
pub const EXE_SHA256: &str = "a56f4cc318b6bef2f3b1ee4debcd50f07280ba0f4910eb1cb6ccf4e071e3b5f8";
pub const SETUP_BODY: &[u8] = b"proxyctl installer package v1.0.0";
pub const SETUP_SHA256: &str = "05bfa7a7dd2dafbfaf0a56b88252160d08db7180ae38b415f02c3552d2eb33a1";

/// GitHub-releases-shaped payload for a v1.0.0 release whose asset URLs point
/// back at the given mock server.
pub fn release_json(base: &str) -> String {
    format!(
        r#"{{
            "tag_name": "v1.0.0",
            "body": "Release notes",
            "assets": [
                {{"name": "proxyctl.exe", "browser_download_url": "{base}/dl/proxyctl.exe"}},
                {{"name": "proxyctl-setup.exe", "browser_download_url": "{base}/dl/proxyctl-setup.exe"}},
                {{"name": "SHA256SUMS.txt", "browser_download_url": "{base}/dl/SHA256SUMS.txt"}}
            ]
        }}"#
    )
}

pub fn manifest_text() -> String {
    format!("{EXE_SHA256}  proxyctl.exe\n{SETUP_SHA256}  proxyctl-setup.exe\n")
}

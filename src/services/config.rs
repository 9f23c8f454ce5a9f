//! Durable user preferences and the audit log.
//!
//! The config file is plain JSON under the per-user config dir. Writes merge:
//! patched fields overlay, every other field in the file is preserved, so the
//! schema can grow without clobbering what other versions wrote. Read
//! failures degrade to the empty config ("no preferences set"), never fatal.

use crate::domain::models::{AppConfig, ConfigPatch, Invocation};
use serde_json::{json, Map, Value};

pub fn read_config(inv: &Invocation) -> AppConfig {
    let path = inv.config_file();
    match std::fs::read_to_string(&path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

pub fn write_config(inv: &Invocation, patch: ConfigPatch) -> anyhow::Result<()> {
    let path = inv.config_file();
    let mut doc: Map<String, Value> = match std::fs::read_to_string(&path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
        Err(_) => Map::new(),
    };

    if let Some(channel) = patch.update_channel {
        doc.insert("updateChannel".to_string(), json!(channel));
    }
    if let Some(pin) = patch.pinned_version {
        doc.insert("pinnedVersion".to_string(), json!(pin));
    }
    if patch.clear_pinned_version {
        doc.remove("pinnedVersion");
    }
    if let Some(key) = patch.service_account_key {
        doc.insert("serviceAccountKey".to_string(), json!(key));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, serde_json::to_string_pretty(&Value::Object(doc))?)?;
    Ok(())
}

/// Best-effort append-only audit trail of state-changing actions. Failures
/// here never fail the operation being audited.
pub fn audit(inv: &Invocation, action: &str, data: Value) {
    let path = inv.config_dir().join("audit.jsonl");
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let event = json!({ "ts": ts, "action": action, "data": data });
    let line = format!("{event}\n");
    let _ = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut f| std::io::Write::write_all(&mut f, line.as_bytes()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Channel;
    use tempfile::TempDir;

    fn test_invocation(tmp: &TempDir) -> Invocation {
        Invocation {
            current_version: "0.0.0".to_string(),
            policy_path_override: None,
            feed_base: "http://example.invalid".to_string(),
            home: tmp.path().to_path_buf(),
        }
    }

    #[test]
    fn missing_config_reads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let inv = test_invocation(&tmp);
        let cfg = read_config(&inv);
        assert!(cfg.update_channel.is_none());
        assert!(cfg.pinned_version.is_none());
    }

    #[test]
    fn corrupt_config_reads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let inv = test_invocation(&tmp);
        std::fs::create_dir_all(inv.config_dir()).unwrap();
        std::fs::write(inv.config_file(), "{not-json").unwrap();
        let cfg = read_config(&inv);
        assert!(cfg.pinned_version.is_none());
    }

    #[test]
    fn writes_merge_and_preserve_unknown_fields() {
        let tmp = TempDir::new().unwrap();
        let inv = test_invocation(&tmp);
        std::fs::create_dir_all(inv.config_dir()).unwrap();
        std::fs::write(
            inv.config_file(),
            r#"{"proxyPort": 5432, "pinnedVersion": "0.4.10"}"#,
        )
        .unwrap();

        write_config(
            &inv,
            ConfigPatch {
                update_channel: Some(Channel::Beta),
                ..Default::default()
            },
        )
        .unwrap();

        let raw = std::fs::read_to_string(inv.config_file()).unwrap();
        let doc: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc["proxyPort"], json!(5432));
        assert_eq!(doc["pinnedVersion"], json!("0.4.10"));
        assert_eq!(doc["updateChannel"], json!("beta"));
    }

    #[test]
    fn clearing_the_pin_removes_the_field() {
        let tmp = TempDir::new().unwrap();
        let inv = test_invocation(&tmp);
        write_config(
            &inv,
            ConfigPatch {
                pinned_version: Some("0.4.15".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(read_config(&inv).pinned_version.as_deref(), Some("0.4.15"));

        write_config(
            &inv,
            ConfigPatch {
                clear_pinned_version: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(read_config(&inv).pinned_version.is_none());
    }
}

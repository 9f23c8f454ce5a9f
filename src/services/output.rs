//! JSON/text output helpers.
//!
//! In `--json` mode the command prints exactly one JSON object at its
//! terminal point (a status, an outcome, or `{"error": ...}`); text mode
//! prints progress lines as it goes.

use serde::Serialize;
use serde_json::json;

/// Progress line, suppressed in JSON mode.
pub fn say(json: bool, msg: impl AsRef<str>) {
    if !json {
        println!("{}", msg.as_ref());
    }
}

/// The single machine-readable payload of a JSON-mode invocation.
pub fn emit_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Failure surface: `{"error": ...}` on stdout in JSON mode, a plain line on
/// stderr otherwise. The caller decides the exit code.
pub fn emit_error(json: bool, err: &anyhow::Error) {
    if json {
        println!("{}", json!({ "error": format!("{err:#}") }));
    } else {
        eprintln!("error: {err:#}");
    }
}

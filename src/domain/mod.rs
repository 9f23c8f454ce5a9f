//! Shared data model layer (structs/constants/error kinds only).
//!
//! ## Files
//! - `models.rs` — policy, config, status and report structs.
//! - `constants.rs` — env var names, asset markers, well-known paths.
//! - `errors.rs` — the closed upgrade error enumeration.
//!
//! ## Rule of thumb
//! Domain types are data-only: no filesystem/network side effects.
//! Changes here can affect `--json` output schemas; keep them deliberate.

pub mod constants;
pub mod errors;
pub mod models;

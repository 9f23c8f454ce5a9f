//! Service layer containing business logic and side-effect helpers.
//!
//! ## Service map
//! - `policy.rs` — enterprise policy loading, upgrade-policy resolution, auth guard.
//! - `config.rs` — durable user preferences (merged writes) + audit log.
//! - `assets.rs` — deterministic release asset selection.
//! - `checksum.rs` — digest manifest parsing + file verification.
//! - `download.rs` — bounded-retry streaming download.
//! - `context.rs` — install context / system scope / privilege detection.
//! - `apply.rs` — installer invocation and portable executable swap.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod apply;
pub mod assets;
pub mod checksum;
pub mod config;
pub mod context;
pub mod download;
pub mod output;
pub mod policy;

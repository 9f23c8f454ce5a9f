//! proxyctl — operator CLI for the local database proxy.
//!
//! The heart of the crate is the policy-constrained self-update pipeline:
//! resolve what the enterprise policy allows, check the release feed, pick
//! the right artifact, verify its checksum, and swap it in without ever
//! leaving the install directory without a working executable.

pub mod cli;
pub mod commands;
pub mod domain;
pub mod feed;
pub mod services;

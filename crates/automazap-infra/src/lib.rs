//! Infrastructure layer for AutomaZap.
//!
//! Contains implementations of the ports defined in `automazap-core`:
//! file-backed session storage, plus config loading and data directory
//! resolution.

pub mod config;
pub mod filesystem;
pub mod session;

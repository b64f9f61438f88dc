//! Storage abstractions for AutomaZap.
//!
//! Defines the session key/value port. File-backed implementations live in
//! automazap-infra.

pub mod session;

pub use session::{MemorySessionStorage, SESSION_KEY, SessionStorage};

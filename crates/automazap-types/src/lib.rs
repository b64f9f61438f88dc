//! Shared domain types for AutomaZap.
//!
//! This crate contains the domain types used across the workspace: bots,
//! messages, end users, analytics, account profiles, subscription plans,
//! UI-facing events, configuration and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod account;
pub mod analytics;
pub mod bot;
pub mod config;
pub mod error;
pub mod event;
pub mod message;
pub mod plan;
pub mod user;

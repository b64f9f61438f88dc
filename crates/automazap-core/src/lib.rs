//! Business logic for AutomaZap.
//!
//! Holds the in-memory bot/session store, the synthetic reply generator,
//! the event bus, and the mock account and subscription services. Storage
//! is reached through the `SessionStorage` port; concrete adapters live in
//! `automazap-infra`.

pub mod account;
pub mod event;
pub mod reply;
pub mod storage;
pub mod store;

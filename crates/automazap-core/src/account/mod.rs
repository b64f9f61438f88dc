//! Mock account and subscription services.
//!
//! Both simulate a backend with fixed delays and an in-memory account
//! table; the signed-in profile is persisted through `SessionStorage`.

pub mod service;
pub mod subscription;

pub use service::AccountService;
pub use subscription::{SubscriptionService, default_plans};

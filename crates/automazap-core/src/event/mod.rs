//! Event distribution for store and service notifications.

pub mod bus;

pub use bus::EventBus;

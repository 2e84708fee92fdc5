//! Adapters implementing the port traits against real infrastructure.

pub mod events;
pub mod http;
pub mod postgres;
pub mod stripe;
pub mod subscribers;

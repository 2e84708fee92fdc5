//! Webhook HTTP surface.

pub mod handlers;
pub mod routes;

pub use routes::hooks_routes;

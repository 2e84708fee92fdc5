//! Admin HTTP surface.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::admin_subscription_routes;

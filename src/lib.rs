//! Commerce Billing - Recurring billing extension for the commerce platform
//!
//! This crate mirrors the billing provider's (Stripe's) subscription state
//! into local commerce state and exposes the admin/store/webhook HTTP API.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

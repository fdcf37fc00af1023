//! Mailroom Backend Library
//!
//! Exposes the core modules for the server binary and integration tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod messaging;
pub mod middleware;
pub mod sentiment;

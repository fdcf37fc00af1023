//! HTTP middleware shared across routes.

pub mod logging;

pub use logging::request_logging;

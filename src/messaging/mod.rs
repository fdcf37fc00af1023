//! Messaging Module
//! Mission: Manager-to-user messages tagged with sentiment

pub mod api;
pub mod models;
pub mod store;

pub use api::MessagingState;
pub use store::MessageStore;

//! Authentication Module
//! Mission: Sessions with signed cookies, role authorization, login audit

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod user_store;

pub use api::AuthState;
pub use jwt::JwtHandler;
pub use middleware::{auth_middleware, manager_middleware};
pub use user_store::UserStore;

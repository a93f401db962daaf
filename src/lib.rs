//! Authentication backend for a real-estate listing service.
//!
//! Accounts register and sign in over HTTP; repeated failed logins lock the
//! account for a fixed period (see [`lockout`]).

pub mod accounts;
pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod lockout;
pub mod observability;

pub use auth::AuthService;
pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

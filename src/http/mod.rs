//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, CORS, timeout, tracing)
//!     → middleware/session.rs (bearer token check, protected routes only)
//!     → handlers.rs (decode body, call AuthService)
//!     → response.rs (map outcomes and errors to status + JSON)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};

//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Open store → Build auth service → Bind listener
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     Ctrl+C / SIGTERM → trigger → Stop accepting → Drain requests → Flush store → Exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;

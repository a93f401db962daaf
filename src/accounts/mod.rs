//! User accounts and their persistence.
//!
//! # Responsibilities
//! - Define the user record (credentials plus embedded security state)
//! - Abstract the record store behind [`AccountStore`]
//! - Provide an in-memory store with an optional JSON snapshot

pub mod model;
pub mod store;

pub use model::{PublicUser, UserRecord};
pub use store::{AccountStore, MemoryAccountStore, StoreError, StoreResult};

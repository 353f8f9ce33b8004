//! Session application services.
//!
//! This module owns the authentication session: the bearer token, the user
//! resolved from it, and the lifecycle state machine driving revalidation.

mod manager;
mod manager_test;
mod state;

pub use manager::SessionManager;
pub use state::{SessionSnapshot, SessionState};

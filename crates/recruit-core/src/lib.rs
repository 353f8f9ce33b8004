pub mod applicant;
pub mod auth;
pub mod config;
pub mod error;
pub mod post;

// Re-export common error type
pub use error::{ClientError, Result};

//! Authentication: tokens, identities, the identity API and token persistence.

pub mod gateway;
pub mod model;
pub mod token_store;

pub use gateway::AuthApi;
pub use model::{AuthToken, Credentials, Registration, User};
pub use token_store::{MemoryTokenStore, TokenStore, TOKEN_KEY};

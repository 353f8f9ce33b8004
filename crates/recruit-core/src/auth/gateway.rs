//! Remote identity endpoints.

use super::model::{AuthToken, Credentials, Registration, User};
use crate::error::Result;

/// Transport for the authentication endpoints.
///
/// Implementations surface HTTP failures as [`crate::ClientError`] kinds:
/// rejected payloads as `Validation`/`Conflict`, bad credentials and
/// invalid tokens as `Auth`, transport failures as `Network`.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /api/auth/user`: registers an applicant and returns a fresh token.
    async fn register(&self, registration: &Registration) -> Result<AuthToken>;

    /// `POST /api/auth/user/session`: exchanges credentials for a token.
    async fn create_session(&self, credentials: &Credentials) -> Result<AuthToken>;

    /// `GET /api/auth/me`: resolves the identity bound to `token`.
    async fn me(&self, token: &AuthToken) -> Result<User>;
}

//! Authentication domain models.
//!
//! Covers the bearer token, the resolved user identity, and the payloads sent
//! to the registration and login endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque bearer credential presented on every authenticated call.
///
/// `Debug` never prints the token value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Identity record resolved from `/api/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "userRole")]
    pub role: String,
}

/// Email/password pair submitted on login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Data collected by the sign-up form.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Account type sent with every registration; this client only registers applicants.
pub const APPLICANT_AUTH_TYPE: &str = "APPLICANT";

/// Wire body of `POST /api/auth/user`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub auth_type: String,
    pub info: RegisterInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub success_code: String,
}

impl From<&Registration> for RegisterRequest {
    fn from(registration: &Registration) -> Self {
        Self {
            auth_type: APPLICANT_AUTH_TYPE.to_string(),
            info: RegisterInfo {
                kind: APPLICANT_AUTH_TYPE.to_string(),
                name: registration.name.clone(),
                email: registration.email.clone(),
                password: registration.password.clone(),
                success_code: "success".to_string(),
            },
        }
    }
}

/// Response body of the registration and login endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: AuthToken,
}

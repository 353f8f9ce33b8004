//! HttpGateway - REST transport for the recruit API.
//!
//! Implements every API trait from `recruit-core` over a single reqwest
//! [`Client`]. The bearer token is read from the shared [`TokenStore`] on each
//! request, so a login or logout performed by the session manager is picked up
//! by the next call without any coupling between the two.

use async_trait::async_trait;
use recruit_core::applicant::{ApplicantApi, ApplicantProfile, ProfileUpdate, PROFILE_MISSING_CODE};
use recruit_core::auth::model::{RegisterRequest, TokenResponse};
use recruit_core::auth::{AuthApi, AuthToken, Credentials, Registration, TokenStore, User};
use recruit_core::config::ClientConfig;
use recruit_core::error::{ClientError, Result};
use recruit_core::post::{BookmarkList, Post, PostPage, RecruitApi};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Error body the API returns alongside non-success statuses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// REST gateway for the recruit API.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl HttpGateway {
    /// Creates a gateway for `config.base_url` that authenticates with `tokens`.
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/api/recruit/{id}/bookmark` with `post_id` escaped as one path segment.
    fn bookmark_url(&self, post_id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.url("/api/recruit"))
            .map_err(|e| ClientError::config(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::config(format!("Base URL {} cannot carry a path", self.base_url)))?
            .push(post_id)
            .push("bookmark");
        Ok(url)
    }

    fn me_request(&self, token: &AuthToken) -> RequestBuilder {
        self.client
            .get(self.url("/api/auth/me"))
            .header(AUTHORIZATION, token.bearer())
    }

    fn list_posts_request(&self, query: &str) -> (RequestBuilder, String) {
        let path = listing_path(query);
        let request = self.authorize(self.client.get(self.url(&path)));
        (request, path)
    }

    /// Attaches the current bearer token, if any.
    ///
    /// A failing token store downgrades the call to an anonymous request.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.load() {
            Ok(Some(token)) => request.header(AUTHORIZATION, token.bearer()),
            Ok(None) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read bearer token, sending anonymously");
                request
            }
        }
    }

    /// Sends `request` and returns the raw body of a successful response.
    async fn execute(&self, request: RequestBuilder, resource: &str) -> Result<Vec<u8>> {
        let response = request.send().await.map_err(|e| {
            ClientError::network(format!("Request to {} failed: {}", resource, e))
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            ClientError::network(format!("Failed to read response from {}: {}", resource, e))
        })?;

        if !status.is_success() {
            let error = classify_failure(status, resource, &body);
            tracing::debug!(%status, resource, error = %error, "API call failed");
            return Err(error);
        }

        Ok(body.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, resource: &str) -> Result<T> {
        let body = self.execute(request, resource).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Path of the listing endpoint; a leading `?` on `query` is tolerated.
fn listing_path(query: &str) -> String {
    let query = query.trim_start_matches('?');
    if query.is_empty() {
        "/api/recruit".to_string()
    } else {
        format!("/api/recruit?{}", query)
    }
}

/// Maps a non-success response to the error taxonomy.
fn classify_failure(status: StatusCode, resource: &str, body: &[u8]) -> ClientError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();

    if parsed.code.as_deref() == Some(PROFILE_MISSING_CODE) {
        return ClientError::not_found("applicant_profile", "me");
    }

    let message = parsed
        .message
        .or(parsed.code)
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());
    let message = if message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        message
    };

    ClientError::from_status(status.as_u16(), resource, message)
}

#[async_trait]
impl AuthApi for HttpGateway {
    async fn register(&self, registration: &Registration) -> Result<AuthToken> {
        let request = self
            .client
            .post(self.url("/api/auth/user"))
            .json(&RegisterRequest::from(registration));
        let response: TokenResponse = self.send_json(request, "/api/auth/user").await?;
        Ok(response.token)
    }

    async fn create_session(&self, credentials: &Credentials) -> Result<AuthToken> {
        let request = self
            .client
            .post(self.url("/api/auth/user/session"))
            .json(credentials);
        let response: TokenResponse = self.send_json(request, "/api/auth/user/session").await?;
        Ok(response.token)
    }

    async fn me(&self, token: &AuthToken) -> Result<User> {
        self.send_json(self.me_request(token), "/api/auth/me").await
    }
}

#[async_trait]
impl RecruitApi for HttpGateway {
    async fn list_posts(&self, query: &str) -> Result<PostPage> {
        let (request, path) = self.list_posts_request(query);
        self.send_json(request, &path).await
    }

    async fn toggle_bookmark(&self, post_id: &str) -> Result<()> {
        let url = self.bookmark_url(post_id)?;
        let path = url.path().to_string();
        let request = self.authorize(self.client.post(url));
        self.execute(request, &path).await?;
        Ok(())
    }

    async fn list_bookmarks(&self) -> Result<Vec<Post>> {
        let request = self.authorize(self.client.get(self.url("/api/post/bookmarks")));
        let list: BookmarkList = self.send_json(request, "/api/post/bookmarks").await?;
        Ok(list.posts)
    }
}

#[async_trait]
impl ApplicantApi for HttpGateway {
    async fn get_profile(&self) -> Result<ApplicantProfile> {
        let request = self.authorize(self.client.get(self.url("/api/applicant/me")));
        self.send_json(request, "/api/applicant/me").await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<()> {
        let request = self
            .authorize(self.client.put(self.url("/api/applicant/me")))
            .json(update);
        self.execute(request, "/api/applicant/me").await?;
        Ok(())
    }
}

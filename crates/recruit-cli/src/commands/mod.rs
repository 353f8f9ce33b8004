pub mod auth;
pub mod posts;
pub mod profile;

use anyhow::{Context, Result};
use recruit_application::{ApplicantProfileService, PostListCache, SessionManager};
use recruit_core::auth::TokenStore;
use recruit_core::error::ClientError;
use recruit_infrastructure::{ConfigService, FileTokenStore, HttpGateway};
use std::path::Path;
use std::sync::Arc;

/// Services shared by every command, wired over one HTTP gateway and token file.
pub struct App {
    pub session: SessionManager,
    pub posts: PostListCache,
    pub profiles: ApplicantProfileService,
}

impl App {
    pub fn build(config_path: Option<&Path>, base_url: Option<String>) -> Result<Self> {
        let config_service = match config_path {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new(),
        };
        let mut config = config_service
            .get_config()
            .context("Failed to load client config")?;
        if let Some(base_url) = base_url {
            config.base_url = base_url;
        }

        let tokens: Arc<dyn TokenStore> = match &config.token_file {
            Some(path) => Arc::new(FileTokenStore::with_path(path)),
            None => Arc::new(FileTokenStore::new().context("Failed to locate credential file")?),
        };
        let gateway = Arc::new(
            HttpGateway::new(&config, tokens.clone()).context("Failed to create HTTP client")?,
        );
        tracing::debug!(base_url = %config.base_url, "Client wired");

        Ok(Self {
            session: SessionManager::new(gateway.clone(), tokens),
            posts: PostListCache::new(gateway.clone()),
            profiles: ApplicantProfileService::new(gateway),
        })
    }

    /// Restores the stored session; commands that need a user call this first.
    pub async fn require_user(&self) -> Result<()> {
        self.session.initialize().await;
        if !self.session.is_authenticated() {
            anyhow::bail!("Not logged in. Run `recruit login <email> --password <password>` first");
        }
        Ok(())
    }

    /// Clears the session when the server rejected the token, then surfaces the error.
    pub fn reject(&self, error: ClientError) -> anyhow::Error {
        if self.session.expire_if_unauthorized(&error) {
            return anyhow::anyhow!("Session expired, please log in again ({})", error);
        }
        submission_error("Request", error)
    }
}

/// Reports a failed submission, telling payload rejections apart from other failures.
pub fn submission_error(action: &str, error: ClientError) -> anyhow::Error {
    if error.is_rejection() {
        anyhow::anyhow!("{} rejected by the server: {}", action, error)
    } else {
        error.into()
    }
}

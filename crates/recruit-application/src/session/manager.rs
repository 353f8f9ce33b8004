use super::state::{SessionSnapshot, SessionState};
use recruit_core::auth::{AuthApi, AuthToken, Credentials, Registration, TokenStore, User};
use recruit_core::error::{ClientError, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Owns the bearer token and the identity resolved from it.
///
/// `SessionManager` is responsible for:
/// - Restoring a persisted token on startup and validating it
/// - Exchanging credentials or registrations for a token
/// - Revalidating whenever the token changes, and only then
/// - Clearing the token on logout or when the server rejects it
///
/// Every token change bumps a generation counter. A validation result is
/// applied only if the generation it started with is still current, so a
/// logout (or a newer login) always wins over a slow identity response.
///
/// `login`/`sign_up` are rejected with [`ClientError::Busy`] while the session
/// is initializing or validating, or while another submission is in flight.
/// `logout` is always accepted.
pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    tokens: Arc<dyn TokenStore>,
    inner: Mutex<SessionInner>,
    updates: watch::Sender<SessionSnapshot>,
}

struct SessionInner {
    snapshot: SessionSnapshot,
    /// Bumped on every token change.
    generation: u64,
    /// A login or sign-up request is awaiting its token.
    submitting: bool,
}

impl SessionManager {
    /// Creates a manager in [`SessionState::Initializing`].
    ///
    /// # Arguments
    ///
    /// * `api` - Transport for the identity endpoints
    /// * `tokens` - Persistent storage for the bearer token
    pub fn new(api: Arc<dyn AuthApi>, tokens: Arc<dyn TokenStore>) -> Self {
        let snapshot = SessionSnapshot::initializing();
        let (updates, _) = watch::channel(snapshot.clone());
        Self {
            api,
            tokens,
            inner: Mutex::new(SessionInner {
                snapshot,
                generation: 0,
                submitting: false,
            }),
            updates,
        }
    }

    /// Restores the persisted token, if any, and validates it.
    ///
    /// Without a persisted token the session goes straight to `Anonymous`.
    /// Calling this again once the session has left `Initializing` is a no-op
    /// that returns the current state.
    pub async fn initialize(&self) -> SessionState {
        let persisted = {
            let mut inner = self.lock();
            if inner.snapshot.state != SessionState::Initializing {
                return inner.snapshot.state;
            }

            let persisted = self.tokens.load().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to read persisted token, starting anonymous");
                None
            });

            inner.generation += 1;
            inner.snapshot.token = persisted.clone();
            inner.snapshot.user = None;
            inner.snapshot.state = if persisted.is_some() {
                SessionState::Validating
            } else {
                SessionState::Anonymous
            };
            self.publish(&inner);
            persisted
        };

        if persisted.is_none() {
            tracing::debug!("No persisted token, session is anonymous");
            return SessionState::Anonymous;
        }

        // The outcome is reflected in the state; failures have already been logged.
        let _ = self.run_validation().await;
        self.state()
    }

    /// Revalidates the current token against the identity endpoint.
    ///
    /// Success moves to `Authenticated`. Any failure clears the token (in
    /// memory and in storage) and moves to `Anonymous`.
    ///
    /// # Errors
    ///
    /// - `Busy` if the session is not ready
    /// - `Auth` if there is no token or the server rejects it
    /// - the transport error of a failed identity call
    pub async fn validate(&self) -> Result<User> {
        {
            let inner = self.lock();
            if !inner.snapshot.state.is_ready() {
                return Err(ClientError::busy("Session is still initializing or validating"));
            }
        }
        self.run_validation().await
    }

    /// Exchanges `credentials` for a token, stores it and validates it.
    ///
    /// A rejected login leaves the session exactly as it was.
    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        let (_submission, generation) = self.begin_submission()?;
        tracing::debug!(email = %credentials.email, "Submitting login");

        let token = self.api.create_session(credentials).await?;
        self.adopt_token(token, generation)?;
        tracing::info!(email = %credentials.email, "Login accepted, validating token");

        self.run_validation().await
    }

    /// Registers a new applicant, stores the returned token and validates it.
    ///
    /// # Errors
    ///
    /// - `Validation`/`Conflict` if the server rejects the registration
    /// - `Network` on transport failure
    ///
    /// In both cases the session remains in its prior state.
    pub async fn sign_up(&self, registration: &Registration) -> Result<User> {
        let (_submission, generation) = self.begin_submission()?;
        tracing::debug!(email = %registration.email, "Submitting registration");

        let token = self.api.register(registration).await?;
        self.adopt_token(token, generation)?;
        tracing::info!(email = %registration.email, "Registration accepted, validating token");

        self.run_validation().await
    }

    /// Clears the token and the user immediately.
    ///
    /// No network call is made. Any validation still in flight is discarded
    /// when it completes.
    pub fn logout(&self) {
        let mut inner = self.lock();
        self.clear_token(&mut inner);
        tracing::info!("Logged out");
    }

    /// Downgrades the session when an authenticated call was rejected.
    ///
    /// Returns `true` if `error` was an `Auth` error and the token was cleared.
    /// Token expiry is only ever discovered this way.
    pub fn expire_if_unauthorized(&self, error: &ClientError) -> bool {
        if !error.is_auth() {
            return false;
        }
        let mut inner = self.lock();
        if inner.snapshot.token.is_none() {
            return false;
        }
        tracing::warn!(error = %error, "Server rejected bearer token, clearing session");
        self.clear_token(&mut inner);
        true
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot.clone()
    }

    pub fn state(&self) -> SessionState {
        self.lock().snapshot.state
    }

    pub fn token(&self) -> Option<AuthToken> {
        self.lock().snapshot.token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.lock().snapshot.user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().snapshot.is_authenticated()
    }

    /// Subscribes to snapshot updates.
    ///
    /// The receiver always holds the latest snapshot; intermediate states may
    /// be skipped by slow receivers.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    // ============================================================================
    // Transitions
    // ============================================================================

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &SessionInner) {
        self.updates.send_replace(inner.snapshot.clone());
    }

    fn begin_submission(&self) -> Result<(SubmissionGuard<'_>, u64)> {
        let mut inner = self.lock();
        if !inner.snapshot.state.is_ready() {
            return Err(ClientError::busy("Session is still initializing or validating"));
        }
        if inner.submitting {
            return Err(ClientError::busy("Another login or sign-up is in progress"));
        }
        inner.submitting = true;
        Ok((SubmissionGuard { manager: self }, inner.generation))
    }

    /// Stores a freshly issued token and enters `Validating`.
    ///
    /// Fails without touching the session if it changed (e.g. logout) since
    /// the submission started, or if the token cannot be persisted.
    fn adopt_token(&self, token: AuthToken, generation: u64) -> Result<()> {
        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!("Session changed during submission, discarding issued token");
            return Err(ClientError::auth("Session changed before the login completed"));
        }

        self.tokens.save(&token)?;

        inner.generation += 1;
        inner.snapshot.token = Some(token);
        inner.snapshot.user = None;
        inner.snapshot.state = SessionState::Validating;
        self.publish(&inner);
        Ok(())
    }

    fn clear_token(&self, inner: &mut SessionInner) {
        if let Err(e) = self.tokens.clear() {
            tracing::warn!(error = %e, "Failed to remove persisted token");
        }
        inner.generation += 1;
        inner.snapshot.token = None;
        inner.snapshot.user = None;
        inner.snapshot.state = SessionState::Anonymous;
        self.publish(inner);
    }

    async fn run_validation(&self) -> Result<User> {
        let (token, generation) = {
            let mut inner = self.lock();
            let Some(token) = inner.snapshot.token.clone() else {
                inner.snapshot.user = None;
                inner.snapshot.state = SessionState::Anonymous;
                self.publish(&inner);
                return Err(ClientError::auth("No bearer token to validate"));
            };
            if inner.snapshot.state != SessionState::Validating {
                inner.snapshot.state = SessionState::Validating;
                self.publish(&inner);
            }
            (token, inner.generation)
        };

        tracing::debug!(generation, "Validating bearer token");
        let result = self.api.me(&token).await;

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!(generation, "Discarding validation result for superseded token");
            return Err(ClientError::auth("Session token changed before validation completed"));
        }

        match result {
            Ok(user) => {
                tracing::info!(user_id = %user.id, role = %user.role, "Session authenticated");
                inner.snapshot.user = Some(user.clone());
                inner.snapshot.state = SessionState::Authenticated;
                self.publish(&inner);
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token validation failed, clearing session");
                self.clear_token(&mut inner);
                Err(e)
            }
        }
    }
}

/// Releases the in-flight submission flag, even if the login future is dropped.
struct SubmissionGuard<'a> {
    manager: &'a SessionManager,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.manager.lock().submitting = false;
    }
}

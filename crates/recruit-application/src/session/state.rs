use recruit_core::auth::{AuthToken, User};

/// Lifecycle of the session.
///
/// `Initializing → Validating → Ready`, where `Ready` is either
/// [`SessionState::Authenticated`] or [`SessionState::Anonymous`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, persisted token not yet inspected.
    Initializing,
    /// A token is being checked against the identity endpoint.
    Validating,
    /// Ready with a validated user.
    Authenticated,
    /// Ready without a user.
    Anonymous,
}

impl SessionState {
    /// `Authenticated` or `Anonymous`.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Authenticated | Self::Anonymous)
    }
}

/// Point-in-time view of the session, as published to subscribers.
///
/// `user` is `Some` only in [`SessionState::Authenticated`], and only for the
/// token held alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub token: Option<AuthToken>,
    pub user: Option<User>,
}

impl SessionSnapshot {
    pub(crate) fn initializing() -> Self {
        Self {
            state: SessionState::Initializing,
            token: None,
            user: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated && self.user.is_some()
    }
}

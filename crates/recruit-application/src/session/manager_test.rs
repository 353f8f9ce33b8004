#[cfg(test)]
mod tests {
    use crate::session::{SessionManager, SessionState};
    use crate::test_support::{MockAuthApi, user};
    use recruit_core::auth::{AuthToken, Credentials, MemoryTokenStore, Registration, TokenStore};
    use recruit_core::error::ClientError;
    use std::sync::Arc;

    fn setup(store: MemoryTokenStore) -> (Arc<MockAuthApi>, MemoryTokenStore, SessionManager) {
        let api = Arc::new(MockAuthApi::default());
        let manager = SessionManager::new(api.clone(), Arc::new(store.clone()));
        (api, store, manager)
    }

    async fn anonymous() -> (Arc<MockAuthApi>, MemoryTokenStore, SessionManager) {
        let (api, store, manager) = setup(MemoryTokenStore::new());
        assert_eq!(manager.initialize().await, SessionState::Anonymous);
        (api, store, manager)
    }

    fn credentials() -> Credentials {
        Credentials::new("a@x.com", "p")
    }

    #[tokio::test]
    async fn test_startup_without_token_is_anonymous() {
        let (api, _store, manager) = setup(MemoryTokenStore::new());
        assert_eq!(manager.state(), SessionState::Initializing);

        assert_eq!(manager.initialize().await, SessionState::Anonymous);
        assert_eq!(api.me.calls(), 0);
        assert!(manager.user().is_none());
    }

    #[tokio::test]
    async fn test_startup_revalidates_accepted_token() {
        let store = MemoryTokenStore::with_token(AuthToken::new("persisted"));
        let (api, store, manager) = setup(store);
        let reply = api.me.defer();

        assert_eq!(manager.state(), SessionState::Initializing);
        let (state, ()) = tokio::join!(manager.initialize(), async {
            api.me.started().await;
            assert_eq!(manager.state(), SessionState::Validating);
            assert!(manager.user().is_none());
            reply.send(Ok(user("u1"))).unwrap();
        });

        assert_eq!(state, SessionState::Authenticated);
        assert_eq!(manager.user(), Some(user("u1")));
        assert_eq!(manager.token(), Some(AuthToken::new("persisted")));
        assert_eq!(store.load().unwrap(), Some(AuthToken::new("persisted")));
        assert_eq!(
            *api.validated_tokens.lock().unwrap(),
            vec![AuthToken::new("persisted")]
        );
    }

    #[tokio::test]
    async fn test_startup_rejected_token_is_cleared() {
        let store = MemoryTokenStore::with_token(AuthToken::new("expired"));
        let (api, store, manager) = setup(store);
        api.me.push(Err(ClientError::auth("token expired")));

        assert_eq!(manager.initialize().await, SessionState::Anonymous);
        assert!(manager.token().is_none());
        assert!(manager.user().is_none());
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_initialize_twice_is_noop() {
        let (api, _store, manager) = anonymous().await;
        assert_eq!(manager.initialize().await, SessionState::Anonymous);
        assert_eq!(api.me.calls(), 0);
    }

    #[tokio::test]
    async fn test_login_stores_single_token_and_validates_once_per_call() {
        let (api, store, manager) = anonymous().await;

        for round in 1..=2 {
            api.create_session.push(Ok(AuthToken::new("tok-1")));
            api.me.push(Ok(user("u1")));

            let logged_in = manager.login(&credentials()).await.unwrap();
            assert_eq!(logged_in, user("u1"));
            assert_eq!(store.load().unwrap(), Some(AuthToken::new("tok-1")));
            assert_eq!(api.me.calls(), round);
        }

        assert_eq!(manager.state(), SessionState::Authenticated);
        assert_eq!(api.create_session.calls(), 2);
    }

    #[tokio::test]
    async fn test_login_bad_credentials_keeps_anonymous() {
        let (api, store, manager) = anonymous().await;
        api.create_session.push(Err(ClientError::auth("bad credentials")));

        let result = manager.login(&credentials()).await;

        assert!(result.unwrap_err().is_auth());
        assert_eq!(manager.state(), SessionState::Anonymous);
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(api.me.calls(), 0);
    }

    #[tokio::test]
    async fn test_login_rejected_by_identity_endpoint() {
        let (api, store, manager) = anonymous().await;
        api.create_session.push(Ok(AuthToken::new("tok")));
        api.me.push(Err(ClientError::auth("invalid token")));

        assert!(manager.login(&credentials()).await.unwrap_err().is_auth());
        assert_eq!(manager.state(), SessionState::Anonymous);
        assert!(manager.token().is_none());
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_up_success() {
        let (api, store, manager) = anonymous().await;
        api.register.push(Ok(AuthToken::new("new-token")));
        api.me.push(Ok(user("u2")));

        let registered = manager
            .sign_up(&Registration::new("Kim", "kim@x.com", "pw"))
            .await
            .unwrap();

        assert_eq!(registered.id, "u2");
        assert!(manager.is_authenticated());
        assert_eq!(store.load().unwrap(), Some(AuthToken::new("new-token")));
    }

    #[tokio::test]
    async fn test_sign_up_rejections_leave_prior_state() {
        let (api, store, manager) = anonymous().await;
        api.create_session.push(Ok(AuthToken::new("tok-1")));
        api.me.push(Ok(user("u1")));
        manager.login(&credentials()).await.unwrap();

        api.register.push(Err(ClientError::conflict("email already registered")));
        api.register.push(Err(ClientError::validation("password too short")));
        api.register.push(Err(ClientError::network("connection reset")));
        let registration = Registration::new("Kim", "kim@x.com", "pw");

        assert!(manager.sign_up(&registration).await.unwrap_err().is_conflict());
        assert!(manager.sign_up(&registration).await.unwrap_err().is_validation());
        assert!(manager.sign_up(&registration).await.unwrap_err().is_network());

        assert_eq!(manager.state(), SessionState::Authenticated);
        assert_eq!(manager.user(), Some(user("u1")));
        assert_eq!(store.load().unwrap(), Some(AuthToken::new("tok-1")));
        assert_eq!(api.me.calls(), 1);
    }

    #[tokio::test]
    async fn test_logout_is_synchronous_and_total() {
        let (api, store, manager) = anonymous().await;
        api.create_session.push(Ok(AuthToken::new("tok")));
        api.me.push(Ok(user("u1")));
        manager.login(&credentials()).await.unwrap();

        manager.logout();

        assert!(manager.token().is_none());
        assert!(manager.user().is_none());
        assert_eq!(manager.state(), SessionState::Anonymous);
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(api.me.calls(), 1);
    }

    #[tokio::test]
    async fn test_logout_during_validation_discards_late_identity() {
        let (api, store, manager) = anonymous().await;
        api.create_session.push(Ok(AuthToken::new("tok")));
        let reply = api.me.defer();
        let credentials = credentials();

        let (result, ()) = tokio::join!(manager.login(&credentials), async {
            api.me.started().await;
            manager.logout();
            reply.send(Ok(user("u1"))).unwrap();
        });

        assert!(result.is_err());
        assert_eq!(manager.state(), SessionState::Anonymous);
        assert!(manager.user().is_none());
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_while_validating_is_busy() {
        let store = MemoryTokenStore::with_token(AuthToken::new("persisted"));
        let (api, _store, manager) = setup(store);
        let reply = api.me.defer();

        let (state, ()) = tokio::join!(manager.initialize(), async {
            api.me.started().await;
            let err = manager.login(&credentials()).await.unwrap_err();
            assert!(err.is_busy());
            reply.send(Ok(user("u1"))).unwrap();
        });

        assert_eq!(state, SessionState::Authenticated);
        assert_eq!(api.create_session.calls(), 0);
    }

    #[tokio::test]
    async fn test_second_submission_in_flight_is_busy() {
        let (api, _store, manager) = anonymous().await;
        let token_reply = api.create_session.defer();
        api.me.push(Ok(user("u1")));
        let credentials = credentials();

        let (first, ()) = tokio::join!(manager.login(&credentials), async {
            api.create_session.started().await;
            let err = manager
                .sign_up(&Registration::new("Kim", "kim@x.com", "pw"))
                .await
                .unwrap_err();
            assert!(err.is_busy());
            token_reply.send(Ok(AuthToken::new("tok"))).unwrap();
        });

        assert!(first.is_ok());
        assert_eq!(api.register.calls(), 0);

        // The submission flag is released once the first login finishes
        api.create_session.push(Ok(AuthToken::new("tok")));
        api.me.push(Ok(user("u1")));
        assert!(manager.login(&credentials).await.is_ok());
    }

    #[tokio::test]
    async fn test_validate_before_initialize_is_busy() {
        let (_api, _store, manager) = setup(MemoryTokenStore::new());
        assert!(manager.validate().await.unwrap_err().is_busy());
    }

    #[tokio::test]
    async fn test_expire_if_unauthorized() {
        let (api, store, manager) = anonymous().await;
        api.create_session.push(Ok(AuthToken::new("tok")));
        api.me.push(Ok(user("u1")));
        manager.login(&credentials()).await.unwrap();

        assert!(!manager.expire_if_unauthorized(&ClientError::network("timeout")));
        assert!(manager.is_authenticated());

        assert!(manager.expire_if_unauthorized(&ClientError::auth("expired")));
        assert_eq!(manager.state(), SessionState::Anonymous);
        assert_eq!(store.load().unwrap(), None);

        // Already anonymous
        assert!(!manager.expire_if_unauthorized(&ClientError::auth("expired")));
    }

    #[tokio::test]
    async fn test_subscribers_see_latest_snapshot() {
        let (api, _store, manager) = anonymous().await;
        let mut updates = manager.subscribe();
        assert_eq!(updates.borrow_and_update().state, SessionState::Anonymous);

        api.create_session.push(Ok(AuthToken::new("tok")));
        api.me.push(Ok(user("u1")));
        manager.login(&credentials()).await.unwrap();

        assert!(updates.has_changed().unwrap());
        let snapshot = updates.borrow_and_update().clone();
        assert_eq!(snapshot.state, SessionState::Authenticated);
        assert_eq!(snapshot.user, Some(user("u1")));
    }
}

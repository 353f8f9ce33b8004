//! Scripted API mocks shared by the service tests.
//!
//! Each endpoint is backed by a [`Script`]: a queue of replies that are either
//! ready immediately or released later by the test through a oneshot sender,
//! which lets a test decide the order in which concurrent calls complete.

use recruit_core::applicant::{ApplicantApi, ApplicantProfile, ProfileUpdate};
use recruit_core::auth::{AuthApi, AuthToken, Credentials, Registration, User};
use recruit_core::error::{ClientError, Result};
use recruit_core::post::{Post, PostPage, RecruitApi};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Notify, oneshot};

enum Reply<T> {
    Ready(Result<T>),
    Deferred(oneshot::Receiver<Result<T>>),
}

pub struct Script<T> {
    replies: Mutex<VecDeque<Reply<T>>>,
    calls: AtomicUsize,
    started: Notify,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            started: Notify::new(),
        }
    }
}

impl<T> Script<T> {
    /// Queues a reply returned as soon as the call is made.
    pub fn push(&self, reply: Result<T>) {
        self.replies.lock().unwrap().push_back(Reply::Ready(reply));
    }

    /// Queues a reply the test releases later through the returned sender.
    pub fn defer(&self) -> oneshot::Sender<Result<T>> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Reply::Deferred(rx));
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Resolves once a call has reached this endpoint.
    pub async fn started(&self) {
        self.started.notified().await;
    }

    async fn next(&self) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Deferred(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ClientError::network("reply sender dropped"))),
            None => Err(ClientError::internal("unscripted call")),
        }
    }
}

#[derive(Default)]
pub struct MockAuthApi {
    pub register: Script<AuthToken>,
    pub create_session: Script<AuthToken>,
    pub me: Script<User>,
    pub validated_tokens: Mutex<Vec<AuthToken>>,
}

#[async_trait::async_trait]
impl AuthApi for MockAuthApi {
    async fn register(&self, _registration: &Registration) -> Result<AuthToken> {
        self.register.next().await
    }

    async fn create_session(&self, _credentials: &Credentials) -> Result<AuthToken> {
        self.create_session.next().await
    }

    async fn me(&self, token: &AuthToken) -> Result<User> {
        self.validated_tokens.lock().unwrap().push(token.clone());
        self.me.next().await
    }
}

#[derive(Default)]
pub struct MockRecruitApi {
    pub list: Script<PostPage>,
    pub toggle: Script<()>,
    pub bookmarks: Script<Vec<Post>>,
    pub queries: Mutex<Vec<String>>,
    pub toggled: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl RecruitApi for MockRecruitApi {
    async fn list_posts(&self, query: &str) -> Result<PostPage> {
        self.queries.lock().unwrap().push(query.to_string());
        self.list.next().await
    }

    async fn toggle_bookmark(&self, post_id: &str) -> Result<()> {
        self.toggled.lock().unwrap().push(post_id.to_string());
        self.toggle.next().await
    }

    async fn list_bookmarks(&self) -> Result<Vec<Post>> {
        self.bookmarks.next().await
    }
}

#[derive(Default)]
pub struct MockApplicantApi {
    pub get: Script<ApplicantProfile>,
    pub update: Script<()>,
    pub updates: Mutex<Vec<ProfileUpdate>>,
}

#[async_trait::async_trait]
impl ApplicantApi for MockApplicantApi {
    async fn get_profile(&self) -> Result<ApplicantProfile> {
        self.get.next().await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<()> {
        self.updates.lock().unwrap().push(update.clone());
        self.update.next().await
    }
}

pub fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        name: format!("User {}", id),
        email: format!("{}@x.com", id),
        role: "APPLICANT".to_string(),
    }
}

pub fn post(id: &str, is_bookmarked: bool) -> Post {
    Post {
        id: id.to_string(),
        company_name: format!("Company {}", id),
        position_title: "Intern".to_string(),
        employment_end_date: None,
        is_bookmarked,
    }
}

pub fn page(ids: &[&str], total_pages: u32) -> PostPage {
    PostPage {
        data: ids.iter().map(|id| post(id, false)).collect(),
        total_pages,
    }
}

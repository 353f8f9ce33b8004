use futures::future::BoxFuture;
use futures::FutureExt;
use recruit_core::error::{ClientError, Result};
use recruit_core::post::{Post, RecruitApi};
use std::future::IntoFuture;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Point-in-time copy of the cached listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostListView {
    /// Postings in server response order.
    pub items: Vec<Post>,
    /// Page count reported by the most recently applied fetch.
    pub total_pages: u32,
    /// True exactly while a fetch is outstanding.
    pub is_loading: bool,
    /// Query of the most recently issued fetch.
    pub last_query: Option<String>,
}

/// How a [`PostListCache::fetch_posts`] call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the cached items.
    Applied,
    /// A newer fetch was issued first; this response was dropped.
    Superseded,
    /// The request failed; the previous items stay visible.
    Failed(ClientError),
}

/// How a bookmark toggle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkOutcome {
    /// The server accepted the toggle.
    Confirmed,
    /// The server call failed and the optimistic flip was undone.
    RolledBack(ClientError),
    /// The server call failed and there was nothing local to undo: the post was
    /// not cached, or a fetch has since replaced the items with server data.
    Failed(ClientError),
}

/// A bookmark toggle whose local flip has already been applied.
///
/// The server call and its reconciliation run as a spawned task, so dropping
/// this handle only discards the outcome. Awaiting it yields the outcome.
pub struct PendingToggle {
    post_id: String,
    optimistic: Option<bool>,
    request: JoinHandle<BookmarkOutcome>,
}

impl PendingToggle {
    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    /// The bookmark flag shown locally, or `None` if the post is not cached.
    pub fn optimistic_state(&self) -> Option<bool> {
        self.optimistic
    }
}

impl IntoFuture for PendingToggle {
    type Output = BookmarkOutcome;
    type IntoFuture = BoxFuture<'static, BookmarkOutcome>;

    fn into_future(self) -> Self::IntoFuture {
        let post_id = self.post_id;
        self.request
            .map(move |joined| {
                joined.unwrap_or_else(|e| {
                    tracing::error!(post_id = %post_id, error = %e, "Bookmark task did not complete");
                    BookmarkOutcome::Failed(ClientError::internal(format!(
                        "Bookmark task for {} did not complete: {}",
                        post_id, e
                    )))
                })
            })
            .boxed()
    }
}

/// In-memory, server-backed page of postings.
///
/// Overlapping fetches are ordered by a monotonically increasing sequence
/// number: only the latest issued fetch may apply its response, and issuing a
/// fetch cancels its predecessor's request. Bookmark toggles flip the local
/// flag immediately and roll it back if the server call fails, unless a fetch
/// has replaced the items in the meantime.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone)]
pub struct PostListCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    api: Arc<dyn RecruitApi>,
    state: Mutex<CacheState>,
}

#[derive(Default)]
struct CacheState {
    view: PostListView,
    /// Sequence number of the latest issued fetch.
    latest_seq: u64,
    /// Bumped whenever a fetch replaces the items.
    epoch: u64,
    in_flight: Option<CancellationToken>,
}

impl PostListCache {
    /// Creates an empty cache.
    pub fn new(api: Arc<dyn RecruitApi>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                api,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> PostListView {
        self.lock().view.clone()
    }

    pub fn items(&self) -> Vec<Post> {
        self.lock().view.items.clone()
    }

    pub fn total_pages(&self) -> u32 {
        self.lock().view.total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.lock().view.is_loading
    }

    pub fn last_query(&self) -> Option<String> {
        self.lock().view.last_query.clone()
    }

    /// Looks up a cached post by id.
    pub fn post(&self, post_id: &str) -> Option<Post> {
        self.lock()
            .view
            .items
            .iter()
            .find(|post| post.id == post_id)
            .cloned()
    }

    /// Fetches one page of postings and replaces the cached items.
    ///
    /// Never fails past this boundary: a failed fetch is logged and leaves the
    /// previous items and page count visible.
    pub async fn fetch_posts(&self, query: impl Into<String>) -> FetchOutcome {
        let query = query.into();
        let (seq, cancel) = {
            let mut state = self.lock();
            state.latest_seq += 1;
            if let Some(previous) = state.in_flight.take() {
                previous.cancel();
            }
            let cancel = CancellationToken::new();
            state.in_flight = Some(cancel.clone());
            state.view.is_loading = true;
            state.view.last_query = Some(query.clone());
            (state.latest_seq, cancel)
        };

        // Clears the loading state if this future is dropped while still the latest fetch.
        let _settle = FetchGuard { cache: self, seq };

        tracing::debug!(seq, query = %query, "Fetching posts");
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.inner.api.list_posts(&query) => Some(result),
        };

        let mut state = self.lock();
        let Some(result) = result.filter(|_| state.latest_seq == seq) else {
            tracing::debug!(seq, latest = state.latest_seq, "Dropping superseded fetch");
            return FetchOutcome::Superseded;
        };

        state.view.is_loading = false;
        state.in_flight = None;
        match result {
            Ok(page) => {
                tracing::debug!(seq, items = page.data.len(), total_pages = page.total_pages, "Applied posts");
                state.view.items = page.data;
                state.view.total_pages = page.total_pages;
                state.epoch += 1;
                FetchOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(seq, query = %query, error = %e, "Failed to fetch posts, keeping previous page");
                FetchOutcome::Failed(e)
            }
        }
    }

    /// Cancels the outstanding fetch, if any, and clears `is_loading`.
    ///
    /// Returns `true` if a fetch was cancelled.
    pub fn cancel_fetch(&self) -> bool {
        let mut state = self.lock();
        let Some(in_flight) = state.in_flight.take() else {
            return false;
        };
        in_flight.cancel();
        state.latest_seq += 1;
        state.view.is_loading = false;
        tracing::debug!("Cancelled outstanding fetch");
        true
    }

    /// Flips the bookmark flag of `post_id` now and starts the server call.
    ///
    /// The local flag changes before this method returns. The toggle is sent
    /// from a spawned task; on failure the flip is undone if the items have
    /// not been refreshed since. Reconciliation runs whether or not the
    /// returned [`PendingToggle`] is awaited.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn toggle_bookmark(&self, post_id: &str) -> PendingToggle {
        let (optimistic, epoch) = {
            let mut state = self.lock();
            let epoch = state.epoch;
            let optimistic = flip(&mut state.view.items, post_id);
            (optimistic, epoch)
        };
        tracing::debug!(post_id, ?optimistic, "Toggled bookmark locally");

        let cache = self.clone();
        let id = post_id.to_string();
        let request = tokio::spawn(async move {
            match cache.inner.api.toggle_bookmark(&id).await {
                Ok(()) => BookmarkOutcome::Confirmed,
                Err(e) => cache.roll_back(&id, optimistic, epoch, e),
            }
        });

        PendingToggle {
            post_id: post_id.to_string(),
            optimistic,
            request,
        }
    }

    fn roll_back(
        &self,
        post_id: &str,
        optimistic: Option<bool>,
        epoch: u64,
        error: ClientError,
    ) -> BookmarkOutcome {
        let mut state = self.lock();
        if optimistic.is_none() || state.epoch != epoch {
            tracing::warn!(post_id, error = %error, "Bookmark toggle failed, items already refreshed");
            return BookmarkOutcome::Failed(error);
        }

        // Toggles commute, so undoing one is another flip.
        flip(&mut state.view.items, post_id);
        tracing::warn!(post_id, error = %error, "Bookmark toggle failed, rolled back");
        BookmarkOutcome::RolledBack(error)
    }

    /// Lists every bookmarked posting without touching the cached page.
    pub async fn fetch_bookmarked(&self) -> Result<Vec<Post>> {
        self.inner.api.list_bookmarks().await.inspect_err(|e| {
            tracing::warn!(error = %e, "Failed to fetch bookmarked posts");
        })
    }
}

/// Settles the loading state of an abandoned fetch.
///
/// Only acts while `seq` is still the latest issued fetch; a superseded or
/// cancelled fetch leaves the state to its successor.
struct FetchGuard<'a> {
    cache: &'a PostListCache,
    seq: u64,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.cache.lock();
        if state.latest_seq == self.seq {
            state.view.is_loading = false;
            state.in_flight = None;
        }
    }
}

/// Flips the bookmark flag of `post_id`, returning the new value.
fn flip(items: &mut [Post], post_id: &str) -> Option<bool> {
    items.iter_mut().find(|post| post.id == post_id).map(|post| {
        post.is_bookmarked = !post.is_bookmarked;
        post.is_bookmarked
    })
}

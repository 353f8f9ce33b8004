//! Posting list services.
//!
//! Holds the cached page of postings shown to the user and reconciles local
//! bookmark edits with the server.

mod cache;

pub use cache::{BookmarkOutcome, FetchOutcome, PendingToggle, PostListCache, PostListView};

//! Client-side state synchronization for the recruit service.
//!
//! Two independent service objects, constructed once per application and
//! passed by reference to whatever needs them:
//!
//! - [`SessionManager`]: bearer token, resolved user, revalidation
//! - [`PostListCache`]: current page of postings and optimistic bookmarks

pub mod applicant_service;
pub mod posts;
pub mod session;

#[cfg(test)]
mod test_support;

pub use applicant_service::ApplicantProfileService;
pub use posts::{BookmarkOutcome, FetchOutcome, PendingToggle, PostListCache, PostListView};
pub use session::{SessionManager, SessionSnapshot, SessionState};

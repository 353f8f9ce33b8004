//! Remote posting endpoints.

use super::model::{Post, PostPage};
use crate::error::Result;

/// Transport for the posting endpoints.
///
/// Calls are authenticated with whatever bearer token is current when the
/// request is sent.
#[async_trait::async_trait]
pub trait RecruitApi: Send + Sync {
    /// `GET /api/recruit?<query>`: one page of postings in ranking order.
    async fn list_posts(&self, query: &str) -> Result<PostPage>;

    /// `POST /api/recruit/{id}/bookmark`: flips the bookmark on the server.
    async fn toggle_bookmark(&self, post_id: &str) -> Result<()>;

    /// `GET /api/post/bookmarks`: every posting the user has bookmarked.
    async fn list_bookmarks(&self) -> Result<Vec<Post>>;
}

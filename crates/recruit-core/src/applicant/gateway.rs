//! Remote applicant profile endpoints.

use super::model::{ApplicantProfile, ProfileUpdate};
use crate::error::Result;

#[async_trait::async_trait]
pub trait ApplicantApi: Send + Sync {
    /// `GET /api/applicant/me`.
    ///
    /// Returns `ClientError::NotFound` when the applicant has not created a
    /// profile yet.
    async fn get_profile(&self) -> Result<ApplicantProfile>;

    /// `PUT /api/applicant/me`.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<()>;
}

//! Applicant profile service.
//!
//! Thin wrapper over [`ApplicantApi`] that turns "no profile yet" into `None`
//! so callers can distinguish a first-time applicant from a failed request.

use recruit_core::applicant::{ApplicantApi, ApplicantProfile, ProfileUpdate};
use recruit_core::error::Result;
use std::sync::Arc;

pub struct ApplicantProfileService {
    api: Arc<dyn ApplicantApi>,
}

impl ApplicantProfileService {
    pub fn new(api: Arc<dyn ApplicantApi>) -> Self {
        Self { api }
    }

    /// Loads the applicant profile.
    ///
    /// Returns `Ok(None)` if the applicant has not created one yet.
    pub async fn get_profile(&self) -> Result<Option<ApplicantProfile>> {
        match self.api.get_profile().await {
            Ok(profile) => Ok(Some(profile)),
            Err(e) if e.is_not_found() => {
                tracing::debug!("No applicant profile yet");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load applicant profile");
                Err(e)
            }
        }
    }

    /// Creates or replaces the applicant profile.
    pub async fn save_profile(&self, update: &ProfileUpdate) -> Result<()> {
        self.api.update_profile(update).await?;
        tracing::info!(enroll_year = update.enroll_year, "Saved applicant profile");
        Ok(())
    }
}

//! Applicant profile: models and API.

pub mod gateway;
pub mod model;

pub use gateway::ApplicantApi;
pub use model::{ApplicantProfile, ProfileUpdate, PROFILE_MISSING_CODE};

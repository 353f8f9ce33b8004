//! Applicant profile models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Server error code returned by `GET /api/applicant/me` when no profile exists yet.
pub const PROFILE_MISSING_CODE: &str = "APPLICANT_002";

/// Departments are sent as one comma-joined string.
const DEPARTMENT_SEPARATOR: char = ',';

/// Applicant profile as returned by `GET /api/applicant/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub enroll_year: i32,
    pub department: String,
    #[serde(default)]
    pub cv_key: String,
}

impl ApplicantProfile {
    /// Departments, main department first.
    pub fn departments(&self) -> Vec<String> {
        split_departments(&self.department)
    }

    /// File name component of the stored CV key.
    pub fn cv_file_name(&self) -> Option<&str> {
        self.cv_key
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
    }
}

/// Body of `PUT /api/applicant/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub enroll_year: i32,
    pub department: String,
    pub cv_key: String,
}

impl ProfileUpdate {
    /// Builds an update from form values.
    ///
    /// `student_year` is the two-digit admission year printed on student IDs.
    pub fn new(student_year: u8, departments: &[String], cv_key: impl Into<String>) -> Self {
        Self {
            enroll_year: expand_enroll_year(student_year),
            department: join_departments(departments),
            cv_key: cv_key.into(),
        }
    }
}

/// Expands a two-digit admission year: below 50 is 20xx, otherwise 19xx.
pub fn expand_enroll_year(two_digit: u8) -> i32 {
    let year = i32::from(two_digit % 100);
    if year < 50 { 2000 + year } else { 1900 + year }
}

pub fn join_departments(departments: &[String]) -> String {
    departments
        .iter()
        .map(|d| d.trim())
        .collect::<Vec<_>>()
        .join(&DEPARTMENT_SEPARATOR.to_string())
}

pub fn split_departments(joined: &str) -> Vec<String> {
    joined
        .split(DEPARTMENT_SEPARATOR)
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect()
}

/// Storage key for an uploaded CV: `static/private/CV/<random>_<YYYYMMDD>/<file>`.
pub fn generate_cv_key(file_name: &str, uploaded_on: NaiveDate) -> String {
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "static/private/CV/{}_{}/{}",
        &nonce[..10],
        uploaded_on.format("%Y%m%d"),
        file_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_enroll_year() {
        assert_eq!(expand_enroll_year(21), 2021);
        assert_eq!(expand_enroll_year(0), 2000);
        assert_eq!(expand_enroll_year(49), 2049);
        assert_eq!(expand_enroll_year(50), 1950);
        assert_eq!(expand_enroll_year(99), 1999);
    }

    #[test]
    fn test_departments_round_trip() {
        let departments = vec!["Computer Science".to_string(), " Economics ".to_string()];
        let update = ProfileUpdate::new(22, &departments, "");
        assert_eq!(update.department, "Computer Science,Economics");
        assert_eq!(split_departments(&update.department), vec!["Computer Science", "Economics"]);
    }

    #[test]
    fn test_cv_file_name() {
        let profile: ApplicantProfile = serde_json::from_str(
            r#"{"enrollYear":2022,"department":"CS","cvKey":"static/private/CV/abc_20250101/resume.pdf"}"#,
        )
        .unwrap();
        assert_eq!(profile.cv_file_name(), Some("resume.pdf"));
        assert_eq!(profile.departments(), vec!["CS"]);
    }

    #[test]
    fn test_generate_cv_key_layout() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        let key = generate_cv_key("resume.pdf", date);

        let parts: Vec<&str> = key.split('/').collect();
        assert_eq!(&parts[..3], &["static", "private", "CV"]);
        assert!(parts[3].ends_with("_20250109"));
        assert_eq!(parts[3].len(), 10 + 1 + 8);
        assert_eq!(parts[4], "resume.pdf");
    }
}

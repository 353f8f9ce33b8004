//! Posting domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel the server sends for postings that accept applications indefinitely.
pub const OPEN_ENDED_SENTINEL: &str = "상시";

/// End of the employment/application window of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmploymentEnd {
    /// No fixed end date.
    OpenEnded,
    /// Applications close at the end of this day.
    Date(NaiveDate),
}

impl EmploymentEnd {
    /// Parses the wire representation.
    ///
    /// Accepts the open-ended sentinel, `YYYY-MM-DD`, or an ISO timestamp whose
    /// first ten characters are a date. Anything else is treated as absent.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw == OPEN_ENDED_SENTINEL {
            return Some(Self::OpenEnded);
        }
        raw.get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
            .map(Self::Date)
    }

    /// Deadline label relative to `today`.
    pub fn deadline(&self, today: NaiveDate) -> Deadline {
        match self {
            Self::OpenEnded => Deadline::OpenEnded,
            Self::Date(end) => {
                let days = (*end - today).num_days();
                match days {
                    d if d < 0 => Deadline::Closed,
                    0 => Deadline::DDay,
                    d => Deadline::DaysLeft(d),
                }
            }
        }
    }
}

impl Serialize for EmploymentEnd {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::OpenEnded => serializer.serialize_str(OPEN_ENDED_SENTINEL),
            Self::Date(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
        }
    }
}

fn deserialize_employment_end<'de, D>(deserializer: D) -> Result<Option<EmploymentEnd>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(EmploymentEnd::parse))
}

/// Time left until a posting closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    OpenEnded,
    Closed,
    DDay,
    DaysLeft(i64),
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deadline::OpenEnded => f.write_str(OPEN_ENDED_SENTINEL),
            Deadline::Closed => f.write_str("마감"),
            Deadline::DDay => f.write_str("D-day"),
            Deadline::DaysLeft(days) => write!(f, "D-{}", days),
        }
    }
}

/// A single internship posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub company_name: String,
    pub position_title: String,
    #[serde(default, deserialize_with = "deserialize_employment_end")]
    pub employment_end_date: Option<EmploymentEnd>,
    /// Mutated only through the bookmark toggle.
    #[serde(default)]
    pub is_bookmarked: bool,
}

impl Post {
    /// Deadline label; postings without an end date count as open-ended.
    pub fn deadline(&self, today: NaiveDate) -> Deadline {
        self.employment_end_date
            .map(|end| end.deadline(today))
            .unwrap_or(Deadline::OpenEnded)
    }
}

/// Response body of `GET /api/recruit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub data: Vec<Post>,
    pub total_pages: u32,
}

/// Response body of `GET /api/post/bookmarks`.
#[derive(Debug, Clone, Deserialize)]
pub struct BookmarkList {
    #[serde(default)]
    pub posts: Vec<Post>,
}

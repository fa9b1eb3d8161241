use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Availability, BookId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Book {
    pub fn availability(&self) -> Availability {
        Availability::from_flag(self.available)
    }

    /// Publisher with the backend's empty-string encoding folded into `None`.
    pub fn publisher(&self) -> Option<&str> {
        non_empty(self.publisher.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(self.description.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Body of `POST /books` and `PUT /books/{id}`.
///
/// `year` is `None` when the entered text carries no leading integer; it is
/// sent as `null` and rejected (or not) by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub description: String,
    pub year: Option<i32>,
    pub publisher: String,
}

/// Parses the leading integer of `raw` the way a lenient form field does:
/// surrounding whitespace is skipped, an optional sign is accepted, and
/// parsing stops at the first non-digit.
pub fn parse_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i32>().ok().map(|value| sign * value)
}

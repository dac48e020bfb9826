//! Output record structures.
//!
//! A field that could not be populated after exhausting retries carries the
//! `FAILURE` sentinel, distinct from `Absent` (not applicable, e.g. the
//! marker record for a week with no qualifying postings).

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Marker value for fields whose capture exhausted all retries.
pub const FAILURE_SENTINEL: &str = "FAILURE";

/// A captured field value: present, failed, or not applicable.
///
/// Serializes as the value itself, the string `"FAILURE"`, or null.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Captured<T> {
    Value(T),
    Failure,
    #[default]
    Absent,
}

impl<T> Captured<T> {
    /// Borrow the inner value if one was captured.
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Captured::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Captured::Value(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Captured::Failure)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Captured::Absent)
    }
}

impl<T: Serialize> Serialize for Captured<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Captured::Value(v) => v.serialize(serializer),
            Captured::Failure => serializer.serialize_str(FAILURE_SENTINEL),
            Captured::Absent => serializer.serialize_none(),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Captured<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<serde_json::Value>::deserialize(deserializer)? {
            None => Ok(Captured::Absent),
            Some(serde_json::Value::String(s)) if s == FAILURE_SENTINEL => Ok(Captured::Failure),
            Some(value) => serde_json::from_value(value)
                .map(Captured::Value)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// One job posting harvested from a weekly compilation.
///
/// A record with `Absent` salary/markup/text fields marks a week that yielded
/// zero posting URLs; one with `Failure` fields marks a posting whose fetch
/// exhausted all retries. Records are never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostingRecord {
    /// Monotonically assigned id, continuing from the store's max
    pub sequence_id: u64,

    /// Week label of the owning compilation, as printed inside its page
    pub week_label: String,

    /// Posting URL; `None` on empty-week marker records
    pub source_url: Option<String>,

    /// Capture timestamp
    pub captured_at: DateTime<Utc>,

    /// Whether the message text mentions salary
    pub has_salary_signal: Captured<bool>,

    /// Raw markup of the message page
    pub raw_markup: Captured<String>,

    /// Normalized plain text of the message
    pub plain_text: Captured<String>,
}

impl PostingRecord {
    /// True if this record carries usable message text.
    pub fn has_text(&self) -> bool {
        self.plain_text.is_value()
    }
}

/// One URL found inside a posting's message text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddedUrlRecord {
    /// Id of the owning posting record
    pub posting_sequence_id: u64,

    /// Monotonically assigned id, continuing from the store's max
    pub sequence_id: u64,

    /// Week label of the owning compilation
    pub week_label: String,

    /// URL of the owning posting
    pub posting_source_url: Option<String>,

    /// The URL found inside the message text
    pub embedded_url: String,

    /// Capture timestamp
    pub captured_at: DateTime<Utc>,

    /// Whether the fetched page mentions salary
    pub has_salary_signal: Captured<bool>,

    /// Raw markup of the fetched page
    pub raw_markup: Captured<String>,

    /// Normalized plain text of the fetched page
    pub plain_text: Captured<String>,
}

//! Response envelope
//!
//! Every successful response carries the same `{status, message, data}`
//! shape; list responses add `total`, and media lists add `newest`, the
//! human-readable timestamp of the most recent upload among the matches.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::query::format_readable;

/// Uniform success envelope
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest: Option<String>,
}

impl<T> Envelope<T> {
    /// Envelope for a single entity or action result
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data: Some(data),
            total: None,
            newest: None,
        }
    }

    /// Envelope for a filtered list with its total match count
    pub fn list(message: impl Into<String>, data: T, total: i64) -> Self {
        Self {
            total: Some(total),
            ..Self::ok(message, data)
        }
    }

    /// Attach the newest-entry timestamp in readable form
    pub fn with_newest(mut self, newest: Option<DateTime<Utc>>) -> Self {
        self.newest = newest.map(format_readable);
        self
    }
}

/// Envelope without a data payload, for deletes and logout
pub fn message_only(message: impl Into<String>) -> Envelope<()> {
    Envelope {
        status: "success",
        message: message.into(),
        data: None,
        total: None,
        newest: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn single_envelope_shape() {
        let envelope = Envelope::ok("Blog retrieved successfully", serde_json::json!({"id": 1}));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["message"], "Blog retrieved successfully");
        assert_eq!(value["data"]["id"], 1);
        assert!(value.get("total").is_none());
        assert!(value.get("newest").is_none());
    }

    #[test]
    fn list_envelope_carries_total_and_newest() {
        let at = Utc.with_ymd_and_hms(2024, 9, 17, 10, 35, 0).unwrap();
        let envelope = Envelope::list("Media retrieved successfully", vec![1, 2], 7)
            .with_newest(Some(at));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["total"], 7);
        assert_eq!(value["newest"], "17 September 2024 at 10:35");
    }

    #[test]
    fn message_only_skips_data() {
        let value = serde_json::to_value(message_only("Deleted")).unwrap();
        assert!(value.get("data").is_none());
    }
}

//! User documents as stored.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::coerce;

/// A single user document: an opaque id plus the raw field map.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub data: Value,
}

impl UserRecord {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Account creation time, if the stored value is parsable. Users
    /// without one still count toward totals but never toward growth.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.data.get("createdAt").and_then(coerce::as_instant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    #[test]
    fn created_at_from_string() {
        let user = UserRecord::new("u1", json!({"createdAt": "2026-08-02T09:00:00Z"}));
        assert_eq!(user.created_at().unwrap().month(), 8);
    }

    #[test]
    fn created_at_from_timestamp_object() {
        let user = UserRecord::new("u1", json!({"createdAt": {"seconds": 1609459200}}));
        assert_eq!(user.created_at().unwrap().year(), 2021);
    }

    #[test]
    fn created_at_absent_is_none() {
        let user = UserRecord::new("u1", json!({"name": "Ada"}));
        assert!(user.created_at().is_none());
    }
}

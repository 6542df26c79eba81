//! Change notification channel

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::RemoteError;

/// One project rename, as seen by listening clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Fresh per event so listeners can tell repeated renames apart
    pub client_key: String,
    pub project: String,
    pub value: String,
    pub change_id: bool,
    pub date: String,
}

impl ChangeEvent {
    pub fn new(previous_name: &str, current_name: &str, identifier_changed: bool) -> Self {
        Self::at(previous_name, current_name, identifier_changed, Utc::now())
    }

    pub fn at(
        previous_name: &str,
        current_name: &str,
        identifier_changed: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            client_key: Uuid::new_v4().to_string(),
            project: previous_name.to_string(),
            value: current_name.to_string(),
            change_id: identifier_changed,
            date: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    /// Publishes the event, merging into the shared document
    async fn publish(&self, event: &ChangeEvent) -> Result<(), RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_fields() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let event = ChangeEvent::at("100 - OldCo", "100 - NewCo", true, ts);
        assert_eq!(event.date, "2024-03-01T12:00:00.000Z");
        assert!(Uuid::parse_str(&event.client_key).is_ok());

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["project"], "100 - OldCo");
        assert_eq!(json["value"], "100 - NewCo");
        assert_eq!(json["changeId"], true);
    }

    #[test]
    fn test_client_key_is_unique_per_event() {
        let a = ChangeEvent::new("a", "b", true);
        let b = ChangeEvent::new("a", "b", true);
        assert_ne!(a.client_key, b.client_key);
    }
}

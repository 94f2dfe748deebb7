use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Experience,
    WantToDo,
    JobSummary,
}

/// Snapshot of a profile object taken before a tool overwrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    #[serde(rename = "toolName")]
    pub tool_name: String,
    #[serde(rename = "objectType")]
    pub object_type: ObjectType,
    #[serde(rename = "previousState")]
    pub previous_state: Value,
}

/// Append-only, process-local log. Nothing is persisted and entries are never
/// evicted.
#[derive(Clone, Default)]
pub struct HistoryLog {
    entries: Arc<RwLock<Vec<HistoryEntry>>>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, tool_name: &str, object_type: ObjectType, previous_state: Value) {
        let entry = HistoryEntry {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            tool_name: tool_name.to_string(),
            object_type,
            previous_state,
        };
        self.entries.write().await.push(entry);
    }

    /// All entries, oldest first.
    pub async fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn keeps_insertion_order() {
        let log = HistoryLog::new();
        log.record("update_want_to_do", ObjectType::WantToDo, json!({"want_to_do": "a"}))
            .await;
        log.record("update_experience", ObjectType::Experience, json!({"id": 1}))
            .await;

        let entries = log.entries().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].tool_name, "update_want_to_do");
        assert_eq!(entries[1].object_type, ObjectType::Experience);
    }

    #[tokio::test]
    async fn clones_share_the_same_log() {
        let log = HistoryLog::new();
        let other = log.clone();
        other
            .record("update_want_to_do", ObjectType::WantToDo, Value::Null)
            .await;
        assert_eq!(log.len().await, 1);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let entry = HistoryEntry {
            timestamp: "2024-01-01T00:00:00.000Z".to_string(),
            tool_name: "update_experience".to_string(),
            object_type: ObjectType::WantToDo,
            previous_state: json!({"want_to_do": "x"}),
        };
        let value = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(value["toolName"], "update_experience");
        assert_eq!(value["objectType"], "want_to_do");
        assert_eq!(value["previousState"]["want_to_do"], "x");
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Rows;
use crate::types::AppResult;

pub const STATUS_CLASSIFYING: &str = "Classifying query...";
pub const STATUS_RESPONDING: &str = "Generating response...";
pub const STATUS_GENERATING_SQL: &str = "Generating SQL query...";
pub const STATUS_EXECUTING: &str = "Executing SQL query...";
pub const STATUS_SUMMARIZING: &str = "Generating summary...";

/// Record terminator on the wire.
pub const RECORD_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Status,
    Intent,
    GenericChunk,
    GenericComplete,
    SqlChunk,
    SqlComplete,
    Data,
    SummaryChunk,
    SummaryComplete,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// One unit of the streaming protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub event: EventKind,
    pub data: EventData,
}

impl ProgressEvent {
    fn text(event: EventKind, content: impl Into<String>) -> Self {
        Self {
            event,
            data: EventData {
                content: Value::String(content.into()),
                data: None,
            },
        }
    }

    pub fn status(message: &str) -> Self {
        Self::text(EventKind::Status, message)
    }

    pub fn intent(label: impl Into<String>) -> Self {
        Self::text(EventKind::Intent, label)
    }

    pub fn chunk(kind: EventKind, fragment: impl Into<String>) -> Self {
        Self::text(kind, fragment)
    }

    pub fn complete(kind: EventKind, full: impl Into<String>) -> Self {
        Self::text(kind, full)
    }

    /// The rows go out twice: as `content` and again under `data`.
    pub fn data(rows: &Rows) -> AppResult<Self> {
        let rows = serde_json::to_value(rows)?;
        Ok(Self {
            event: EventKind::Data,
            data: EventData {
                content: rows.clone(),
                data: Some(rows),
            },
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::text(EventKind::Error, message)
    }

    #[cfg(test)]
    pub(crate) fn is_terminal(&self) -> bool {
        matches!(
            self.event,
            EventKind::Error | EventKind::GenericComplete | EventKind::SummaryComplete
        )
    }

    /// Text content, if the payload is a string.
    pub fn content_str(&self) -> Option<&str> {
        self.data.content.as_str()
    }
}

/// Serialize one event as a `<json>\n\n` record.
pub fn encode(event: &ProgressEvent) -> AppResult<String> {
    let mut record = serde_json::to_string(event)?;
    record.push_str(RECORD_SEPARATOR);
    Ok(record)
}

#[cfg(test)]
pub(crate) fn decode_records(text: &str) -> AppResult<Vec<ProgressEvent>> {
    text.split(RECORD_SEPARATOR)
        .filter(|record| !record.trim().is_empty())
        .map(|record| Ok(serde_json::from_str(record)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_record_shape() {
        let record = encode(&ProgressEvent::status(STATUS_CLASSIFYING)).unwrap();
        assert_eq!(
            record,
            "{\"event\":\"status\",\"data\":{\"content\":\"Classifying query...\"}}\n\n"
        );
    }

    #[test]
    fn test_tags_are_snake_case() {
        let event = ProgressEvent::chunk(EventKind::SummaryChunk, "Sales ");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "summary_chunk");
        assert_eq!(value["data"]["content"], "Sales ");
    }

    #[test]
    fn test_data_event_repeats_rows() {
        let rows: Rows = vec![json!({"n": 1}).as_object().cloned().unwrap()];
        let value = serde_json::to_value(ProgressEvent::data(&rows).unwrap()).unwrap();
        assert_eq!(value["data"]["content"], json!([{"n": 1}]));
        assert_eq!(value["data"]["data"], json!([{"n": 1}]));
    }

    #[test]
    fn test_decode_records() {
        let wire = [
            ProgressEvent::status(STATUS_CLASSIFYING),
            ProgressEvent::intent("generic"),
            ProgressEvent::error("boom\n\nwith blank lines"),
        ]
        .iter()
        .map(|e| encode(e).unwrap())
        .collect::<String>();

        let events = decode_records(&wire).unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[1].content_str(), Some("generic"));
        assert!(events[2].is_terminal());
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod env;
pub mod record;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Event kind emitted for thing lifecycle changes.
pub const THING_EVENT: &str = "THING_EVENT";

/// A lifecycle notification for a single thing.
///
/// Fields not modelled here are collected into `extra` so the payload
/// survives a typed round trip intact.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ThingEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thing_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ThingEvent {
    pub fn is_thing_event(&self) -> bool {
        self.event_type.as_deref() == Some(THING_EVENT)
    }

    /// The recognized registry operation, if any.
    pub fn operation(&self) -> Option<ThingOperation> {
        self.operation.as_deref().and_then(ThingOperation::parse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThingOperation {
    Created,
    Updated,
    Deleted,
}

impl ThingOperation {
    /// Unrecognized operation strings map to `None`; the handler treats
    /// those events as a no-op rather than a failure.
    pub fn parse(value: &str) -> Option<ThingOperation> {
        match value {
            "CREATED" => Some(ThingOperation::Created),
            "UPDATED" => Some(ThingOperation::Updated),
            "DELETED" => Some(ThingOperation::Deleted),
            _ => None,
        }
    }
}

/// Fixed success body returned to the invoker.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RegistryResponse {
    pub code: u16,
}

impl RegistryResponse {
    pub fn ok() -> RegistryResponse {
        RegistryResponse { code: 200 }
    }
}

use crate::ThingEvent;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle state of a registry record.
///
/// Records are never physically removed; a delete transitions the record to
/// `Deleted` and keeps its history fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordState {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "DELETED")]
    Deleted,
}

/// One registry record, keyed by (region, thing name).
///
/// Serde renames match the attribute names of the global registry table, so
/// the same struct is both the domain type and the stored item layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThingRecord {
    #[serde(rename = "AWSRegion")]
    pub region: String,
    #[serde(rename = "ThingName")]
    pub thing_name: String,
    pub state: RecordState,
    #[serde(rename = "accountId", default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    // Raw payloads of the most recent event per operation, kept for audit
    #[serde(
        rename = "eventoriginal_THING_EVENT_CREATED",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub create_event: Option<Value>,
    #[serde(
        rename = "eventoriginal_THING_EVENT_UPDATED",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub update_event: Option<Value>,
    #[serde(
        rename = "eventoriginal_THING_EVENT_DELETED",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub delete_event: Option<Value>,
    #[serde(rename = "timestamp_create", default, skip_serializing_if = "Option::is_none")]
    pub timestamp_create: Option<i64>,
    #[serde(
        rename = "timestamp_lastupdate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp_last_update: Option<i64>,
    #[serde(rename = "timestamp_delete", default, skip_serializing_if = "Option::is_none")]
    pub timestamp_delete: Option<i64>,
}

impl ThingRecord {
    /// A fresh active record, used for CREATED events and for UPDATED events
    /// arriving before the registry has seen the thing.
    pub fn created(region: &str, thing_name: &str, event: &ThingEvent, raw: Value) -> ThingRecord {
        ThingRecord {
            region: region.to_string(),
            thing_name: thing_name.to_string(),
            state: RecordState::Active,
            account_id: event.account_id.clone(),
            attributes: event.attributes.clone(),
            create_event: Some(raw),
            update_event: None,
            delete_event: None,
            timestamp_create: event.timestamp,
            timestamp_last_update: None,
            timestamp_delete: None,
        }
    }

    /// A record materialized directly in `Deleted` state, for DELETED events
    /// naming a thing the registry has never seen.
    pub fn tombstone(region: &str, thing_name: &str, event: &ThingEvent, raw: Value) -> ThingRecord {
        ThingRecord {
            region: region.to_string(),
            thing_name: thing_name.to_string(),
            state: RecordState::Deleted,
            account_id: event.account_id.clone(),
            attributes: event.attributes.clone(),
            create_event: None,
            update_event: None,
            delete_event: Some(raw),
            timestamp_create: None,
            timestamp_last_update: None,
            timestamp_delete: event.timestamp,
        }
    }

    /// Merge an UPDATED event into an existing record. Attributes are
    /// last-write-wins; the owning account and creation history are kept.
    pub fn apply_update(&mut self, event: &ThingEvent, raw: Value) {
        self.state = RecordState::Active;
        self.attributes = event.attributes.clone();
        self.update_event = Some(raw);
        self.timestamp_last_update = event.timestamp;
    }

    /// Merge a DELETED event into an existing record. Attributes and prior
    /// audit fields are preserved, not cleared.
    pub fn apply_delete(&mut self, event: &ThingEvent, raw: Value) {
        self.state = RecordState::Deleted;
        self.delete_event = Some(raw);
        self.timestamp_delete = event.timestamp;
    }
}

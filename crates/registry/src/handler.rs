use crate::HandlerError;
use lambda_runtime::tracing;
use model::record::ThingRecord;
use model::{RegistryResponse, ThingEvent, ThingOperation};
use serde_json::Value;
use std::sync::Arc;
use store::RegistryStore;

/// Applies thing lifecycle events to the global registry.
///
/// One event per call: dispatch on the operation, optionally read the
/// existing record, merge or construct the replacement, write it back.
/// The read-merge-write is not guarded by a conditional write; concurrent
/// events for the same thing race with last-write-wins at the table.
pub struct RegistryHandler {
    store: Arc<dyn RegistryStore>,
    region: String,
}

impl RegistryHandler {
    pub fn new(store: Arc<dyn RegistryStore>, region: String) -> RegistryHandler {
        RegistryHandler { store, region }
    }

    /// Handle one lifecycle event, given as the raw invocation payload.
    ///
    /// The raw payload is kept alongside the typed view so the audit fields
    /// store the event exactly as it arrived.
    pub async fn handle(&self, payload: Value) -> Result<RegistryResponse, HandlerError> {
        tracing::info!("Received event: {}", payload);

        let event: ThingEvent = serde_json::from_value(payload.clone())
            .map_err(|err| HandlerError::BadEvent(err.to_string()))?;

        if !event.is_thing_event() {
            let event_type: String = event.event_type.unwrap_or_default();
            tracing::info!("Invalid event type {}", event_type);

            return Err(HandlerError::UnsupportedEventType(event_type));
        }

        let operation: ThingOperation = match event.operation() {
            Some(operation) => operation,
            None => {
                // Unrecognized operations are ignored, not failed
                tracing::warn!(
                    "Ignoring THING_EVENT with unhandled operation {:?}",
                    event.operation
                );

                return Ok(RegistryResponse::ok());
            }
        };

        let thing_name: String = event
            .thing_name
            .clone()
            .ok_or_else(|| HandlerError::BadEvent("missing thingName".to_string()))?;

        match operation {
            ThingOperation::Created => self.handle_created(&thing_name, &event, payload).await?,
            ThingOperation::Updated => self.handle_updated(&thing_name, &event, payload).await?,
            ThingOperation::Deleted => self.handle_deleted(&thing_name, &event, payload).await?,
        }

        Ok(RegistryResponse::ok())
    }

    /// A CREATED event always writes a fresh record, overwriting whatever is
    /// stored under the key. Duplicate CREATEs are deterministic overwrites.
    async fn handle_created(
        &self,
        thing_name: &str,
        event: &ThingEvent,
        payload: Value,
    ) -> Result<(), HandlerError> {
        tracing::info!("Processing THING_EVENT/CREATED");

        let record: ThingRecord = ThingRecord::created(&self.region, thing_name, event, payload);
        self.store.put_record(record).await?;

        Ok(())
    }

    async fn handle_updated(
        &self,
        thing_name: &str,
        event: &ThingEvent,
        payload: Value,
    ) -> Result<(), HandlerError> {
        tracing::info!("Processing THING_EVENT/UPDATED");

        let record: ThingRecord = match self.store.get_record(&self.region, thing_name).await? {
            None => {
                // An update may arrive before the create; materialize the
                // record as if this event had created it
                tracing::info!(
                    "Thing {} is being updated but is not in the global registry yet, adding it",
                    thing_name
                );

                ThingRecord::created(&self.region, thing_name, event, payload)
            }
            Some(mut record) => {
                tracing::info!("Found {:?}, will update it", record);

                record.apply_update(event, payload);
                record
            }
        };

        self.store.put_record(record).await?;

        Ok(())
    }

    async fn handle_deleted(
        &self,
        thing_name: &str,
        event: &ThingEvent,
        payload: Value,
    ) -> Result<(), HandlerError> {
        tracing::info!("Processing THING_EVENT/DELETED");

        let record: ThingRecord = match self.store.get_record(&self.region, thing_name).await? {
            None => {
                tracing::info!(
                    "Thing {} is being deleted but is not in the global registry yet, adding it in DELETED state",
                    thing_name
                );

                ThingRecord::tombstone(&self.region, thing_name, event, payload)
            }
            Some(mut record) => {
                tracing::info!("Found {:?}, will delete it", record);

                record.apply_delete(event, payload);
                record
            }
        };

        self.store.put_record(record).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HandlerError;
    use async_trait::async_trait;
    use model::record::RecordState;
    use serde_json::json;
    use store::StoreErrorReason::BackendFailure;
    use store::StoreOperation::{GetRecord, PutRecord};
    use store::{record_key, StoreError};
    use store_in_memory::InMemoryRegistryStore;
    use test_utils::{thing_event, thing_event_with_attributes, TEST_ACCOUNT, TEST_REGION};

    fn handler_with_store() -> (RegistryHandler, Arc<InMemoryRegistryStore>) {
        let store: Arc<InMemoryRegistryStore> = Arc::new(InMemoryRegistryStore::default());
        let handler = RegistryHandler::new(store.clone(), TEST_REGION.to_string());

        (handler, store)
    }

    #[tokio::test]
    async fn rejects_unsupported_event_type_without_touching_store() {
        let (handler, store) = handler_with_store();

        let result = handler
            .handle(json!({"eventType": "OTHER", "operation": "CREATED"}))
            .await;

        assert!(matches!(result, Err(HandlerError::UnsupportedEventType(t)) if t == "OTHER"));
        assert_eq!(0, store.reads());
        assert_eq!(0, store.writes());
    }

    #[tokio::test]
    async fn rejects_payload_without_event_type() {
        let (handler, store) = handler_with_store();

        let result = handler.handle(json!({"operation": "CREATED"})).await;

        assert!(matches!(result, Err(HandlerError::UnsupportedEventType(_))));
        assert_eq!(0, store.writes());
    }

    #[tokio::test]
    async fn rejects_non_object_payload() {
        let (handler, store) = handler_with_store();

        let result = handler.handle(json!("not an event")).await;

        assert!(matches!(result, Err(HandlerError::BadEvent(_))));
        assert_eq!(0, store.reads());
        assert_eq!(0, store.writes());
    }

    #[tokio::test]
    async fn ignores_unhandled_operation() {
        let (handler, store) = handler_with_store();

        let response = handler
            .handle(thing_event("RENAMED", "sensor-1", 100))
            .await
            .expect("Unhandled operations should succeed as no-ops");

        assert_eq!(RegistryResponse::ok(), response);
        assert_eq!(0, store.reads());
        assert_eq!(0, store.writes());
    }

    #[tokio::test]
    async fn create_writes_active_record() {
        let (handler, store) = handler_with_store();
        let payload = thing_event("CREATED", "sensor-1", 100);

        let response = handler.handle(payload.clone()).await.unwrap();
        assert_eq!(RegistryResponse::ok(), response);

        let record = store.record(TEST_REGION, "sensor-1").unwrap();
        assert_eq!(RecordState::Active, record.state);
        assert_eq!(TEST_REGION, record.region);
        assert_eq!(Some(TEST_ACCOUNT), record.account_id.as_deref());
        assert_eq!(Some(&json!("1.0")), record.attributes.as_ref().unwrap().get("fw"));
        assert_eq!(Some(&payload), record.create_event.as_ref());
        assert_eq!(Some(100), record.timestamp_create);
        // A create never reads the existing record first
        assert_eq!(0, store.reads());
        assert_eq!(1, store.writes());
    }

    #[tokio::test]
    async fn duplicate_create_is_idempotent() {
        let (handler, store) = handler_with_store();
        let payload = thing_event("CREATED", "sensor-1", 100);

        handler.handle(payload.clone()).await.unwrap();
        let after_first = store.record(TEST_REGION, "sensor-1").unwrap();

        handler.handle(payload).await.unwrap();
        let after_second = store.record(TEST_REGION, "sensor-1").unwrap();

        assert_eq!(after_first, after_second);
        assert_eq!(2, store.writes());
    }

    #[tokio::test]
    async fn create_overwrites_existing_record() {
        let (handler, store) = handler_with_store();

        handler
            .handle(thing_event_with_attributes("CREATED", "sensor-1", 100, json!({"fw": "1.0"})))
            .await
            .unwrap();
        handler
            .handle(thing_event_with_attributes("CREATED", "sensor-1", 500, json!({"fw": "2.0"})))
            .await
            .unwrap();

        let record = store.record(TEST_REGION, "sensor-1").unwrap();
        assert_eq!(Some(500), record.timestamp_create);
        assert_eq!(Some(&json!("2.0")), record.attributes.as_ref().unwrap().get("fw"));
        assert_eq!(None, record.timestamp_last_update);
    }

    #[tokio::test]
    async fn update_of_unknown_thing_materializes_record() {
        let (handler, store) = handler_with_store();
        let payload = thing_event("UPDATED", "sensor-1", 200);

        handler.handle(payload.clone()).await.unwrap();

        let record = store.record(TEST_REGION, "sensor-1").unwrap();
        assert_eq!(RecordState::Active, record.state);
        // Treated as an implicit creation, audited as such
        assert_eq!(Some(&payload), record.create_event.as_ref());
        assert_eq!(None, record.update_event);
        assert_eq!(Some(200), record.timestamp_create);
        assert_eq!(None, record.timestamp_last_update);
    }

    #[tokio::test]
    async fn update_of_existing_thing_replaces_attributes() {
        let (handler, store) = handler_with_store();
        let create_payload = thing_event_with_attributes("CREATED", "sensor-1", 100, json!({"fw": "1.0"}));
        let update_payload = thing_event_with_attributes("UPDATED", "sensor-1", 200, json!({"fw": "1.1"}));

        handler.handle(create_payload.clone()).await.unwrap();
        handler.handle(update_payload.clone()).await.unwrap();

        let record = store.record(TEST_REGION, "sensor-1").unwrap();
        assert_eq!(RecordState::Active, record.state);
        assert_eq!(Some(&json!("1.1")), record.attributes.as_ref().unwrap().get("fw"));
        assert_eq!(Some(100), record.timestamp_create);
        assert_eq!(Some(200), record.timestamp_last_update);
        assert_eq!(Some(&create_payload), record.create_event.as_ref());
        assert_eq!(Some(&update_payload), record.update_event.as_ref());
    }

    #[tokio::test]
    async fn delete_of_existing_thing_preserves_attributes() {
        let (handler, store) = handler_with_store();
        let update_payload = thing_event_with_attributes("UPDATED", "sensor-1", 200, json!({"fw": "1.1"}));
        let delete_payload = json!({
            "eventType": "THING_EVENT",
            "operation": "DELETED",
            "thingName": "sensor-1",
            "timestamp": 300,
        });

        handler.handle(thing_event("CREATED", "sensor-1", 100)).await.unwrap();
        handler.handle(update_payload).await.unwrap();
        handler.handle(delete_payload.clone()).await.unwrap();

        let record = store.record(TEST_REGION, "sensor-1").unwrap();
        assert_eq!(RecordState::Deleted, record.state);
        assert_eq!(Some(&json!("1.1")), record.attributes.as_ref().unwrap().get("fw"));
        assert_eq!(Some(100), record.timestamp_create);
        assert_eq!(Some(200), record.timestamp_last_update);
        assert_eq!(Some(300), record.timestamp_delete);
        assert_eq!(Some(&delete_payload), record.delete_event.as_ref());
        // Prior audit fields survive the delete
        assert!(record.create_event.is_some());
        assert!(record.update_event.is_some());
    }

    #[tokio::test]
    async fn delete_of_unknown_thing_writes_tombstone() {
        let (handler, store) = handler_with_store();
        let payload = thing_event("DELETED", "sensor-9", 300);

        handler.handle(payload.clone()).await.unwrap();

        let record = store.record(TEST_REGION, "sensor-9").unwrap();
        assert_eq!(RecordState::Deleted, record.state);
        assert_eq!(Some(&payload), record.delete_event.as_ref());
        assert_eq!(Some(300), record.timestamp_delete);
        assert_eq!(None, record.timestamp_create);
        assert_eq!(None, record.create_event);
    }

    #[tokio::test]
    async fn missing_thing_name_is_a_bad_event() {
        let (handler, store) = handler_with_store();

        let result = handler
            .handle(json!({"eventType": "THING_EVENT", "operation": "CREATED", "timestamp": 100}))
            .await;

        assert!(matches!(result, Err(HandlerError::BadEvent(_))));
        assert_eq!(0, store.writes());
    }

    #[tokio::test]
    async fn store_failure_aborts_the_invocation() {
        struct FailingStore;

        #[async_trait]
        impl RegistryStore for FailingStore {
            async fn get_record(
                &self,
                region: &str,
                thing_name: &str,
            ) -> Result<Option<ThingRecord>, StoreError> {
                Err(StoreError::new(
                    record_key(region, thing_name),
                    GetRecord,
                    BackendFailure("connection reset".into()),
                ))
            }

            async fn put_record(&self, record: ThingRecord) -> Result<(), StoreError> {
                Err(StoreError::new(
                    record_key(&record.region, &record.thing_name),
                    PutRecord,
                    BackendFailure("connection reset".into()),
                ))
            }
        }

        let handler = RegistryHandler::new(Arc::new(FailingStore), TEST_REGION.to_string());

        let read_failure = handler.handle(thing_event("UPDATED", "sensor-1", 200)).await;
        assert!(matches!(read_failure, Err(HandlerError::Store(_))));

        let write_failure = handler.handle(thing_event("CREATED", "sensor-1", 100)).await;
        assert!(matches!(write_failure, Err(HandlerError::Store(_))));
    }
}

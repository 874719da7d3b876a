use async_trait::async_trait;
use model::record::ThingRecord;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use store::{RegistryStore, StoreError};

/// Registry store held in process memory, used in tests and local runs.
///
/// Reads and writes going through the `RegistryStore` trait are counted so
/// tests can assert that a code path performed no table interaction.
pub struct InMemoryRegistryStore {
    records: Arc<Mutex<HashMap<(String, String), ThingRecord>>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl Default for InMemoryRegistryStore {
    fn default() -> Self {
        InMemoryRegistryStore {
            records: Arc::new(Mutex::new(Default::default())),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }
}

impl InMemoryRegistryStore {
    /// Seed a record directly, bypassing the store counters.
    pub fn insert(&self, record: ThingRecord) {
        self.records
            .lock()
            .unwrap()
            .insert((record.region.clone(), record.thing_name.clone()), record);
    }

    /// Peek at a stored record, bypassing the store counters.
    pub fn record(&self, region: &str, thing_name: &str) -> Option<ThingRecord> {
        self.records
            .lock()
            .unwrap()
            .get(&(region.to_string(), thing_name.to_string()))
            .cloned()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryStore for InMemoryRegistryStore {
    async fn get_record(
        &self,
        region: &str,
        thing_name: &str,
    ) -> Result<Option<ThingRecord>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let record: Option<ThingRecord> = self
            .records
            .lock()
            .unwrap()
            .get(&(region.to_string(), thing_name.to_string()))
            .cloned();

        Ok(record)
    }

    async fn put_record(&self, record: ThingRecord) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);

        self.records
            .lock()
            .unwrap()
            .insert((record.region.clone(), record.thing_name.clone()), record);

        Ok(())
    }
}

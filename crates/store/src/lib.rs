use async_trait::async_trait;
use model::record::ThingRecord;
use model::Error;
use std::fmt::{Debug, Display, Formatter};

/// Store one registry record per (region, thing name) pair.
///
/// The table is addressed by point reads and full-item overwrites only; no
/// range queries and no conditional writes. An absent record is `Ok(None)`
/// rather than an error: updates and deletes for things the registry has
/// never seen materialize a fresh record, so absence is a normal branch.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    async fn get_record(
        &self,
        region: &str,
        thing_name: &str,
    ) -> Result<Option<ThingRecord>, StoreError>;

    async fn put_record(&self, record: ThingRecord) -> Result<(), StoreError>;
}

/// Key under which a record is stored, used in errors and logs.
pub fn record_key(region: &str, thing_name: &str) -> String {
    format!("{}/{}", region, thing_name)
}

/// Errors arising from reading or writing the registry table.
#[derive(Debug)]
pub struct StoreError {
    pub record_key: String,

    pub operation: StoreOperation,
    pub reason: StoreErrorReason,
}

#[derive(Debug)]
pub enum StoreErrorReason {
    // The record could not be converted to or from the stored item
    BadRecord(String),
    // An error from the underlying table
    BackendFailure(Error),
}

#[derive(Debug, Clone)]
pub enum StoreOperation {
    GetRecord,
    PutRecord,
}

impl StoreError {
    pub fn new(record_key: String, operation: StoreOperation, reason: StoreErrorReason) -> Self {
        StoreError {
            record_key,
            operation,
            reason,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(format!("{:?}", self).as_str())
    }
}

impl std::error::Error for StoreError {}

use async_trait::async_trait;
use aws_sdk_dynamodb::config::http::HttpResponse;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::get_item::{GetItemError, GetItemOutput};
use aws_sdk_dynamodb::operation::put_item::{PutItemError, PutItemOutput};
use aws_sdk_dynamodb::types::AttributeValue;
use lambda_runtime::tracing;
use model::record::ThingRecord;
use std::collections::HashMap;
use store::StoreErrorReason::{BackendFailure, BadRecord};
use store::StoreOperation::{GetRecord, PutRecord};
use store::{record_key, RegistryStore, StoreError};

const REGION_KEY: &str = "AWSRegion";
const THING_NAME_KEY: &str = "ThingName";

/// Registry store over a DynamoDB global table.
///
/// Records are whole items addressed by the (`AWSRegion`, `ThingName`)
/// composite key; every write is a full-item overwrite.
pub struct DynamoDbRegistryStore {
    table_name: String,
    dynamodb_client: aws_sdk_dynamodb::Client,
    consistent_read: bool,
}

impl DynamoDbRegistryStore {
    pub fn new(dynamodb_client: aws_sdk_dynamodb::Client, table_name: String) -> Self {
        tracing::info!("Using DynamoDB table {}", table_name);

        DynamoDbRegistryStore {
            table_name,
            dynamodb_client,
            consistent_read: false,
        }
    }

    pub fn with_consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = consistent_read;
        self
    }

    async fn get_item(
        &self,
        key_parts: &[(&str, &str)],
    ) -> Result<GetItemOutput, SdkError<GetItemError, HttpResponse>> {
        let key: HashMap<String, AttributeValue> = key_parts
            .iter()
            .map(|&(k, v)| (k.to_string(), AttributeValue::S(v.to_string())))
            .collect();

        self.dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .consistent_read(self.consistent_read)
            .set_key(Some(key))
            .send()
            .await
    }

    async fn put_item(
        &self,
        item: HashMap<String, AttributeValue>,
    ) -> Result<PutItemOutput, SdkError<PutItemError, HttpResponse>> {
        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
    }
}

#[async_trait]
impl RegistryStore for DynamoDbRegistryStore {
    async fn get_record(
        &self,
        region: &str,
        thing_name: &str,
    ) -> Result<Option<ThingRecord>, StoreError> {
        let key: String = record_key(region, thing_name);

        let output: GetItemOutput = self
            .get_item(&[(REGION_KEY, region), (THING_NAME_KEY, thing_name)])
            .await
            .map_err(|err| StoreError::new(key.clone(), GetRecord, BackendFailure(err.into())))?;

        let item: HashMap<String, AttributeValue> = match output.item {
            Some(item) => item,
            None => {
                tracing::debug!("No record stored for {}", key);

                return Ok(None);
            }
        };

        let record: ThingRecord = serde_dynamo::from_item(item)
            .map_err(|err| StoreError::new(key, GetRecord, BadRecord(err.to_string())))?;

        Ok(Some(record))
    }

    async fn put_record(&self, record: ThingRecord) -> Result<(), StoreError> {
        let key: String = record_key(&record.region, &record.thing_name);

        let item: HashMap<String, AttributeValue> = serde_dynamo::to_item(&record)
            .map_err(|err| StoreError::new(key.clone(), PutRecord, BadRecord(err.to_string())))?;

        self.put_item(item)
            .await
            .map_err(|err| StoreError::new(key, PutRecord, BackendFailure(err.into())))?;

        Ok(())
    }
}

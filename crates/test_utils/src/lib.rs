use aws_sdk_dynamodb::operation::get_item::GetItemOutput;
use aws_sdk_dynamodb::operation::put_item::PutItemOutput;
use aws_smithy_mocks::{mock, mock_client, Rule};
use model::record::ThingRecord;
use model::ThingEvent;
use serde_json::{json, Value};

/// Region and table values shared across tests
pub const TEST_REGION: &str = "eu-west-1";
pub const TEST_TABLE: &str = "GlobalIoTDeviceRegistyTableName";
pub const TEST_ACCOUNT: &str = "123456789012";

/// A lifecycle event payload with the default test account and firmware
/// attributes.
pub fn thing_event(operation: &str, thing_name: &str, timestamp: i64) -> Value {
    thing_event_with_attributes(operation, thing_name, timestamp, json!({"fw": "1.0"}))
}

/// A lifecycle event payload with explicit attributes.
pub fn thing_event_with_attributes(
    operation: &str,
    thing_name: &str,
    timestamp: i64,
    attributes: Value,
) -> Value {
    json!({
        "eventType": "THING_EVENT",
        "operation": operation,
        "thingName": thing_name,
        "accountId": TEST_ACCOUNT,
        "attributes": attributes,
        "timestamp": timestamp,
    })
}

/// A record as the registry would store it after handling `payload`.
pub fn record_from_create(region: &str, payload: Value) -> ThingRecord {
    let event: ThingEvent =
        serde_json::from_value(payload.clone()).expect("Payload should parse as a thing event");
    let thing_name: &str = event
        .thing_name
        .as_deref()
        .expect("Payload should name a thing");

    ThingRecord::created(region, thing_name, &event, payload)
}

/// A default mock DynamoDB client: every read misses, every write succeeds.
pub fn create_mock_dynamodb_client() -> aws_sdk_dynamodb::Client {
    let get_item_rule: Rule = mock!(aws_sdk_dynamodb::Client::get_item)
        .match_requests(|_| true)
        .sequence()
        .output(|| GetItemOutput::builder().build())
        .repeatedly()
        .build();
    let put_item_rule: Rule = mock!(aws_sdk_dynamodb::Client::put_item)
        .match_requests(|_| true)
        .sequence()
        .output(|| PutItemOutput::builder().build())
        .repeatedly()
        .build();

    mock_client!(aws_sdk_dynamodb, [&get_item_rule, &put_item_rule])
}

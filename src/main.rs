use crate::config::RegistryConfig;
use aws_config::BehaviorVersion;
use lambda_runtime::{service_fn, tracing, Error, LambdaEvent};
use model::RegistryResponse;
use registry::RegistryHandler;
use serde_json::Value;
use std::sync::Arc;
use store_dynamodb::DynamoDbRegistryStore;

mod config;

/// One invocation carries one lifecycle event as a raw JSON payload.
async fn function_handler(
    handler: &RegistryHandler,
    event: LambdaEvent<Value>,
) -> Result<RegistryResponse, Error> {
    let response: RegistryResponse = handler.handle(event.payload).await?;

    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config: RegistryConfig = RegistryConfig::from_env()?;
    tracing::info!("Region is {}", config.region);

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let store = DynamoDbRegistryStore::new(
        aws_sdk_dynamodb::Client::new(&aws_config),
        config.table_name.clone(),
    );
    let handler = RegistryHandler::new(Arc::new(store), config.region.clone());

    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| {
        function_handler(&handler, event)
    }))
    .await
}

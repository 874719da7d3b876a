use model::env::{AWS_REGION, DDB_TABLE_NAME};
use model::Error;
use std::env;

/// Placeholder table name injected by `sam local invoke`; rewritten to the
/// deployed global table so local invocations hit real registry state.
const LOCAL_TABLE_PLACEHOLDER: &str = "MyGlobalIoTDeviceRegistyTable";
const GLOBAL_TABLE_NAME: &str = "GlobalIoTDeviceRegistyTableName";

/// Process-wide configuration, resolved once before any event is handled.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub table_name: String,
    pub region: String,
}

impl RegistryConfig {
    pub fn from_env() -> Result<RegistryConfig, Error> {
        RegistryConfig::resolve(env::var(DDB_TABLE_NAME).ok(), env::var(AWS_REGION).ok())
    }

    fn resolve(
        table_name: Option<String>,
        region: Option<String>,
    ) -> Result<RegistryConfig, Error> {
        let table_name: String =
            table_name.ok_or(format!("Missing {} environment variable", DDB_TABLE_NAME))?;
        let region: String =
            region.ok_or(format!("Missing {} environment variable", AWS_REGION))?;

        let table_name: String = if table_name == LOCAL_TABLE_PLACEHOLDER {
            GLOBAL_TABLE_NAME.to_string()
        } else {
            table_name
        };

        Ok(RegistryConfig { table_name, region })
    }
}

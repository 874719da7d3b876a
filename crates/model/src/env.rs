/// Environment variable containing the registry table name
pub const DDB_TABLE_NAME: &'static str = "DDB_TABLE_NAME";
/// Environment variable containing the deployment region
pub const AWS_REGION: &'static str = "AWS_REGION";

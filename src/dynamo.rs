use crate::config::Config;
use crate::error::CatalogError;
use crate::store::{ContainsFilter, RawScan, TableScanner};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::{debug, info};

/// [`TableScanner`] backed by a DynamoDB table.
#[derive(Debug, Clone)]
pub struct DynamoScanner {
    client: Client,
    table_name: String,
}

impl DynamoScanner {
    /// Resolves credentials through the default AWS chain for the configured
    /// region (and endpoint override, if any).
    pub async fn from_config(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            info!("Using DynamoDB endpoint override {}", endpoint);
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;
        Self::new(Client::new(&shared), config.table_name.clone())
    }

    pub fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    /// Checks that the table is reachable.
    pub async fn probe(&self) -> Result<(), CatalogError> {
        let output = self
            .client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| CatalogError::BackendUnavailable(DisplayErrorContext(&e).to_string()))?;
        let status = output
            .table()
            .and_then(|t| t.table_status())
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        info!("Table '{}' reachable (status {})", self.table_name, status);
        Ok(())
    }
}

#[async_trait]
impl TableScanner for DynamoScanner {
    async fn scan(&self, filter: Option<&ContainsFilter>) -> Result<RawScan, CatalogError> {
        let mut request = self.client.scan().table_name(&self.table_name);
        if let Some(filter) = filter {
            debug!(
                attribute = %filter.attribute,
                value = %filter.value,
                "Scanning with contains filter"
            );
            request = request
                .filter_expression("contains(#attr, :value)")
                .expression_attribute_names("#attr", &filter.attribute)
                .expression_attribute_values(":value", AttributeValue::S(filter.value.clone()));
        }

        let output = request
            .send()
            .await
            .map_err(|e| CatalogError::BackendUnavailable(DisplayErrorContext(&e).to_string()))?;

        Ok(RawScan {
            count: i64::from(output.count()),
            items: output.items().to_vec(),
        })
    }
}

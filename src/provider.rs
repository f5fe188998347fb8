//! The openHAB provider.
//!
//! [`OpenhabProvider`] implements [`ProviderService`] by dispatching to the
//! registered [`Resource`]s. `configure` builds a [`ProviderContext`] once;
//! every resource operation receives it explicitly.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::client::OpenhabClient;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::resources::{ItemResource, LinkResource, Resource};
use crate::schema::{Diagnostic, ProviderSchema};
use crate::server::ProviderService;
use crate::types::{ApplyResult, ImportedResource, PlanResult};

/// Everything a resource operation needs once the provider is configured.
#[derive(Debug, Clone)]
pub struct ProviderContext {
    /// Client for the configured openHAB server.
    pub client: OpenhabClient,
    /// Provider version, sent as part of the user agent.
    pub version: String,
}

/// Provider managing openHAB items and links.
pub struct OpenhabProvider {
    version: String,
    context: OnceCell<ProviderContext>,
    resources: HashMap<&'static str, Arc<dyn Resource>>,
}

impl std::fmt::Debug for OpenhabProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenhabProvider")
            .field("version", &self.version)
            .field("configured", &self.context.initialized())
            .field("resources", &self.resource_types())
            .finish()
    }
}

impl OpenhabProvider {
    /// Create an unconfigured provider with all resources registered.
    pub fn new(version: impl Into<String>) -> Self {
        let mut provider = Self {
            version: version.into(),
            context: OnceCell::new(),
            resources: HashMap::new(),
        };
        provider.register(ItemResource);
        provider.register(LinkResource);
        provider
    }

    fn register(&mut self, resource: impl Resource + 'static) {
        self.resources.insert(resource.type_name(), Arc::new(resource));
    }

    /// Provider version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Registered resource type names, sorted.
    pub fn resource_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.resources.keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// The context built by `configure`.
    pub fn context(&self) -> Result<&ProviderContext, ProviderError> {
        self.context.get().ok_or_else(|| {
            ProviderError::Configuration(
                "provider is not configured; configure must be called first".to_string(),
            )
        })
    }

    fn resource(&self, resource_type: &str) -> Result<&dyn Resource, ProviderError> {
        self.resources
            .get(resource_type)
            .map(|r| r.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }
}

fn already_configured() -> Vec<Diagnostic> {
    vec![Diagnostic::error("Provider already configured")
        .with_detail("configure may only be called once per provider process")]
}

#[async_trait::async_trait]
impl ProviderService for OpenhabProvider {
    fn schema(&self) -> ProviderSchema {
        self.resources.values().fold(
            ProviderSchema::new().with_provider_config(ProviderConfig::schema()),
            |schema, resource| schema.with_resource(resource.type_name(), resource.schema()),
        )
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(ProviderConfig::validate(&config))
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        if self.context.initialized() {
            return Ok(already_configured());
        }

        let config = match ProviderConfig::from_json(&config) {
            Ok(config) => config,
            Err(diagnostics) => return Ok(diagnostics),
        };

        let client = match OpenhabClient::new(&config, &self.version) {
            Ok(client) => client,
            Err(e) => {
                return Ok(vec![Diagnostic::error("Client Error")
                    .with_detail(format!("Unable to create client, got error: {}", e))])
            },
        };

        let context = ProviderContext {
            client,
            version: self.version.clone(),
        };
        if self.context.set(context).is_err() {
            return Ok(already_configured());
        }

        info!(endpoint = %config.endpoint, "Provider configured");
        Ok(vec![])
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        debug!("Provider stopping");
        Ok(())
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(self.resource(resource_type)?.validate(&config))
    }

    async fn upgrade_resource_state(
        &self,
        resource_type: &str,
        version: i64,
        state: Value,
    ) -> Result<Value, ProviderError> {
        let current = self.resource(resource_type)?.schema().version;
        if u64::try_from(version).map_or(true, |v| v > current) {
            return Err(ProviderError::InvalidRequest(format!(
                "state of {} has schema version {}, this provider supports up to {}",
                resource_type, version, current
            )));
        }
        Ok(state)
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.resource(resource_type)?
            .plan(prior_state.as_ref(), proposed_state)
    }

    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<ApplyResult, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.create(self.context()?, planned_state).await
    }

    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Option<Value>, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.read(self.context()?, current_state).await
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<ApplyResult, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource
            .update(self.context()?, prior_state, planned_state)
            .await
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.delete(self.context()?, current_state).await
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.import(self.context()?, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> Value {
        json!({"endpoint": "http://localhost:8080/rest", "api_token": "oh.token"})
    }

    #[test]
    fn test_schema() {
        let provider = OpenhabProvider::new("test");
        let schema = provider.schema();
        assert!(schema.provider.attributes.contains_key("endpoint"));
        assert!(schema.provider.attributes["api_token"].flags.sensitive);
        assert!(schema.resources.contains_key("openhab_item"));
        assert!(schema.resources.contains_key("openhab_link"));

        assert_eq!(provider.resource_types(), vec!["openhab_item", "openhab_link"]);
        assert_eq!(
            provider.metadata().resources,
            vec!["openhab_item".to_string(), "openhab_link".to_string()]
        );
    }

    #[tokio::test]
    async fn test_configure_once() {
        let provider = OpenhabProvider::new("test");
        assert!(provider.context().is_err());

        let diagnostics = provider.configure(config()).await.unwrap();
        assert!(diagnostics.is_empty());

        let ctx = provider.context().unwrap();
        assert_eq!(ctx.version, "test");
        assert_eq!(ctx.client.base_url().as_str(), "http://localhost:8080/rest");

        let diagnostics = provider.configure(config()).await.unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Provider already configured");
    }

    #[tokio::test]
    async fn test_configure_invalid() {
        let provider = OpenhabProvider::new("test");
        let diagnostics = provider
            .configure(json!({"endpoint": "ftp://openhab", "api_token": "t"}))
            .await
            .unwrap();
        assert_eq!(diagnostics[0].summary, "Invalid endpoint");
        assert!(provider.context().is_err());
    }

    #[tokio::test]
    async fn test_unknown_resource_type() {
        let provider = OpenhabProvider::new("test");
        let err = provider
            .validate_resource_config("openhab_thing", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn test_operations_require_configure() {
        let provider = OpenhabProvider::new("test");
        let err = provider
            .read("openhab_item", json!({"name": "Light"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));

        // planning is offline
        assert!(provider
            .plan("openhab_item", None, json!({"name": "Light"}), json!({}))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_upgrade_resource_state() {
        let provider = OpenhabProvider::new("test");
        let state = json!({"id": "Light"});
        let upgraded = provider
            .upgrade_resource_state("openhab_item", 0, state.clone())
            .await
            .unwrap();
        assert_eq!(upgraded, state);

        let err = provider
            .upgrade_resource_state("openhab_item", 3, state)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRequest(_)));
    }
}

//! Resource handlers.
//!
//! Each managed openHAB object is a [`Resource`]: it owns its schema, decodes
//! host JSON into a typed model once, and maps the lifecycle operations onto
//! [`OpenhabClient`](crate::client::OpenhabClient) calls. The provider keeps a
//! registry of resources keyed by [`Resource::type_name`].

mod item;
mod link;

pub use item::{ItemModel, ItemResource};
pub use link::{LinkModel, LinkResource};

use serde_json::Value;

use crate::error::ProviderError;
use crate::plan::plan_resource;
use crate::provider::ProviderContext;
use crate::schema::{Diagnostic, Schema};
use crate::types::{ApplyResult, ImportedResource, PlanResult};
use crate::validation::validate;
use crate::value::AttrValue;

/// A resource type managed by the provider.
#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    /// Type name, e.g. `openhab_item`.
    fn type_name(&self) -> &'static str;

    /// Schema of the resource.
    fn schema(&self) -> Schema;

    /// Validate a resource block. Never touches the server.
    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        validate(&self.schema(), config)
    }

    /// Plan a create, update or destroy.
    fn plan(&self, prior: Option<&Value>, proposed: Value) -> Result<PlanResult, ProviderError> {
        Ok(plan_resource(&self.schema(), prior, proposed))
    }

    /// Create the remote object from the planned state.
    async fn create(&self, ctx: &ProviderContext, planned: Value)
        -> Result<ApplyResult, ProviderError>;

    /// Refresh the state; `None` when the remote object is gone.
    async fn read(&self, ctx: &ProviderContext, current: Value)
        -> Result<Option<Value>, ProviderError>;

    /// Apply an in-place update.
    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: Value,
        planned: Value,
    ) -> Result<ApplyResult, ProviderError>;

    /// Remove the remote object. Already gone is not an error.
    async fn delete(&self, ctx: &ProviderContext, current: Value) -> Result<(), ProviderError>;

    /// Import an existing remote object by its id.
    async fn import(&self, ctx: &ProviderContext, id: &str)
        -> Result<Vec<ImportedResource>, ProviderError>;
}

/// The known value of a required attribute, or an SDK error.
///
/// Used on planned and current state, where required attributes are always
/// known.
pub(crate) fn require_known<T>(
    value: AttrValue<T>,
    name: &str,
) -> Result<T, ProviderError> {
    value
        .into_option()
        .ok_or_else(|| ProviderError::Sdk(format!("attribute '{}' has no known value", name)))
}

/// Keep an attribute the configuration left null as null when the server
/// answers with an empty collection, so the next plan shows no drift.
pub(crate) fn keep_null_if_empty<T: Default + PartialEq>(
    value: AttrValue<T>,
    configured: &AttrValue<T>,
) -> AttrValue<T> {
    match value {
        AttrValue::Known(v) if configured.is_null() && v == T::default() => {
            AttrValue::Null
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ListValue;

    #[test]
    fn test_require_known() {
        assert_eq!(require_known(AttrValue::Known(7), "n").unwrap(), 7);

        let err = require_known(AttrValue::<String>::Unknown, "name").unwrap_err();
        assert!(matches!(err, ProviderError::Sdk(_)));
        assert!(require_known(AttrValue::<String>::Null, "name").is_err());
    }

    #[test]
    fn test_keep_null_if_empty() {
        let empty = ListValue::Known(vec![]);
        assert_eq!(keep_null_if_empty(empty.clone(), &ListValue::Null), ListValue::Null);
        assert_eq!(
            keep_null_if_empty(empty.clone(), &ListValue::Known(vec![])),
            empty
        );

        let tags = ListValue::Known(vec!["Lighting".into()]);
        assert_eq!(keep_null_if_empty(tags.clone(), &ListValue::Null), tags);
    }
}

//! `openhab_item`: an item in the openHAB item registry.

use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use super::{keep_null_if_empty, require_known, Resource};
use crate::client::{EnrichedItemDto, ItemDto, Upsert};
use crate::conversion::{
    string_list_to_value, string_to_value, value_to_string, value_to_string_list,
};
use crate::error::ProviderError;
use crate::item_type::{is_valid_item_name, ItemNameValidator, ItemTypeValidator};
use crate::plan::plan_resource;
use crate::provider::ProviderContext;
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::types::{ApplyResult, ImportedResource, PlanResult};
use crate::value::{field, ListValue, StringValue};

const ID: &str = "id";
const NAME: &str = "name";
const TYPE: &str = "type";
const LABEL: &str = "label";
const CATEGORY: &str = "category";
const TAGS: &str = "tags";
const GROUP_NAMES: &str = "group_names";

/// Typed view of an `openhab_item` attribute object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemModel {
    /// Resource id; always the item name.
    pub id: StringValue,
    /// Item name.
    pub name: StringValue,
    /// Item type, e.g. `Number:Temperature`.
    pub item_type: StringValue,
    /// Display label.
    pub label: StringValue,
    /// Category.
    pub category: StringValue,
    /// Tags, in configuration order.
    pub tags: ListValue,
    /// Group names, in configuration order.
    pub group_names: ListValue,
}

impl ItemModel {
    /// Decode a configuration, plan or state object.
    pub fn from_state(state: &Value) -> Result<Self, ProviderError> {
        Ok(Self {
            id: field(state, ID)?,
            name: field(state, NAME)?,
            item_type: field(state, TYPE)?,
            label: field(state, LABEL)?,
            category: field(state, CATEGORY)?,
            tags: field(state, TAGS)?,
            group_names: field(state, GROUP_NAMES)?,
        })
    }

    /// Encode as a state object.
    pub fn to_state(&self) -> Value {
        let mut state = Map::new();
        state.insert(ID.into(), self.id.to_json());
        state.insert(NAME.into(), self.name.to_json());
        state.insert(TYPE.into(), self.item_type.to_json());
        state.insert(LABEL.into(), self.label.to_json());
        state.insert(CATEGORY.into(), self.category.to_json());
        state.insert(TAGS.into(), self.tags.to_json());
        state.insert(GROUP_NAMES.into(), self.group_names.to_json());
        Value::Object(state)
    }

    /// Request body for `PUT /items/{name}`.
    pub fn to_dto(&self) -> ItemDto {
        ItemDto {
            item_type: value_to_string(&self.item_type),
            name: value_to_string(&self.name),
            label: value_to_string(&self.label),
            category: value_to_string(&self.category),
            tags: value_to_string_list(&self.tags),
            group_names: value_to_string_list(&self.group_names),
        }
    }

    /// Rebuild the model from the server's view of the item.
    ///
    /// `configured` is the model the request was made with; lists it left
    /// null stay null when the server reports them empty.
    pub fn from_dto(dto: EnrichedItemDto, configured: &ItemModel) -> Self {
        let name = string_to_value(dto.name);
        Self {
            id: name.clone(),
            name,
            item_type: string_to_value(dto.item_type),
            label: string_to_value(dto.label),
            category: string_to_value(dto.category),
            tags: keep_null_if_empty(string_list_to_value(dto.tags), &configured.tags),
            group_names: keep_null_if_empty(
                string_list_to_value(dto.group_names),
                &configured.group_names,
            ),
        }
    }
}

/// Handler for `openhab_item`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemResource;

impl ItemResource {
    /// Resource type name.
    pub const TYPE_NAME: &'static str = "openhab_item";
}

#[async_trait::async_trait]
impl Resource for ItemResource {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("openHAB Item")
            .with_attribute(ID, Attribute::computed_string().with_description("Resource ID"))
            .with_attribute(
                NAME,
                Attribute::required_string()
                    .with_description("Item name")
                    .with_force_new()
                    .with_validator(ItemNameValidator),
            )
            .with_attribute(
                TYPE,
                Attribute::required_string()
                    .with_description("Item type, e.g. `Switch` or `Number:Temperature`")
                    .with_validator(ItemTypeValidator),
            )
            .with_attribute(LABEL, Attribute::required_string().with_description("Item label"))
            .with_attribute(
                CATEGORY,
                Attribute::optional_string()
                    .with_description("Item category (often used as the icon)"),
            )
            .with_attribute(TAGS, Attribute::optional_string_list().with_description("Item tags"))
            .with_attribute(
                GROUP_NAMES,
                Attribute::optional_string_list().with_description("Item groups"),
            )
    }

    fn plan(&self, prior: Option<&Value>, mut proposed: Value) -> Result<PlanResult, ProviderError> {
        if let Some(obj) = proposed.as_object_mut() {
            if let StringValue::Known(name) = StringValue::from_json(obj.get(NAME), NAME)? {
                obj.insert(ID.into(), Value::String(name));
            }
        }
        Ok(plan_resource(&self.schema(), prior, proposed))
    }

    #[instrument(skip_all, fields(resource_type = "openhab_item"))]
    async fn create(&self, ctx: &ProviderContext, planned: Value) -> Result<ApplyResult, ProviderError> {
        let model = ItemModel::from_state(&planned)?;
        let name = require_known(model.name.clone(), NAME)?;

        let (outcome, dto) = ctx.client.put_item(&name, &model.to_dto()).await?;
        let mut result = ApplyResult::new(ItemModel::from_dto(dto, &model).to_state());
        if outcome == Upsert::Updated {
            result = result.with_diagnostic(
                Diagnostic::warning("Create Item Warning")
                    .with_detail(format!("Item {} was not created, but updated", name)),
            );
        }

        info!(name = %name, "Created item");
        Ok(result)
    }

    #[instrument(skip_all, fields(resource_type = "openhab_item"))]
    async fn read(&self, ctx: &ProviderContext, current: Value) -> Result<Option<Value>, ProviderError> {
        let model = ItemModel::from_state(&current)?;
        let name = require_known(model.name.clone(), NAME)?;

        match ctx.client.get_item(&name).await? {
            Some(dto) => Ok(Some(ItemModel::from_dto(dto, &model).to_state())),
            None => {
                debug!(name = %name, "Item not found, will be removed from state");
                Ok(None)
            },
        }
    }

    #[instrument(skip_all, fields(resource_type = "openhab_item"))]
    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: Value,
        planned: Value,
    ) -> Result<ApplyResult, ProviderError> {
        let model = ItemModel::from_state(&planned)?;
        let name = require_known(model.name.clone(), NAME)?;

        let (outcome, dto) = ctx.client.put_item(&name, &model.to_dto()).await?;
        let mut result = ApplyResult::new(ItemModel::from_dto(dto, &model).to_state());
        if outcome == Upsert::Created {
            result = result.with_diagnostic(
                Diagnostic::warning("Update Item Warning")
                    .with_detail(format!("Item {} was not updated, but created", name)),
            );
        }

        info!(name = %name, "Updated item");
        Ok(result)
    }

    #[instrument(skip_all, fields(resource_type = "openhab_item"))]
    async fn delete(&self, ctx: &ProviderContext, current: Value) -> Result<(), ProviderError> {
        let model = ItemModel::from_state(&current)?;
        let name = require_known(model.name, NAME)?;

        if ctx.client.delete_item(&name).await? {
            info!(name = %name, "Deleted item");
        } else {
            debug!(name = %name, "Planned to remove an item, but it was already removed");
        }
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(resource_type = "openhab_item"))]
    async fn import(&self, ctx: &ProviderContext, id: &str) -> Result<Vec<ImportedResource>, ProviderError> {
        if !is_valid_item_name(id) {
            return Err(ProviderError::InvalidRequest(format!(
                "Invalid item id '{}', expected an item name",
                id
            )));
        }

        let dto = ctx
            .client
            .get_item(id)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("item {}", id)))?;
        let state = ItemModel::from_dto(dto, &ItemModel::default()).to_state();

        Ok(vec![ImportedResource::new(Self::TYPE_NAME, state)])
    }
}

//! `openhab_link`: a link between an item and a thing channel.
//!
//! openHAB has no in-place update for links, so every attribute forces
//! replacement. The resource id is `<item_name>-<channel_uid>`; item names
//! cannot contain `-`, so the id splits back unambiguously on the first `-`.

use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use super::{keep_null_if_empty, require_known, Resource};
use crate::client::{EnrichedItemChannelLinkDto, ItemChannelLinkDto};
use crate::conversion::{string_map_to_value, string_to_value, value_to_string, value_to_string_map};
use crate::error::ProviderError;
use crate::item_type::{is_valid_item_name, ItemNameValidator};
use crate::plan::plan_resource;
use crate::provider::ProviderContext;
use crate::schema::{Attribute, Schema};
use crate::types::{ApplyResult, ImportedResource, PlanResult};
use crate::value::{field, AttrValue, MapValue, StringValue};

const ID: &str = "id";
const ITEM_NAME: &str = "item_name";
const CHANNEL_UID: &str = "channel_uid";
const CONFIGURATION: &str = "configuration";

/// The resource id of the link between `item_name` and `channel_uid`.
pub fn link_id(item_name: &str, channel_uid: &str) -> String {
    format!("{}-{}", item_name, channel_uid)
}

/// Split a link id into item name and channel UID.
pub fn parse_link_id(id: &str) -> Option<(&str, &str)> {
    let (item_name, channel_uid) = id.split_once('-')?;
    (is_valid_item_name(item_name) && !channel_uid.is_empty()).then_some((item_name, channel_uid))
}

/// Typed view of an `openhab_link` attribute object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkModel {
    /// `<item_name>-<channel_uid>`.
    pub id: StringValue,
    /// Linked item.
    pub item_name: StringValue,
    /// Linked channel.
    pub channel_uid: StringValue,
    /// Profile configuration.
    pub configuration: MapValue,
}

impl LinkModel {
    /// Decode a configuration, plan or state object.
    pub fn from_state(state: &Value) -> Result<Self, ProviderError> {
        Ok(Self {
            id: field(state, ID)?,
            item_name: field(state, ITEM_NAME)?,
            channel_uid: field(state, CHANNEL_UID)?,
            configuration: field(state, CONFIGURATION)?,
        })
    }

    /// Encode as a state object.
    pub fn to_state(&self) -> Value {
        let mut state = Map::new();
        state.insert(ID.into(), self.id.to_json());
        state.insert(ITEM_NAME.into(), self.item_name.to_json());
        state.insert(CHANNEL_UID.into(), self.channel_uid.to_json());
        state.insert(CONFIGURATION.into(), self.configuration.to_json());
        Value::Object(state)
    }

    /// Request body for `PUT /links/{item}/{channel}`.
    pub fn to_dto(&self) -> ItemChannelLinkDto {
        ItemChannelLinkDto {
            item_name: value_to_string(&self.item_name),
            channel_uid: value_to_string(&self.channel_uid),
            configuration: value_to_string_map(&self.configuration),
        }
    }

    /// Rebuild the model from the server's view of the link.
    pub fn from_dto(dto: EnrichedItemChannelLinkDto, configured: &LinkModel) -> Self {
        let configuration = string_map_to_value(dto.string_configuration());
        let item_name = string_to_value(dto.item_name);
        let channel_uid = string_to_value(dto.channel_uid);
        Self {
            id: derive_id(&item_name, &channel_uid),
            item_name,
            channel_uid,
            configuration: keep_null_if_empty(configuration, &configured.configuration),
        }
    }
}

fn derive_id(item_name: &StringValue, channel_uid: &StringValue) -> StringValue {
    match (item_name, channel_uid) {
        (AttrValue::Known(item), AttrValue::Known(channel)) => {
            AttrValue::Known(link_id(item, channel))
        },
        (AttrValue::Null, _) | (_, AttrValue::Null) => AttrValue::Null,
        _ => AttrValue::Unknown,
    }
}

/// Handler for `openhab_link`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkResource;

impl LinkResource {
    /// Resource type name.
    pub const TYPE_NAME: &'static str = "openhab_link";
}

#[async_trait::async_trait]
impl Resource for LinkResource {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("openHAB Link between an Item and a Channel.")
            .with_attribute(ID, Attribute::computed_string().with_description("Resource ID"))
            .with_attribute(
                ITEM_NAME,
                Attribute::required_string()
                    .with_description("Item name")
                    .with_force_new()
                    .with_validator(ItemNameValidator),
            )
            .with_attribute(
                CHANNEL_UID,
                Attribute::required_string()
                    .with_description("Channel UID")
                    .with_force_new(),
            )
            .with_attribute(
                CONFIGURATION,
                Attribute::optional_string_map()
                    .with_description("Link configuration, e.g. the profile and its parameters")
                    .with_force_new(),
            )
    }

    fn plan(&self, prior: Option<&Value>, mut proposed: Value) -> Result<PlanResult, ProviderError> {
        if let Some(obj) = proposed.as_object_mut() {
            let item_name = StringValue::from_json(obj.get(ITEM_NAME), ITEM_NAME)?;
            let channel_uid = StringValue::from_json(obj.get(CHANNEL_UID), CHANNEL_UID)?;
            if let AttrValue::Known(id) = derive_id(&item_name, &channel_uid) {
                obj.insert(ID.into(), Value::String(id));
            }
        }
        Ok(plan_resource(&self.schema(), prior, proposed))
    }

    #[instrument(skip_all, fields(resource_type = "openhab_link"))]
    async fn create(&self, ctx: &ProviderContext, planned: Value) -> Result<ApplyResult, ProviderError> {
        let mut model = LinkModel::from_state(&planned)?;
        let item_name = require_known(model.item_name.clone(), ITEM_NAME)?;
        let channel_uid = require_known(model.channel_uid.clone(), CHANNEL_UID)?;

        ctx.client
            .put_link(&item_name, &channel_uid, &model.to_dto())
            .await?;
        model.id = AttrValue::Known(link_id(&item_name, &channel_uid));

        info!(item_name = %item_name, channel_uid = %channel_uid, "Created link");
        Ok(ApplyResult::new(model.to_state()))
    }

    #[instrument(skip_all, fields(resource_type = "openhab_link"))]
    async fn read(&self, ctx: &ProviderContext, current: Value) -> Result<Option<Value>, ProviderError> {
        let model = LinkModel::from_state(&current)?;
        let item_name = require_known(model.item_name.clone(), ITEM_NAME)?;
        let channel_uid = require_known(model.channel_uid.clone(), CHANNEL_UID)?;

        match ctx.client.get_link(&item_name, &channel_uid).await? {
            Some(dto) => Ok(Some(LinkModel::from_dto(dto, &model).to_state())),
            None => {
                debug!(
                    item_name = %item_name,
                    channel_uid = %channel_uid,
                    "Link not found, will be removed from state"
                );
                Ok(None)
            },
        }
    }

    async fn update(
        &self,
        _ctx: &ProviderContext,
        _prior: Value,
        _planned: Value,
    ) -> Result<ApplyResult, ProviderError> {
        Err(ProviderError::Unimplemented(
            "Updating links is not supported".to_string(),
        ))
    }

    #[instrument(skip_all, fields(resource_type = "openhab_link"))]
    async fn delete(&self, ctx: &ProviderContext, current: Value) -> Result<(), ProviderError> {
        let model = LinkModel::from_state(&current)?;
        let item_name = require_known(model.item_name, ITEM_NAME)?;
        let channel_uid = require_known(model.channel_uid, CHANNEL_UID)?;

        if ctx.client.delete_link(&item_name, &channel_uid).await? {
            info!(item_name = %item_name, channel_uid = %channel_uid, "Deleted link");
        } else {
            debug!(
                item_name = %item_name,
                channel_uid = %channel_uid,
                "Planned to remove a link, but it was already removed"
            );
        }
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(resource_type = "openhab_link"))]
    async fn import(&self, ctx: &ProviderContext, id: &str) -> Result<Vec<ImportedResource>, ProviderError> {
        let (item_name, channel_uid) = parse_link_id(id).ok_or_else(|| {
            ProviderError::InvalidRequest(format!(
                "Invalid link id '{}', expected '<item_name>-<channel_uid>'",
                id
            ))
        })?;

        let dto = ctx
            .client
            .get_link(item_name, channel_uid)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("link {}", id)))?;
        let state = LinkModel::from_dto(dto, &LinkModel::default()).to_state();

        Ok(vec![ImportedResource::new(Self::TYPE_NAME, state)])
    }
}

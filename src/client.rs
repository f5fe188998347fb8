//! openHAB REST client.
//!
//! Covers the item registry (`/items/{name}`) and item-channel links
//! (`/links/{item}/{channel}`). Authentication is HTTP basic auth with the API
//! token as user name and no password.

use std::collections::HashMap;

use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::{check_endpoint, ProviderConfig};
use crate::error::ProviderError;

/// Item as sent to `PUT /items/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    /// Item type, e.g. `Number:Temperature`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    /// Item name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Display label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Category, often used as the icon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Names of the groups this item belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_names: Option<Vec<String>>,
}

/// Item as returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedItemDto {
    /// Item type.
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    /// Item name.
    pub name: Option<String>,
    /// Display label.
    pub label: Option<String>,
    /// Category.
    pub category: Option<String>,
    /// Tags.
    pub tags: Option<Vec<String>>,
    /// Group names.
    pub group_names: Option<Vec<String>>,
    /// Self link.
    pub link: Option<String>,
    /// Current state.
    pub state: Option<String>,
    /// Whether the item is managed through the REST API.
    pub editable: Option<bool>,
}

/// Link as sent to `PUT /links/{item}/{channel}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemChannelLinkDto {
    /// Linked item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    /// Linked channel.
    #[serde(rename = "channelUID", skip_serializing_if = "Option::is_none")]
    pub channel_uid: Option<String>,
    /// Link configuration (profile and profile parameters).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<HashMap<String, String>>,
}

/// Link as returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedItemChannelLinkDto {
    /// Linked item.
    pub item_name: Option<String>,
    /// Linked channel.
    #[serde(rename = "channelUID")]
    pub channel_uid: Option<String>,
    /// Configuration values; openHAB keeps their JSON types.
    pub configuration: Option<HashMap<String, serde_json::Value>>,
    /// Whether the link is managed through the REST API.
    pub editable: Option<bool>,
}

impl EnrichedItemChannelLinkDto {
    /// The configuration with every value rendered as a string.
    pub fn string_configuration(&self) -> Option<HashMap<String, String>> {
        self.configuration.as_ref().map(|config| {
            config
                .iter()
                .map(|(k, v)| {
                    let v = match v {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), v)
                })
                .collect()
        })
    }
}

/// Whether an upsert created a new entry or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// HTTP 201.
    Created,
    /// HTTP 200.
    Updated,
}

/// Client for the openHAB REST API.
#[derive(Clone)]
pub struct OpenhabClient {
    http: reqwest::Client,
    base_url: Url,
    api_token: String,
}

impl std::fmt::Debug for OpenhabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenhabClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl OpenhabClient {
    /// Build a client from the provider configuration.
    pub fn new(config: &ProviderConfig, version: &str) -> Result<Self, ProviderError> {
        let base_url = check_endpoint(&config.endpoint).map_err(ProviderError::Configuration)?;
        let http = reqwest::Client::builder()
            .user_agent(format!("openhab-provider/{}", version))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_token: config.api_token.clone(),
        })
    }

    /// The REST root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ProviderError::Configuration(format!(
                    "endpoint '{}' cannot take a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.api_token, None::<&str>)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Create or replace an item. Returns whether it was created, and the stored item.
    #[instrument(skip(self, item), fields(name = %name))]
    pub async fn put_item(
        &self,
        name: &str,
        item: &ItemDto,
    ) -> Result<(Upsert, EnrichedItemDto), ProviderError> {
        let url = self.url(&["items", name])?;
        let resp = self.request(Method::PUT, url).json(item).send().await?;

        let outcome = match resp.status() {
            StatusCode::CREATED => Upsert::Created,
            StatusCode::OK => Upsert::Updated,
            status => return Err(error_from_response(status, resp).await),
        };
        debug!(?outcome, "Item stored");
        Ok((outcome, read_body(resp).await?))
    }

    /// Fetch an item; `None` if it does not exist.
    #[instrument(skip(self), fields(name = %name))]
    pub async fn get_item(&self, name: &str) -> Result<Option<EnrichedItemDto>, ProviderError> {
        let url = self.url(&["items", name])?;
        let resp = self.request(Method::GET, url).send().await?;

        match resp.status() {
            StatusCode::OK => Ok(Some(read_body(resp).await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(error_from_response(status, resp).await),
        }
    }

    /// Remove an item; `false` if it was already gone.
    #[instrument(skip(self), fields(name = %name))]
    pub async fn delete_item(&self, name: &str) -> Result<bool, ProviderError> {
        let url = self.url(&["items", name])?;
        let resp = self.request(Method::DELETE, url).send().await?;

        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(error_from_response(status, resp).await),
        }
    }

    /// Link an item to a channel.
    #[instrument(skip(self, link), fields(item_name = %item_name, channel_uid = %channel_uid))]
    pub async fn put_link(
        &self,
        item_name: &str,
        channel_uid: &str,
        link: &ItemChannelLinkDto,
    ) -> Result<(), ProviderError> {
        let url = self.url(&["links", item_name, channel_uid])?;
        let resp = self.request(Method::PUT, url).json(link).send().await?;

        match resp.status() {
            StatusCode::OK => Ok(()),
            status => Err(error_from_response(status, resp).await),
        }
    }

    /// Fetch a link; `None` if it does not exist.
    #[instrument(skip(self), fields(item_name = %item_name, channel_uid = %channel_uid))]
    pub async fn get_link(
        &self,
        item_name: &str,
        channel_uid: &str,
    ) -> Result<Option<EnrichedItemChannelLinkDto>, ProviderError> {
        let url = self.url(&["links", item_name, channel_uid])?;
        let resp = self.request(Method::GET, url).send().await?;

        match resp.status() {
            StatusCode::OK => Ok(Some(read_body(resp).await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(error_from_response(status, resp).await),
        }
    }

    /// Unlink an item from a channel; `false` if the link was already gone.
    #[instrument(skip(self), fields(item_name = %item_name, channel_uid = %channel_uid))]
    pub async fn delete_link(&self, item_name: &str, channel_uid: &str) -> Result<bool, ProviderError> {
        let url = self.url(&["links", item_name, channel_uid])?;
        let resp = self.request(Method::DELETE, url).send().await?;

        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(error_from_response(status, resp).await),
        }
    }
}

async fn read_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ProviderError> {
    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn error_from_response(status: StatusCode, resp: reqwest::Response) -> ProviderError {
    let body = resp.text().await.unwrap_or_default();
    ProviderError::from_status(status, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(endpoint: &str) -> OpenhabClient {
        let config = ProviderConfig {
            endpoint: endpoint.to_string(),
            api_token: "token".to_string(),
        };
        OpenhabClient::new(&config, "test").unwrap()
    }

    #[test]
    fn test_url_building() {
        let client = client("http://openhab:8080/rest");
        let url = client.url(&["links", "Kitchen_Light", "hue:0210:bridge:bulb1:color"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://openhab:8080/rest/links/Kitchen_Light/hue:0210:bridge:bulb1:color"
        );

        // trailing slash on the endpoint does not produce an empty segment
        let client = super::tests::client("http://openhab:8080/rest/");
        let url = client.url(&["items", "Light"]).unwrap();
        assert_eq!(url.as_str(), "http://openhab:8080/rest/items/Light");
    }

    #[test]
    fn test_url_segments_are_encoded() {
        let client = client("http://openhab:8080/rest");
        let url = client.url(&["links", "Light", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://openhab:8080/rest/links/Light/a%2Fb%20c");
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = ProviderConfig {
            endpoint: "openhab".to_string(),
            api_token: "token".to_string(),
        };
        let err = OpenhabClient::new(&config, "test").unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[test]
    fn test_item_dto_omits_absent_fields() {
        let dto = ItemDto {
            item_type: Some("Switch".into()),
            name: Some("Light".into()),
            label: Some("Light".into()),
            group_names: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&dto).unwrap(),
            json!({"type": "Switch", "name": "Light", "label": "Light", "groupNames": []})
        );
    }

    #[test]
    fn test_enriched_item_decoding() {
        let dto: EnrichedItemDto = serde_json::from_value(json!({
            "link": "http://openhab:8080/rest/items/Temp",
            "state": "21.5 °C",
            "editable": true,
            "type": "Number:Temperature",
            "name": "Temp",
            "label": "Temperature",
            "tags": ["Measurement"],
            "groupNames": []
        }))
        .unwrap();

        assert_eq!(dto.item_type.as_deref(), Some("Number:Temperature"));
        assert_eq!(dto.category, None);
        assert_eq!(dto.group_names, Some(vec![]));
    }

    #[test]
    fn test_link_configuration_as_strings() {
        let dto: EnrichedItemChannelLinkDto = serde_json::from_value(json!({
            "itemName": "Light",
            "channelUID": "hue:0210:bridge:bulb1:color",
            "configuration": {"profile": "system:offset", "offset": 2, "invert": false},
            "editable": true
        }))
        .unwrap();

        let config = dto.string_configuration().unwrap();
        assert_eq!(config["profile"], "system:offset");
        assert_eq!(config["offset"], "2");
        assert_eq!(config["invert"], "false");
    }
}

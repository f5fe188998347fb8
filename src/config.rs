//! Provider configuration.
//!
//! The provider block carries the openHAB REST endpoint and an API token.
//! Both are required; the token is sensitive.

use serde_json::Value;

use crate::schema::{Attribute, Diagnostic, Schema};
use crate::validation::validate;
use crate::value::{field, is_unknown, StringValue};

/// Attribute holding the REST endpoint.
pub const ENDPOINT: &str = "endpoint";

/// Attribute holding the API token.
pub const API_TOKEN: &str = "api_token";

/// The decoded provider configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// URL of the openHAB REST root, e.g. `https://openhab:8080/rest`.
    pub endpoint: String,
    /// API token used to authenticate against the server.
    pub api_token: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

impl ProviderConfig {
    /// Schema of the provider block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                ENDPOINT,
                Attribute::required_string().with_description(
                    "API endpoint of the target openHAB server, usually the URL with `/rest` suffix, e.g. `https://openhab:8080/rest`",
                ),
            )
            .with_attribute(
                API_TOKEN,
                Attribute::required_string()
                    .sensitive()
                    .with_description("API token used to authenticate against the openHAB server"),
            )
    }

    /// Validate a provider block: schema checks plus a parseable endpoint URL.
    pub fn validate(config: &Value) -> Vec<Diagnostic> {
        let mut diagnostics = validate(&Self::schema(), config);

        let endpoint = config.get(ENDPOINT).filter(|v| !is_unknown(v));
        if let Some(endpoint) = endpoint.and_then(Value::as_str) {
            if let Err(detail) = check_endpoint(endpoint) {
                diagnostics.push(
                    Diagnostic::error("Invalid endpoint")
                        .with_detail(detail)
                        .with_attribute(ENDPOINT),
                );
            }
        }

        diagnostics
    }

    /// Decode a validated provider block.
    ///
    /// Fails with diagnostics when the block is invalid or still holds unknown
    /// values: the client cannot be built from values resolved only at apply.
    pub fn from_json(config: &Value) -> Result<Self, Vec<Diagnostic>> {
        let diagnostics = Self::validate(config);
        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }

        let endpoint = known_string(config, ENDPOINT)?;
        let api_token = known_string(config, API_TOKEN)?;
        Ok(Self {
            endpoint,
            api_token,
        })
    }
}

fn known_string(config: &Value, name: &str) -> Result<String, Vec<Diagnostic>> {
    let value: StringValue = field(config, name).map_err(|e| {
        vec![Diagnostic::error("Invalid provider configuration")
            .with_detail(e.to_string())
            .with_attribute(name)]
    })?;

    match value {
        StringValue::Known(v) => Ok(v),
        StringValue::Unknown => Err(vec![Diagnostic::error("Unknown provider configuration value")
            .with_detail(format!(
                "The value of '{}' is not known yet; the provider cannot be configured with it.",
                name
            ))
            .with_attribute(name)]),
        StringValue::Null => Err(vec![Diagnostic::error(format!(
            "Missing required attribute '{}'",
            name
        ))
        .with_attribute(name)]),
    }
}

/// The endpoint must be an absolute `http`/`https` URL that can take path segments.
pub fn check_endpoint(endpoint: &str) -> Result<reqwest::Url, String> {
    let url = reqwest::Url::parse(endpoint)
        .map_err(|e| format!("Given endpoint '{}' is not a valid URL: {}", endpoint, e))?;

    match url.scheme() {
        "http" | "https" if !url.cannot_be_a_base() => Ok(url),
        scheme => Err(format!(
            "Given endpoint '{}' must use http or https, got '{}'",
            endpoint, scheme
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::UNKNOWN_VALUE;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        let config = ProviderConfig::from_json(&json!({
            "endpoint": "https://openhab:8080/rest",
            "api_token": "oh.token"
        }))
        .unwrap();

        assert_eq!(config.endpoint, "https://openhab:8080/rest");
        assert_eq!(config.api_token, "oh.token");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ProviderConfig {
            endpoint: "http://localhost:8080/rest".into(),
            api_token: "secret".into(),
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("localhost"));
    }

    #[test]
    fn test_missing_attributes() {
        let diagnostics = ProviderConfig::from_json(&json!({})).unwrap_err();
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_invalid_endpoint() {
        let diagnostics = ProviderConfig::validate(&json!({
            "endpoint": "openhab:8080",
            "api_token": "t"
        }));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Invalid endpoint");
        assert_eq!(diagnostics[0].attribute, Some(ENDPOINT.to_string()));

        let diagnostics = ProviderConfig::validate(&json!({
            "endpoint": "not a url",
            "api_token": "t"
        }));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_unknown_values() {
        // an unknown endpoint passes validation but cannot configure the client
        assert!(ProviderConfig::validate(&json!({
            "endpoint": UNKNOWN_VALUE,
            "api_token": "t"
        }))
        .is_empty());

        let diagnostics = ProviderConfig::from_json(&json!({
            "endpoint": UNKNOWN_VALUE,
            "api_token": "t"
        }))
        .unwrap_err();
        assert_eq!(diagnostics[0].summary, "Unknown provider configuration value");
    }

    #[test]
    fn test_check_endpoint() {
        assert!(check_endpoint("http://192.168.1.10:8080/rest").is_ok());
        assert!(check_endpoint("ftp://openhab/rest").is_err());
        assert!(check_endpoint("mailto:admin@example.com").is_err());
    }
}

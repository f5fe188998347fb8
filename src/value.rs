//! Tri-state attribute values.
//!
//! Every configurable attribute arrives from the host as a JSON value that is
//! either a concrete value, `null`, or not yet known (it depends on something
//! that is only resolved during apply). [`AttrValue`] captures those three
//! states. Values are decoded once at the host boundary, so the rest of the
//! crate only ever sees concrete Rust types inside [`AttrValue::Known`].
//!
//! # Wire encoding
//!
//! | JSON                                         | `AttrValue`  |
//! |----------------------------------------------|--------------|
//! | key absent, or `null`                        | `Null`       |
//! | the string [`UNKNOWN_VALUE`]                 | `Unknown`    |
//! | anything else, decoded as the attribute type | `Known(v)`   |
//!
//! ```
//! use openhab_provider::value::{StringValue, UNKNOWN_VALUE};
//! use serde_json::json;
//!
//! let known = StringValue::from_json(Some(&json!("Switch")), "type").unwrap();
//! assert_eq!(known, StringValue::Known("Switch".to_string()));
//!
//! let unknown = StringValue::from_json(Some(&json!(UNKNOWN_VALUE)), "type").unwrap();
//! assert!(unknown.is_unknown());
//!
//! let null = StringValue::from_json(None, "type").unwrap();
//! assert!(null.is_null());
//! ```

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::ProviderError;

/// Placeholder the host sends in place of a value that is not known until apply.
pub const UNKNOWN_VALUE: &str = "74D93920-ED26-11E3-AC10-0800200C9A66";

/// An attribute value that is present, explicitly null, or not yet known.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttrValue<T> {
    /// A concrete value.
    Known(T),
    /// No value.
    #[default]
    Null,
    /// A value the host has not resolved yet.
    Unknown,
}

/// A tri-state string attribute.
pub type StringValue = AttrValue<String>;

/// A tri-state list-of-strings attribute.
pub type ListValue = AttrValue<Vec<String>>;

/// A tri-state string-to-string map attribute.
pub type MapValue = AttrValue<HashMap<String, String>>;

impl<T> AttrValue<T> {
    /// Returns `true` for [`AttrValue::Known`].
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Returns `true` for [`AttrValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for [`AttrValue::Unknown`].
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Borrow the concrete value, if any.
    pub fn as_known(&self) -> Option<&T> {
        match self {
            Self::Known(v) => Some(v),
            Self::Null | Self::Unknown => None,
        }
    }
}

/// Concrete attribute types that can travel inside an [`AttrValue`].
pub trait AttrType: Sized {
    /// Name used in error messages.
    const TYPE_NAME: &'static str;

    /// Decode a non-null, known JSON value. `None` if the shape is wrong.
    fn decode(value: &Value) -> Option<Self>;

    /// Encode into JSON.
    fn encode(&self) -> Value;
}

impl AttrType for String {
    const TYPE_NAME: &'static str = "string";

    fn decode(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }

    fn encode(&self) -> Value {
        Value::String(self.clone())
    }
}

impl AttrType for Vec<String> {
    const TYPE_NAME: &'static str = "list of strings";

    fn decode(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(String::decode).collect()
    }

    fn encode(&self) -> Value {
        Value::Array(self.iter().map(String::encode).collect())
    }
}

impl AttrType for HashMap<String, String> {
    const TYPE_NAME: &'static str = "map of strings";

    fn decode(value: &Value) -> Option<Self> {
        value
            .as_object()?
            .iter()
            .map(|(k, v)| String::decode(v).map(|v| (k.clone(), v)))
            .collect()
    }

    fn encode(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), v.encode()))
                .collect::<Map<String, Value>>(),
        )
    }
}

impl<T: AttrType> AttrValue<T> {
    /// Decode an attribute from the host's JSON.
    ///
    /// `path` only names the attribute in the error. A value of the wrong
    /// shape means the host broke its contract, so it is reported as
    /// [`ProviderError::Sdk`] rather than as a user diagnostic.
    pub fn from_json(value: Option<&Value>, path: &str) -> Result<Self, ProviderError> {
        match value {
            None | Some(Value::Null) => Ok(Self::Null),
            Some(v) if is_unknown(v) => Ok(Self::Unknown),
            Some(v) => T::decode(v).map(Self::Known).ok_or_else(|| {
                ProviderError::Sdk(format!(
                    "attribute '{}' is not a {}: {}",
                    path,
                    T::TYPE_NAME,
                    v
                ))
            }),
        }
    }

    /// Encode for the host.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Known(v) => v.encode(),
            Self::Null => Value::Null,
            Self::Unknown => Value::String(UNKNOWN_VALUE.to_string()),
        }
    }
}

/// Whether a raw JSON value is the unknown placeholder.
pub fn is_unknown(value: &Value) -> bool {
    value.as_str() == Some(UNKNOWN_VALUE)
}

/// The unknown placeholder as JSON.
pub fn unknown() -> Value {
    Value::String(UNKNOWN_VALUE.to_string())
}

/// Decode the attribute `name` of a JSON attribute object.
pub fn field<T: AttrType>(object: &Value, name: &str) -> Result<AttrValue<T>, ProviderError> {
    AttrValue::from_json(object.get(name), name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_states() {
        let v = StringValue::from_json(Some(&json!("Kitchen")), "label").unwrap();
        assert_eq!(v.as_known().map(String::as_str), Some("Kitchen"));

        let v = StringValue::from_json(Some(&Value::Null), "label").unwrap();
        assert!(v.is_null());

        let v = StringValue::from_json(Some(&unknown()), "label").unwrap();
        assert!(v.is_unknown());
        assert!(!v.is_known());
    }

    #[test]
    fn test_wrong_shape_is_sdk_error() {
        let err = StringValue::from_json(Some(&json!(42)), "label").unwrap_err();
        assert!(matches!(err, ProviderError::Sdk(_)));
        assert!(err.message().contains("label"));

        // a non-string element inside a list breaks the host contract
        let err = ListValue::from_json(Some(&json!(["a", 1])), "tags").unwrap_err();
        assert!(matches!(err, ProviderError::Sdk(_)));

        let err = MapValue::from_json(Some(&json!({"a": true})), "configuration").unwrap_err();
        assert!(matches!(err, ProviderError::Sdk(_)));
    }

    #[test]
    fn test_list_is_unknown_as_a_whole() {
        let v = ListValue::from_json(Some(&unknown()), "tags").unwrap();
        assert!(v.is_unknown());

        let v = ListValue::from_json(Some(&json!([])), "tags").unwrap();
        assert_eq!(v, ListValue::Known(vec![]));
    }

    #[test]
    fn test_to_json() {
        assert_eq!(StringValue::Known("x".into()).to_json(), json!("x"));
        assert_eq!(StringValue::Null.to_json(), Value::Null);
        assert!(is_unknown(&ListValue::Unknown.to_json()));

        let map: MapValue = AttrValue::Known(HashMap::from([("profile".into(), "follow".into())]));
        assert_eq!(map.to_json(), json!({"profile": "follow"}));
    }

    #[test]
    fn test_field() {
        let state = json!({"name": "Light", "tags": ["Lighting"]});
        let name: StringValue = field(&state, "name").unwrap();
        assert_eq!(name, StringValue::Known("Light".into()));

        let category: StringValue = field(&state, "category").unwrap();
        assert!(category.is_null());

        let tags: ListValue = field(&state, "tags").unwrap();
        assert_eq!(tags, ListValue::Known(vec!["Lighting".into()]));
    }
}

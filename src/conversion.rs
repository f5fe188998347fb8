//! Conversions between tri-state attribute values and plain optional values.
//!
//! The REST DTOs use `Option<T>` (absent fields are omitted from the JSON
//! body), while configuration and state use [`AttrValue`]. Going towards the
//! API, `Unknown` collapses into `None` just like `Null`: an unresolved value
//! cannot be sent to openHAB. Going back, `None` becomes `Null`, so
//! `Unknown` does not survive a round trip.

use std::collections::HashMap;

use crate::value::{AttrValue, ListValue, MapValue, StringValue};

impl<T> From<Option<T>> for AttrValue<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Known(v),
            None => Self::Null,
        }
    }
}

impl<T> AttrValue<T> {
    /// Extract the concrete value; `Null` and `Unknown` both yield `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Known(v) => Some(v),
            Self::Null | Self::Unknown => None,
        }
    }
}

/// Absent becomes `Null`, present becomes `Known`.
pub fn string_to_value(value: Option<String>) -> StringValue {
    value.into()
}

/// `Null` and `Unknown` become absent.
pub fn value_to_string(value: &StringValue) -> Option<String> {
    value.clone().into_option()
}

/// Order-preserving; an absent list becomes a `Null` list, not an empty one.
pub fn string_list_to_value(value: Option<Vec<String>>) -> ListValue {
    value.into()
}

/// A `Null` or `Unknown` list becomes absent, never an empty list.
pub fn value_to_string_list(value: &ListValue) -> Option<Vec<String>> {
    value.clone().into_option()
}

/// An absent map becomes a `Null` map.
pub fn string_map_to_value(value: Option<HashMap<String, String>>) -> MapValue {
    value.into()
}

/// A `Null` or `Unknown` map becomes absent.
pub fn value_to_string_map(value: &MapValue) -> Option<HashMap<String, String>> {
    value.clone().into_option()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_round_trip() {
        for v in ["", "Switch", "Küche", "a:b"] {
            let back = value_to_string(&string_to_value(Some(v.to_string())));
            assert_eq!(back.as_deref(), Some(v));
        }
    }

    #[test]
    fn test_absent_scalar() {
        assert_eq!(string_to_value(None), StringValue::Null);
        assert_eq!(value_to_string(&StringValue::Null), None);
        assert_eq!(value_to_string(&StringValue::Unknown), None);

        // unknown is not recoverable once collapsed
        let reapplied = string_to_value(value_to_string(&StringValue::Unknown));
        assert_eq!(reapplied, StringValue::Null);
    }

    #[test]
    fn test_list_order_preserved() {
        let tags = vec![
            "Lighting".to_string(),
            "Switchable".to_string(),
            "Alpha".to_string(),
        ];
        let value = string_list_to_value(Some(tags.clone()));
        assert_eq!(value_to_string_list(&value), Some(tags));
    }

    #[test]
    fn test_list_absent_vs_empty() {
        assert_eq!(string_list_to_value(None), ListValue::Null);
        assert_eq!(value_to_string_list(&ListValue::Null), None);
        assert_eq!(value_to_string_list(&ListValue::Unknown), None);

        let empty = string_list_to_value(Some(vec![]));
        assert_eq!(empty, ListValue::Known(vec![]));
        assert_eq!(value_to_string_list(&empty), Some(vec![]));
    }

    #[test]
    fn test_map_round_trip() {
        let config = HashMap::from([
            ("profile".to_string(), "system:follow".to_string()),
            ("offset".to_string(), "2".to_string()),
            ("invert".to_string(), "true".to_string()),
        ]);
        let back = value_to_string_map(&string_map_to_value(Some(config.clone())));
        assert_eq!(back, Some(config));
    }

    #[test]
    fn test_absent_map() {
        assert_eq!(string_map_to_value(None), MapValue::Null);
        assert_eq!(value_to_string_map(&MapValue::Null), None);
        assert_eq!(value_to_string_map(&MapValue::Unknown), None);
    }
}

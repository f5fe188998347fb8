//! openHAB item type grammar.
//!
//! An item type is `BaseType` or `BaseType:Dimension`, e.g. `Switch` or
//! `Number:Temperature`. Only `Number` carries a dimension; it names a unit
//! family from the openHAB units-of-measurement list.
//!
//! See <https://www.openhab.org/docs/concepts/items.html> and
//! <https://www.openhab.org/docs/concepts/units-of-measurement.html#list-of-units>.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::schema::Diagnostic;
use crate::validation::AttributeValidator;

/// The base type of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    /// Color information (RGB).
    Color,
    /// Status of contacts, e.g. door/window contacts.
    Contact,
    /// Date and time.
    DateTime,
    /// Percentage value for dimmers.
    Dimmer,
    /// Item nesting other items.
    Group,
    /// Binary data of an image.
    Image,
    /// GPS coordinates.
    Location,
    /// Values in number format, optionally with a dimension.
    Number,
    /// Control of players (e.g. audio players).
    Player,
    /// Roller shutter, typically used for blinds.
    Rollershutter,
    /// Text.
    String,
    /// Anything that is switched ON and OFF.
    Switch,
}

impl BaseType {
    /// All base types.
    pub const ALL: [BaseType; 12] = [
        BaseType::Color,
        BaseType::Contact,
        BaseType::DateTime,
        BaseType::Dimmer,
        BaseType::Group,
        BaseType::Image,
        BaseType::Location,
        BaseType::Number,
        BaseType::Player,
        BaseType::Rollershutter,
        BaseType::String,
        BaseType::Switch,
    ];

    /// The name openHAB uses for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            BaseType::Color => "Color",
            BaseType::Contact => "Contact",
            BaseType::DateTime => "DateTime",
            BaseType::Dimmer => "Dimmer",
            BaseType::Group => "Group",
            BaseType::Image => "Image",
            BaseType::Location => "Location",
            BaseType::Number => "Number",
            BaseType::Player => "Player",
            BaseType::Rollershutter => "Rollershutter",
            BaseType::String => "String",
            BaseType::Switch => "Switch",
        }
    }

    /// Look up a base type by its exact (case-sensitive) name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit families with SI units. Sorted for binary search.
pub const SI_DIMENSIONS: [&str; 40] = [
    "Acceleration",
    "AmountOfSubstance",
    "Angle",
    "Area",
    "ArealDensity",
    "CatalyticActivity",
    "DataAmount",
    "DataTransferRate",
    "Density",
    "Dimensionless",
    "ElectricCapacitance",
    "ElectricCharge",
    "ElectricConductance",
    "ElectricConductivity",
    "ElectricCurrent",
    "ElectricInductance",
    "ElectricPotential",
    "ElectricResistance",
    "Energy",
    "Force",
    "Frequency",
    "Illuminance",
    "Intensity",
    "Length",
    "LuminousFlux",
    "LuminousIntensity",
    "MagneticFlux",
    "MagneticFluxDensity",
    "Mass",
    "Power",
    "Pressure",
    "RadiationDoseAbsorbed",
    "RadiationDoseEffective",
    "Radioactivity",
    "SolidAngle",
    "Speed",
    "Temperature",
    "Time",
    "Volume",
    "VolumetricFlowRate",
];

/// Unit families with imperial units. Sorted for binary search; overlaps the SI set.
pub const IMPERIAL_DIMENSIONS: [&str; 4] = ["Length", "Pressure", "Speed", "Temperature"];

/// Whether `dimension` is a known unit family in either system.
pub fn is_known_dimension(dimension: &str) -> bool {
    SI_DIMENSIONS.binary_search(&dimension).is_ok()
        || IMPERIAL_DIMENSIONS.binary_search(&dimension).is_ok()
}

/// Why an item type string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemTypeError {
    /// The base type is not one of [`BaseType::ALL`]. Carries the full input.
    #[error("Given type '{0}' is unknown.")]
    UnknownType(String),

    /// `Number` with a dimension outside both unit vocabularies. Carries the dimension.
    #[error("Given dimension '{0}' is unknown.")]
    UnknownDimension(String),
}

impl ItemTypeError {
    /// Short title for diagnostics.
    pub fn summary(&self) -> &'static str {
        match self {
            ItemTypeError::UnknownType(_) => "Unknown type",
            ItemTypeError::UnknownDimension(_) => "Unknown dimension",
        }
    }

    /// Convert into an error diagnostic scoped to `path`.
    pub fn to_diagnostic(&self, path: &str) -> Diagnostic {
        Diagnostic::error(self.summary())
            .with_detail(self.to_string())
            .with_attribute(path)
    }
}

/// A parsed item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemType<'a> {
    /// The base type.
    pub base: BaseType,
    /// The dimension segment, if one was given.
    pub dimension: Option<&'a str>,
}

/// Parse and check an item type string.
///
/// Only the first two `:`-separated segments matter; anything after the
/// dimension is ignored. A dimension on a base type other than `Number` is
/// accepted without checking.
///
/// ```
/// use openhab_provider::item_type::{parse_item_type, BaseType, ItemTypeError};
///
/// let t = parse_item_type("Number:Temperature").unwrap();
/// assert_eq!(t.base, BaseType::Number);
/// assert_eq!(t.dimension, Some("Temperature"));
///
/// assert_eq!(
///     parse_item_type("Number:Bogus"),
///     Err(ItemTypeError::UnknownDimension("Bogus".to_string()))
/// );
/// ```
pub fn parse_item_type(value: &str) -> Result<ItemType<'_>, ItemTypeError> {
    let mut parts = value.split(':');
    let base_name = parts.next().unwrap_or_default();
    let dimension = parts.next();

    let base =
        BaseType::from_name(base_name).ok_or_else(|| ItemTypeError::UnknownType(value.into()))?;

    match (base, dimension) {
        (BaseType::Number, Some(dim)) if !is_known_dimension(dim) => {
            Err(ItemTypeError::UnknownDimension(dim.to_string()))
        },
        (BaseType::Number, _) | (_, None) => Ok(ItemType { base, dimension }),
        (_, Some(dim)) => {
            debug!(item_type = %value, dimension = %dim, "Dimension on non-Number type is not checked");
            Ok(ItemType { base, dimension })
        },
    }
}

/// Ensures an item's `type` attribute is a valid openHAB item type.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemTypeValidator;

impl AttributeValidator for ItemTypeValidator {
    fn description(&self) -> &'static str {
        "Ensures a given type is valid."
    }

    fn validate(&self, path: &str, value: &str, diagnostics: &mut Vec<Diagnostic>) {
        if let Err(e) = parse_item_type(value) {
            diagnostics.push(e.to_diagnostic(path));
        }
    }
}

/// Ensures an item name only uses ASCII letters, digits and underscores.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemNameValidator;

/// Whether `name` is a valid openHAB item name.
pub fn is_valid_item_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

impl AttributeValidator for ItemNameValidator {
    fn description(&self) -> &'static str {
        "Ensures a given item name is valid."
    }

    fn validate(&self, path: &str, value: &str, diagnostics: &mut Vec<Diagnostic>) {
        if !is_valid_item_name(value) {
            diagnostics.push(
                Diagnostic::error("Invalid item name")
                    .with_detail(format!(
                        "Given item name '{}' may only contain letters, digits and '_'.",
                        value
                    ))
                    .with_attribute(path),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(value: &str) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        ItemTypeValidator.validate("type", value, &mut diagnostics);
        diagnostics
    }

    #[test]
    fn test_vocabularies_are_sorted() {
        assert!(SI_DIMENSIONS.windows(2).all(|w| w[0] < w[1]));
        assert!(IMPERIAL_DIMENSIONS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_every_base_type_is_valid() {
        for base in BaseType::ALL {
            assert!(check(base.as_str()).is_empty(), "{} should be valid", base);
            assert_eq!(BaseType::from_name(base.as_str()), Some(base));
        }
    }

    #[test]
    fn test_unknown_type() {
        for value in ["Foo", "", "switch", "NUMBER", " Switch", "Foo:Temperature"] {
            let diagnostics = check(value);
            assert_eq!(diagnostics.len(), 1, "{:?} should be rejected", value);
            assert_eq!(diagnostics[0].summary, "Unknown type");
            assert_eq!(
                diagnostics[0].detail,
                Some(format!("Given type '{}' is unknown.", value))
            );
            assert_eq!(diagnostics[0].attribute, Some("type".to_string()));
        }
    }

    #[test]
    fn test_number_dimensions() {
        assert!(check("Number").is_empty());
        assert!(check("Number:Temperature").is_empty());
        assert!(check("Number:VolumetricFlowRate").is_empty());
        assert!(check("Number:Dimensionless").is_empty());

        for dim in SI_DIMENSIONS.iter().chain(IMPERIAL_DIMENSIONS.iter()) {
            assert!(check(&format!("Number:{}", dim)).is_empty());
        }
    }

    #[test]
    fn test_unknown_dimension() {
        let diagnostics = check("Number:Bogus");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Unknown dimension");
        assert!(diagnostics[0].detail.as_deref().unwrap().contains("Bogus"));

        assert_eq!(
            parse_item_type("Number:"),
            Err(ItemTypeError::UnknownDimension(String::new()))
        );
        assert_eq!(
            parse_item_type("Number:temperature"),
            Err(ItemTypeError::UnknownDimension("temperature".to_string()))
        );
    }

    #[test]
    fn test_extra_segments_ignored() {
        let t = parse_item_type("Number:Temperature:extra").unwrap();
        assert_eq!(t.base, BaseType::Number);
        assert_eq!(t.dimension, Some("Temperature"));
    }

    #[test]
    fn test_dimension_on_other_types_not_checked() {
        assert!(check("String:Foo").is_empty());
        let t = parse_item_type("Group:Switch:OR(ON,OFF)").unwrap();
        assert_eq!(t.base, BaseType::Group);
        assert_eq!(t.dimension, Some("Switch"));
    }

    #[test]
    fn test_item_name_validator() {
        assert!(is_valid_item_name("Kitchen_Light_1"));
        assert!(!is_valid_item_name(""));
        assert!(!is_valid_item_name("Kitchen-Light"));
        assert!(!is_valid_item_name("Küche"));

        let mut diagnostics = Vec::new();
        ItemNameValidator.validate("name", "bad name", &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Invalid item name");
        assert_eq!(diagnostics[0].attribute, Some("name".to_string()));
    }
}

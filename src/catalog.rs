//! Catalog
//!
//! The static pricing data a calculator is built from: per-category option
//! tables, multi-select add-ons and conditionally auto-included lines.
//! These are plain records; all arithmetic lives in [`crate::pricing`].

use std::fmt;

use rust_decimal::Decimal;
use serde::{
    Deserialize, Deserializer,
    de::{self, MapAccess, Visitor},
};

use crate::conditions::Condition;

/// How a single option contributes to the running amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionPrice {
    /// Flat amount in minor units. Used for base prices and additive
    /// surcharges; may be zero or negative.
    Amount(i64),

    /// Ratio applied to the running amount (e.g. a twice-weekly frequency
    /// multiplier of `1.9`).
    Multiplier(Decimal),
}

/// One selectable option inside a category table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDef {
    /// Unique id within the owning table.
    pub id: String,

    /// Display label, also used for breakdown lines.
    pub label: String,

    /// Price contribution of this option.
    pub price: OptionPrice,

    /// Marketing highlight; has no effect on pricing.
    pub popular: bool,

    /// Derived quantity this option implies (e.g. an eight-week program
    /// option carries `8`), consumed by add-on scaling rules.
    pub quantity: Option<u32>,
}

impl OptionDef {
    /// The flat amount in minor units, or zero for multiplier options.
    #[must_use]
    pub fn amount(&self) -> i64 {
        match self.price {
            OptionPrice::Amount(amount) => amount,
            OptionPrice::Multiplier(_) => 0,
        }
    }
}

/// An ordered table of options for one selection category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionTable {
    /// Category name, e.g. `vehicle_type` or `service_level`.
    pub category: String,

    /// Display label for the category.
    pub label: String,

    options: Vec<OptionDef>,
}

impl OptionTable {
    /// Create a table over the given options, preserving declaration order.
    #[must_use]
    pub fn new(category: String, label: String, options: Vec<OptionDef>) -> Self {
        Self {
            category,
            label,
            options,
        }
    }

    /// Find an option by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&OptionDef> {
        self.options.iter().find(|option| option.id == id)
    }

    /// Iterate options in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionDef> {
        self.options.iter()
    }

    /// Number of options in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether the table has no options.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Where an add-on's scaling quantity comes from.
///
/// In YAML this is a single-key map: `scale_by: { category: duration }` or
/// `scale_by: { field: guests }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantitySource {
    /// The declared `quantity` of the option currently chosen in a category
    /// (e.g. weeks implied by the chosen program duration).
    Category(String),

    /// A numeric field on the selection (e.g. `guests`).
    Field(String),
}

impl<'de> Deserialize<'de> for QuantitySource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SourceVisitor;

        impl<'de> Visitor<'de> for SourceVisitor {
            type Value = QuantitySource;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map with a single `category` or `field` key")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let Some(key) = map.next_key::<String>()? else {
                    return Err(de::Error::invalid_length(0, &self));
                };

                let source = match key.as_str() {
                    "category" => QuantitySource::Category(map.next_value()?),
                    "field" => QuantitySource::Field(map.next_value()?),
                    other => {
                        return Err(de::Error::unknown_variant(other, &["category", "field"]));
                    }
                };

                if map.next_key::<String>()?.is_some() {
                    return Err(de::Error::custom("expected a single source key"));
                }

                Ok(source)
            }
        }

        deserializer.deserialize_map(SourceVisitor)
    }
}

/// A multi-select add-on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOnDef {
    /// Unique add-on id.
    pub id: String,

    /// Display label.
    pub label: String,

    /// Flat amount in minor units before any scaling.
    pub amount: i64,

    /// Prerequisite for the add-on to count. Unmet prerequisites exclude
    /// the add-on silently; they never error.
    pub requires: Option<Condition>,

    /// Optional scaling rule multiplying `amount` by a derived quantity.
    pub scale_by: Option<QuantitySource>,
}

/// A line auto-added by the engine when its condition holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoInclude {
    /// Unique id for the auto-included line.
    pub id: String,

    /// Display label.
    pub label: String,

    /// Flat amount in minor units.
    pub amount: i64,

    /// Condition under which the line is added.
    pub when: Condition,

    /// Skip the auto-include when this add-on is already selected and
    /// counting (e.g. furniture protection already chosen explicitly).
    pub unless_addon: Option<String>,
}

//! Pipeline Stages
//!
//! Additive and multiplicative contributions do not commute, so each
//! calculator declares the order its categories apply in rather than
//! leaving it to ad hoc arithmetic. The engine folds the stage list in
//! declaration order; discounts always run after the last stage.

use std::fmt;

use serde::{
    Deserialize, Deserializer,
    de::{self, MapAccess, Visitor},
};

/// One step of a calculator's pricing pipeline.
///
/// In YAML a stage is either a bare name (`add_ons`, `auto_includes`) or a
/// single-key map binding a category (`base: service`, `multiply: frequency`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Set the running amount from the chosen option of this category.
    /// Exactly one base stage is required, and it must come first.
    Base(String),

    /// Add the chosen option's flat amount (possibly negative).
    Surcharge(String),

    /// Multiply the running amount by the chosen option's ratio.
    Multiply(String),

    /// Sum selected add-ons, in selection order.
    AddOns,

    /// Append auto-included lines whose conditions hold.
    AutoIncludes,
}

impl Stage {
    /// The category this stage resolves, if it resolves one.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::Base(category) | Self::Surcharge(category) | Self::Multiply(category) => {
                Some(category)
            }
            Self::AddOns | Self::AutoIncludes => None,
        }
    }
}

impl<'de> Deserialize<'de> for Stage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StageVisitor;

        impl<'de> Visitor<'de> for StageVisitor {
            type Value = Stage;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a stage name or a single-key map like `base: category`")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                match value {
                    "add_ons" => Ok(Stage::AddOns),
                    "auto_includes" => Ok(Stage::AutoIncludes),
                    other => Err(de::Error::unknown_variant(
                        other,
                        &["add_ons", "auto_includes"],
                    )),
                }
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let Some(key) = map.next_key::<String>()? else {
                    return Err(de::Error::invalid_length(0, &self));
                };

                let stage = match key.as_str() {
                    "base" => Stage::Base(map.next_value()?),
                    "surcharge" => Stage::Surcharge(map.next_value()?),
                    "multiply" => Stage::Multiply(map.next_value()?),
                    other => {
                        return Err(de::Error::unknown_variant(
                            other,
                            &["base", "surcharge", "multiply"],
                        ));
                    }
                };

                if map.next_key::<String>()?.is_some() {
                    return Err(de::Error::custom("expected a single stage key"));
                }

                Ok(stage)
            }
        }

        deserializer.deserialize_any(StageVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_list_deserializes_from_yaml() -> testresult::TestResult {
        let yaml = "
- base: service
- surcharge: vehicle
- multiply: frequency
- add_ons
- auto_includes
";
        let stages: Vec<Stage> = serde_norway::from_str(yaml)?;

        assert_eq!(
            stages,
            vec![
                Stage::Base("service".to_string()),
                Stage::Surcharge("vehicle".to_string()),
                Stage::Multiply("frequency".to_string()),
                Stage::AddOns,
                Stage::AutoIncludes,
            ]
        );

        Ok(())
    }

    #[test]
    fn unknown_stage_names_are_rejected() {
        assert!(serde_norway::from_str::<Vec<Stage>>("- discount: promo").is_err());
        assert!(serde_norway::from_str::<Vec<Stage>>("- fees").is_err());
    }

    #[test]
    fn category_is_none_for_collection_stages() {
        assert_eq!(Stage::AddOns.category(), None);
        assert_eq!(Stage::Base("a".to_string()).category(), Some("a"));
    }
}

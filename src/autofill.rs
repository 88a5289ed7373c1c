//! Autofill Adapter
//!
//! Boundary for the external natural-language parsing endpoint. The
//! endpoint is a black box that returns best-effort field guesses; this
//! module models its response as a partial, untrusted selection patch and
//! applies it through the same validation the manual path uses. A patch
//! can pre-fill fields, never bypass gating or pricing rules.
//!
//! Competing patches are last-write-wins; callers wanting ordering
//! guarantees should debounce or cancel superseded requests themselves.

use rustc_hash::FxHashMap;
use serde_json::Value;
use thiserror::Error;

use crate::{calculator::Calculator, selection::Selection};

/// Errors surfaced by an autofill source.
///
/// Callers are expected to log these and keep the prior selection state;
/// autofill failure is never shown to the user as a form error.
#[derive(Debug, Error)]
pub enum AutofillError {
    /// The endpoint was unreachable or answered non-2xx.
    #[error("autofill endpoint unavailable: {0}")]
    Unavailable(String),

    /// The response body was not a valid patch.
    #[error("malformed autofill response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One best-effort field guess.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldGuess {
    /// A category option id.
    Option(String),

    /// A numeric field value, e.g. a guest count.
    Number(u32),
}

/// A partial, untrusted selection patch.
///
/// Wire shape per the endpoint contract: a JSON object whose keys are a
/// subset of the calculator's selection categories (plus free numeric
/// fields), with an optional `addOns` array.
#[derive(Debug, Clone, Default)]
pub struct SelectionPatch {
    /// Guessed add-on ids, in the order the endpoint returned them.
    pub add_ons: Vec<String>,

    /// Guessed category options and numeric fields.
    pub fields: FxHashMap<String, FieldGuess>,
}

impl SelectionPatch {
    /// Parse a patch from an endpoint response body.
    ///
    /// Parsing is lenient per field: values that do not fit the contract
    /// (fractional or negative numbers, nulls, nested objects, non-string
    /// add-on entries) are dropped without discarding the rest of the body.
    ///
    /// # Errors
    ///
    /// Returns [`AutofillError::Malformed`] only when the body is not a JSON
    /// object at all.
    pub fn from_json(body: &str) -> Result<Self, AutofillError> {
        let raw: FxHashMap<String, Value> = serde_json::from_str(body)?;
        let mut patch = Self::default();

        for (field, value) in raw {
            if field == "addOns" {
                if let Value::Array(items) = value {
                    patch.add_ons = items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::String(id) => Some(id),
                            _ => None,
                        })
                        .collect();
                }
                continue;
            }

            match value {
                Value::String(id) => {
                    patch.fields.insert(field, FieldGuess::Option(id));
                }
                Value::Number(number) => {
                    if let Some(value) = number.as_u64().and_then(|wide| u32::try_from(wide).ok())
                    {
                        patch.fields.insert(field, FieldGuess::Number(value));
                    }
                }
                _ => {}
            }
        }

        Ok(patch)
    }

    /// Apply the patch to a selection, validating every id against the
    /// calculator.
    ///
    /// Only fields present in the patch are touched. Unknown categories,
    /// unknown option ids and unknown add-on ids are dropped silently;
    /// the endpoint's guesses carry no guarantee of validity. Numeric
    /// guesses for names that are not categories become numeric fields.
    pub fn apply(&self, selection: &mut Selection, calculator: &Calculator) {
        for (field, guess) in &self.fields {
            match guess {
                FieldGuess::Option(id) => {
                    if calculator.find_option(field, id).is_some() {
                        selection.choose(field, id);
                    }
                }
                FieldGuess::Number(value) => {
                    if calculator.table(field).is_none() {
                        selection.set_number(field, *value);
                    }
                }
            }
        }

        for id in &self.add_ons {
            if calculator.add_on(id).is_some() {
                selection.select_add_on(id);
            }
        }
    }
}

/// A source of autofill patches.
///
/// The production implementation posts `{ "input": <text> }` to the
/// calculator's endpoint and parses the JSON response; tests substitute a
/// canned source. Either way the patch goes through [`SelectionPatch::apply`].
pub trait AutofillSource {
    /// Parse free text into a best-effort patch.
    ///
    /// # Errors
    ///
    /// Returns an [`AutofillError`] when the source is unavailable or its
    /// response is malformed.
    fn parse(&self, input: &str) -> Result<SelectionPatch, AutofillError>;
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{
        calculator::{Calculator, CalculatorParts},
        catalog::{AddOnDef, OptionDef, OptionPrice, OptionTable},
        pricing::stages::Stage,
    };

    use super::*;

    fn calculator() -> Result<Calculator, crate::calculator::CalculatorError> {
        let vehicle = OptionTable::new(
            "vehicle".to_string(),
            "Vehicle".to_string(),
            vec![
                OptionDef {
                    id: "sedan".to_string(),
                    label: "Sedan".to_string(),
                    price: OptionPrice::Amount(0),
                    popular: false,
                    quantity: None,
                },
                OptionDef {
                    id: "suv".to_string(),
                    label: "SUV".to_string(),
                    price: OptionPrice::Amount(20_00),
                    popular: false,
                    quantity: None,
                },
            ],
        );

        Calculator::new(
            iso::USD,
            CalculatorParts {
                name: "Test".to_string(),
                tables: vec![vehicle],
                add_ons: vec![AddOnDef {
                    id: "wax".to_string(),
                    label: "Wax".to_string(),
                    amount: 25_00,
                    requires: None,
                    scale_by: None,
                }],
                stages: vec![Stage::Base("vehicle".to_string()), Stage::AddOns],
                ..CalculatorParts::default()
            },
        )
    }

    #[test]
    fn patch_applies_only_valid_fields() -> TestResult {
        let calculator = calculator()?;
        let mut selection = Selection::new();

        let patch = SelectionPatch::from_json(
            r#"{"vehicle": "suv", "boat": "yacht", "guests": 6, "addOns": ["wax", "nope"]}"#,
        )?;
        patch.apply(&mut selection, &calculator);

        assert_eq!(selection.category("vehicle"), Some("suv"));
        assert_eq!(selection.category("boat"), None);
        assert_eq!(selection.number("guests"), Some(6));
        assert!(selection.has_add_on("wax"));
        assert!(!selection.has_add_on("nope"));

        Ok(())
    }

    #[test]
    fn patch_leaves_unmentioned_fields_alone() -> TestResult {
        let calculator = calculator()?;
        let mut selection = Selection::new();
        selection.choose("vehicle", "sedan");
        selection.set_promo_code(Some("SHINE10"));

        let patch = SelectionPatch::from_json(r#"{"addOns": ["wax"]}"#)?;
        patch.apply(&mut selection, &calculator);

        assert_eq!(selection.category("vehicle"), Some("sedan"));
        assert_eq!(selection.promo_code(), Some("SHINE10"));

        Ok(())
    }

    #[test]
    fn invalid_option_id_is_dropped_not_applied() -> TestResult {
        let calculator = calculator()?;
        let mut selection = Selection::new();
        selection.choose("vehicle", "suv");

        let patch = SelectionPatch::from_json(r#"{"vehicle": "hovercraft"}"#)?;
        patch.apply(&mut selection, &calculator);

        // The bad guess must not clobber the valid manual choice.
        assert_eq!(selection.category("vehicle"), Some("suv"));

        Ok(())
    }

    #[test]
    fn off_contract_values_are_dropped_per_field() -> TestResult {
        let calculator = calculator()?;
        let mut selection = Selection::new();

        let patch = SelectionPatch::from_json(
            r#"{"vehicle": "suv", "guests": 6.5, "notes": null, "addOns": ["wax", 3]}"#,
        )?;
        patch.apply(&mut selection, &calculator);

        // The fractional guest count is dropped; the valid guesses survive.
        assert_eq!(selection.category("vehicle"), Some("suv"));
        assert_eq!(selection.number("guests"), None);
        assert!(selection.has_add_on("wax"));

        Ok(())
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(matches!(
            SelectionPatch::from_json("not json"),
            Err(AutofillError::Malformed(_))
        ));
    }
}

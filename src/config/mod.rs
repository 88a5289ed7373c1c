//! Calculator Configs
//!
//! YAML-backed calculator definitions. A calculator is pure data (option
//! tables, add-ons, conditional rules, discount rules and a pipeline), and
//! this module parses that data into a validated [`Calculator`]. Raw serde
//! shapes are converted with `TryFrom` so every money string, percentage
//! and cross-reference is checked at load time, never at pricing time.

use std::{ffi::OsStr, fs, path::PathBuf};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::iso::{self, Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    calculator::{Calculator, CalculatorError, CalculatorParts},
    catalog::{AddOnDef, AutoInclude, OptionDef, OptionPrice, OptionTable, QuantitySource},
    conditions::Condition,
    discounts::{PromoCode, StandingDiscount},
    pricing::stages::Stage,
};

/// Config parsing and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading a calculator file.
    #[error("failed to read calculator file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format. Prices are written as `"150.00 USD"`.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// Unknown ISO currency code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// An amount's currency differs from the calculator's currency.
    #[error("currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch {
        /// The calculator's declared currency.
        expected: String,
        /// The offending amount's currency.
        found: String,
    },

    /// A percentage outside `(0, 1]`.
    #[error("invalid percentage: {0} (expected a fraction in (0, 1])")]
    InvalidPercent(f64),

    /// An option declares none of `price`, `surcharge`, `multiplier`.
    #[error("option {0} declares no price")]
    MissingPrice(String),

    /// An option declares more than one of `price`, `surcharge`,
    /// `multiplier`.
    #[error("option {0} declares more than one price kind")]
    AmbiguousPrice(String),

    /// Structural validation failed after parsing.
    #[error(transparent)]
    Calculator(#[from] CalculatorError),
}

/// Parse a price string like `"150.00 USD"` into minor units and currency.
///
/// Negative amounts (`"-15.00 USD"`) are accepted; adjustments may be
/// modeled as negative surcharges.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPrice`] for malformed input and
/// [`ConfigError::UnknownCurrency`] for unrecognized currency codes.
pub fn parse_price(input: &str) -> Result<(i64, &'static Currency), ConfigError> {
    let mut parts = input.split_whitespace();
    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ConfigError::InvalidPrice(input.to_string()));
    };

    let currency = iso::find(code).ok_or_else(|| ConfigError::UnknownCurrency(code.to_string()))?;

    let amount: Decimal = amount
        .parse()
        .map_err(|_parse| ConfigError::InvalidPrice(input.to_string()))?;

    let scale = Decimal::from(10_u64.pow(currency.exponent));
    let minor = amount
        .checked_mul(scale)
        .ok_or_else(|| ConfigError::InvalidPrice(input.to_string()))?;

    if minor.fract() != Decimal::ZERO {
        return Err(ConfigError::InvalidPrice(input.to_string()));
    }

    minor
        .to_i64()
        .map(|minor| (minor, currency))
        .ok_or_else(|| ConfigError::InvalidPrice(input.to_string()))
}

fn parse_percent(value: f64) -> Result<Percentage, ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(Percentage::from(value))
    } else {
        Err(ConfigError::InvalidPercent(value))
    }
}

/// Parse a calculator definition from YAML text.
///
/// # Errors
///
/// Returns a [`ConfigError`] for malformed YAML, bad money or percentage
/// values, or structural problems found during validation.
pub fn load_str(yaml: &str) -> Result<Calculator, ConfigError> {
    let raw: RawCalculator = serde_norway::from_str(yaml)?;

    raw.try_into()
}

/// Load a calculator definition from a YAML file.
///
/// # Errors
///
/// As [`load_str`], plus IO errors reading the file.
pub fn load_path(path: impl Into<PathBuf>) -> Result<Calculator, ConfigError> {
    let contents = fs::read_to_string(path.into())?;

    load_str(&contents)
}

/// A directory of calculator definitions, one `.yml` file per calculator.
#[derive(Debug, Clone)]
pub struct CalculatorSet {
    base_path: PathBuf,
}

impl CalculatorSet {
    /// A set rooted at the default `./calculators` directory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./calculators")
    }

    /// A set rooted at a custom directory.
    #[must_use]
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load the named calculator (`{base}/{name}.yml`).
    ///
    /// # Errors
    ///
    /// As [`load_path`].
    pub fn load(&self, name: &str) -> Result<Calculator, ConfigError> {
        load_path(self.base_path.join(format!("{name}.yml")))
    }

    /// List the calculator names available in the set, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the directory cannot be read.
    pub fn available(&self) -> Result<Vec<String>, ConfigError> {
        let mut names: Vec<String> = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|extension| extension == "yml") {
                if let Some(stem) = path.file_stem().and_then(OsStr::to_str) {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

impl Default for CalculatorSet {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCalculator {
    name: String,
    currency: String,
    #[serde(default)]
    required: Vec<String>,
    tables: Vec<RawTable>,
    #[serde(default)]
    add_ons: Vec<RawAddOn>,
    #[serde(default)]
    auto_includes: Vec<RawAutoInclude>,
    #[serde(default)]
    discounts: Vec<RawStandingDiscount>,
    #[serde(default)]
    promo_codes: Vec<RawPromoCode>,
    pipeline: Vec<Stage>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTable {
    category: String,
    label: String,
    options: Vec<RawOption>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOption {
    id: String,
    label: String,
    price: Option<String>,
    surcharge: Option<String>,
    multiplier: Option<Decimal>,
    #[serde(default)]
    popular: bool,
    quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAddOn {
    id: String,
    label: String,
    price: String,
    requires: Option<Condition>,
    scale_by: Option<QuantitySource>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAutoInclude {
    id: String,
    label: String,
    price: String,
    when: Condition,
    unless_addon: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStandingDiscount {
    id: String,
    label: String,
    percent: f64,
    when: Condition,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPromoCode {
    code: String,
    label: String,
    percent: f64,
}

impl TryFrom<RawCalculator> for Calculator {
    type Error = ConfigError;

    fn try_from(raw: RawCalculator) -> Result<Self, Self::Error> {
        let currency = iso::find(&raw.currency)
            .ok_or_else(|| ConfigError::UnknownCurrency(raw.currency.clone()))?;

        let mut tables = Vec::with_capacity(raw.tables.len());
        for table in raw.tables {
            let mut options = Vec::with_capacity(table.options.len());
            for option in table.options {
                options.push(convert_option(option, currency)?);
            }
            tables.push(OptionTable::new(table.category, table.label, options));
        }

        let mut add_ons = Vec::with_capacity(raw.add_ons.len());
        for add_on in raw.add_ons {
            add_ons.push(AddOnDef {
                amount: amount_in(&add_on.price, currency)?,
                id: add_on.id,
                label: add_on.label,
                requires: add_on.requires,
                scale_by: add_on.scale_by,
            });
        }

        let mut auto_includes = Vec::with_capacity(raw.auto_includes.len());
        for auto in raw.auto_includes {
            auto_includes.push(AutoInclude {
                amount: amount_in(&auto.price, currency)?,
                id: auto.id,
                label: auto.label,
                when: auto.when,
                unless_addon: auto.unless_addon,
            });
        }

        let mut standing_discounts = Vec::with_capacity(raw.discounts.len());
        for discount in raw.discounts {
            standing_discounts.push(StandingDiscount {
                percent: parse_percent(discount.percent)?,
                id: discount.id,
                label: discount.label,
                when: discount.when,
            });
        }

        let mut promo_codes = Vec::with_capacity(raw.promo_codes.len());
        for promo in raw.promo_codes {
            promo_codes.push(PromoCode {
                percent: parse_percent(promo.percent)?,
                code: promo.code,
                label: promo.label,
            });
        }

        let parts = CalculatorParts {
            name: raw.name,
            tables,
            add_ons,
            auto_includes,
            standing_discounts,
            promo_codes,
            stages: raw.pipeline,
            required: raw.required,
        };

        Ok(Calculator::new(currency, parts)?)
    }
}

fn convert_option(raw: RawOption, currency: &'static Currency) -> Result<OptionDef, ConfigError> {
    let price = match (raw.price, raw.surcharge, raw.multiplier) {
        (Some(price), None, None) | (None, Some(price), None) => {
            OptionPrice::Amount(amount_in(&price, currency)?)
        }
        (None, None, Some(multiplier)) => OptionPrice::Multiplier(multiplier),
        (None, None, None) => return Err(ConfigError::MissingPrice(raw.id)),
        _ => return Err(ConfigError::AmbiguousPrice(raw.id)),
    };

    Ok(OptionDef {
        id: raw.id,
        label: raw.label,
        price,
        popular: raw.popular,
        quantity: raw.quantity,
    })
}

/// Parse a price string and check it against the calculator currency.
fn amount_in(input: &str, currency: &'static Currency) -> Result<i64, ConfigError> {
    let (minor, found) = parse_price(input)?;

    if found == currency {
        Ok(minor)
    } else {
        Err(ConfigError::CurrencyMismatch {
            expected: currency.iso_alpha_code.to_string(),
            found: found.iso_alpha_code.to_string(),
        })
    }
}

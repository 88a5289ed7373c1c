//! Calculator
//!
//! The validated aggregate for one quote calculator: option tables, add-ons,
//! auto-includes, discount rules and the declared pipeline. Construction
//! checks every cross-reference so the engine can stay total. After a
//! calculator validates, no user input can make pricing fail.

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    catalog::{AddOnDef, AutoInclude, OptionDef, OptionPrice, OptionTable, QuantitySource},
    discounts::{PromoCode, StandingDiscount},
    pricing::stages::Stage,
};

/// Structural validation errors for a calculator definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculatorError {
    /// Two tables share a category name.
    #[error("duplicate category: {0}")]
    DuplicateCategory(String),

    /// Two options in one table share an id.
    #[error("duplicate option {id} in category {category}")]
    DuplicateOption {
        /// Owning category.
        category: String,
        /// Duplicated option id.
        id: String,
    },

    /// Two add-ons share an id.
    #[error("duplicate add-on: {0}")]
    DuplicateAddOn(String),

    /// Two auto-includes share an id.
    #[error("duplicate auto-include: {0}")]
    DuplicateAutoInclude(String),

    /// Two promo codes collide case-insensitively.
    #[error("duplicate promo code: {0}")]
    DuplicatePromoCode(String),

    /// A stage, rule or requirement names a category with no table.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// A condition names an option missing from its category's table.
    #[error("unknown option {id} in category {category}")]
    UnknownOption {
        /// Referenced category.
        category: String,
        /// Missing option id.
        id: String,
    },

    /// An `unless_addon` reference names no declared add-on.
    #[error("unknown add-on: {0}")]
    UnknownAddOn(String),

    /// The pipeline has no base stage.
    #[error("pipeline has no base stage")]
    MissingBaseStage,

    /// The pipeline's base stage is not its first stage, or there is more
    /// than one.
    #[error("pipeline base stage must be the single first stage")]
    MisplacedBaseStage,

    /// A category is consumed by more than one stage.
    #[error("category {0} appears in more than one stage")]
    DuplicateStageCategory(String),

    /// `add_ons` or `auto_includes` appears more than once in the pipeline.
    #[error("stage {0} appears more than once")]
    DuplicateStage(&'static str),

    /// A multiply stage references a table containing flat amounts.
    #[error("option {id} in category {category} must be a multiplier")]
    ExpectedMultiplier {
        /// Referenced category.
        category: String,
        /// Offending option id.
        id: String,
    },

    /// A base or surcharge stage references a table containing multipliers.
    #[error("option {id} in category {category} must be a flat amount")]
    ExpectedAmount {
        /// Referenced category.
        category: String,
        /// Offending option id.
        id: String,
    },
}

/// A validated quote calculator.
#[derive(Debug, Clone)]
pub struct Calculator {
    name: String,
    currency: &'static Currency,
    tables: Vec<OptionTable>,
    add_ons: Vec<AddOnDef>,
    auto_includes: Vec<AutoInclude>,
    standing_discounts: Vec<StandingDiscount>,
    promo_codes: Vec<PromoCode>,
    stages: Vec<Stage>,
    required: Vec<String>,
}

/// Unvalidated parts of a calculator, assembled by the config loader or by
/// hand in tests.
#[derive(Debug, Clone, Default)]
pub struct CalculatorParts {
    /// Display name.
    pub name: String,

    /// Ordered option tables.
    pub tables: Vec<OptionTable>,

    /// Add-on definitions.
    pub add_ons: Vec<AddOnDef>,

    /// Auto-include definitions.
    pub auto_includes: Vec<AutoInclude>,

    /// Standing discount rules, applied in declaration order.
    pub standing_discounts: Vec<StandingDiscount>,

    /// Promo-code rules.
    pub promo_codes: Vec<PromoCode>,

    /// Declared pipeline stage order.
    pub stages: Vec<Stage>,

    /// Categories the UI should require before quoting.
    pub required: Vec<String>,
}

impl Calculator {
    /// Validate parts into a calculator.
    ///
    /// # Errors
    ///
    /// Returns a [`CalculatorError`] describing the first structural problem
    /// found: duplicate ids, dangling references, or a malformed pipeline.
    pub fn new(currency: &'static Currency, parts: CalculatorParts) -> Result<Self, CalculatorError> {
        let calculator = Self {
            name: parts.name,
            currency,
            tables: parts.tables,
            add_ons: parts.add_ons,
            auto_includes: parts.auto_includes,
            standing_discounts: parts.standing_discounts,
            promo_codes: parts.promo_codes,
            stages: parts.stages,
            required: parts.required,
        };

        calculator.validate()?;

        Ok(calculator)
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Currency all amounts are denominated in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Option tables in declaration order.
    #[must_use]
    pub fn tables(&self) -> &[OptionTable] {
        &self.tables
    }

    /// Find a table by category name.
    #[must_use]
    pub fn table(&self, category: &str) -> Option<&OptionTable> {
        self.tables.iter().find(|table| table.category == category)
    }

    /// Resolve an option id within a category.
    #[must_use]
    pub fn find_option(&self, category: &str, id: &str) -> Option<&OptionDef> {
        self.table(category).and_then(|table| table.find(id))
    }

    /// Add-on definitions.
    #[must_use]
    pub fn add_ons(&self) -> &[AddOnDef] {
        &self.add_ons
    }

    /// Find an add-on by id.
    #[must_use]
    pub fn add_on(&self, id: &str) -> Option<&AddOnDef> {
        self.add_ons.iter().find(|add_on| add_on.id == id)
    }

    /// Auto-include definitions in declaration order.
    #[must_use]
    pub fn auto_includes(&self) -> &[AutoInclude] {
        &self.auto_includes
    }

    /// Standing discounts in declaration order.
    #[must_use]
    pub fn standing_discounts(&self) -> &[StandingDiscount] {
        &self.standing_discounts
    }

    /// Promo-code rules.
    #[must_use]
    pub fn promo_codes(&self) -> &[PromoCode] {
        &self.promo_codes
    }

    /// Declared pipeline stages.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Categories the UI should require before quoting.
    pub fn required_categories(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    fn validate(&self) -> Result<(), CalculatorError> {
        self.validate_tables()?;
        self.validate_add_ons()?;
        self.validate_auto_includes()?;
        self.validate_promo_codes()?;
        self.validate_pipeline()?;
        self.validate_conditions()?;

        for category in &self.required {
            self.require_table(category)?;
        }

        Ok(())
    }

    fn validate_tables(&self) -> Result<(), CalculatorError> {
        for (index, table) in self.tables.iter().enumerate() {
            if self
                .tables
                .iter()
                .take(index)
                .any(|earlier| earlier.category == table.category)
            {
                return Err(CalculatorError::DuplicateCategory(table.category.clone()));
            }

            let mut seen: Vec<&str> = Vec::with_capacity(table.len());
            for option in table.iter() {
                if seen.contains(&option.id.as_str()) {
                    return Err(CalculatorError::DuplicateOption {
                        category: table.category.clone(),
                        id: option.id.clone(),
                    });
                }
                seen.push(&option.id);
            }
        }

        Ok(())
    }

    fn validate_add_ons(&self) -> Result<(), CalculatorError> {
        for (index, add_on) in self.add_ons.iter().enumerate() {
            if self
                .add_ons
                .iter()
                .take(index)
                .any(|earlier| earlier.id == add_on.id)
            {
                return Err(CalculatorError::DuplicateAddOn(add_on.id.clone()));
            }

            if let Some(QuantitySource::Category(category)) = &add_on.scale_by {
                self.require_table(category)?;
            }
        }

        Ok(())
    }

    fn validate_auto_includes(&self) -> Result<(), CalculatorError> {
        for (index, auto) in self.auto_includes.iter().enumerate() {
            if self
                .auto_includes
                .iter()
                .take(index)
                .any(|earlier| earlier.id == auto.id)
            {
                return Err(CalculatorError::DuplicateAutoInclude(auto.id.clone()));
            }

            if let Some(unless) = &auto.unless_addon {
                if self.add_on(unless).is_none() {
                    return Err(CalculatorError::UnknownAddOn(unless.clone()));
                }
            }
        }

        Ok(())
    }

    fn validate_promo_codes(&self) -> Result<(), CalculatorError> {
        for (index, promo) in self.promo_codes.iter().enumerate() {
            if self
                .promo_codes
                .iter()
                .take(index)
                .any(|earlier| earlier.code.eq_ignore_ascii_case(&promo.code))
            {
                return Err(CalculatorError::DuplicatePromoCode(promo.code.clone()));
            }
        }

        Ok(())
    }

    fn validate_pipeline(&self) -> Result<(), CalculatorError> {
        match self.stages.first() {
            Some(Stage::Base(_)) => {}
            Some(_) => return Err(CalculatorError::MisplacedBaseStage),
            None => return Err(CalculatorError::MissingBaseStage),
        }

        if self
            .stages
            .iter()
            .skip(1)
            .any(|stage| matches!(stage, Stage::Base(_)))
        {
            return Err(CalculatorError::MisplacedBaseStage);
        }

        let mut seen_categories: Vec<&str> = Vec::new();
        let mut seen_add_ons = false;
        let mut seen_auto_includes = false;

        for stage in &self.stages {
            match stage {
                Stage::Base(category) | Stage::Surcharge(category) => {
                    self.require_amount_table(category)?;
                    Self::record_stage_category(&mut seen_categories, category)?;
                }
                Stage::Multiply(category) => {
                    self.require_multiplier_table(category)?;
                    Self::record_stage_category(&mut seen_categories, category)?;
                }
                Stage::AddOns => {
                    if seen_add_ons {
                        return Err(CalculatorError::DuplicateStage("add_ons"));
                    }
                    seen_add_ons = true;
                }
                Stage::AutoIncludes => {
                    if seen_auto_includes {
                        return Err(CalculatorError::DuplicateStage("auto_includes"));
                    }
                    seen_auto_includes = true;
                }
            }
        }

        Ok(())
    }

    fn record_stage_category<'a>(
        seen: &mut Vec<&'a str>,
        category: &'a str,
    ) -> Result<(), CalculatorError> {
        if seen.contains(&category) {
            return Err(CalculatorError::DuplicateStageCategory(category.to_string()));
        }

        seen.push(category);
        Ok(())
    }

    fn validate_conditions(&self) -> Result<(), CalculatorError> {
        let mut references: Vec<(String, Option<String>)> = Vec::new();

        for add_on in &self.add_ons {
            if let Some(requires) = &add_on.requires {
                requires.referenced_categories(&mut references);
            }
        }
        for auto in &self.auto_includes {
            auto.when.referenced_categories(&mut references);
        }
        for discount in &self.standing_discounts {
            discount.when.referenced_categories(&mut references);
        }

        for (category, option) in references {
            let table = self.require_table(&category)?;

            if let Some(id) = option {
                if table.find(&id).is_none() {
                    return Err(CalculatorError::UnknownOption { category, id });
                }
            }
        }

        Ok(())
    }

    fn require_table(&self, category: &str) -> Result<&OptionTable, CalculatorError> {
        self.table(category)
            .ok_or_else(|| CalculatorError::UnknownCategory(category.to_string()))
    }

    fn require_amount_table(&self, category: &str) -> Result<(), CalculatorError> {
        let table = self.require_table(category)?;

        for option in table.iter() {
            if matches!(option.price, OptionPrice::Multiplier(_)) {
                return Err(CalculatorError::ExpectedAmount {
                    category: category.to_string(),
                    id: option.id.clone(),
                });
            }
        }

        Ok(())
    }

    fn require_multiplier_table(&self, category: &str) -> Result<(), CalculatorError> {
        let table = self.require_table(category)?;

        for option in table.iter() {
            if matches!(option.price, OptionPrice::Amount(_)) {
                return Err(CalculatorError::ExpectedMultiplier {
                    category: category.to_string(),
                    id: option.id.clone(),
                });
            }
        }

        Ok(())
    }
}

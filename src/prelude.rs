//! Quotient prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    autofill::{AutofillError, AutofillSource, SelectionPatch},
    booking::{mailto_link, quote_summary},
    breakdown::{Breakdown, LineKind, PriceLine},
    calculator::{Calculator, CalculatorError, CalculatorParts},
    catalog::{AddOnDef, AutoInclude, OptionDef, OptionPrice, OptionTable, QuantitySource},
    conditions::{BoolOp, Condition, ConditionRule},
    config::{CalculatorSet, ConfigError, load_path, load_str, parse_price},
    discounts::{DiscountError, PromoCode, StandingDiscount, match_promo, percent_of_minor},
    pricing::{price, stages::Stage},
    selection::{Contact, Selection},
};

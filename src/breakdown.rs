//! Breakdown
//!
//! The derived, ephemeral result of pricing a selection: an ordered list of
//! human-readable lines plus subtotal, discount and clamped total. A
//! breakdown holds no identity and is never persisted; it is recomputed
//! from scratch on every change to the selection.

use std::fmt;

use rusty_money::{Money, iso::Currency};
use tabled::{Table, Tabled, settings::Style};

/// What a price line represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// The primary category's base amount.
    Base,

    /// An additive category surcharge or adjustment (may be negative).
    Surcharge,

    /// The delta introduced by a multiplicative factor.
    MultiplierAdjustment,

    /// A selected add-on.
    AddOn,

    /// A conditionally auto-added mandatory line.
    AutoInclude,

    /// A standing or promo-code discount (always negative).
    Discount,
}

/// One visible line of the breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLine {
    /// Display label derived from the contributing option or rule.
    pub label: String,

    /// Signed amount in minor units.
    pub amount: i64,

    /// What the line represents.
    pub kind: LineKind,
}

/// Price breakdown for one selection.
///
/// Line order is significant: base first, then multiplier adjustments and
/// surcharges in pipeline order, add-ons in selection order, auto-included
/// lines in declaration order, discounts last. Zero-amount contributions
/// are part of the computation but omitted from `lines`.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    lines: Vec<PriceLine>,
    subtotal: i64,
    discount: i64,
    total: i64,
    currency: &'static Currency,
}

impl Breakdown {
    /// Create a breakdown from computed parts.
    ///
    /// The total is clamped to zero here so the invariant holds no matter
    /// how the parts were produced.
    #[must_use]
    pub fn new(
        lines: Vec<PriceLine>,
        subtotal: i64,
        discount: i64,
        currency: &'static Currency,
    ) -> Self {
        Self {
            lines,
            subtotal,
            discount,
            total: subtotal.saturating_sub(discount).max(0),
            currency,
        }
    }

    /// Visible lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[PriceLine] {
        &self.lines
    }

    /// Sum of all non-discount contributions, in minor units.
    #[must_use]
    pub fn subtotal_minor(&self) -> i64 {
        self.subtotal
    }

    /// Total discount, in minor units.
    #[must_use]
    pub fn discount_minor(&self) -> i64 {
        self.discount
    }

    /// Final amount, in minor units. Never negative.
    #[must_use]
    pub fn total_minor(&self) -> i64 {
        self.total
    }

    /// Subtotal as a money value.
    #[must_use]
    pub fn subtotal(&self) -> Money<'static, Currency> {
        Money::from_minor(self.subtotal, self.currency)
    }

    /// Total discount as a money value.
    #[must_use]
    pub fn discount(&self) -> Money<'static, Currency> {
        Money::from_minor(self.discount, self.currency)
    }

    /// Final total as a money value.
    #[must_use]
    pub fn total(&self) -> Money<'static, Currency> {
        Money::from_minor(self.total, self.currency)
    }

    /// Currency used for all monetary values.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Render the breakdown as a table.
    #[must_use]
    pub fn to_table(&self) -> String {
        let mut rows: Vec<BreakdownRow> = self
            .lines
            .iter()
            .map(|line| BreakdownRow {
                item: line.label.clone(),
                amount: Money::from_minor(line.amount, self.currency).to_string(),
            })
            .collect();

        rows.push(BreakdownRow {
            item: "Subtotal".to_string(),
            amount: self.subtotal().to_string(),
        });

        if self.discount != 0 {
            rows.push(BreakdownRow {
                item: "Discount".to_string(),
                amount: Money::from_minor(-self.discount, self.currency).to_string(),
            });
        }

        rows.push(BreakdownRow {
            item: "Total".to_string(),
            amount: self.total().to_string(),
        });

        Table::new(rows).with(Style::sharp()).to_string()
    }
}

impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_table())
    }
}

#[derive(Tabled)]
struct BreakdownRow {
    #[tabled(rename = "Item")]
    item: String,

    #[tabled(rename = "Amount")]
    amount: String,
}

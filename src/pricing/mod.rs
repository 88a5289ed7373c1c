//! Pricing Engine
//!
//! The pure breakdown computation: fold the calculator's declared pipeline
//! over the current selection, then apply discounts and clamp. The engine
//! is total: missing or unknown selections contribute zero, invalid
//! add-on combinations are skipped silently, and unknown promo codes are
//! ignored. Required-field gating is the wizard's concern, not the
//! engine's; any selection can be priced at any time.

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};

use crate::{
    breakdown::{Breakdown, LineKind, PriceLine},
    calculator::Calculator,
    catalog::{AddOnDef, OptionDef, OptionPrice, QuantitySource},
    discounts::{match_promo, percent_of_minor},
    selection::Selection,
};

pub mod stages;

use stages::Stage;

/// Compute the price breakdown for a selection.
///
/// Referentially transparent: identical inputs always produce an identical
/// breakdown, and recomputation never observes interior state.
#[must_use]
pub fn price(selection: &Selection, calculator: &Calculator) -> Breakdown {
    let mut lines: Vec<PriceLine> = Vec::new();
    let mut running: i64 = 0;

    for stage in calculator.stages() {
        match stage {
            Stage::Base(category) => {
                if let Some(option) = resolve(calculator, selection, category) {
                    running = option.amount();
                    push_line(&mut lines, &option.label, running, LineKind::Base);
                }
            }
            Stage::Surcharge(category) => {
                if let Some(option) = resolve(calculator, selection, category) {
                    let amount = option.amount();
                    running = running.saturating_add(amount);
                    push_line(&mut lines, &option.label, amount, LineKind::Surcharge);
                }
            }
            Stage::Multiply(category) => {
                if let Some(option) = resolve(calculator, selection, category) {
                    if let OptionPrice::Multiplier(factor) = option.price {
                        let scaled = mul_minor(running, factor);
                        let delta = scaled.saturating_sub(running);
                        running = scaled;
                        push_line(
                            &mut lines,
                            &format!("{} (\u{d7}{factor})", option.label),
                            delta,
                            LineKind::MultiplierAdjustment,
                        );
                    }
                }
            }
            Stage::AddOns => {
                for id in selection.add_ons() {
                    let Some(add_on) = calculator.add_on(id) else {
                        continue;
                    };

                    if !add_on_counts(add_on, selection) {
                        continue;
                    }

                    let quantity = scale_quantity(add_on, selection, calculator);
                    let amount = add_on.amount.saturating_mul(i64::from(quantity));
                    running = running.saturating_add(amount);
                    push_line(
                        &mut lines,
                        &add_on_label(add_on, quantity),
                        amount,
                        LineKind::AddOn,
                    );
                }
            }
            Stage::AutoIncludes => {
                for auto in calculator.auto_includes() {
                    if !auto.when.holds(selection) {
                        continue;
                    }

                    let already_covered = auto.unless_addon.as_deref().is_some_and(|id| {
                        selection.has_add_on(id)
                            && calculator
                                .add_on(id)
                                .is_some_and(|add_on| add_on_counts(add_on, selection))
                    });
                    if already_covered {
                        continue;
                    }

                    running = running.saturating_add(auto.amount);
                    push_line(&mut lines, &auto.label, auto.amount, LineKind::AutoInclude);
                }
            }
        }
    }

    let subtotal = running;
    let mut remaining = subtotal;
    let mut discount_total: i64 = 0;

    for discount in calculator.standing_discounts() {
        if !discount.when.holds(selection) {
            continue;
        }

        // Totality over precision at the extreme end of the i64 range: an
        // unrepresentable percentage yields no discount rather than an error.
        let amount = percent_of_minor(&discount.percent, remaining).unwrap_or(0);
        discount_total = discount_total.saturating_add(amount);
        remaining = remaining.saturating_sub(amount);
        push_line(&mut lines, &discount.label, -amount, LineKind::Discount);
    }

    if let Some(input) = selection.promo_code() {
        if let Some(promo) = match_promo(calculator.promo_codes(), input) {
            let amount = percent_of_minor(&promo.percent, remaining).unwrap_or(0);
            discount_total = discount_total.saturating_add(amount);
            push_line(&mut lines, &promo.label, -amount, LineKind::Discount);
        }
    }

    Breakdown::new(lines, subtotal, discount_total, calculator.currency())
}

/// Resolve the chosen option for a category, treating unresolved or unknown
/// ids as "not yet chosen".
fn resolve<'a>(
    calculator: &'a Calculator,
    selection: &Selection,
    category: &str,
) -> Option<&'a OptionDef> {
    selection
        .category(category)
        .and_then(|id| calculator.find_option(category, id))
}

/// Whether a selected add-on actually counts toward the total.
fn add_on_counts(add_on: &AddOnDef, selection: &Selection) -> bool {
    add_on
        .requires
        .as_ref()
        .is_none_or(|requires| requires.holds(selection))
}

/// Resolve the scaling quantity for an add-on. A missing source resolves to
/// one: an unscaled add-on is still a chosen add-on.
fn scale_quantity(add_on: &AddOnDef, selection: &Selection, calculator: &Calculator) -> u32 {
    match &add_on.scale_by {
        None => 1,
        Some(QuantitySource::Field(field)) => selection.number(field).unwrap_or(1).max(1),
        Some(QuantitySource::Category(category)) => resolve(calculator, selection, category)
            .and_then(|option| option.quantity)
            .unwrap_or(1)
            .max(1),
    }
}

fn add_on_label(add_on: &AddOnDef, quantity: u32) -> String {
    if quantity > 1 {
        format!("{} \u{d7} {quantity}", add_on.label)
    } else {
        add_on.label.clone()
    }
}

/// Scale a minor-unit amount by a decimal ratio, rounding midpoints away
/// from zero and saturating at the representable range.
fn mul_minor(minor: i64, factor: Decimal) -> i64 {
    let Some(minor_decimal) = Decimal::from_i64(minor) else {
        return minor;
    };

    if let Some(product) = minor_decimal.checked_mul(factor) {
        let rounded = product.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        if let Some(scaled) = rounded.to_i64() {
            return scaled;
        }
    }

    if factor.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    }
}

/// Append a line, omitting zero-amount contributions from the visible
/// breakdown. They still took part in the computation.
fn push_line(lines: &mut Vec<PriceLine>, label: &str, amount: i64, kind: LineKind) {
    if amount == 0 {
        return;
    }

    lines.push(PriceLine {
        label: label.to_string(),
        amount,
        kind,
    });
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn mul_minor_rounds_half_away_from_zero() {
        // 45 × 1.9 = 85.5 rounds to 86.
        assert_eq!(mul_minor(45, Decimal::new(19, 1)), 86);
        assert_eq!(mul_minor(-45, Decimal::new(19, 1)), -86);
    }

    #[test]
    fn mul_minor_saturates_on_overflow() {
        assert_eq!(mul_minor(i64::MAX, Decimal::TWO), i64::MAX);
        assert_eq!(mul_minor(i64::MAX, Decimal::NEGATIVE_ONE * Decimal::TWO), i64::MIN);
    }

    #[test]
    fn zero_lines_are_omitted() {
        let mut lines = Vec::new();
        push_line(&mut lines, "Online", 0, LineKind::Surcharge);
        push_line(&mut lines, "SUV", 20_00, LineKind::Surcharge);

        assert_eq!(lines.len(), 1);
    }
}

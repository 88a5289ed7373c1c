//! Conformance tests for the bundled calculators.

use quotient::prelude::*;
use rusty_money::{Money, iso::USD};
use testresult::TestResult;

fn load(name: &str) -> Result<Calculator, ConfigError> {
    CalculatorSet::new().load(name)
}

#[test]
fn car_detailing_scenario() -> TestResult {
    let calculator = load("car-detailing")?;

    let mut selection = Selection::new();
    selection.choose("service", "full_detail");
    selection.choose("vehicle", "suv");
    selection.choose("condition", "average");
    selection.toggle_add_on("headlight_restoration");
    selection.set_promo_code(Some("SHINE10"));

    let breakdown = price(&selection, &calculator);

    // 150 + 20 + 10 + 40 = 220; 10% off -> 198.
    assert_eq!(breakdown.subtotal(), Money::from_minor(220_00, USD));
    assert_eq!(breakdown.discount(), Money::from_minor(22_00, USD));
    assert_eq!(breakdown.total(), Money::from_minor(198_00, USD));

    Ok(())
}

#[test]
fn tutoring_frequency_multiplies_the_per_session_amount() -> TestResult {
    let calculator = load("tutoring")?;

    let mut selection = Selection::new();
    selection.choose("session", "session_60");
    selection.choose("level", "secondary");
    selection.choose("session_type", "online");
    selection.choose("frequency", "twice_weekly");

    let breakdown = price(&selection, &calculator);

    // (30 + 10 + 0) × 1.9 = 76.
    assert_eq!(breakdown.total(), Money::from_minor(76_00, USD));

    // The zero-amount online surcharge is computed but not displayed.
    assert!(
        breakdown.lines().iter().all(|line| line.amount != 0),
        "zero lines must be omitted"
    );

    Ok(())
}

#[test]
fn no_promo_no_add_ons_total_equals_adjusted_base() -> TestResult {
    let calculator = load("interior-design")?;

    let mut selection = Selection::new();
    selection.choose("project", "multi_room");
    selection.choose("size", "medium");
    selection.choose("service_level", "virtual");

    let breakdown = price(&selection, &calculator);

    // 600 × 1.3 = 780; virtual consultation -150 -> 630.
    assert_eq!(breakdown.total(), Money::from_minor(630_00, USD));
    assert_eq!(breakdown.discount(), Money::from_minor(0, USD));

    Ok(())
}

#[test]
fn gated_add_on_contributes_nothing_without_its_prerequisite() -> TestResult {
    let calculator = load("interior-design")?;

    let mut selection = Selection::new();
    selection.choose("project", "single_room");
    selection.choose("size", "small");
    selection.choose("service_level", "essentials");

    let without = price(&selection, &calculator);

    selection.toggle_add_on("renderings_3d");
    let with_gated = price(&selection, &calculator);

    assert_eq!(with_gated, without);
    assert!(
        with_gated
            .lines()
            .iter()
            .all(|line| line.label != "3D Renderings"),
        "gated add-on must not appear as a line"
    );

    // Meeting the prerequisite makes the same selection count.
    selection.choose("service_level", "full_design");
    let with_met = price(&selection, &calculator);

    assert_eq!(
        with_met.subtotal_minor(),
        250_00 + 400_00 + 120_00,
        "base + full design + renderings"
    );

    Ok(())
}

#[test]
fn toggling_an_add_on_off_restores_the_breakdown() -> TestResult {
    let calculator = load("car-detailing")?;

    let mut selection = Selection::new();
    selection.choose("service", "full_detail");
    selection.choose("vehicle", "sedan");
    selection.choose("condition", "light");

    let before = price(&selection, &calculator);

    selection.toggle_add_on("engine_bay");
    selection.toggle_add_on("engine_bay");

    assert_eq!(price(&selection, &calculator), before);

    Ok(())
}

#[test]
fn unknown_promo_code_changes_nothing() -> TestResult {
    let calculator = load("car-detailing")?;

    let mut selection = Selection::new();
    selection.choose("service", "showroom");
    selection.choose("vehicle", "truck");
    selection.choose("condition", "heavy");
    selection.toggle_add_on("pet_hair");

    let without = price(&selection, &calculator);

    selection.set_promo_code(Some("FOO123"));
    let with_unknown = price(&selection, &calculator);

    assert_eq!(with_unknown, without);
    assert_eq!(with_unknown.discount_minor(), 0);

    Ok(())
}

#[test]
fn promo_matching_ignores_case_and_whitespace() -> TestResult {
    let calculator = load("car-detailing")?;

    let mut selection = Selection::new();
    selection.choose("service", "full_detail");
    selection.choose("vehicle", "sedan");
    selection.choose("condition", "light");
    selection.set_promo_code(Some("  shine10 "));

    let breakdown = price(&selection, &calculator);

    assert_eq!(breakdown.discount(), Money::from_minor(15_00, USD));
    assert_eq!(breakdown.total(), Money::from_minor(135_00, USD));

    Ok(())
}

#[test]
fn recomputation_is_idempotent() -> TestResult {
    let calculator = load("tutoring")?;

    let mut selection = Selection::new();
    selection.choose("session", "session_90");
    selection.choose("level", "college");
    selection.choose("session_type", "in_person");
    selection.choose("frequency", "three_weekly");
    selection.toggle_add_on("exam_pack");
    selection.set_promo_code(Some("LEARN10"));

    let first = price(&selection, &calculator);
    let second = price(&selection, &calculator);

    assert_eq!(first, second);

    Ok(())
}

#[test]
fn partial_selection_prices_what_is_chosen_so_far() -> TestResult {
    let calculator = load("photography")?;

    let mut selection = Selection::new();
    selection.choose("shoot", "family");
    // location and editing not chosen yet; they contribute zero.

    let breakdown = price(&selection, &calculator);

    assert_eq!(breakdown.total(), Money::from_minor(275_00, USD));
    assert!(!selection.is_quotable(&calculator));

    Ok(())
}

#[test]
fn auto_include_applies_unless_covered_by_the_add_on() -> TestResult {
    let calculator = load("painting")?;

    let mut selection = Selection::new();
    selection.choose("project", "whole_house");
    selection.choose("paint_quality", "standard");

    let auto_added = price(&selection, &calculator);
    assert_eq!(auto_added.subtotal_minor(), 1800_00 + 80_00);
    assert!(
        auto_added
            .lines()
            .iter()
            .any(|line| line.kind == LineKind::AutoInclude),
        "whole house must auto-add furniture protection"
    );

    // Choosing the add-on explicitly replaces the auto line; the total
    // stays the same.
    selection.toggle_add_on("furniture_protection");
    let chosen = price(&selection, &calculator);

    assert_eq!(chosen.subtotal_minor(), auto_added.subtotal_minor());
    assert!(
        chosen
            .lines()
            .iter()
            .all(|line| line.kind != LineKind::AutoInclude),
        "explicit add-on must suppress the auto-include"
    );

    // Smaller projects never auto-add it.
    selection.toggle_add_on("furniture_protection");
    selection.choose("project", "one_room");
    let small = price(&selection, &calculator);

    assert_eq!(small.subtotal_minor(), 300_00);

    Ok(())
}

#[test]
fn permit_package_is_auto_added_to_every_install() -> TestResult {
    let calculator = load("solar")?;

    let mut selection = Selection::new();
    selection.choose("system_size", "kw_6");
    selection.choose("roof", "metal");

    let breakdown = price(&selection, &calculator);

    // 11500 + 600 + 450 permit package.
    assert_eq!(breakdown.total(), Money::from_minor(12_550_00, USD));
    assert!(
        breakdown.lines().iter().any(|line| {
            line.kind == LineKind::AutoInclude && line.label == "Permit & Inspection Package"
        }),
        "the permit package must be auto-added unconditionally"
    );

    // It applies regardless of what is chosen.
    let breakdown = price(&Selection::new(), &calculator);
    assert_eq!(breakdown.total(), Money::from_minor(450_00, USD));

    Ok(())
}

#[test]
fn per_guest_add_ons_scale_by_the_numeric_field() -> TestResult {
    let calculator = load("boat-charter")?;

    let mut selection = Selection::new();
    selection.choose("boat", "pontoon");
    selection.choose("duration", "half_day");
    selection.choose("route", "harbor");
    selection.toggle_add_on("catering");
    selection.set_number("guests", 6);

    let breakdown = price(&selection, &calculator);

    // 400 + 35 × 6 = 610.
    assert_eq!(breakdown.total(), Money::from_minor(610_00, USD));
    assert!(
        breakdown
            .lines()
            .iter()
            .any(|line| line.label.contains("\u{d7} 6")),
        "scaled add-on label should show the quantity"
    );

    Ok(())
}

#[test]
fn program_duration_scales_weekly_add_ons() -> TestResult {
    let calculator = load("life-coaching")?;

    let mut selection = Selection::new();
    selection.choose("program", "clarity");
    selection.choose("duration", "eight_weeks");
    selection.choose("format", "online");
    selection.toggle_add_on("weekly_support");

    let breakdown = price(&selection, &calculator);

    // 180 × 1.85 = 333; weekly support 25 × 8 = 200.
    assert_eq!(breakdown.total(), Money::from_minor(533_00, USD));

    Ok(())
}

#[test]
fn standing_discount_layers_before_the_promo() -> TestResult {
    let calculator = load("tax-prep")?;

    let mut selection = Selection::new();
    selection.choose("filing", "itemized");
    selection.choose("state", "one_state");
    selection.set_flag("returning_client");
    selection.set_promo_code(Some("TAX10"));

    let breakdown = price(&selection, &calculator);

    // 280 + 60 = 340; returning client 5% = 17; promo 10% of 323 = 32.30.
    assert_eq!(breakdown.subtotal(), Money::from_minor(340_00, USD));
    assert_eq!(breakdown.discount(), Money::from_minor(17_00 + 32_30, USD));
    assert_eq!(breakdown.total(), Money::from_minor(340_00 - 49_30, USD));

    let discount_lines = breakdown
        .lines()
        .iter()
        .filter(|line| line.kind == LineKind::Discount)
        .count();
    assert_eq!(discount_lines, 2, "both discounts appear as lines");

    Ok(())
}

#[test]
fn total_is_never_negative() -> TestResult {
    let calculator = load("interior-design")?;

    // Virtual consultation alone drives the subtotal negative; the
    // breakdown clamps at zero.
    let mut selection = Selection::new();
    selection.choose("service_level", "virtual");

    let breakdown = price(&selection, &calculator);

    assert_eq!(breakdown.subtotal_minor(), -150_00);
    assert_eq!(breakdown.total_minor(), 0);

    Ok(())
}

//! Loading and validation of the bundled calculator definitions.

use std::fs;

use quotient::prelude::*;
use testresult::TestResult;

#[test]
fn every_bundled_calculator_loads() -> TestResult {
    let set = CalculatorSet::new();
    let names = set.available()?;

    assert_eq!(names.len(), 11);

    for name in &names {
        let calculator = set.load(name)?;

        assert!(!calculator.name().is_empty());
        assert!(!calculator.tables().is_empty(), "{name} has no tables");
        assert!(!calculator.stages().is_empty(), "{name} has no pipeline");
    }

    Ok(())
}

#[test]
fn available_lists_known_names_sorted() -> TestResult {
    let names = CalculatorSet::new().available()?;

    assert!(names.contains(&"car-detailing".to_string()));
    assert!(names.contains(&"tax-prep".to_string()));

    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    Ok(())
}

#[test]
fn loading_a_missing_calculator_reports_io() -> TestResult {
    let result = CalculatorSet::new().load("no-such-calculator");

    assert!(matches!(result, Err(ConfigError::Io(_))));

    Ok(())
}

#[test]
fn set_rooted_at_a_custom_directory() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join("haircuts.yml"),
        r#"
name: Haircut Quote
currency: USD
required: [cut]
tables:
  - category: cut
    label: Cut
    options:
      - id: trim
        label: Trim
        price: "25.00 USD"
pipeline:
  - base: cut
"#,
    )?;

    let set = CalculatorSet::with_base_path(dir.path());

    assert_eq!(set.available()?, vec!["haircuts".to_string()]);

    let calculator = set.load("haircuts")?;
    assert_eq!(calculator.name(), "Haircut Quote");

    let mut selection = Selection::new();
    selection.choose("cut", "trim");
    assert_eq!(price(&selection, &calculator).total_minor(), 25_00);

    Ok(())
}

#[test]
fn unknown_fields_in_a_definition_are_rejected() -> TestResult {
    let yaml = r#"
name: Bad Quote
currency: USD
tables:
  - category: cut
    label: Cut
    options:
      - id: trim
        label: Trim
        price: "25.00 USD"
pipeline:
  - base: cut
surprise: true
"#;

    assert!(matches!(load_str(yaml), Err(ConfigError::Yaml(_))));

    Ok(())
}

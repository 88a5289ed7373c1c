//! Quote calculator CLI.
//!
//! Loads a calculator definition, applies selections from the command
//! line and prints the resulting price breakdown.

use std::process::ExitCode;

use clap::Parser;

use quotient::prelude::*;

/// Arguments for the quote calculator CLI
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Calculator to load from the calculators directory
    #[clap(short, long)]
    calculator: Option<String>,

    /// Directory containing calculator definitions
    #[clap(long, default_value = "./calculators")]
    dir: String,

    /// List available calculators and exit
    #[clap(long)]
    list: bool,

    /// Category selection, as category=option (repeatable)
    #[clap(short, long = "set", value_name = "CATEGORY=OPTION")]
    set: Vec<String>,

    /// Add-on to select (repeatable; order is selection order)
    #[clap(short, long = "addon", value_name = "ID")]
    addons: Vec<String>,

    /// Numeric field, as field=value (repeatable)
    #[clap(short = 'n', long = "num", value_name = "FIELD=VALUE")]
    nums: Vec<String>,

    /// Flag to set, e.g. returning_client (repeatable)
    #[clap(short, long = "flag", value_name = "FLAG")]
    flags: Vec<String>,

    /// Promo code
    #[clap(short, long)]
    promo: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let set = CalculatorSet::with_base_path(&args.dir);

    if args.list {
        for name in set.available().map_err(|error| format!("{error}"))? {
            println!("{name}");
        }
        return Ok(());
    }

    let Some(name) = &args.calculator else {
        return Err("pass --calculator <name>, or --list to see what is available".to_string());
    };

    let calculator = set.load(name).map_err(|error| format!("{error}"))?;
    let selection = build_selection(args, &calculator)?;
    let breakdown = price(&selection, &calculator);

    println!("{}", calculator.name());
    println!("{breakdown}");

    let missing = selection.missing_categories(&calculator);
    if !missing.is_empty() {
        println!("unresolved required categories: {}", missing.join(", "));
    }

    Ok(())
}

fn build_selection(args: &Args, calculator: &Calculator) -> Result<Selection, String> {
    let mut selection = Selection::new();

    for pair in &args.set {
        let (category, option) = split_pair(pair)?;

        if calculator.find_option(category, option).is_none() {
            return Err(format!("unknown option {option} in category {category}"));
        }
        selection.choose(category, option);
    }

    for id in &args.addons {
        if calculator.add_on(id).is_none() {
            return Err(format!("unknown add-on {id}"));
        }
        selection.toggle_add_on(id);
    }

    for pair in &args.nums {
        let (field, value) = split_pair(pair)?;
        let value: u32 = value
            .parse()
            .map_err(|_parse| format!("invalid numeric value in {pair}"))?;
        selection.set_number(field, value);
    }

    for flag in &args.flags {
        selection.set_flag(flag);
    }

    selection.set_promo_code(args.promo.as_deref());

    Ok(selection)
}

fn split_pair(pair: &str) -> Result<(&str, &str), String> {
    pair.split_once('=')
        .ok_or_else(|| format!("expected key=value, got {pair}"))
}

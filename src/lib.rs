//! Quotient
//!
//! Quotient is a declarative pricing-breakdown engine for multi-step quote
//! calculators. Each calculator is pure data (option tables, add-ons,
//! conditional rules, promo codes and a declared pipeline); one shared,
//! pure engine turns that data plus the current selection into an ordered
//! price breakdown with a clamped, never-negative total.

pub mod autofill;
pub mod booking;
pub mod breakdown;
pub mod calculator;
pub mod catalog;
pub mod conditions;
pub mod config;
pub mod discounts;
pub mod prelude;
pub mod pricing;
pub mod selection;

//! Selection State
//!
//! The single in-memory state a wizard session owns: one chosen option per
//! category, an ordered set of add-ons, promo-code text, numeric fields,
//! boolean flags and contact details. The pricing engine reads this state;
//! the wizard UI is its only writer.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::calculator::Calculator;

/// Contact details captured alongside the quote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    /// Customer name.
    pub name: String,

    /// Customer email address.
    pub email: String,

    /// Optional phone number.
    pub phone: Option<String>,

    /// Optional company or brand name.
    pub company: Option<String>,
}

impl Contact {
    /// Whether the contact is complete enough to finalize a booking.
    ///
    /// Name and email are required; phone and company are not.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty()
    }
}

/// Current user choices for one calculator session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    categories: FxHashMap<String, String>,
    add_ons: Vec<String>,
    promo_code: Option<String>,
    numbers: FxHashMap<String, u32>,
    flags: FxHashSet<String>,

    /// Contact details for the booking action.
    pub contact: Contact,
}

impl Selection {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose an option for a category, replacing any previous choice.
    pub fn choose(&mut self, category: &str, option: &str) {
        self.categories
            .insert(category.to_string(), option.to_string());
    }

    /// Clear the choice for a category.
    pub fn clear_category(&mut self, category: &str) {
        self.categories.remove(category);
    }

    /// The option id currently chosen for a category, if any.
    #[must_use]
    pub fn category(&self, category: &str) -> Option<&str> {
        self.categories.get(category).map(String::as_str)
    }

    /// Toggle an add-on: select it if absent, deselect it if present.
    ///
    /// Returns `true` when the add-on is selected after the toggle.
    /// Selection order is preserved and significant for line ordering.
    pub fn toggle_add_on(&mut self, id: &str) -> bool {
        if let Some(position) = self.add_ons.iter().position(|chosen| chosen == id) {
            self.add_ons.remove(position);
            false
        } else {
            self.add_ons.push(id.to_string());
            true
        }
    }

    /// Select an add-on if it is not already selected.
    pub fn select_add_on(&mut self, id: &str) {
        if !self.has_add_on(id) {
            self.add_ons.push(id.to_string());
        }
    }

    /// Whether the add-on is currently selected.
    #[must_use]
    pub fn has_add_on(&self, id: &str) -> bool {
        self.add_ons.iter().any(|chosen| chosen == id)
    }

    /// Selected add-on ids in selection order.
    pub fn add_ons(&self) -> impl Iterator<Item = &str> {
        self.add_ons.iter().map(String::as_str)
    }

    /// Set the raw promo-code input. `None` clears it.
    pub fn set_promo_code(&mut self, code: Option<&str>) {
        self.promo_code = code.map(ToString::to_string);
    }

    /// The raw promo-code input, if any.
    #[must_use]
    pub fn promo_code(&self) -> Option<&str> {
        self.promo_code.as_deref()
    }

    /// Set a numeric field such as a guest count.
    pub fn set_number(&mut self, field: &str, value: u32) {
        self.numbers.insert(field.to_string(), value);
    }

    /// Read a numeric field.
    #[must_use]
    pub fn number(&self, field: &str) -> Option<u32> {
        self.numbers.get(field).copied()
    }

    /// Set a boolean flag such as `returning_client`.
    pub fn set_flag(&mut self, flag: &str) {
        self.flags.insert(flag.to_string());
    }

    /// Clear a boolean flag.
    pub fn clear_flag(&mut self, flag: &str) {
        self.flags.remove(flag);
    }

    /// Whether a boolean flag is set.
    #[must_use]
    pub fn flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Required categories of the calculator that are still unresolved.
    ///
    /// A category counts as resolved only when its chosen id exists in the
    /// calculator's table; stale ids left behind by earlier edits do not.
    pub fn missing_categories<'a>(&self, calculator: &'a Calculator) -> Vec<&'a str> {
        calculator
            .required_categories()
            .filter(|category| {
                self.category(category)
                    .and_then(|option| calculator.find_option(category, option))
                    .is_none()
            })
            .collect()
    }

    /// Whether every required category is resolved.
    ///
    /// This gating is advisory for the wizard UI. The engine prices any
    /// selection, complete or not.
    #[must_use]
    pub fn is_quotable(&self, calculator: &Calculator) -> bool {
        self.missing_categories(calculator).is_empty()
    }

    /// Whether the selection can be finalized into a booking.
    #[must_use]
    pub fn is_bookable(&self, calculator: &Calculator) -> bool {
        self.is_quotable(calculator) && self.contact.is_complete()
    }
}

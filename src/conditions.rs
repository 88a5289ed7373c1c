//! Prerequisite Conditions
//!
//! Nested boolean predicates over a [`Selection`], used to gate add-ons,
//! auto-included lines and standing discounts.

use std::fmt;

use serde::{
    Deserialize, Deserializer,
    de::{self, MapAccess, Visitor},
};
use smallvec::{SmallVec, smallvec};

use crate::selection::Selection;

/// Condition expression evaluated against the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Condition {
    /// How `rules` are combined.
    pub op: BoolOp,

    /// Child rules. Empty means "always holds".
    pub rules: SmallVec<[ConditionRule; 2]>,
}

/// Boolean operation used to combine condition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolOp {
    /// All child rules must hold.
    And,

    /// At least one child rule must hold.
    Or,
}

/// Single condition rule.
///
/// In YAML each rule is a single-key map naming the rule kind, e.g.
/// `category_is: { category: service, option: full_detail }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionRule {
    /// The named category must currently resolve to the given option id.
    CategoryIs {
        /// Selection category to inspect.
        category: String,

        /// Option id the category must resolve to.
        option: String,
    },

    /// The named category must resolve to one of the listed option ids.
    CategoryIn {
        /// Selection category to inspect.
        category: String,

        /// Accepted option ids.
        options: SmallVec<[String; 2]>,
    },

    /// The named boolean flag must be set on the selection.
    FlagSet {
        /// Flag name.
        flag: String,
    },

    /// Negation of a nested rule.
    Not(Box<ConditionRule>),

    /// Nested condition group.
    Group(Box<Condition>),
}

impl Condition {
    /// Create a condition from operator and rules.
    #[must_use]
    pub fn new(op: BoolOp, rules: SmallVec<[ConditionRule; 2]>) -> Self {
        Self { op, rules }
    }

    /// A condition that always holds.
    #[must_use]
    pub fn always() -> Self {
        Self {
            op: BoolOp::And,
            rules: SmallVec::new(),
        }
    }

    /// Shorthand for "category must resolve to this option".
    #[must_use]
    pub fn category_is(category: &str, option: &str) -> Self {
        Self {
            op: BoolOp::And,
            rules: smallvec![ConditionRule::CategoryIs {
                category: category.to_string(),
                option: option.to_string(),
            }],
        }
    }

    /// Shorthand for "flag must be set".
    #[must_use]
    pub fn flag_set(flag: &str) -> Self {
        Self {
            op: BoolOp::And,
            rules: smallvec![ConditionRule::FlagSet {
                flag: flag.to_string(),
            }],
        }
    }

    /// Evaluate the condition against the selection.
    #[must_use]
    pub fn holds(&self, selection: &Selection) -> bool {
        if self.rules.is_empty() {
            return true;
        }

        match self.op {
            BoolOp::And => self.rules.iter().all(|rule| rule.holds(selection)),
            BoolOp::Or => self.rules.iter().any(|rule| rule.holds(selection)),
        }
    }

    /// Visit every category referenced anywhere in this condition.
    pub(crate) fn referenced_categories(&self, out: &mut Vec<(String, Option<String>)>) {
        for rule in &self.rules {
            rule.referenced_categories(out);
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::always()
    }
}

impl ConditionRule {
    #[must_use]
    fn holds(&self, selection: &Selection) -> bool {
        match self {
            Self::CategoryIs { category, option } => {
                selection.category(category) == Some(option.as_str())
            }
            Self::CategoryIn { category, options } => selection
                .category(category)
                .is_some_and(|chosen| options.iter().any(|option| option == chosen)),
            Self::FlagSet { flag } => selection.flag(flag),
            Self::Not(rule) => !rule.holds(selection),
            Self::Group(group) => group.holds(selection),
        }
    }

    fn referenced_categories(&self, out: &mut Vec<(String, Option<String>)>) {
        match self {
            Self::CategoryIs { category, option } => {
                out.push((category.clone(), Some(option.clone())));
            }
            Self::CategoryIn { category, options } => {
                for option in options {
                    out.push((category.clone(), Some(option.clone())));
                }
            }
            Self::FlagSet { .. } => {}
            Self::Not(rule) => rule.referenced_categories(out),
            Self::Group(group) => group.referenced_categories(out),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CategoryIsFields {
    category: String,
    option: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CategoryInFields {
    category: String,
    options: SmallVec<[String; 2]>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FlagSetFields {
    flag: String,
}

impl<'de> Deserialize<'de> for ConditionRule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RuleVisitor;

        impl<'de> Visitor<'de> for RuleVisitor {
            type Value = ConditionRule;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map with a single rule key")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let Some(key) = map.next_key::<String>()? else {
                    return Err(de::Error::invalid_length(0, &self));
                };

                let rule = match key.as_str() {
                    "category_is" => {
                        let CategoryIsFields { category, option } = map.next_value()?;
                        ConditionRule::CategoryIs { category, option }
                    }
                    "category_in" => {
                        let CategoryInFields { category, options } = map.next_value()?;
                        ConditionRule::CategoryIn { category, options }
                    }
                    "flag_set" => {
                        let FlagSetFields { flag } = map.next_value()?;
                        ConditionRule::FlagSet { flag }
                    }
                    "not" => ConditionRule::Not(Box::new(map.next_value()?)),
                    "group" => ConditionRule::Group(Box::new(map.next_value()?)),
                    other => {
                        return Err(de::Error::unknown_variant(
                            other,
                            &["category_is", "category_in", "flag_set", "not", "group"],
                        ));
                    }
                };

                if map.next_key::<String>()?.is_some() {
                    return Err(de::Error::custom("expected a single rule key"));
                }

                Ok(rule)
            }
        }

        deserializer.deserialize_map(RuleVisitor)
    }
}

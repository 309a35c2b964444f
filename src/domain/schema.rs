//! Field rules for the sign-up form.
//!
//! Each field carries an ordered list of [`Rule`]s; the first rule that
//! fails provides the message shown next to the field.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::models::{Field, FieldValues};

/// Local part, `@`, then dot-separated labels ending in an alphabetic TLD.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^[A-Za-z0-9_'+\-]+(\.[A-Za-z0-9_'+\-]+)*   # local part, no leading or doubled dots
        @
        ([A-Za-z0-9]([A-Za-z0-9\-]*[A-Za-z0-9])?\.)+  # domain labels
        [A-Za-z]{2,}$                              # top-level domain
        ",
    )
    .expect("email pattern is valid")
});

pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

pub fn default_countries() -> Vec<String> {
    vec!["USA".to_string(), "Armenia".to_string()]
}

/// A single check applied to one field's value.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required { message: String },
    Email { message: String },
    MinLength { min: usize, message: String },
    /// Cross-field rule: value must equal the value of `other`.
    Matches { other: Field, message: String },
    OneOf { options: Vec<String>, message: String },
}

impl Rule {
    /// Returns the failure message, or `None` when `value` passes.
    ///
    /// `values` is the whole form snapshot so cross-field rules can look up
    /// their counterpart.
    pub fn check(&self, value: &str, values: &FieldValues) -> Option<&str> {
        let passed = match self {
            Rule::Required { .. } => !value.is_empty(),
            Rule::Email { .. } => EMAIL_PATTERN.is_match(value),
            Rule::MinLength { min, .. } => value.chars().count() >= *min,
            Rule::Matches { other, .. } => {
                values.get(other).map(String::as_str).unwrap_or("") == value
            }
            Rule::OneOf { options, .. } => options.iter().any(|option| option == value),
        };

        if passed { None } else { Some(self.message()) }
    }

    pub fn message(&self) -> &str {
        match self {
            Rule::Required { message }
            | Rule::Email { message }
            | Rule::MinLength { message, .. }
            | Rule::Matches { message, .. }
            | Rule::OneOf { message, .. } => message,
        }
    }
}

/// Immutable rule set for every field of the form.
///
/// # Examples
///
/// ```
/// use signup_wizard::domain::{Field, FieldValues, FormSchema};
///
/// let schema = FormSchema::default();
/// let values = FieldValues::new();
/// assert_eq!(schema.first_failure(Field::Email, &values), Some("invalid email"));
/// ```
#[derive(Debug, Clone)]
pub struct FormSchema {
    rules: BTreeMap<Field, Vec<Rule>>,
}

impl Default for FormSchema {
    fn default() -> Self {
        Self::new(default_countries(), DEFAULT_MIN_PASSWORD_LENGTH)
    }
}

impl FormSchema {
    pub fn new(countries: Vec<String>, min_password_length: usize) -> Self {
        let mut rules = BTreeMap::new();
        rules.insert(
            Field::Email,
            vec![
                Rule::Email { message: "invalid email".to_string() },
                Rule::Required { message: "Email is required".to_string() },
            ],
        );
        rules.insert(
            Field::Password,
            vec![
                Rule::Required { message: "Password is required".to_string() },
                Rule::MinLength {
                    min: min_password_length,
                    message: format!("Password must have more than {} characters", min_password_length),
                },
            ],
        );
        rules.insert(
            Field::ConfirmPassword,
            vec![
                Rule::Required { message: "Password confirmation is required".to_string() },
                Rule::Matches {
                    other: Field::Password,
                    message: "Passwords do not match".to_string(),
                },
            ],
        );
        rules.insert(
            Field::Country,
            vec![
                Rule::Required { message: "Country is required".to_string() },
                Rule::OneOf { options: countries, message: "Unknown country".to_string() },
            ],
        );
        Self { rules }
    }

    /// Builds a schema from an explicit rule table.
    pub fn from_rules(rules: BTreeMap<Field, Vec<Rule>>) -> Self {
        Self { rules }
    }

    pub fn rules_for(&self, field: Field) -> Option<&[Rule]> {
        self.rules.get(&field).map(Vec::as_slice)
    }

    /// Message of the first failing rule for `field`. Absent values are
    /// checked as the empty string. Fields without rules always pass.
    pub fn first_failure<'a>(&'a self, field: Field, values: &FieldValues) -> Option<&'a str> {
        let value = values.get(&field).map(String::as_str).unwrap_or("");
        self.rules_for(field)?
            .iter()
            .find_map(|rule| rule.check(value, values))
    }

    /// Options for choice fields, empty for free-text fields.
    pub fn options_for(&self, field: Field) -> &[String] {
        self.rules_for(field)
            .and_then(|rules| {
                rules.iter().find_map(|rule| match rule {
                    Rule::OneOf { options, .. } => Some(options.as_slice()),
                    _ => None,
                })
            })
            .unwrap_or(&[])
    }
}

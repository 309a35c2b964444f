use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named input of the sign-up form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Email,
    Password,
    ConfirmPassword,
    Country,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Email,
        Field::Password,
        Field::ConfirmPassword,
        Field::Country,
    ];

    /// Wire name of the field, as used in stored values and analytics payloads.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirmPassword",
            Field::Country => "country",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Email => "Email",
            Field::Password => "Password",
            Field::ConfirmPassword => "Confirm Password",
            Field::Country => "Select country",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Field::Email => "Email",
            Field::Password => "Password",
            Field::ConfirmPassword => "Confirm Password",
            Field::Country => "Select country",
        }
    }

    /// Secret fields are masked when rendered.
    pub fn is_secret(&self) -> bool {
        matches!(self, Field::Password | Field::ConfirmPassword)
    }

    /// Fields picked from a fixed list rather than typed.
    pub fn is_choice(&self) -> bool {
        matches!(self, Field::Country)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field values keyed by field. Absent keys mean the field was never touched.
pub type FieldValues = BTreeMap<Field, String>;

/// Which fields must validate before leaving `step`.
///
/// Pure mapping from step index to field set; steps past the last defined
/// page have nothing to validate.
///
/// # Examples
///
/// ```
/// use signup_wizard::domain::{fields_for_step, Field};
///
/// assert_eq!(fields_for_step(0), &[Field::Email]);
/// assert_eq!(fields_for_step(1), &[Field::Password, Field::ConfirmPassword]);
/// assert!(fields_for_step(3).is_empty());
/// ```
pub fn fields_for_step(step: usize) -> &'static [Field] {
    match step {
        0 => &[Field::Email],
        1 => &[Field::Password, Field::ConfirmPassword],
        2 => &[Field::Country],
        _ => &[],
    }
}

/// The two shapes the wizard ships in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WizardVariant {
    /// Email, then password/confirmation.
    TwoStep,
    /// Email, password/confirmation, then country.
    #[default]
    ThreeStep,
}

impl WizardVariant {
    /// Index of the page whose primary action is "Send" instead of "Next".
    pub fn last_step(&self) -> usize {
        match self {
            WizardVariant::TwoStep => 1,
            WizardVariant::ThreeStep => 2,
        }
    }

    pub fn step_count(&self) -> usize {
        self.last_step() + 1
    }

    /// Fields shown and validated on `step` for this variant.
    pub fn fields_for_step(&self, step: usize) -> &'static [Field] {
        if step > self.last_step() {
            &[]
        } else {
            fields_for_step(step)
        }
    }
}

impl FromStr for WizardVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "two_step" | "2" => Ok(WizardVariant::TwoStep),
            "three_step" | "3" => Ok(WizardVariant::ThreeStep),
            other => Err(format!("unknown wizard variant: {}", other)),
        }
    }
}

impl fmt::Display for WizardVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardVariant::TwoStep => f.write_str("two_step"),
            WizardVariant::ThreeStep => f.write_str("three_step"),
        }
    }
}

/// Progress of one wizard session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub step: usize,
    pub values: FieldValues,
}

//! Step-tracking store for a single wizard session.

use super::models::{FieldValues, WizardState};

/// Owns the [`WizardState`] of one session.
///
/// All operations are total. Every mutation bumps [`revision`](Self::revision);
/// only value merges bump [`values_revision`](Self::values_revision), which is
/// what views watch to re-sync their inputs.
///
/// # Examples
///
/// ```
/// use signup_wizard::domain::{Field, FieldValues, WizardStore};
///
/// let mut store = WizardStore::default();
/// store.retreat_step();
/// assert_eq!(store.step(), 0);
///
/// let mut partial = FieldValues::new();
/// partial.insert(Field::Email, "a@b.com".to_string());
/// store.merge_values(&partial);
/// store.advance_step();
/// assert_eq!(store.step(), 1);
/// assert_eq!(store.values().get(&Field::Email).map(String::as_str), Some("a@b.com"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct WizardStore {
    state: WizardState,
    revision: u64,
    values_revision: u64,
}

impl WizardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> usize {
        self.state.step
    }

    pub fn values(&self) -> &FieldValues {
        &self.state.values
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Changes only when stored values change; step moves leave it alone.
    pub fn values_revision(&self) -> u64 {
        self.values_revision
    }

    /// Moves forward one step. There is no upper bound here; callers decide
    /// when the last page has been reached.
    pub fn advance_step(&mut self) {
        self.state.step += 1;
        self.revision += 1;
    }

    /// Moves back one step, stopping at zero.
    pub fn retreat_step(&mut self) {
        if self.state.step != 0 {
            self.state.step -= 1;
            self.revision += 1;
        }
    }

    /// Shallow-merges `partial` into the stored values. Keys already stored
    /// and absent from `partial` are kept.
    pub fn merge_values(&mut self, partial: &FieldValues) {
        if partial.is_empty() {
            return;
        }
        for (field, value) in partial {
            self.state.values.insert(*field, value.clone());
        }
        self.revision += 1;
        self.values_revision += 1;
    }
}

//! Step controller for the sign-up wizard.
//!
//! Guards "Next" with the current step's validation, commits the form
//! snapshot into the [`WizardStore`] and emits the submission event on the
//! last step.

use serde_json::{json, Value};

use crate::domain::{
    EngineError, Field, FieldValues, FormSchema, ValidationReport, Validator, WizardStore,
    WizardVariant,
};
use crate::infrastructure::{AnalyticsSink, LogSink};

pub const SUBMIT_EVENT: &str = "Form submitted";

/// Everything collected by a finished wizard session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub values: FieldValues,
}

impl Submission {
    pub fn value(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Properties of the submitted event. Only email and country leave the
    /// process.
    pub fn event_properties(&self) -> Value {
        json!({
            "message": {
                "email": self.value(Field::Email),
                "country": self.value(Field::Country),
            }
        })
    }

    pub fn identity_traits(&self) -> Value {
        json!({
            "email": self.value(Field::Email),
            "country": self.value(Field::Country),
        })
    }
}

/// Result of a "Next" request.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Advanced { from: usize, to: usize },
    /// Validation failed; nothing changed.
    Rejected(ValidationReport),
    Submitted(Submission),
    /// The validation engine failed; nothing changed.
    Aborted(EngineError),
}

/// Drives one wizard session.
///
/// # Examples
///
/// ```
/// use signup_wizard::application::{StepOutcome, WizardController};
/// use signup_wizard::domain::{Field, FieldValues};
///
/// let mut controller = WizardController::default();
/// let mut form = FieldValues::new();
/// form.insert(Field::Email, "a@b.com".to_string());
///
/// assert_eq!(controller.next(&form), StepOutcome::Advanced { from: 0, to: 1 });
/// assert_eq!(controller.step(), 1);
/// ```
pub struct WizardController {
    store: WizardStore,
    variant: WizardVariant,
    validator: Box<dyn Validator>,
    analytics: Box<dyn AnalyticsSink>,
}

impl std::fmt::Debug for WizardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardController")
            .field("store", &self.store)
            .field("variant", &self.variant)
            .finish_non_exhaustive()
    }
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new(
            WizardVariant::default(),
            Box::new(FormSchema::default()),
            Box::new(LogSink),
        )
    }
}

impl WizardController {
    pub fn new(
        variant: WizardVariant,
        validator: Box<dyn Validator>,
        analytics: Box<dyn AnalyticsSink>,
    ) -> Self {
        Self {
            store: WizardStore::new(),
            variant,
            validator,
            analytics,
        }
    }

    pub fn store(&self) -> &WizardStore {
        &self.store
    }

    /// Mutable access for hosts that drive the store directly.
    pub fn store_mut(&mut self) -> &mut WizardStore {
        &mut self.store
    }

    pub fn step(&self) -> usize {
        self.store.step()
    }

    pub fn variant(&self) -> WizardVariant {
        self.variant
    }

    pub fn is_first_step(&self) -> bool {
        self.store.step() == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.store.step() == self.variant.last_step()
    }

    /// Fields rendered and validated on the current step.
    pub fn current_fields(&self) -> &'static [Field] {
        self.variant.fields_for_step(self.store.step())
    }

    /// Starts a new session with an empty store.
    pub fn reset(&mut self) {
        self.store = WizardStore::new();
        log::info!("wizard session reset");
    }

    /// Handles "Next" (or "Send" on the last step).
    ///
    /// `snapshot` is the full set of form inputs, not just this step's.
    /// The transition is all-or-nothing: on rejection or engine failure the
    /// store is left untouched.
    pub fn next(&mut self, snapshot: &FieldValues) -> StepOutcome {
        let from = self.store.step();
        let fields = self.current_fields();

        let report = match self.validator.validate(snapshot, fields) {
            Ok(report) => report,
            Err(e) => {
                log::error!("validation failed to run on step {}: {}", from, e);
                return StepOutcome::Aborted(e);
            }
        };

        if !report.is_valid() {
            log::warn!(
                "step {} rejected: {}",
                from,
                report.errors().keys().map(Field::name).collect::<Vec<_>>().join(", ")
            );
            return StepOutcome::Rejected(report);
        }

        self.store.merge_values(snapshot);

        if self.is_last_step() {
            return StepOutcome::Submitted(self.submit());
        }

        self.store.advance_step();
        log::info!("advanced from step {} to {}", from, self.store.step());
        StepOutcome::Advanced { from, to: self.store.step() }
    }

    /// Handles "Prev". Returns whether the step moved.
    pub fn prev(&mut self) -> bool {
        let from = self.store.step();
        self.store.retreat_step();
        let moved = self.store.step() != from;
        if moved {
            log::info!("went back from step {} to {}", from, self.store.step());
        }
        moved
    }

    fn submit(&self) -> Submission {
        let submission = Submission { values: self.store.values().clone() };
        log::info!(
            "form submitted with fields: {}",
            submission.values.keys().map(Field::name).collect::<Vec<_>>().join(", ")
        );

        self.analytics.track(SUBMIT_EVENT, submission.event_properties());
        if let Some(email) = submission.value(Field::Email) {
            self.analytics.identify(email, submission.identity_traits());
        }
        submission
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EngineResult;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct RecordingSink {
        calls: Rc<RefCell<Vec<(String, String, Value)>>>,
    }

    impl AnalyticsSink for RecordingSink {
        fn track(&self, event: &str, properties: Value) {
            self.calls.borrow_mut().push(("track".to_string(), event.to_string(), properties));
        }

        fn identify(&self, user_id: &str, traits: Value) {
            self.calls.borrow_mut().push(("identify".to_string(), user_id.to_string(), traits));
        }
    }

    struct BrokenValidator;

    impl Validator for BrokenValidator {
        fn validate(&self, _values: &FieldValues, _fields: &[Field]) -> EngineResult<ValidationReport> {
            Err(EngineError::Unavailable("resolver crashed".to_string()))
        }
    }

    fn values(pairs: &[(Field, &str)]) -> FieldValues {
        pairs.iter().map(|(f, v)| (*f, v.to_string())).collect()
    }

    fn controller(variant: WizardVariant) -> (WizardController, RecordingSink) {
        let sink = RecordingSink::default();
        let controller = WizardController::new(variant, Box::new(FormSchema::default()), Box::new(sink.clone()));
        (controller, sink)
    }

    fn valid_inputs() -> [FieldValues; 3] {
        [
            values(&[(Field::Email, "a@b.com")]),
            values(&[(Field::Password, "longenough1"), (Field::ConfirmPassword, "longenough1")]),
            values(&[(Field::Country, "Armenia")]),
        ]
    }

    fn invalid_inputs() -> [FieldValues; 3] {
        [
            values(&[(Field::Email, "bad")]),
            values(&[(Field::Password, "short"), (Field::ConfirmPassword, "short")]),
            values(&[(Field::Country, "")]),
        ]
    }

    /// Walks the controller to `step` with valid input, accumulating the form.
    fn advance_to(controller: &mut WizardController, form: &mut FieldValues, step: usize) {
        for input in valid_inputs().iter().take(step) {
            form.extend(input.clone());
            assert!(matches!(controller.next(form), StepOutcome::Advanced { .. }));
        }
    }

    #[test]
    fn test_invalid_input_leaves_state_unchanged_on_every_step() {
        for step in 0..3 {
            let (mut controller, sink) = controller(WizardVariant::ThreeStep);
            let mut form = FieldValues::new();
            advance_to(&mut controller, &mut form, step);

            let before = controller.store().state().clone();
            form.extend(invalid_inputs()[step].clone());

            let outcome = controller.next(&form);

            assert!(matches!(outcome, StepOutcome::Rejected(_)), "step {}", step);
            assert_eq!(controller.store().state(), &before, "step {}", step);
            assert!(sink.calls.borrow().is_empty());
        }
    }

    #[test]
    fn test_valid_input_advances_and_merges() {
        let (mut controller, _) = controller(WizardVariant::ThreeStep);
        let mut form = values(&[(Field::Email, "a@b.com")]);

        assert_eq!(controller.next(&form), StepOutcome::Advanced { from: 0, to: 1 });
        assert_eq!(controller.store().values(), &values(&[(Field::Email, "a@b.com")]));

        form.extend(valid_inputs()[1].clone());
        assert_eq!(controller.next(&form), StepOutcome::Advanced { from: 1, to: 2 });
        assert_eq!(controller.store().values().len(), 3);
        assert_eq!(controller.store().values()[&Field::Email], "a@b.com");
        assert_eq!(controller.store().values()[&Field::Password], "longenough1");
    }

    #[test]
    fn test_email_scenario() {
        let (mut controller, _) = controller(WizardVariant::ThreeStep);

        let outcome = controller.next(&values(&[(Field::Email, "bad")]));
        match outcome {
            StepOutcome::Rejected(report) => {
                assert_eq!(report.message(Field::Email), Some("invalid email"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(controller.step(), 0);
        assert!(controller.store().values().is_empty());

        controller.next(&values(&[(Field::Email, "a@b.com")]));
        assert_eq!(controller.step(), 1);
        assert_eq!(controller.store().values(), &values(&[(Field::Email, "a@b.com")]));
    }

    #[test]
    fn test_password_scenario() {
        let (mut controller, _) = controller(WizardVariant::ThreeStep);
        let mut form = FieldValues::new();
        advance_to(&mut controller, &mut form, 1);

        form.insert(Field::Password, "short".to_string());
        form.insert(Field::ConfirmPassword, "short".to_string());
        match controller.next(&form) {
            StepOutcome::Rejected(report) => {
                assert_eq!(report.message(Field::Password), Some("Password must have more than 8 characters"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(controller.step(), 1);

        form.insert(Field::Password, "longenough1".to_string());
        form.insert(Field::ConfirmPassword, "different".to_string());
        match controller.next(&form) {
            StepOutcome::Rejected(report) => {
                assert_eq!(report.message(Field::Password), None);
                assert_eq!(report.message(Field::ConfirmPassword), Some("Passwords do not match"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(controller.step(), 1);

        form.insert(Field::ConfirmPassword, "longenough1".to_string());
        assert_eq!(controller.next(&form), StepOutcome::Advanced { from: 1, to: 2 });
    }

    #[test]
    fn test_country_scenario_submits() {
        let (mut controller, sink) = controller(WizardVariant::ThreeStep);
        let mut form = FieldValues::new();
        advance_to(&mut controller, &mut form, 2);

        form.insert(Field::Country, "Armenia".to_string());
        let submission = match controller.next(&form) {
            StepOutcome::Submitted(submission) => submission,
            other => panic!("expected submission, got {:?}", other),
        };

        assert_eq!(controller.step(), 2);
        assert_eq!(submission.value(Field::Email), Some("a@b.com"));
        assert_eq!(submission.value(Field::Password), Some("longenough1"));
        assert_eq!(submission.value(Field::ConfirmPassword), Some("longenough1"));
        assert_eq!(submission.value(Field::Country), Some("Armenia"));

        let calls = sink.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "track");
        assert_eq!(calls[0].1, SUBMIT_EVENT);
        assert_eq!(
            calls[0].2,
            json!({ "message": { "email": "a@b.com", "country": "Armenia" } })
        );
        assert_eq!(calls[1].0, "identify");
        assert_eq!(calls[1].1, "a@b.com");
        assert!(!calls[0].2.to_string().contains("longenough1"));
    }

    #[test]
    fn test_two_step_variant_submits_on_password_step() {
        let (mut controller, sink) = controller(WizardVariant::TwoStep);
        let mut form = FieldValues::new();
        advance_to(&mut controller, &mut form, 1);
        assert!(controller.is_last_step());

        form.extend(valid_inputs()[1].clone());
        let outcome = controller.next(&form);

        match outcome {
            StepOutcome::Submitted(submission) => {
                assert_eq!(submission.value(Field::Country), None);
                assert_eq!(
                    submission.event_properties(),
                    json!({ "message": { "email": "a@b.com", "country": null } })
                );
            }
            other => panic!("expected submission, got {:?}", other),
        }
        assert_eq!(controller.step(), 1);
        assert_eq!(sink.calls.borrow().len(), 2);
    }

    #[test]
    fn test_prev_clamps_at_zero() {
        let (mut controller, _) = controller(WizardVariant::ThreeStep);
        assert!(!controller.prev());
        assert_eq!(controller.step(), 0);

        controller.next(&values(&[(Field::Email, "a@b.com")]));
        assert!(controller.prev());
        assert_eq!(controller.step(), 0);
        assert_eq!(controller.store().values()[&Field::Email], "a@b.com");
    }

    #[test]
    fn test_engine_failure_aborts_without_change() {
        let sink = RecordingSink::default();
        let mut controller =
            WizardController::new(WizardVariant::ThreeStep, Box::new(BrokenValidator), Box::new(sink.clone()));

        let outcome = controller.next(&values(&[(Field::Email, "a@b.com")]));

        assert_eq!(outcome, StepOutcome::Aborted(EngineError::Unavailable("resolver crashed".to_string())));
        assert_eq!(controller.step(), 0);
        assert!(controller.store().values().is_empty());
        assert!(sink.calls.borrow().is_empty());
    }

    #[test]
    fn test_step_past_last_advances_unconditionally() {
        let (mut controller, _) = controller(WizardVariant::ThreeStep);
        for _ in 0..3 {
            controller.store_mut().advance_step();
        }
        assert!(controller.current_fields().is_empty());

        assert_eq!(controller.next(&FieldValues::new()), StepOutcome::Advanced { from: 3, to: 4 });
    }

    #[test]
    fn test_reset_starts_fresh_session() {
        let (mut controller, _) = controller(WizardVariant::ThreeStep);
        controller.next(&values(&[(Field::Email, "a@b.com")]));

        controller.reset();

        assert_eq!(controller.step(), 0);
        assert!(controller.store().values().is_empty());
    }
}

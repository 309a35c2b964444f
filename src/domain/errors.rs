use thiserror::Error;

use super::models::Field;

/// Failures of the validation engine itself, as opposed to a field that
/// simply did not pass its rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("no validation rules registered for field '{0}'")]
    NoRules(Field),

    #[error("validation engine unavailable: {0}")]
    Unavailable(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

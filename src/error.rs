use thiserror::Error;
use uuid::Uuid;

/// Rejected form submission. The draft stays open so the user can fix it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(String),

    #[error("{field} must be a number (got {value:?})")]
    NotANumber { field: String, value: String },

    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be a date in YYYY-MM-DD form (got {value:?})")]
    InvalidDate { field: String, value: String },

    #[error("unknown {field} {value:?}")]
    UnknownValue { field: String, value: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScreenError {
    #[error("another form is already open ({0})")]
    Busy(&'static str),

    #[error("no form is open")]
    NoOpenForm,

    #[error("record {0} not found")]
    NotFound(Uuid),

    #[error("unknown scenario {0:?}")]
    UnknownScenario(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

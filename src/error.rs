use thiserror::Error;

/// Rejected user input from an editable field. The caller keeps its last
/// valid value and surfaces the message; nothing here is fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("'{0}' is not a positive whole number of days")]
    InvalidFrequency(String),

    #[error("'{0}' is not a date in YYYY-MM-DD form")]
    InvalidDate(String),
}

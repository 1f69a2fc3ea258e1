use thiserror::Error;

/// Rejected caller input. Messages name the CLI flag at fault; the HTTP
/// payload maps its camelCase keys onto the same flags.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{flag} must be between {min} and {max}")]
    OutOfRange {
        flag: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{flag} must be greater than {after} and at most {max}")]
    AgeOrder {
        flag: &'static str,
        after: &'static str,
        max: u32,
    },
    #[error("{flag} must be a finite amount >= 0")]
    NegativeAmount { flag: &'static str },
    #[error("invalid API payload: {0}")]
    Payload(String),
}

use shieldcore_domain::Decision;
use shieldcore_types::{InvalidEvent, WireError, ids};
use thiserror::Error;

/// Failures surfaced by shieldcore use cases.
///
/// Every variant fails closed: a caller that cannot decide must treat the action as denied.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("policy unavailable: {0}")]
    PolicyUnavailable(String),
}

impl CoreError {
    pub fn fail_closed(&self) -> Decision {
        Decision::Deny
    }

    /// Stable reason code for logs and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::ConfigurationMissing(_) => ids::REASON_CONFIGURATION_MISSING,
            CoreError::MalformedInput(_) => ids::REASON_MALFORMED_INPUT,
            CoreError::PolicyUnavailable(_) => ids::REASON_POLICY_UNAVAILABLE,
        }
    }
}

impl From<WireError> for CoreError {
    fn from(err: WireError) -> Self {
        CoreError::MalformedInput(err.to_string())
    }
}

impl From<InvalidEvent> for CoreError {
    fn from(err: InvalidEvent) -> Self {
        CoreError::MalformedInput(err.to_string())
    }
}

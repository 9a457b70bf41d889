//! Error taxonomy for engine control calls.
//!
//! Every variant is recoverable: callers inside the tick absorb them, callers
//! outside (the presentation layer) see them as "nothing happened".

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A fixed-capacity table (organisms, groups, structures, treaties, wars,
    /// trade offers) is full.
    #[error("capacity exceeded: {resource}")]
    CapacityExceeded { resource: &'static str },

    /// The referenced id is dead, inactive or was never issued.
    #[error("invalid reference to {what} {id}")]
    InvalidReference { what: &'static str, id: String },

    /// A stockpile cannot cover the requested cost. Nothing was deducted.
    #[error("insufficient resources")]
    InsufficientResources,

    /// The call is well-formed but the world is not in a state that allows it.
    #[error("precondition not met: {0}")]
    PreconditionNotMet(&'static str),
}

pub type SimResult<T> = std::result::Result<T, SimError>;

impl SimError {
    #[must_use]
    pub fn capacity(resource: &'static str) -> Self {
        Self::CapacityExceeded { resource }
    }

    #[must_use]
    pub fn invalid<I: std::fmt::Display>(what: &'static str, id: I) -> Self {
        Self::InvalidReference {
            what,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            SimError::capacity("organisms").to_string(),
            "capacity exceeded: organisms"
        );
        assert_eq!(
            SimError::invalid("group", 4).to_string(),
            "invalid reference to group 4"
        );
    }
}

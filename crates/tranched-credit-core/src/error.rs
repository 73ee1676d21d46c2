use thiserror::Error;

use crate::types::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranchedCreditError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid state for {operation}: {reason}")]
    InvalidState { operation: String, reason: String },

    #[error("Arithmetic bound exceeded in {context}")]
    ArithmeticBound { context: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Unauthorized: {operation} requires {required}")]
    Unauthorized { operation: String, required: String },

    #[error("Not yet set: {context}")]
    NotYetSet { context: String },

    #[error("Stale state: {context}")]
    Stale { context: String },
}

impl TranchedCreditError {
    pub fn invalid_input(field: &str, reason: &str) -> Self {
        TranchedCreditError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_state(operation: &str, reason: &str) -> Self {
        TranchedCreditError::InvalidState {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn unauthorized(operation: &str, required: Role) -> Self {
        TranchedCreditError::Unauthorized {
            operation: operation.into(),
            required: format!("the {required:?} role"),
        }
    }

    pub fn not_owner(operation: &str) -> Self {
        TranchedCreditError::Unauthorized {
            operation: operation.into(),
            required: "the token owner".into(),
        }
    }
}

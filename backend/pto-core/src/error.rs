// src/error.rs
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{LeaveType, RequestId, RequestStatus};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PtoError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Insufficient {leave_type} balance: requested {requested}h, available {available}h (short {shortfall}h)")]
    InsufficientBalance {
        leave_type: LeaveType,
        requested: Decimal,
        available: Decimal,
        shortfall: Decimal,
    },

    #[error("Request {request_id} cannot move from {from} to {to}")]
    InvalidTransition {
        request_id: RequestId,
        from: RequestStatus,
        to: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Cannot compute balance: {source_name} unavailable ({reason})")]
    SourceUnavailable {
        source_name: &'static str,
        reason: String,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Lock acquisition failed")]
    LockError,
}

impl PtoError {
    pub fn validation(message: impl Into<String>) -> Self {
        PtoError::Validation(message.into())
    }

    pub fn insufficient(leave_type: LeaveType, requested: Decimal, available: Decimal) -> Self {
        PtoError::InsufficientBalance {
            leave_type,
            requested,
            available,
            shortfall: requested - available,
        }
    }

    pub fn not_found(entity: &'static str, id: &str) -> Self {
        PtoError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

//! Investors who fund split payments.
//!
//! An investor referenced by any payment source cannot be hard-deleted; it is
//! deactivated instead so the payment history stays intact.

use ledgerly_shared::{AppError, ErrorKind};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::access::AccessError;

/// What a remove request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RemovalOutcome {
    /// The row was deleted.
    Deleted,
    /// The row was kept and marked inactive.
    Deactivated,
}

/// Errors that can occur during investor operations.
#[derive(Debug, Error)]
pub enum InvestorError {
    /// Investor not found.
    #[error("Investor {0} not found")]
    NotFound(Uuid),

    /// Name is required.
    #[error("Investor name is required")]
    NameRequired,

    /// Actor may not perform the operation.
    #[error(transparent)]
    Forbidden(#[from] AccessError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl InvestorError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "INVESTOR_NOT_FOUND",
            Self::NameRequired => "NAME_REQUIRED",
            Self::Forbidden(_) => "ROLE_NOT_ALLOWED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NameRequired => ErrorKind::Validation,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Database(_) => ErrorKind::Internal,
        }
    }
}

impl From<InvestorError> for AppError {
    fn from(err: InvestorError) -> Self {
        Self::new(err.kind(), err.error_code(), err.to_string())
    }
}

/// Stateless service for investor rules.
pub struct InvestorService;

impl InvestorService {
    /// Validate an investor name.
    ///
    /// # Errors
    ///
    /// Returns `InvestorError::NameRequired` for a blank name.
    pub fn validate_name(name: &str) -> Result<(), InvestorError> {
        if name.trim().is_empty() {
            Err(InvestorError::NameRequired)
        } else {
            Ok(())
        }
    }

    /// An investor can be hard-deleted only if no payment source references it.
    #[must_use]
    pub const fn can_hard_delete(payment_source_count: u64) -> bool {
        payment_source_count == 0
    }

    /// What removing an investor with this many payment sources should do.
    #[must_use]
    pub const fn removal_outcome(payment_source_count: u64) -> RemovalOutcome {
        if Self::can_hard_delete(payment_source_count) {
            RemovalOutcome::Deleted
        } else {
            RemovalOutcome::Deactivated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_outcome() {
        assert_eq!(InvestorService::removal_outcome(0), RemovalOutcome::Deleted);
        assert_eq!(
            InvestorService::removal_outcome(3),
            RemovalOutcome::Deactivated
        );
    }

    #[test]
    fn test_name_required() {
        assert!(InvestorService::validate_name("Ana").is_ok());
        assert!(matches!(
            InvestorService::validate_name(" "),
            Err(InvestorError::NameRequired)
        ));
    }
}

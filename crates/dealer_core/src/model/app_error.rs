//! Application error carried by store and service operations.
//!
//! # Responsibility
//! - Give every failure an operation location, a stable machine-readable id,
//!   free-form detail text and an HTTP-style status code.
//!
//! # Invariants
//! - `status_code` is always derived from `kind`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AppResult<T> = Result<T, AppError>;

/// Error category; decides the status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An entity failed `is_valid()`.
    Validation,
    /// The request cannot be applied to current state.
    BadRequest,
    /// A read found no matching row.
    NotFound,
    /// Query building, connectivity or write failure.
    Internal,
}

impl ErrorKind {
    pub fn status_code(self) -> u16 {
        match self {
            Self::Validation | Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::Internal => 500,
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    /// Operation that produced the error, e.g. `SqlDealerStore.Get`.
    pub location: &'static str,
    /// Machine-readable error code.
    pub id: String,
    pub detailed_error: String,
    pub status_code: u16,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl AppError {
    pub fn new(
        kind: ErrorKind,
        location: &'static str,
        id: impl Into<String>,
        detailed_error: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            location,
            id: id.into(),
            detailed_error: detailed_error.into(),
            status_code: kind.status_code(),
            source: None,
        }
    }

    pub fn bad_request(
        location: &'static str,
        id: impl Into<String>,
        detailed_error: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::BadRequest, location, id, detailed_error)
    }

    pub fn not_found(
        location: &'static str,
        id: impl Into<String>,
        detailed_error: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::NotFound, location, id, detailed_error)
    }

    pub fn internal(
        location: &'static str,
        id: impl Into<String>,
        detailed_error: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::Internal, location, id, detailed_error)
    }

    /// Attaches the underlying cause, exposed through `Error::source`.
    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.detailed_error.is_empty() {
            write!(f, "{}: {}", self.location, self.id)
        } else {
            write!(f, "{}: {}, {}", self.location, self.id, self.detailed_error)
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, ErrorKind};
    use std::error::Error;
    use std::fmt;

    #[derive(Debug)]
    struct Cause;

    impl fmt::Display for Cause {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "disk on fire")
        }
    }

    impl Error for Cause {}

    #[test]
    fn status_code_follows_kind() {
        assert_eq!(AppError::bad_request("A", "x", "").status_code, 400);
        assert_eq!(AppError::not_found("A", "x", "").status_code, 404);
        assert_eq!(AppError::internal("A", "x", "").status_code, 500);
        assert_eq!(ErrorKind::Validation.status_code(), 400);
    }

    #[test]
    fn display_includes_location_id_and_detail() {
        let err = AppError::internal("SqlDealerStore.Get", "store.sql_dealer.get.app_error", "dealer_id=abc");
        assert_eq!(
            err.to_string(),
            "SqlDealerStore.Get: store.sql_dealer.get.app_error, dealer_id=abc"
        );
        let bare = AppError::bad_request("Dealer.IsValid", "model.dealer.is_valid.id.app_error", "");
        assert_eq!(bare.to_string(), "Dealer.IsValid: model.dealer.is_valid.id.app_error");
    }

    #[test]
    fn source_is_exposed_when_attached() {
        let err = AppError::internal("A", "x", "").with_source(Cause);
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("disk on fire"));
        assert!(AppError::internal("A", "x", "").source().is_none());
    }
}

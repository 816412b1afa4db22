//! Core persistence logic for dealer records.
//! This crate is the single source of truth for dealer invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::app_error::{AppError, AppResult, ErrorKind};
pub use model::dealer::{
    filter_by_name, is_valid_dealer_name, Dealer, DealerField, DealerPatch, DealerUpdate,
    DealerValidationError,
};
pub use service::dealer_service::DealerService;
pub use store::dealer_store::{DealerStore, SqlDealerStore};
pub use store::{SqlSettings, SqlStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

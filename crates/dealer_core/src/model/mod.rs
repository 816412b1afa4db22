//! Domain model for dealer records.
//!
//! # Responsibility
//! - Define canonical data structures used by store and service layers.
//! - Keep validation and normalization next to the data they guard.
//!
//! # Invariants
//! - Every persisted dealer is identified by a 26-character id.
//! - Deletion is represented by the `delete_at` tombstone, not hard delete.

pub mod app_error;
pub mod dealer;
pub mod utils;

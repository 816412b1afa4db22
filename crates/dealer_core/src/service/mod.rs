//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep CLI/embedding layers decoupled from storage details.

pub mod dealer_service;

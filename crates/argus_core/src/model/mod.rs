//! Domain model for the scored project catalog.
//!
//! # Responsibility
//! - Define catalog, project and scoring records used by core logic.
//! - Host write-time validation so repositories can reject bad input early.
//!
//! # Invariants
//! - Every persisted record is identified by its SQLite row id.
//! - Metric observations additionally carry a stable UUID for collectors.

pub mod catalog;
pub mod project;
pub mod scoring;
pub mod translation;
pub mod validation;

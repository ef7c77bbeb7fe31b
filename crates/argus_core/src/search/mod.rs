//! Public project discovery.
//!
//! # Responsibility
//! - Expose search and listing APIs over published projects.
//! - Keep result shaping and ordering inside core.

pub mod project_search;

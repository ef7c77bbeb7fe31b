//! Weighted score rollups over the Category → Field hierarchy.
//!
//! # Responsibility
//! - Compute category and overall scores from published field scores.
//! - Provide the explicit "missing" display cell.
//!
//! # Invariants
//! - No floating point anywhere in the scoring path.
//! - Nothing is cached; every call recomputes from its inputs.

pub mod aggregate;
pub mod cell;
pub mod rollup;

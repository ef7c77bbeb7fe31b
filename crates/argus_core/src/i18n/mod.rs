//! Locale-aware name resolution for catalog entities.
//!
//! # Responsibility
//! - Pick a display name for an entity from its pre-loaded translations.
//!
//! # Invariants
//! - The requested locale is always an explicit argument; there is no
//!   process-wide "current locale".

pub mod resolver;

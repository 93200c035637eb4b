//! Canonical workspace model.
//!
//! # Responsibility
//! - Define the entity types the store holds and persists.
//! - Provide factories that build fully populated entities.
//!
//! # Invariants
//! - Factories never fail; every field gets a schema-correct value.
//! - Entities are replaced as whole values, never edited in place by
//!   store transitions.

pub mod card;
pub mod ids;
pub mod note;
pub mod prefs;
pub mod project;
pub mod resource;
pub mod section;
pub mod task;
pub mod workspace;

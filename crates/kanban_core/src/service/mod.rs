//! Core use-case services.
//!
//! # Responsibility
//! - Own the workspace value and its persistence side effect (`store`).
//! - Express every feature change as a project-level transform routed
//!   through `WorkspaceStore::patch_active_project`.
//! - Keep UI layers decoupled from storage and normalization details.

pub mod board;
pub mod link_preview;
pub mod notes;
pub mod projects;
pub mod query;
pub mod resources;
pub mod sections;
pub mod store;
pub mod transfer;

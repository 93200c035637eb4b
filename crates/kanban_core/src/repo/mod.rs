//! Persistence adapters.
//!
//! # Responsibility
//! - Define the document-store contract consumed by the workspace store.
//! - Isolate SQLite details from service orchestration.
//!
//! # Invariants
//! - Read failures never reach callers; write failures do.

pub mod kv_repo;

//! Core workspace model for the kanban board and project notes.
//! This crate is the single source of truth for workspace invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::ids::{
    Clock, EpochMs, IdGenerator, ManualClock, NormalizeCtx, SequentialIdGenerator, SystemClock,
    UuidIdGenerator,
};
pub use model::note::{Note, NoteDraft, NotePatch, NotesState};
pub use model::project::{Project, ProjectDraft, ProjectType};
pub use model::resource::{Resource, ResourceDraft, ResourceKind};
pub use model::section::Section;
pub use model::task::{Priority, Task, TaskDraft, TaskPatch};
pub use model::workspace::Workspace;
pub use repo::kv_repo::{
    KeyValueStore, MemoryKeyValueStore, RepoError, RepoResult, SqliteKeyValueStore,
};
pub use service::link_preview::{
    run_due_previews, LinkResolver, OembedResolver, PreviewScheduler, ResolveError,
};
pub use service::store::{StoreError, StoreResult, WorkspaceStore};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

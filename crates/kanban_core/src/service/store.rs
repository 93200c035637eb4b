//! Workspace store: the owned workspace value and its mutation primitives.
//!
//! # Responsibility
//! - Load the workspace from a document store, migrating older shapes.
//! - Route every project-level change through `patch_active_project`.
//! - Persist the whole workspace after every state transition.
//!
//! # Invariants
//! - The held workspace always has at least one project and a valid active
//!   project pointer after any public call returns.
//! - Every held project has sections, tasks pointing at one of them, and a
//!   selected note; transitions that break this are re-normalized.
//! - Updates replace whole values; a `None` updater result is a no-op and
//!   triggers no save.
//! - On a save failure the in-memory state is kept and the error returned.

use crate::model::ids::{
    Clock, EpochMs, IdGenerator, NormalizeCtx, SystemClock, UuidIdGenerator,
};
use crate::model::prefs::{Theme, ViewMode};
use crate::model::project::{create_project, Project, ProjectDraft};
use crate::model::workspace::Workspace;
use crate::normalize::project::normalize_project;
use crate::normalize::workspace::{fallback_workspace, migrate_document};
use crate::repo::kv_repo::{
    KeyValueStore, RepoError, LEGACY_NOTES_KEY, LEGACY_TASKS_KEY, THEME_KEY, VIEW_MODE_KEY,
    WORKSPACE_KEY,
};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Name of the project synthesized when the last one is removed.
pub const REPLACEMENT_PROJECT_NAME: &str = "New Project";

pub type StoreResult<T> = Result<T, StoreError>;

/// Store transition error.
#[derive(Debug)]
pub enum StoreError {
    /// Document store rejected the write.
    Persist(RepoError),
    /// Workspace could not be encoded.
    Serialize(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persist(err) => write!(f, "failed to persist workspace: {err}"),
            Self::Serialize(err) => write!(f, "failed to encode workspace: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persist(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Persist(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Owner of the workspace and its persistence side effect.
pub struct WorkspaceStore<S: KeyValueStore> {
    storage: S,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
    workspace: Workspace,
}

impl<S: KeyValueStore> WorkspaceStore<S> {
    /// Opens a store with random ids and the wall clock.
    pub fn open(storage: S) -> StoreResult<Self> {
        Self::open_with(storage, Box::new(UuidIdGenerator), Box::new(SystemClock))
    }

    /// Opens a store with injected id and time sources.
    ///
    /// Reads the canonical document first, then the legacy keys, then seeds
    /// a fresh workspace. The normalized result is saved before returning.
    pub fn open_with(
        storage: S,
        mut ids: Box<dyn IdGenerator>,
        clock: Box<dyn Clock>,
    ) -> StoreResult<Self> {
        let now = clock.now_ms();
        let workspace = {
            let mut ctx = NormalizeCtx::new(ids.as_mut(), now);
            load_workspace(&storage, &mut ctx)
        };
        info!(
            "event=store_open module=service status=ok projects={}",
            workspace.projects.len()
        );

        let mut store = Self {
            storage,
            ids,
            clock,
            workspace,
        };
        store.persist()?;
        Ok(store)
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Active project, healing a stale pointer on read.
    pub fn active_project(&self) -> &Project {
        let index = self.active_index();
        &self.workspace.projects[index]
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn now_ms(&self) -> EpochMs {
        self.clock.now_ms()
    }

    /// Runs `f` with the store's id source and the current time, for
    /// building entities outside a patch (e.g. resolved previews).
    pub fn with_ctx<R>(&mut self, f: impl FnOnce(&mut NormalizeCtx<'_>) -> R) -> R {
        let now = self.clock.now_ms();
        let mut ctx = NormalizeCtx::new(self.ids.as_mut(), now);
        f(&mut ctx)
    }

    /// Applies `updater` to the active project only.
    ///
    /// `None` from the updater leaves the workspace untouched. Otherwise the
    /// returned project gets `updated_at = now`, replaces the active project
    /// in a new workspace value, and the workspace is saved.
    pub fn patch_active_project<F>(&mut self, updater: F) -> StoreResult<&Workspace>
    where
        F: FnOnce(&Project, &mut NormalizeCtx<'_>) -> Option<Project>,
    {
        let now = self.clock.now_ms();
        let index = self.active_index();
        let patched = {
            let mut ctx = NormalizeCtx::new(self.ids.as_mut(), now);
            updater(&self.workspace.projects[index], &mut ctx)
                .map(|project| heal_project(project, index, &mut ctx))
                .transpose()?
        };
        let Some(mut project) = patched else {
            debug!("event=patch_active_project module=service status=noop");
            return Ok(&self.workspace);
        };
        project.updated_at = now;

        let active_project_id = project.id.clone();
        let mut projects = self.workspace.projects.clone();
        projects[index] = project;
        debug!("event=patch_active_project module=service status=ok project_id={active_project_id}");
        self.commit(Workspace {
            projects,
            active_project_id,
        })
    }

    /// Applies `updater` to the whole workspace (project list and selection).
    ///
    /// The result is healed before it is stored: an empty project list gets
    /// a fresh replacement project, a stale pointer selects the first, and
    /// structurally broken projects are re-derived by the normalizer.
    pub fn update_workspace<F>(&mut self, updater: F) -> StoreResult<&Workspace>
    where
        F: FnOnce(&Workspace, &mut NormalizeCtx<'_>) -> Option<Workspace>,
    {
        let now = self.clock.now_ms();
        let next = {
            let mut ctx = NormalizeCtx::new(self.ids.as_mut(), now);
            updater(&self.workspace, &mut ctx)
                .map(|workspace| heal_workspace(workspace, &mut ctx))
                .transpose()?
        };
        match next {
            Some(workspace) => self.commit(workspace),
            None => {
                debug!("event=update_workspace module=service status=noop");
                Ok(&self.workspace)
            }
        }
    }

    /// Top-level replacement of the workspace value.
    pub fn replace_workspace(&mut self, workspace: Workspace) -> StoreResult<&Workspace> {
        self.update_workspace(|_, _| Some(workspace))
    }

    /// Stored view flag; anything unrecognized reads as the board.
    pub fn view_mode(&self) -> ViewMode {
        ViewMode::from_stored(self.storage.load(VIEW_MODE_KEY).as_deref())
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> StoreResult<()> {
        self.storage.save(VIEW_MODE_KEY, mode.as_key())?;
        Ok(())
    }

    /// Stored theme, or the OS preference when none was saved.
    pub fn theme(&self, os_prefers_dark: bool) -> Theme {
        Theme::from_stored(self.storage.load(THEME_KEY).as_deref(), os_prefers_dark)
    }

    pub fn set_theme(&mut self, theme: Theme) -> StoreResult<()> {
        self.storage.save(THEME_KEY, theme.as_key())?;
        Ok(())
    }

    fn active_index(&self) -> usize {
        self.workspace
            .resolved_active_id()
            .and_then(|active_id| {
                self.workspace
                    .projects
                    .iter()
                    .position(|project| project.id == active_id)
            })
            .unwrap_or(0)
    }

    fn commit(&mut self, workspace: Workspace) -> StoreResult<&Workspace> {
        self.workspace = workspace;
        self.persist()?;
        Ok(&self.workspace)
    }

    fn persist(&mut self) -> StoreResult<()> {
        let encoded = serde_json::to_string(&self.workspace)?;
        if let Err(err) = self.storage.save(WORKSPACE_KEY, &encoded) {
            error!("event=workspace_save module=service status=error error={err}");
            return Err(err.into());
        }
        Ok(())
    }
}

fn load_workspace<S: KeyValueStore>(storage: &S, ctx: &mut NormalizeCtx<'_>) -> Workspace {
    if let Some(raw) = read_json(storage, WORKSPACE_KEY) {
        if let Some(workspace) = migrate_document(&raw, ctx) {
            return workspace;
        }
        warn!("event=workspace_load module=service status=unrecognized key={WORKSPACE_KEY}");
    }

    let legacy_tasks = read_json(storage, LEGACY_TASKS_KEY);
    // The notes key held either JSON or the raw markdown of a single note.
    let legacy_notes = storage
        .load(LEGACY_NOTES_KEY)
        .map(|text| serde_json::from_str(&text).unwrap_or(Value::String(text)));
    info!(
        "event=workspace_load module=service status=fallback legacy_tasks={} legacy_notes={}",
        legacy_tasks.is_some(),
        legacy_notes.is_some()
    );
    fallback_workspace(legacy_tasks.as_ref(), legacy_notes.as_ref(), ctx)
}

fn read_json<S: KeyValueStore>(storage: &S, key: &str) -> Option<Value> {
    let text = storage.load(key)?;
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("event=kv_decode module=service status=error key={key} error={err}");
            None
        }
    }
}

fn heal_workspace(workspace: Workspace, ctx: &mut NormalizeCtx<'_>) -> StoreResult<Workspace> {
    if workspace.projects.is_empty() {
        let project = create_project(ProjectDraft::named(REPLACEMENT_PROJECT_NAME), ctx);
        return Ok(Workspace::selecting_first(vec![project]));
    }
    let projects = workspace
        .projects
        .into_iter()
        .enumerate()
        .map(|(position, project)| heal_project(project, position, ctx))
        .collect::<StoreResult<Vec<_>>>()?;
    let mut healed = Workspace {
        projects,
        active_project_id: workspace.active_project_id,
    };
    if let Some(active_id) = healed.resolved_active_id().map(str::to_string) {
        healed.active_project_id = active_id;
    }
    Ok(healed)
}

/// Runs `project` back through the normalizer when it breaks a structural
/// invariant; whole projects pass through untouched.
fn heal_project(
    project: Project,
    position: usize,
    ctx: &mut NormalizeCtx<'_>,
) -> StoreResult<Project> {
    if is_whole(&project) {
        return Ok(project);
    }
    warn!(
        "event=project_heal module=service status=repaired project_id={}",
        project.id
    );
    let raw = serde_json::to_value(&project)?;
    Ok(normalize_project(&raw, Some(position), ctx))
}

fn is_whole(project: &Project) -> bool {
    let section_ids = project.section_ids();
    let unique_sections = section_ids
        .iter()
        .enumerate()
        .all(|(index, id)| !section_ids[..index].contains(id));
    let notes = &project.notes_state;
    !project.name.trim().is_empty()
        && !section_ids.is_empty()
        && unique_sections
        && project.tasks.iter().all(|task| section_ids.contains(&task.status))
        && notes.note(&notes.active_note_id).is_some()
}

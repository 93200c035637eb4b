//! CLI entry point.
//!
//! # Responsibility
//! - Verify `kanban_core` linkage (`ping`).
//! - Inspect and maintain the persisted workspace without a UI.
//!
//! Configuration is read from `$KANBAN_CONFIG`, else `./kanban.toml`; a
//! missing file means defaults.

use kanban_core::service::query::{group_tasks, note_metrics, TaskFilter};
use kanban_core::service::transfer::ExportedNote;
use kanban_core::{
    init_logging_from_config, open_db, run_due_previews, CoreConfig, KeyValueStore,
    OembedResolver, PreviewScheduler, SqliteKeyValueStore, WorkspaceStore,
};
use log::info;
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

type CliResult<T> = Result<T, Box<dyn Error>>;

const DEFAULT_CONFIG_PATH: &str = "kanban.toml";
const USAGE: &str = "usage: kanban [ping|summary|export <dir>|import <file>|previews]";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> CliResult<()> {
    match args.first().map(String::as_str) {
        None | Some("ping") => {
            println!("kanban_core ping={}", kanban_core::ping());
            println!("kanban_core version={}", kanban_core::core_version());
            Ok(())
        }
        Some("summary") => with_store(|store, _| {
            print_summary(store);
            Ok(())
        }),
        Some("export") => {
            let dir = args.get(1).ok_or(USAGE)?;
            with_store(|store, _| {
                let exported: ExportedNote = store.export_active_note().ok_or("no active note")?;
                let path = exported.write_to(dir)?;
                println!("exported {}", path.display());
                Ok(())
            })
        }
        Some("import") => {
            let file = args.get(1).ok_or(USAGE)?;
            let body = std::fs::read_to_string(file)?;
            let file_name = Path::new(file)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(file.as_str());
            with_store(|store, _| {
                let note_id = store.import_note(file_name, &body)?;
                println!("imported note {note_id}");
                Ok(())
            })
        }
        Some("previews") => with_store(|store, config| {
            let mut scheduler = PreviewScheduler::from_config(config);
            let note_id = store.active_project().notes_state.active_note_id.clone();
            scheduler.note_edited(&note_id, store.now_ms());
            if let Some(deadline) = scheduler.next_deadline() {
                let wait_ms = u64::try_from(deadline - store.now_ms()).unwrap_or(0);
                thread::sleep(Duration::from_millis(wait_ms));
            }
            let resolver = OembedResolver::new()?;
            let applied = run_due_previews(store, &mut scheduler, &resolver)?;
            info!(
                "event=cli_previews module=cli status=ok applied={applied} debounce_ms={}",
                config.preview_debounce_ms
            );
            println!("added {applied} link preview(s)");
            Ok(())
        }),
        Some(_) => Err(USAGE.into()),
    }
}

fn with_store<T>(
    action: impl FnOnce(&mut WorkspaceStore<SqliteKeyValueStore<'_>>, &CoreConfig) -> CliResult<T>,
) -> CliResult<T> {
    let config_path =
        std::env::var("KANBAN_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = CoreConfig::load_or_default(&config_path)?;
    init_logging_from_config(&config)?;
    std::fs::create_dir_all(&config.data_dir)?;

    let conn = open_db(config.db_path())?;
    let storage = SqliteKeyValueStore::try_new(&conn)?;
    let mut store = WorkspaceStore::open(storage)?;
    action(&mut store, &config)
}

fn print_summary<S: KeyValueStore>(store: &WorkspaceStore<S>) {
    let workspace = store.workspace();
    for project in &workspace.projects {
        let marker = if project.id == workspace.active_project_id {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {} ({} tasks, {} notes, {} resources)",
            project.name,
            project.tasks.len(),
            project.notes_state.notes.len(),
            project.resources.len()
        );
    }

    let active = store.active_project();
    for group in group_tasks(active, &TaskFilter::default()) {
        println!("  [{}] {}", group.section.label, group.tasks.len());
        for task in group.tasks {
            println!(
                "    - {} ({}, {})",
                task.title,
                task.priority.as_key(),
                task.card.card_type().as_key()
            );
        }
    }
    if let Some(note) = active.notes_state.active_note() {
        let metrics = note_metrics(&note.content);
        println!(
            "  note: {} ({} words, {})",
            note.title,
            metrics.words,
            metrics.reading_label()
        );
    }
}

//! Command-line front end for the tidytask task list.
//!
//! # Responsibility
//! - Render projected tasks and summary counts.
//! - Dispatch user intents (add, toggle, remove, clear, filter/sort
//!   selections) to the core task store.
//!
//! # Invariants
//! - All business rules live in `tidytask_core`; this binary only maps
//!   core results to user-facing text.
//! - Destructive bulk deletion is gated behind an explicit confirmation.

use anyhow::{bail, Context};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tidytask_core::db::open_store;
use tidytask_core::{
    counts, default_log_level, init_logging, project, Filter, SnapshotStore, SortMode,
    SqliteSnapshotStore, StoreError, Task, TaskId, TaskStore, TaskValidationError,
};

const DB_FILE_NAME: &str = "tidytask.sqlite3";

#[derive(Parser)]
#[command(
    name = "tidytask",
    about = "Single-user task list manager",
    version = tidytask_core::core_version()
)]
struct Cli {
    /// Path to the task database file
    #[arg(long, env = "TIDYTASK_DB_PATH", global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging stays off without it
    #[arg(long, env = "TIDYTASK_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// Log level used when --log-dir is set (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a new task
    Add {
        /// Task text; quoting is optional, words are joined with spaces
        text: Vec<String>,
    },
    /// List tasks with optional filter and sort selections
    List {
        #[arg(long, value_enum, default_value = "all")]
        filter: FilterArg,
        #[arg(long, value_enum, default_value = "newest")]
        sort: SortArg,
    },
    /// Flip completion for one task
    Toggle { id: TaskId },
    /// Delete one task
    Remove { id: TaskId },
    /// Delete every task (asks for confirmation)
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show summary counts
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FilterArg {
    All,
    Active,
    Completed,
}

impl From<FilterArg> for Filter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => Self::All,
            FilterArg::Active => Self::Active,
            FilterArg::Completed => Self::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortArg {
    Newest,
    Oldest,
    Alphabetical,
    /// Incomplete tasks first, completed last
    Completed,
}

impl From<SortArg> for SortMode {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Newest => Self::Newest,
            SortArg::Oldest => Self::Oldest,
            SortArg::Alphabetical => Self::Alphabetical,
            SortArg::Completed => Self::CompletedLast,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());
        init_logging(&level, &log_dir.to_string_lossy()).map_err(anyhow::Error::msg)?;
    }

    let db_path = resolve_db_path(cli.db);
    let conn = open_store(&db_path)
        .with_context(|| format!("failed to open task store at `{}`", db_path.display()))?;
    let mut store = TaskStore::open(SqliteSnapshotStore::new(&conn))?;

    if let Some(warning) = store.load_warning() {
        eprintln!("Warning: stored tasks could not be read and were reset ({warning}).");
    }

    match cli.command {
        Command::Add { text } => run_add(&mut store, &text.join(" ")),
        Command::List { filter, sort } => {
            run_list(&store, filter.into(), sort.into());
            Ok(())
        }
        Command::Toggle { id } => run_toggle(&mut store, id),
        Command::Remove { id } => run_remove(&mut store, id),
        Command::Clear { yes } => run_clear(&mut store, yes),
        Command::Stats => {
            println!("{}", stats_line(store.tasks()));
            Ok(())
        }
    }
}

fn run_add<S: SnapshotStore>(store: &mut TaskStore<S>, raw: &str) -> anyhow::Result<()> {
    match store.add(raw) {
        Ok(id) => {
            println!("Added task #{id}: {}", raw.trim());
            Ok(())
        }
        Err(StoreError::Validation(err)) => {
            eprintln!("Rejected input: {raw}");
            bail!("{}", validation_message(&err));
        }
        Err(other) => Err(other.into()),
    }
}

fn run_list<S: SnapshotStore>(store: &TaskStore<S>, filter: Filter, sort: SortMode) {
    let tasks = store.tasks();
    let projected = project(tasks, filter, sort);

    if projected.is_empty() {
        if tasks.is_empty() {
            println!("No tasks yet. Add one with `tidytask add <text>`.");
        } else {
            println!("No tasks match your current filter.");
        }
    } else {
        for task in &projected {
            println!("{}", render_task_line(task));
        }
    }

    println!("{}", stats_line(tasks));
}

fn run_toggle<S: SnapshotStore>(store: &mut TaskStore<S>, id: TaskId) -> anyhow::Result<()> {
    if store.toggle(id)? {
        let completed = store
            .tasks()
            .iter()
            .find(|task| task.id == id)
            .is_some_and(|task| task.completed);
        if completed {
            println!("Task #{id} marked as done.");
        } else {
            println!("Task #{id} marked as not done.");
        }
    } else {
        println!("No task with id {id}.");
    }
    Ok(())
}

fn run_remove<S: SnapshotStore>(store: &mut TaskStore<S>, id: TaskId) -> anyhow::Result<()> {
    if store.remove(id)? {
        println!("Removed task #{id}.");
    } else {
        println!("No task with id {id}.");
    }
    Ok(())
}

fn run_clear<S: SnapshotStore>(store: &mut TaskStore<S>, yes: bool) -> anyhow::Result<()> {
    if store.is_empty() {
        println!("Nothing to clear.");
        return Ok(());
    }

    if !yes {
        print!("Are you sure you want to clear all tasks? [y/N] ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !confirms(&answer) {
            println!("Kept all tasks.");
            return Ok(());
        }
    }

    let removed = store.clear_all()?;
    println!("Cleared {removed} task(s).");
    Ok(())
}

/// Maps validation errors to the inline messages users see.
fn validation_message(err: &TaskValidationError) -> &'static str {
    match err {
        TaskValidationError::EmptyInput => "Please enter a task",
        TaskValidationError::TooShort => "Task must be at least 3 characters long",
        TaskValidationError::DuplicateTask => "This task already exists",
    }
}

fn render_task_line(task: &Task) -> String {
    let marker = if task.completed { "x" } else { " " };
    let date = task.created_at.with_timezone(&Local).format("%Y-%m-%d");
    format!("[{marker}] #{} {} ({date})", task.id, task.text)
}

fn stats_line(tasks: &[Task]) -> String {
    let summary = counts(tasks);
    format!(
        "Total: {} | Completed: {} | Remaining: {}",
        summary.total, summary.completed, summary.remaining
    )
}

fn confirms(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn resolve_db_path(flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::{
        confirms, render_task_line, resolve_db_path, stats_line, validation_message, FilterArg,
        SortArg,
    };
    use std::path::PathBuf;
    use tidytask_core::{Filter, SortMode, Task, TaskValidationError};

    #[test]
    fn confirms_accepts_yes_variants_only() {
        assert!(confirms("y\n"));
        assert!(confirms(" YES "));
        assert!(!confirms(""));
        assert!(!confirms("n\n"));
        assert!(!confirms("yep"));
    }

    #[test]
    fn validation_messages_match_the_inline_copy() {
        assert_eq!(
            validation_message(&TaskValidationError::EmptyInput),
            "Please enter a task"
        );
        assert_eq!(
            validation_message(&TaskValidationError::TooShort),
            "Task must be at least 3 characters long"
        );
        assert_eq!(
            validation_message(&TaskValidationError::DuplicateTask),
            "This task already exists"
        );
    }

    #[test]
    fn task_line_shows_completion_marker_id_and_text() {
        let mut task = Task::new(12, "buy milk");
        let line = render_task_line(&task);
        assert!(line.starts_with("[ ] #12 buy milk"));

        task.toggle();
        let line = render_task_line(&task);
        assert!(line.starts_with("[x] #12 buy milk"));
    }

    #[test]
    fn stats_line_reports_all_three_counts() {
        let mut done = Task::new(1, "walk the dog");
        done.toggle();
        let tasks = vec![done, Task::new(2, "buy milk")];
        assert_eq!(stats_line(&tasks), "Total: 2 | Completed: 1 | Remaining: 1");
    }

    #[test]
    fn explicit_db_path_wins_over_the_default() {
        let explicit = PathBuf::from("/tmp/custom.sqlite3");
        assert_eq!(resolve_db_path(Some(explicit.clone())), explicit);
        assert!(resolve_db_path(None).ends_with("tidytask.sqlite3"));
    }

    #[test]
    fn arg_enums_map_onto_core_selections() {
        assert_eq!(Filter::from(FilterArg::Active), Filter::Active);
        assert_eq!(Filter::from(FilterArg::Completed), Filter::Completed);
        assert_eq!(SortMode::from(SortArg::Completed), SortMode::CompletedLast);
        assert_eq!(SortMode::from(SortArg::Alphabetical), SortMode::Alphabetical);
    }
}

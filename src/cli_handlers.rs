use crate::cli::Command;
use crate::error::{Result, TaskError};
use crate::models::{Status, Task};
use crate::store::TaskStore;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Rendered outcome of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The store was modified and has unsaved changes
    Mutated(String),
    /// Nothing changed in memory
    Info(String),
    /// End the session
    Quit,
}

/// Run a command against the store
pub fn dispatch(store: &mut TaskStore, command: Command) -> Result<Reply> {
    match command {
        Command::Add { description } => handle_add(store, &description.join(" ")).map(Reply::Mutated),
        Command::Update { id, description } => {
            handle_update(store, id, &description.join(" ")).map(Reply::Mutated)
        }
        Command::Delete { id } => handle_delete(store, id).map(Reply::Mutated),
        Command::Mark { id, status } => handle_mark(store, id, status).map(Reply::Mutated),
        Command::List { status } => Ok(Reply::Info(handle_list(store, status))),
        Command::Save => handle_save(store).map(Reply::Info),
        Command::Quit => Ok(Reply::Quit),
    }
}

/// Handle the add command
pub fn handle_add(store: &mut TaskStore, description: &str) -> Result<String> {
    let (description, id) = store.add(description)?;
    Ok(format!("Task added successfully (ID: {id}): {description}"))
}

/// Handle the update command
pub fn handle_update(store: &mut TaskStore, id: u64, description: &str) -> Result<String> {
    let (old, new) = store.update(id, description)?;
    Ok(format!("Task {id} updated: \"{old}\" -> \"{new}\""))
}

/// Handle the delete command
pub fn handle_delete(store: &mut TaskStore, id: u64) -> Result<String> {
    let task = store.delete(id)?;
    Ok(format!("Task {} deleted: {}", task.id, task.description))
}

/// Handle the mark command
pub fn handle_mark(store: &mut TaskStore, id: u64, status: Status) -> Result<String> {
    let (old, new, description) = store.mark_status(id, status)?;
    Ok(format!("Task {id} marked {new} (was {old}): {description}"))
}

/// Handle the list command
pub fn handle_list(store: &TaskStore, status: Option<Status>) -> String {
    let tasks = store.list(status);

    if tasks.is_empty() {
        return match status {
            Some(status) => format!("No tasks with status {status}."),
            None => "No tasks found.".to_string(),
        };
    }

    tasks
        .into_iter()
        .map(format_task)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Handle the save command
pub fn handle_save(store: &TaskStore) -> Result<String> {
    store.save()?;
    Ok(saved_message(store))
}

/// Confirmation printed after the store has been written
pub fn saved_message(store: &TaskStore) -> String {
    format!(
        "Saved {} task(s) to {}",
        store.len(),
        store.path().display()
    )
}

/// Render an error as the one line shown to the user
pub fn render_error(error: &TaskError) -> String {
    match error {
        // Already fully formatted by the parser
        TaskError::Parse(message) => message.clone(),
        other => format!("Error: {other}"),
    }
}

fn format_task(task: &Task) -> String {
    let mut line = format!(
        "[{}] {} ({}) created {}",
        task.id,
        task.description,
        task.status,
        task.created_at.format(TIMESTAMP_FORMAT)
    );
    if let Some(updated) = task.updated_at {
        line.push_str(&format!(", updated {}", updated.format(TIMESTAMP_FORMAT)));
    }
    line
}

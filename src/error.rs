use crate::models::Status;
use thiserror::Error;

/// All possible errors in the task tracker
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Task {0} not found")]
    NotFound(u64),

    #[error("Task {id} is already {status}")]
    NoChange { id: u64, status: Status },

    #[error("Task description cannot be empty")]
    EmptyDescription,

    #[error("No task ids left to assign")]
    IdExhausted,

    #[error("Invalid status '{0}' (expected todo, in-progress or done)")]
    InvalidStatus(String),

    #[error("{0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TaskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(TaskError::NotFound(7).to_string(), "Task 7 not found");
        assert_eq!(
            TaskError::NoChange {
                id: 2,
                status: Status::InProgress
            }
            .to_string(),
            "Task 2 is already in-progress"
        );
        assert_eq!(
            TaskError::InvalidStatus("later".to_string()).to_string(),
            "Invalid status 'later' (expected todo, in-progress or done)"
        );
    }
}

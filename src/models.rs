use crate::error::TaskError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Status::Todo),
            "in-progress" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            _ => Err(TaskError::InvalidStatus(s.to_string())),
        }
    }
}

/// A task as persisted in the store file.
///
/// The id is the key of the enclosing JSON object, so it is skipped on
/// (de)serialization and filled in by the store after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(skip)]
    pub id: u64,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Status")]
    pub status: Status,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: u64, description: String, now: DateTime<Utc>) -> Self {
        Task {
            id,
            description,
            status: Status::Todo,
            created_at: now,
            updated_at: None,
        }
    }
}

/// Trim and capitalize a description, rejecting empty input.
pub fn normalize_description(raw: &str) -> Result<String, TaskError> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => Ok(first.to_uppercase().chain(chars).collect()),
        None => Err(TaskError::EmptyDescription),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("todo".parse::<Status>().unwrap(), Status::Todo);
        assert_eq!("in-progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("done".parse::<Status>().unwrap(), Status::Done);
        assert!(matches!(
            "in_progress".parse::<Status>(),
            Err(TaskError::InvalidStatus(s)) if s == "in_progress"
        ));
        assert!("Done".parse::<Status>().is_err());
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description("buy milk").unwrap(), "Buy milk");
        assert_eq!(normalize_description("  call NASA ").unwrap(), "Call NASA");
        assert_eq!(normalize_description("élan").unwrap(), "Élan");
        assert!(matches!(
            normalize_description("   "),
            Err(TaskError::EmptyDescription)
        ));
    }

    #[test]
    fn test_task_json_shape() {
        let now = "2026-10-19T09:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let task = Task::new(3, "Buy milk".to_string(), now);
        let value = serde_json::to_value(&task).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "Description": "Buy milk",
                "Status": "todo",
                "createdAt": "2026-10-19T09:00:00Z",
                "updatedAt": null,
            })
        );
    }
}

use crate::models::Status;
use crate::store::DEFAULT_STORE_FILE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "task-cli")]
#[command(about = "Personal task tracker")]
#[command(
    long_about = "Personal task tracker. Run a single command, or start an interactive session by omitting it."
)]
#[command(version)]
pub struct Cli {
    /// Path of the JSON store file
    #[arg(long, env = "TASK_CLI_FILE", default_value = DEFAULT_STORE_FILE)]
    pub file: PathBuf,

    /// Save after every change instead of only on `s`, `q` or exit
    #[arg(long, env = "TASK_CLI_AUTOSAVE")]
    pub autosave: bool,

    /// Command to run once; starts an interactive session when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// A single line typed into the interactive session
#[derive(Parser, Debug)]
#[command(name = "task-cli")]
#[command(no_binary_name = true, disable_version_flag = true)]
pub struct SessionLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a new task
    Add {
        /// Task description
        #[arg(
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        description: Vec<String>,
    },

    /// Change a task's description
    Update {
        /// Task ID
        id: u64,
        /// New description
        #[arg(
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        description: Vec<String>,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: u64,
    },

    /// Set a task's status
    Mark {
        /// Task ID
        id: u64,
        /// New status
        #[arg(value_name = "todo|in-progress|done")]
        status: Status,
    },

    /// List tasks
    List {
        /// Only show tasks with this status
        #[arg(value_name = "todo|in-progress|done")]
        status: Option<Status>,
    },

    /// Save and quit
    #[command(name = "q", visible_alias = "quit")]
    Quit,

    /// Save without quitting
    #[command(name = "s", visible_alias = "save")]
    Save,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        SessionLine::try_parse_from(args).map(|line| line.command)
    }

    #[test]
    fn test_add_collects_words() {
        assert_eq!(
            parse(&["add", "buy", "milk"]).unwrap(),
            Command::Add {
                description: vec!["buy".to_string(), "milk".to_string()]
            }
        );
    }

    #[test]
    fn test_descriptions_may_start_with_hyphen() {
        assert_eq!(
            parse(&["add", "-1", "from", "budget"]).unwrap(),
            Command::Add {
                description: vec!["-1".to_string(), "from".to_string(), "budget".to_string()]
            }
        );
        assert_eq!(
            parse(&["update", "2", "--draft", "notes"]).unwrap(),
            Command::Update {
                id: 2,
                description: vec!["--draft".to_string(), "notes".to_string()]
            }
        );
    }

    #[test]
    fn test_mark_parses_status() {
        assert_eq!(
            parse(&["mark", "3", "in-progress"]).unwrap(),
            Command::Mark {
                id: 3,
                status: Status::InProgress
            }
        );
        assert!(parse(&["mark", "3", "finished"]).is_err());
    }

    #[test]
    fn test_arity_errors() {
        assert!(parse(&["add"]).is_err());
        assert!(parse(&["update", "1"]).is_err());
        assert!(parse(&["delete"]).is_err());
        assert!(parse(&["delete", "one"]).is_err());
        assert!(parse(&["list", "done", "todo"]).is_err());
        assert!(parse(&["q", "now"]).is_err());
    }

    #[test]
    fn test_quit_and_save_aliases() {
        assert_eq!(parse(&["q"]).unwrap(), Command::Quit);
        assert_eq!(parse(&["quit"]).unwrap(), Command::Quit);
        assert_eq!(parse(&["s"]).unwrap(), Command::Save);
        assert_eq!(parse(&["save"]).unwrap(), Command::Save);
    }

    #[test]
    fn test_cli_without_command_is_interactive() {
        let cli = Cli::try_parse_from(["task-cli", "--file", "/tmp/t.json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.file, PathBuf::from("/tmp/t.json"));
        assert!(!cli.autosave);
    }

    #[test]
    fn test_cli_verify() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
        SessionLine::command().debug_assert();
    }
}

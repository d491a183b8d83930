//! Interactive read-parse-dispatch-render loop.

use crate::cli::{Command, SessionLine};
use crate::cli_handlers::{self, Reply};
use crate::error::{Result, TaskError};
use crate::store::TaskStore;
use clap::Parser;
use clap::error::ErrorKind;
use std::future::Future;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

const PROMPT: &str = "> ";

/// Session settings
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopOptions {
    /// Save after every successful mutation
    pub autosave: bool,
}

/// What one input line produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Keep reading; print the text if any
    Continue(Option<String>),
    /// Stop reading and flush the store
    Quit,
}

/// A parsed input line
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Blank,
    Command(Command),
    Help(String),
}

/// Split and parse one line of user input
fn parse_line(line: &str) -> Result<Input> {
    if line.trim().is_empty() {
        return Ok(Input::Blank);
    }

    let tokens = shlex::split(line)
        .ok_or_else(|| TaskError::Parse("error: unbalanced quotes in input".to_string()))?;
    if tokens.is_empty() {
        return Ok(Input::Blank);
    }

    match SessionLine::try_parse_from(tokens) {
        Ok(parsed) => Ok(Input::Command(parsed.command)),
        Err(e) => {
            let rendered = e.render().to_string().trim_end().to_string();
            match e.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                | ErrorKind::DisplayVersion => Ok(Input::Help(rendered)),
                _ => Err(TaskError::Parse(rendered)),
            }
        }
    }
}

/// Feed one line to the store and produce what should be printed
pub fn handle_line(store: &mut TaskStore, line: &str, options: LoopOptions) -> Step {
    let command = match parse_line(line) {
        Ok(Input::Blank) => return Step::Continue(None),
        Ok(Input::Help(text)) => return Step::Continue(Some(text)),
        Ok(Input::Command(command)) => command,
        Err(e) => {
            debug!(line, error = %e, "could not parse input");
            return Step::Continue(Some(cli_handlers::render_error(&e)));
        }
    };

    match cli_handlers::dispatch(store, command) {
        Ok(Reply::Quit) => Step::Quit,
        Ok(Reply::Info(text)) => Step::Continue(Some(text)),
        Ok(Reply::Mutated(text)) if options.autosave => match store.save() {
            Ok(()) => Step::Continue(Some(text)),
            Err(e) => Step::Continue(Some(format!(
                "{text}\n{}",
                cli_handlers::render_error(&e)
            ))),
        },
        Ok(Reply::Mutated(text)) => Step::Continue(Some(text)),
        Err(e) => Step::Continue(Some(cli_handlers::render_error(&e))),
    }
}

/// Run the session until `q`, end of input, or `interrupt` resolves.
///
/// The store is flushed once on the way out, including when reading input
/// or writing output fails; a failed flush is returned after the loop has
/// already stopped.
pub async fn run_loop<R, W, F>(
    store: &mut TaskStore,
    mut input: R,
    out: &mut W,
    options: LoopOptions,
    interrupt: F,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    F: Future<Output = ()>,
{
    tokio::pin!(interrupt);
    let mut buf = Vec::new();

    loop {
        if let Err(e) = write!(out, "{PROMPT}").and_then(|()| out.flush()) {
            warn!(error = %e, "cannot write prompt, flushing store");
            break;
        }

        buf.clear();
        let read = tokio::select! {
            read = input.read_until(b'\n', &mut buf) => read,
            _ = &mut interrupt => {
                info!("interrupted, flushing store");
                let _ = writeln!(out);
                break;
            }
        };

        match read {
            Ok(0) => {
                info!("end of input, flushing store");
                let _ = writeln!(out);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "cannot read input, flushing store");
                break;
            }
        }

        let step = match decode_line(&buf) {
            Ok(line) => handle_line(store, line, options),
            Err(e) => {
                debug!(error = %e, "could not decode input");
                Step::Continue(Some(cli_handlers::render_error(&e)))
            }
        };

        let written = match step {
            Step::Continue(Some(text)) => writeln!(out, "{text}"),
            Step::Continue(None) => Ok(()),
            Step::Quit => break,
        };
        if let Err(e) = written {
            warn!(error = %e, "cannot write output, flushing store");
            break;
        }
    }

    store.save()?;
    writeln!(out, "{}", cli_handlers::saved_message(store))?;
    out.flush()?;
    Ok(())
}

/// Strip the line terminator and check the bytes are UTF-8
fn decode_line(bytes: &[u8]) -> Result<&str> {
    let line = std::str::from_utf8(bytes)
        .map_err(|_| TaskError::Parse("error: input is not valid UTF-8".to_string()))?;
    Ok(line.trim_end_matches(['\n', '\r']))
}

use anyhow::Context;
use clap::Parser;
use std::io::{self, IsTerminal};
use std::process;
use task_cli::TaskStore;
use task_cli::cli::{Cli, Command};
use task_cli::cli_handlers::{self, Reply};
use task_cli::repl::{self, LoopOptions};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    };

    // A pending stdin read lives on a blocking thread the runtime would wait for
    process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut store = TaskStore::open(&cli.file)
        .with_context(|| format!("failed to open task store {}", cli.file.display()))?;

    match cli.command {
        Some(command) => Ok(run_once(&mut store, command)),
        None => {
            if io::stdin().is_terminal() {
                println!("Task tracker. Type `help` for commands, `q` to save and quit.");
            }
            let options = LoopOptions {
                autosave: cli.autosave,
            };
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            let mut out = io::stdout().lock();
            repl::run_loop(&mut store, input, &mut out, options, interrupted())
                .await
                .context("failed to save tasks on exit")?;
            Ok(0)
        }
    }
}

/// Run a single command from the process arguments, saving any change
fn run_once(store: &mut TaskStore, command: Command) -> i32 {
    let reply = cli_handlers::dispatch(store, command).and_then(|reply| {
        if let Reply::Mutated(_) = reply {
            store.save()?;
        }
        Ok(reply)
    });

    match reply {
        Ok(Reply::Mutated(text)) | Ok(Reply::Info(text)) => {
            println!("{text}");
            0
        }
        Ok(Reply::Quit) => 0,
        Err(e) => {
            eprintln!("{}", cli_handlers::render_error(&e));
            1
        }
    }
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for interrupts");
        std::future::pending::<()>().await;
    }
}

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
//! Command-line interface for reserving PyPI package names via the
//! libreserve crate.

use std::{
    env,
    io::{self, IsTerminal, Write},
    process,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use liboutput::{Output, Quiet, Terminal};
use libreserve::{Completion, Config, ReserveError, Reserver, expand_tilde};
use tracing::{debug, subscriber, warn};
use tracing_subscriber::EnvFilter;

/// Command-line argument definitions.
mod args;
/// Interactive collection of the package request.
mod prompts;

use args::Cli;
use prompts::{Answers, gather};

/// Install the stderr log subscriber. `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let collector = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .finish();

    if let Err(err) = subscriber::set_global_default(collector) {
        eprintln!("Failed to install log subscriber: {err}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Determine color output preference early for error handling
    let color = if cli.color {
        true
    } else if cli.no_color {
        false
    } else {
        io::stdout().is_terminal()
    };

    let output: Arc<dyn Output> = if cli.quiet {
        Arc::new(Quiet)
    } else {
        Arc::new(Terminal::new(color))
    };

    if let Err(e) = run(cli, &output) {
        // Reset any existing colors only if color was enabled and stdout is a TTY
        if color && io::stdout().is_terminal() {
            print!("\x1b[0m");
            if let Err(flush_err) = io::stdout().flush() {
                eprintln!("Failed to flush stdout while resetting colors: {flush_err}");
            }
        }

        let exit_code = match e.downcast_ref::<ReserveError>() {
            Some(err @ ReserveError::UserAborted) => {
                if let Err(finish_err) = output.finish() {
                    eprintln!("Failed to flush output handler: {finish_err:#}");
                }
                err.exit_code()
            }
            Some(err) => {
                report(output.as_ref(), &e);
                err.exit_code()
            }
            None => {
                report(output.as_ref(), &e);
                1
            }
        };

        process::exit(exit_code);
    }

    Ok(())
}

/// Render a fatal error through the output handler.
fn report(output: &dyn Output, e: &anyhow::Error) {
    if let Err(display_err) = output.fail(&format!("{e:#}")) {
        eprintln!("Failed to report error via output handler: {display_err:#}");
    }
    if let Err(finish_err) = output.finish() {
        eprintln!("Failed to flush output handler: {finish_err:#}");
    }
}

/// Resolve configuration, gather the request and run the pipeline.
fn run(cli: Cli, output: &Arc<dyn Output>) -> Result<()> {
    let home = env::var("HOME").ok();
    let mut config = Config::from_env()?;
    if let Some(url) = &cli.repository_url {
        config.repository_url = url.clone();
    }
    if let Some(python) = &cli.python {
        config.tools.python = expand_tilde(python, home.as_deref());
    }
    debug!(?config, "configuration resolved");

    let answers = Answers {
        repo: cli.repo_choice(),
        name: cli.name,
        description: cli.description,
        base_dir: cli.base_dir,
    };
    let no_prompt = cli.no_prompt || cli.quiet;
    let gathered = gather(answers, &config, output.as_ref(), no_prompt, home.as_deref())?;

    let reserver = Reserver::new(config, Arc::clone(output));
    match reserver.run(&gathered.request, gathered.create_repo)? {
        Completion::Succeeded => {}
        Completion::SucceededWithWarning(err) => {
            warn!(%err, "finished with a warning");
        }
    }

    output.finish().context("Failed to flush output")?;
    Ok(())
}

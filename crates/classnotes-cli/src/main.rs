//! classnotes CLI - collaborative class notes from the terminal
//!
//! Sign in, open a class and subject, then read, write and discuss notes.

mod cli;
mod commands;
mod config_profiles;
mod context;
mod error;
mod session;

#[cfg(test)]
mod tests;

use clap::{CommandFactory, Parser};
use tracing_subscriber::filter::{Directive, LevelFilter};

use crate::cli::{Cli, Commands};
use crate::commands::attachments::{run_image, run_link};
use crate::commands::auth_cmd::run_auth;
use crate::commands::class::run_class;
use crate::commands::comment::run_comment;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::navigation::{run_back, run_status};
use crate::commands::note::run_note;
use crate::commands::share::run_share;
use crate::commands::subject::run_subject;
use crate::context::ClientContext;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let directive = "classnotes=info"
        .parse::<Directive>()
        .unwrap_or_else(|_| LevelFilter::INFO.into());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Config { command } => return run_config(command, profile),
        Commands::Completions { shell, output } => {
            return run_completions(shell, output.as_deref());
        }
        _ => {}
    }

    let ctx = ClientContext::load(profile, cli.db_path).await?;
    match command {
        Commands::Auth { command } => run_auth(command, &ctx).await,
        Commands::Class { command } => run_class(command, &ctx).await,
        Commands::Subject { command } => run_subject(command, &ctx).await,
        Commands::Note { command } => run_note(command, &ctx).await,
        Commands::Image { command } => run_image(command, &ctx).await,
        Commands::Link { command } => run_link(command, &ctx).await,
        Commands::Comment { command } => run_comment(command, &ctx).await,
        Commands::Share {
            note,
            email,
            share_type,
        } => run_share(&note, &email, share_type, &ctx).await,
        Commands::Status { json } => run_status(json, &ctx).await,
        Commands::Back => run_back(&ctx).await,
        Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
    }
}

//! got CLI - snapshot and restore a worktree

use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};

use got::{ops, Hash, Repo};

#[derive(Parser)]
#[command(name = "got")]
#[command(about = "minimal content-addressed version control")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// create a .got repo in the current directory
    Init,

    /// snapshot the worktree
    Commit {
        /// commit message
        message: Option<String>,
    },

    /// restore the worktree to a commit
    To {
        /// target commit hash
        hash: Option<String>,
    },

    /// print the inflated content of any object
    Show {
        /// object hash
        hash: Option<String>,
    },

    /// print the commit log, newest first
    Log,

    /// print the current head commit hash
    Current,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> got::Result<()> {
    let cwd = std::env::current_dir().map_err(|e| got::Error::Io {
        path: ".".into(),
        source: e,
    })?;

    match cli.command {
        Commands::Init => {
            Repo::init(&cwd)?;
            println!("Repo created in a current working directory");
        }

        Commands::Commit { message } => {
            let Some(message) = message.filter(|m| !m.is_empty()) else {
                println!("No commit message provided");
                return Ok(());
            };
            let repo = Repo::discover(&cwd)?;
            let hash = ops::commit(&repo, &message, Utc::now())?;
            println!("Worktree commited: {}", hash);
        }

        Commands::To { hash } => {
            let Some(hex) = hash.filter(|h| !h.is_empty()) else {
                println!("No commit hash provided");
                return Ok(());
            };
            let repo = Repo::discover(&cwd)?;
            let hash = Hash::from_hex(&hex)?;
            ops::restore(&repo, &hash)?;
            println!("Worktree restored from commit: {}", hex);
        }

        Commands::Show { hash } => {
            let Some(hex) = hash.filter(|h| !h.is_empty()) else {
                println!("No commit hash provided");
                return Ok(());
            };
            let repo = Repo::discover(&cwd)?;
            println!("{}", got::show(&repo, &hex)?);
        }

        Commands::Log => {
            let repo = Repo::discover(&cwd)?;
            println!("{}", repo.read_log()?);
        }

        Commands::Current => {
            let repo = Repo::discover(&cwd)?;
            println!("Current commit hash: {}", repo.read_head()?);
        }
    }

    Ok(())
}

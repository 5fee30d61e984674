//! `roster` - terminal console for the student roster

mod app;
mod prompt;
mod render;

use anyhow::Context;
use clap::{value_parser, Arg, Command};
use roster_core::ConsoleConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn cli() -> Command {
    Command::new("roster")
        .version(roster_core::VERSION)
        .about("Student roster console")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to a TOML configuration file"),
        )
        .subcommand(Command::new("shell").about("Interactive console (default)"))
        .subcommand(
            Command::new("list")
                .about("Sign in and print the roster")
                .arg(Arg::new("email").long("email").help("Account email"))
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Account password"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a student record stored as JSON")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON object with camelCase student fields"),
                ),
        )
}

fn init_tracing(configured: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ConsoleConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ConsoleConfig::new(),
    };
    init_tracing(&config.log.filter);
    tracing::debug!(?config.store, "starting console");

    match matches.subcommand() {
        Some(("list", args)) => {
            let table = app::list(
                &config,
                args.get_one::<String>("email").map(String::as_str),
                args.get_one::<String>("password").map(String::as_str),
            )
            .await?;
            print!("{table}");
        }
        Some(("validate", args)) => {
            let path = args
                .get_one::<PathBuf>("file")
                .context("missing file argument")?;
            let (report, valid) = app::validate_file(path)?;
            print!("{report}");
            if !valid {
                std::process::exit(1);
            }
        }
        _ => {
            if config.auth.accounts.is_empty() {
                tracing::warn!("no accounts configured; sign-in will always fail");
            }
            let term = prompt::Terminal::interactive().context("opening the terminal")?;
            let shell = app::Shell::new(
                &config,
                app::identity_provider(&config),
                app::store_client(&config)?,
                Arc::new(parking_lot::Mutex::new(term)),
            );
            shell.run().await?;
        }
    }
    Ok(())
}

//! Terminal client for vocabulary drills, online against the server or
//! offline against a local SQLite database.

pub mod account;
pub mod config;
pub mod credentials;
pub mod error;
pub mod menu;
pub mod remote;
pub mod store;
pub mod terminal;

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::account::ServerAccounts;
use crate::config::Args;
use crate::credentials::Credentials;
use crate::error::ClientError;
use crate::menu::Menu;
use crate::remote::RemoteStore;
use crate::store::SqliteStore;
use crate::terminal::TerminalConsole;

pub fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // stdout belongs to the drill; logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let stdin = io::stdin();
    let mut console = TerminalConsole::new(stdin.lock(), io::stdout());

    match &args.offline {
        Some(db_path) => run_offline(&args, db_path, &mut console),
        None => run_online(&args, &mut console),
    }
}

fn run_offline<R: BufRead, W: Write>(
    args: &Args,
    db_path: &Path,
    console: &mut TerminalConsole<R, W>,
) -> anyhow::Result<()> {
    let store = SqliteStore::open(db_path)
        .with_context(|| format!("opening {}", db_path.display()))?;

    if let Some(import) = &args.import {
        let inserted = store
            .import_file(import)
            .with_context(|| format!("importing {}", import.display()))?;
        console.say(&format!("Imported {inserted} new words."));
    }

    Menu::new(&store, &store, store.learner())
        .with_direction(args.direction())
        .with_time_limit(args.time_limit())
        .run(console)?;
    Ok(())
}

fn run_online<R: BufRead, W: Write>(
    args: &Args,
    console: &mut TerminalConsole<R, W>,
) -> anyhow::Result<()> {
    let path = args.credentials_path();

    if args.logout {
        if let Some(saved) = Credentials::load(&path)? {
            match RemoteStore::new(&saved).logout() {
                Ok(revoked) => tracing::info!(revoked, "logged out"),
                Err(ClientError::Backend { status: 401, .. }) => {
                    tracing::info!("saved token was already invalid")
                }
                Err(err) => return Err(err).context("logging out"),
            }
        }
        Credentials::remove(&path)?;
        console.say("Logged out.");
        return Ok(());
    }

    let saved = Credentials::load(&path)?;
    let credentials = account::sign_in(
        &ServerAccounts::new(&args.server),
        console,
        &args.server,
        saved.clone(),
        Utc::now(),
    )?;
    if saved.as_ref() != Some(&credentials) {
        credentials
            .save(&path)
            .with_context(|| format!("saving credentials to {}", path.display()))?;
    }

    let store = RemoteStore::new(&credentials);
    if !store.check_connectivity().unwrap_or(false) {
        anyhow::bail!("server {} is not reachable", credentials.server_url);
    }

    Menu::new(&store, &store, store.learner())
        .with_direction(args.direction())
        .with_time_limit(args.time_limit())
        .run(console)?;
    Ok(())
}

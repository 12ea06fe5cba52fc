//! Getting a usable token: saved credentials, a fresh login, or a new account.

use std::io::{BufRead, Write};

use anyhow::Context;
use chrono::{DateTime, Utc};
use vocab_core::Console;

use crate::credentials::Credentials;
use crate::error::{ClientError, Result};
use crate::remote::RemoteStore;
use crate::terminal::TerminalConsole;

const MAX_PASSWORD_ATTEMPTS: usize = 3;
const ACCOUNT_PROMPT: &str = "Account (login, register)";

/// Server calls that hand out credentials.
pub trait AccountApi {
    fn register(&self, name: &str, email: &str, password: &str) -> Result<Credentials>;
    fn login(&self, email: &str, password: &str) -> Result<Credentials>;
}

/// `AccountApi` over HTTP.
pub struct ServerAccounts {
    server_url: String,
}

impl ServerAccounts {
    pub fn new(server_url: &str) -> Self {
        Self {
            server_url: server_url.to_string(),
        }
    }
}

impl AccountApi for ServerAccounts {
    fn register(&self, name: &str, email: &str, password: &str) -> Result<Credentials> {
        RemoteStore::register(&self.server_url, name, email, password)
    }

    fn login(&self, email: &str, password: &str) -> Result<Credentials> {
        RemoteStore::login(&self.server_url, email, password)
    }
}

/// Credentials to drill with against `server_url`.
///
/// Saved credentials are reused while their token is valid. An expired token
/// for the same server leads to a password prompt for the saved email, never
/// to a new registration.
pub fn sign_in<A, R, W>(
    api: &A,
    console: &mut TerminalConsole<R, W>,
    server_url: &str,
    saved: Option<Credentials>,
    now: DateTime<Utc>,
) -> anyhow::Result<Credentials>
where
    A: AccountApi + ?Sized,
    R: BufRead,
    W: Write,
{
    match saved {
        Some(saved) if saved.is_valid_for(server_url, now) => Ok(saved),
        Some(saved) if saved.is_for_server(server_url) && !saved.email.is_empty() => {
            console.say(&format!("Session expired. Log in as {}.", saved.email));
            login_with_password(api, console, &saved.email)
        }
        _ => choose_account(api, console),
    }
}

fn choose_account<A, R, W>(
    api: &A,
    console: &mut TerminalConsole<R, W>,
) -> anyhow::Result<Credentials>
where
    A: AccountApi + ?Sized,
    R: BufRead,
    W: Write,
{
    loop {
        let choice = console.present_prompt(ACCOUNT_PROMPT)?;
        match choice.trim().to_lowercase().as_str() {
            "login" => {
                let email = console.present_prompt("Email")?;
                return login_with_password(api, console, email.trim());
            }
            "register" => {
                let name = console.present_prompt("Name")?;
                let email = console.present_prompt("Email")?;
                let password = console.present_prompt("Password")?;
                return api
                    .register(name.trim(), email.trim(), &password)
                    .context("registering with the server");
            }
            other => console.say(&format!("Unknown choice: {other}")),
        }
    }
}

fn login_with_password<A, R, W>(
    api: &A,
    console: &mut TerminalConsole<R, W>,
    email: &str,
) -> anyhow::Result<Credentials>
where
    A: AccountApi + ?Sized,
    R: BufRead,
    W: Write,
{
    for _ in 0..MAX_PASSWORD_ATTEMPTS {
        let password = console.present_prompt("Password")?;
        match api.login(email, &password) {
            Ok(credentials) => return Ok(credentials),
            Err(ClientError::Backend { status: 401, .. }) => {
                console.say("Wrong email or password.");
            }
            Err(err) => return Err(err).context("logging in to the server"),
        }
    }
    anyhow::bail!("login failed {MAX_PASSWORD_ATTEMPTS} times for {email}")
}

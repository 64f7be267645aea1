//! CLI module for Netkeep
//!
//! Provides the credential lifecycle commands:
//! - `set`: store a new credential
//! - `get`: look a credential up
//! - `replace`: swap (or clear) the credential under a label
//! - `delete`: remove matching credentials

use crate::config::load_config;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use netkeep_core::{CredentialManager, CredentialQuery, SecretBytes, StoreBackend, Url};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::debug;

pub mod delete;
pub mod get;
pub mod replace;
pub mod set;

/// Netkeep CLI
#[derive(Parser, Debug)]
#[command(name = "netkeep")]
#[command(about = "Store network service credentials in the platform secure store")]
#[command(version)]
pub struct Cli {
    /// Store backend (auto, keychain, encrypted_file, memory)
    #[arg(long, global = true)]
    pub backend: Option<StoreBackend>,

    /// Keychain file or encrypted item file
    #[arg(long, global = true)]
    pub store_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a new credential (fails if one already exists)
    Set(set::SetArgs),
    /// Look up a credential
    Get(get::GetArgs),
    /// Replace the credential stored under a label
    Replace(replace::ReplaceArgs),
    /// Delete matching credentials
    Delete(LookupArgs),
}

/// Fields that select credentials
#[derive(Args, Debug, Clone, Default)]
pub struct LookupArgs {
    /// Account name
    #[arg(short, long)]
    pub account: Option<String>,

    /// Service URL (http or https)
    #[arg(short, long)]
    pub url: Option<Url>,

    /// Label
    #[arg(short, long)]
    pub label: Option<String>,
}

impl LookupArgs {
    pub fn to_query(&self) -> CredentialQuery {
        CredentialQuery {
            account: self.account.clone(),
            url: self.url.clone(),
            label: self.label.clone(),
        }
    }
}

/// Run the CLI command
pub fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    let mut config = load_config()?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(path) = cli.store_path {
        config.store_path = Some(path);
    }
    debug!(?config, "Loaded configuration");

    let store = config
        .backend
        .open(config.store_path.clone())
        .context("Failed to open secure store")?;
    let manager = CredentialManager::new(store, config.manager);

    match command {
        Commands::Set(args) => set::run(&manager, args),
        Commands::Get(args) => get::run(&manager, args),
        Commands::Replace(args) => replace::run(&manager, args),
        Commands::Delete(args) => delete::run(&manager, args),
    }
}

/// Password bytes from the command line, or a masked prompt
///
/// Command-line bytes are passed through as-is, so non-UTF-8 input is
/// reported by the store layer.
pub(crate) fn read_password(arg: Option<OsString>) -> Result<SecretBytes> {
    if let Some(arg) = arg {
        return Ok(SecretBytes::new(arg.as_encoded_bytes()));
    }

    let password = inquire::Password::new("Password:")
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .with_validator(inquire::required!())
        .prompt()?;
    Ok(SecretBytes::new(password.into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set() {
        let cli = Cli::try_parse_from([
            "netkeep",
            "--backend",
            "memory",
            "set",
            "--account",
            "u1",
            "--url",
            "https://example.com/api",
            "--label",
            "svc",
            "--password",
            "p1",
        ])
        .unwrap();

        assert_eq!(cli.backend, Some(StoreBackend::Memory));
        let Some(Commands::Set(args)) = cli.command else {
            panic!("expected set");
        };
        assert_eq!(args.account, "u1");
        assert_eq!(args.url.as_str(), "https://example.com/api");
        assert_eq!(args.label.as_deref(), Some("svc"));
        assert_eq!(args.password, Some(OsString::from("p1")));
    }

    #[test]
    fn test_parse_get_lookup_fields() {
        let cli = Cli::try_parse_from(["netkeep", "get", "-l", "svc", "--show-password"]).unwrap();

        let Some(Commands::Get(args)) = cli.command else {
            panic!("expected get");
        };
        assert!(args.show_password);
        assert_eq!(args.lookup.to_query(), CredentialQuery::for_label("svc"));
    }

    #[test]
    fn test_parse_rejects_bad_url() {
        assert!(Cli::try_parse_from(["netkeep", "delete", "--url", "not a url"]).is_err());
    }

    #[test]
    fn test_read_password_from_arg() {
        let password = read_password(Some(OsString::from("p1"))).unwrap();
        assert_eq!(password.expose(), b"p1");
    }
}

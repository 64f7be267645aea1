//! `netkeep replace`

use super::read_password;
use anyhow::{bail, Context, Result};
use clap::Args;
use netkeep_core::{Credential, CredentialError, CredentialManager, Url};
use std::ffi::OsString;

#[derive(Args, Debug)]
pub struct ReplaceArgs {
    /// Label whose credential is replaced
    #[arg(short, long)]
    pub label: String,

    /// New account name (omit together with --url to just clear the label)
    #[arg(short, long, requires = "url")]
    pub account: Option<String>,

    /// New service URL
    #[arg(short, long, requires = "account")]
    pub url: Option<Url>,

    /// New password (prompted when omitted)
    #[arg(short, long, requires = "account")]
    pub password: Option<OsString>,
}

pub fn run(manager: &CredentialManager, args: ReplaceArgs) -> Result<()> {
    let credential = match (args.account, args.url) {
        (Some(account), Some(url)) => {
            let password = read_password(args.password)?;
            let password =
                String::from_utf8(password.expose().to_vec()).map_err(|_| CredentialError::Encoding)?;
            Some(Credential::new(account, password, url)?)
        }
        (None, None) => None,
        _ => bail!("--account and --url must be given together"),
    };

    manager
        .replace_credentials(credential.as_ref(), &args.label)
        .with_context(|| format!("Failed to replace credentials for label {}", args.label))?;

    match credential {
        Some(_) => println!("Replaced credential under label {}", args.label),
        None => println!("Cleared credentials under label {}", args.label),
    }
    Ok(())
}

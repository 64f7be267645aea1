//! `netkeep set`

use super::read_password;
use anyhow::{Context, Result};
use clap::Args;
use netkeep_core::{CredentialManager, Url};
use std::ffi::OsString;
use tracing::info;

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Account name
    #[arg(short, long)]
    pub account: String,

    /// Service URL (http or https)
    #[arg(short, long)]
    pub url: Url,

    /// Label
    #[arg(short, long)]
    pub label: Option<String>,

    /// Password (prompted when omitted)
    #[arg(short, long)]
    pub password: Option<OsString>,
}

pub fn run(manager: &CredentialManager, args: SetArgs) -> Result<()> {
    let password = read_password(args.password)?;

    manager
        .set_credential(password.expose(), &args.account, &args.url, args.label.as_deref())
        .with_context(|| format!("Failed to store credential for {}", args.account))?;

    info!(account = %args.account, url = %args.url, "Credential stored");
    println!("Stored credential for {} at {}", args.account, args.url);
    Ok(())
}

//! `netkeep get`

use super::LookupArgs;
use anyhow::{Context, Result};
use clap::Args;
use netkeep_core::CredentialManager;

#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub lookup: LookupArgs,

    /// Print the password as well
    #[arg(long)]
    pub show_password: bool,
}

pub fn run(manager: &CredentialManager, args: GetArgs) -> Result<()> {
    let credential = manager
        .get_credentials(&args.lookup.to_query())
        .context("Failed to retrieve credential")?;

    println!("username: {}", credential.username());
    println!("url:      {}", credential.url());
    if args.show_password {
        println!("password: {}", credential.password().expose());
    }
    Ok(())
}

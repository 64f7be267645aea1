//! `netkeep delete`

use super::LookupArgs;
use anyhow::{bail, Context, Result};
use netkeep_core::CredentialManager;

pub fn run(manager: &CredentialManager, args: LookupArgs) -> Result<()> {
    // An empty query would match every credential
    if args.account.is_none() && args.url.is_none() && args.label.is_none() {
        bail!("Refusing to delete without --account, --url or --label");
    }

    manager
        .delete_credentials(&args.to_query())
        .context("Failed to delete credentials")?;

    println!("Deleted matching credentials");
    Ok(())
}

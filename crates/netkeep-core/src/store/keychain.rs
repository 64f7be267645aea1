//! macOS Keychain store driven through the `security` tool
//!
//! Items are internet passwords. Access groups cannot be expressed through
//! the tool and fail with [`StoreStatus::UNIMPLEMENTED`]; the accessibility
//! attribute is ignored. On other platforms every verb is unimplemented.

use super::{SecureStore, StoreStatus};
use crate::attributes::{flag, AttrKey, AttrValue, AttributeMap, ItemClass};
use crate::secure_string::SecretBytes;
use std::path::PathBuf;
use std::process::Output;
use tracing::{debug, warn};

// Attribute tag the tool prints for the item label
const LABEL_TAG: &str = "0x00000007";

// Upper bound on delete rounds when several items match
const MAX_DELETE_ROUNDS: usize = 256;

/// Secure store backed by a macOS keychain
#[derive(Debug, Clone, Default)]
pub struct KeychainStore {
    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    keychain: Option<PathBuf>,
}

impl KeychainStore {
    /// Use the default keychain search list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific keychain file
    #[must_use]
    pub fn with_keychain(path: impl Into<PathBuf>) -> Self {
        Self {
            keychain: Some(path.into()),
        }
    }

    #[cfg(target_os = "macos")]
    fn run(&self, mut args: Vec<String>) -> Result<Output, StoreStatus> {
        use std::process::Command;

        if let Some(keychain) = &self.keychain {
            args.push(keychain.display().to_string());
        }

        Command::new("security").args(&args).output().map_err(|e| {
            warn!(error = %e, "Failed to run security");
            StoreStatus::IO
        })
    }

    #[cfg(not(target_os = "macos"))]
    fn run(&self, _args: Vec<String>) -> Result<Output, StoreStatus> {
        Err(StoreStatus::UNIMPLEMENTED)
    }
}

impl SecureStore for KeychainStore {
    fn add(&self, attributes: &AttributeMap) -> Result<(), StoreStatus> {
        if attributes.contains_key(&AttrKey::Accessible) {
            debug!("Keychain tool cannot set accessibility; using keychain default");
        }

        let mut args = command("add-internet-password", attributes)?;
        if let Some(value) = attributes.get(&AttrKey::ValueData).and_then(AttrValue::as_data) {
            let password = value.to_secure_string().ok_or(StoreStatus::PARAM)?;
            args.push("-w".to_string());
            args.push(password.expose().to_string());
        }

        check(&self.run(args)?)
    }

    fn copy_matching(&self, query: &AttributeMap) -> Result<AttributeMap, StoreStatus> {
        let mut args = command("find-internet-password", query)?;
        args.push("-g".to_string());

        let output = self.run(args)?;
        check(&output)?;

        let mut item = parse_find_output(
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        );

        let want_data = flag(query, AttrKey::ReturnData);
        let want_attributes = flag(query, AttrKey::ReturnAttributes);
        item.retain(|key, _| match key {
            AttrKey::ValueData => want_data,
            _ => want_attributes,
        });
        Ok(item)
    }

    fn delete(&self, query: &AttributeMap) -> Result<(), StoreStatus> {
        let args = command("delete-internet-password", query)?;
        delete_rounds(|| check(&self.run(args.clone())?))
    }
}

/// Repeat a single-item delete until nothing matches
///
/// The tool removes one item per call. Running out of rounds while items
/// still match is an I/O failure.
fn delete_rounds(
    mut delete_one: impl FnMut() -> Result<(), StoreStatus>,
) -> Result<(), StoreStatus> {
    for round in 0..MAX_DELETE_ROUNDS {
        match delete_one() {
            Ok(()) => continue,
            Err(StoreStatus::ITEM_NOT_FOUND) if round > 0 => return Ok(()),
            Err(status) => return Err(status),
        }
    }

    warn!(rounds = MAX_DELETE_ROUNDS, "Keychain delete did not converge");
    Err(StoreStatus::IO)
}

/// Subcommand plus the selection flags for `query`
fn command(subcommand: &str, query: &AttributeMap) -> Result<Vec<String>, StoreStatus> {
    if query.contains_key(&AttrKey::AccessGroup) {
        return Err(StoreStatus::UNIMPLEMENTED);
    }

    let mut args = vec![subcommand.to_string()];
    for (key, value) in query {
        let option = match key {
            AttrKey::Account => "-a",
            AttrKey::Server => "-s",
            AttrKey::Protocol => "-r",
            AttrKey::Port => "-P",
            AttrKey::Path => "-p",
            AttrKey::Label => "-l",
            _ => continue,
        };
        let value = match value {
            AttrValue::Text(s) => s.clone(),
            AttrValue::Number(n) => n.to_string(),
            _ => return Err(StoreStatus::PARAM),
        };
        args.push(option.to_string());
        args.push(value);
    }
    Ok(args)
}

fn check(output: &Output) -> Result<(), StoreStatus> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(status_from_stderr(&stderr, output.status.code()))
}

fn status_from_stderr(stderr: &str, exit_code: Option<i32>) -> StoreStatus {
    if stderr.contains("could not be found") {
        StoreStatus::ITEM_NOT_FOUND
    } else if stderr.contains("already exists") {
        StoreStatus::DUPLICATE_ITEM
    } else {
        warn!(stderr = %stderr.trim(), "Keychain error");
        exit_code.map_or(StoreStatus::IO, StoreStatus)
    }
}

/// Rebuild an attribute map from `find-internet-password -g` output
///
/// Attributes are printed on stdout; the password goes to stderr.
fn parse_find_output(stdout: &str, stderr: &str) -> AttributeMap {
    let mut item = AttributeMap::new();
    item.insert(
        AttrKey::Class,
        AttrValue::Text(ItemClass::InternetPassword.code().to_string()),
    );

    for line in stdout.lines().map(str::trim) {
        let Some((tag, raw)) = split_attribute(line) else {
            continue;
        };
        let key = match tag {
            LABEL_TAG => AttrKey::Label,
            "acct" => AttrKey::Account,
            "srvr" => AttrKey::Server,
            "path" => AttrKey::Path,
            "ptcl" => AttrKey::Protocol,
            "port" => AttrKey::Port,
            _ => continue,
        };

        let value = if key == AttrKey::Port {
            parse_hex_number(raw)
                .filter(|port| *port != 0)
                .map(AttrValue::Number)
        } else {
            parse_text(raw).map(AttrValue::Text)
        };
        if let Some(value) = value {
            item.insert(key, value);
        }
    }

    let password = stderr
        .lines()
        .find_map(|line| line.trim().strip_prefix("password:"))
        .and_then(|raw| parse_bytes(raw.trim()));
    if let Some(bytes) = password {
        item.insert(AttrKey::ValueData, AttrValue::Data(SecretBytes::new(bytes)));
    }

    item
}

/// Split `"acct"<blob>="u1"` or `0x00000007 <blob>="svc"` into tag and value
fn split_attribute(line: &str) -> Option<(&str, &str)> {
    let (head, raw) = line.split_once('=')?;
    let tag = head.split('<').next()?.trim().trim_matches('"');
    Some((tag, raw.trim()))
}

fn parse_text(raw: &str) -> Option<String> {
    parse_bytes(raw).and_then(|bytes| String::from_utf8(bytes).ok())
}

/// Value forms: `<NULL>`, `"text"`, or `0xHEX  "text"`
fn parse_bytes(raw: &str) -> Option<Vec<u8>> {
    if raw == "<NULL>" {
        return None;
    }
    if let Some(hex) = raw.strip_prefix("0x") {
        let hex = hex.split_whitespace().next().unwrap_or_default();
        return decode_hex(hex);
    }
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .map(|s| s.as_bytes().to_vec())
}

fn parse_hex_number(raw: &str) -> Option<u32> {
    let hex = raw.strip_prefix("0x")?.split_whitespace().next()?;
    u32::from_str_radix(hex, 16).ok()
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect()
}

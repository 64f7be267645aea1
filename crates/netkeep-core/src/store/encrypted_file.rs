//! Encrypted file store using AES-256-GCM
//!
//! The whole item table is serialized to JSON, encrypted with a fresh random
//! nonce, and written base64-encoded. Each verb runs under an advisory lock on
//! a sibling `.lock` file, shared for reads and exclusive for
//! read-modify-write, so separate processes on one path do not lose updates.
//! Writes go to a temp file that is renamed over the target.

use super::table::ItemTable;
use super::{SecureStore, StoreStatus};
use crate::attributes::AttributeMap;
use crate::error::{CredentialError, Result};
use crate::secure_string::SecureString;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};
use fd_lock::RwLock;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Environment variable holding the master key
pub const ENV_MASTER_KEY: &str = "NETKEEP_MASTER_KEY";

const NONCE_LEN: usize = 12;
const KEY_SALT: &[u8] = b"netkeep-item-table-v1";

/// Secure store persisted in a single encrypted file
pub struct EncryptedFileStore {
    path: PathBuf,
    key: Zeroizing<[u8; 32]>,
}

impl EncryptedFileStore {
    /// Open a store at `path` encrypted under `master_key`
    ///
    /// The file is created on the first successful write.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>, master_key: &SecureString) -> Self {
        Self {
            path: path.into(),
            key: derive_key(master_key.expose()),
        }
    }

    /// Open a store keyed from `NETKEEP_MASTER_KEY`, or from machine identity
    /// when the variable is unset
    ///
    /// `path` defaults to [`EncryptedFileStore::default_path`].
    pub fn from_env(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };

        let master_key = std::env::var(ENV_MASTER_KEY)
            .map(SecureString::new)
            .unwrap_or_else(|_| {
                warn!("{} not set, deriving key from machine identity", ENV_MASTER_KEY);
                machine_master_key()
            });

        Ok(Self::open(path, &master_key))
    }

    /// Default location: `<data dir>/.netkeep/items.enc`
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().or_else(dirs::home_dir).ok_or_else(|| {
            CredentialError::Configuration("Cannot determine data directory".to_string())
        })?;

        Ok(data_dir.join(".netkeep").join("items.enc"))
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encrypt(&self, plaintext: &[u8]) -> std::result::Result<Vec<u8>, StoreStatus> {
        let cipher = Aes256Gcm::new_from_slice(self.key.as_slice()).map_err(|e| {
            warn!(error = %e, "Failed to create cipher");
            StoreStatus::PARAM
        })?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher.encrypt(nonce, plaintext).map_err(|e| {
            warn!(error = %e, "Encryption failed");
            StoreStatus::PARAM
        })?;

        let mut result = nonce_bytes.to_vec();
        result.extend(ciphertext);
        Ok(result)
    }

    fn decrypt(&self, encrypted: &[u8]) -> std::result::Result<Zeroizing<Vec<u8>>, StoreStatus> {
        if encrypted.len() < NONCE_LEN {
            warn!(path = %self.path.display(), "Encrypted item file is truncated");
            return Err(StoreStatus::DECODE);
        }

        let cipher = Aes256Gcm::new_from_slice(self.key.as_slice()).map_err(|e| {
            warn!(error = %e, "Failed to create cipher");
            StoreStatus::PARAM
        })?;

        let (nonce_bytes, ciphertext) = encrypted.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        // AEAD failure means the key is wrong or the file was tampered with
        cipher
            .decrypt(nonce, ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| {
                warn!(path = %self.path.display(), "Failed to decrypt item file");
                StoreStatus::AUTH_FAILED
            })
    }

    fn load(&self) -> std::result::Result<ItemTable, StoreStatus> {
        if !self.path.exists() {
            return Ok(ItemTable::default());
        }

        let encoded = fs::read_to_string(&self.path).map_err(|e| {
            warn!(error = %e, path = %self.path.display(), "Failed to read item file");
            StoreStatus::IO
        })?;

        let encrypted = BASE64.decode(encoded.trim()).map_err(|e| {
            warn!(error = %e, "Failed to decode item file");
            StoreStatus::DECODE
        })?;

        let plaintext = self.decrypt(&encrypted)?;

        let table: ItemTable = serde_json::from_slice(&plaintext).map_err(|e| {
            warn!(error = %e, "Failed to parse item file");
            StoreStatus::DECODE
        })?;

        debug!(count = table.len(), "Loaded items from encrypted file");
        Ok(table)
    }

    /// Sibling of the item file with `suffix` appended to its name
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("items"));
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn ensure_parent(&self) -> std::result::Result<(), StoreStatus> {
        let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        fs::create_dir_all(parent).map_err(|e| {
            warn!(error = %e, "Failed to create item directory");
            StoreStatus::IO
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o700);
            let _ = fs::set_permissions(parent, perms);
        }
        Ok(())
    }

    fn lock_file(&self) -> std::result::Result<RwLock<File>, StoreStatus> {
        self.ensure_parent()?;

        let lock_path = self.sibling(".lock");
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| {
                warn!(error = %e, path = %lock_path.display(), "Failed to open lock file");
                StoreStatus::IO
            })?;
        Ok(RwLock::new(file))
    }

    fn save(&self, table: &ItemTable) -> std::result::Result<(), StoreStatus> {
        let json = Zeroizing::new(serde_json::to_vec(table).map_err(|e| {
            warn!(error = %e, "Failed to serialize items");
            StoreStatus::PARAM
        })?);

        let encrypted = self.encrypt(&json)?;

        // Write atomically using temp file
        let temp_path = self.sibling(".tmp");
        fs::write(&temp_path, BASE64.encode(&encrypted)).map_err(|e| {
            warn!(error = %e, path = %temp_path.display(), "Failed to write item file");
            StoreStatus::IO
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&temp_path, perms);
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            warn!(error = %e, path = %self.path.display(), "Failed to replace item file");
            let _ = fs::remove_file(&temp_path);
            StoreStatus::IO
        })?;

        debug!(path = %self.path.display(), count = table.len(), "Saved items to encrypted file");
        Ok(())
    }

    /// Apply `op` to the current table and persist only if it succeeds
    fn modify<T>(
        &self,
        op: impl FnOnce(&mut ItemTable) -> std::result::Result<T, StoreStatus>,
    ) -> std::result::Result<T, StoreStatus> {
        let mut lock = self.lock_file()?;
        let _guard = lock.write().map_err(lock_failed)?;

        let mut table = self.load()?;
        let out = op(&mut table)?;
        self.save(&table)?;
        Ok(out)
    }
}

impl std::fmt::Debug for EncryptedFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedFileStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SecureStore for EncryptedFileStore {
    fn add(&self, attributes: &AttributeMap) -> std::result::Result<(), StoreStatus> {
        self.modify(|table| table.add(attributes))
    }

    fn copy_matching(&self, query: &AttributeMap) -> std::result::Result<AttributeMap, StoreStatus> {
        let lock = self.lock_file()?;
        let _guard = lock.read().map_err(lock_failed)?;

        self.load()?.copy_matching(query)
    }

    fn delete(&self, query: &AttributeMap) -> std::result::Result<(), StoreStatus> {
        self.modify(|table| table.delete(query))
    }
}

fn lock_failed(e: std::io::Error) -> StoreStatus {
    warn!(error = %e, "Failed to lock item file");
    StoreStatus::IO
}

/// SHA-256 over the master key and a fixed salt
fn derive_key(master_key: &str) -> Zeroizing<[u8; 32]> {
    let mut hasher = Sha256::new();
    hasher.update(master_key.as_bytes());
    hasher.update(KEY_SALT);

    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&hasher.finalize());
    key
}

fn machine_master_key() -> SecureString {
    let hostname = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "netkeep-default".to_string());
    let username = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "netkeep-user".to_string());
    SecureString::new(format!("netkeep-auto-key-{}-{}", hostname, username))
}

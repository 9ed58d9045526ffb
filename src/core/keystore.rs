//! Durable device credentials: the device id, the enrolled biometric token,
//! and the last signed-in user. Lives at `~/.kobo/keystore.json`.
//!
//! This is the only file that survives logout with content: the device id is
//! minted once per install and never rotates. Session tokens are never
//! written here; they live only in process memory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Keystore {
    pub device_id: String,
    #[serde(default)]
    pub biometric_token: Option<String>,
    #[serde(default)]
    pub last_user_id: Option<i64>,
}

impl Keystore {
    fn with_new_device_id() -> Self {
        Self {
            device_id: Uuid::new_v4().to_string(),
            biometric_token: None,
            last_user_id: None,
        }
    }

    /// Records who signed in, for the next biometric login.
    pub fn remember_user(&mut self, user_id: i64) {
        self.last_user_id = Some(user_id);
    }

    pub fn set_biometric_token(&mut self, token: impl Into<String>) {
        self.biometric_token = Some(token.into());
    }

    /// Logout wipes credentials but keeps the device identity.
    pub fn clear_credentials(&mut self) {
        self.biometric_token = None;
        self.last_user_id = None;
    }

    pub fn can_login_biometric(&self) -> bool {
        self.biometric_token.is_some() && self.last_user_id.is_some()
    }
}

/// Returns `~/.kobo`, creating it on first use.
pub fn kobo_dir() -> io::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "home directory not found"))?;
    let dir = home.join(".kobo");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn keystore_path() -> io::Result<PathBuf> {
    Ok(kobo_dir()?.join("keystore.json"))
}

/// Loads the keystore, minting a fresh device id (and writing the file)
/// when none exists yet.
pub fn load_or_init() -> io::Result<Keystore> {
    let path = keystore_path()?;
    load_from(&path)
}

pub fn save(keystore: &Keystore) -> io::Result<()> {
    let path = keystore_path()?;
    write_to(&path, keystore)
}

fn load_from(path: &Path) -> io::Result<Keystore> {
    if !path.exists() {
        let keystore = Keystore::with_new_device_id();
        info!("minted device id {}", keystore.device_id);
        write_to(path, &keystore)?;
        return Ok(keystore);
    }
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Write-then-rename so a crash mid-write never truncates the keystore.
fn write_to(path: &Path, keystore: &Keystore) -> io::Result<()> {
    let json = serde_json::to_string_pretty(keystore)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    debug!("keystore saved to {}", path.display());
    Ok(())
}

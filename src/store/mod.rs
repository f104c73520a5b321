//! Persisted remote configuration.
//!
//! # Data Flow
//! ```text
//! env.sh on disk
//!     → envfile.rs (line grammar → key/value map)
//!     → ordered host-key lookup + legacy label split
//!     → ConfigSnapshot {host, label, ssh_key_configured}
//!
//! On save:
//!     validated host/label
//!     → whole-file rewrite of env.sh (0600, fixed header/trailer)
//!     → optional SSH key write or clear (0700 dir, 0600 file)
//! ```
//!
//! # Design Decisions
//! - Loads never fail: an unreadable or absent file is an empty
//!   snapshot, so the page always renders
//! - Saves replace the whole file; manual edits below the trailer
//!   comment do not survive a save (known limitation, kept for
//!   compatibility with existing deployments)
//! - No locking. Concurrent saves are last-write-wins, acceptable for
//!   a single-operator tool

pub mod envfile;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::paths::{create_dir_mode, write_file_mode, StoragePaths};
use crate::endpoint::split_label;

/// Host keys in lookup order; the first non-empty value wins.
/// `DOCKER_HOST` is the legacy spelling older deployments still carry.
const HOST_KEYS: [&str; 2] = ["DOZZLE_REMOTE_HOST", "DOCKER_HOST"];
const LABEL_KEY: &str = "DOZZLE_REMOTE_LABEL";

const ENV_HEADER: &str = "# Autogenerated by Remote Log Proxy config";
const ENV_TRAILER: &str = "# You can add other variables here";

/// Errors that can occur while persisting configuration.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage directory could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    /// File write failed.
    #[error("failed to write {path}: {source}")]
    WriteFile { path: PathBuf, source: io::Error },

    /// File removal failed for a reason other than absence.
    #[error("failed to remove {path}: {source}")]
    RemoveFile { path: PathBuf, source: io::Error },
}

/// The persisted state, already split into its logical parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    /// Raw host descriptor, e.g. `tcp://10.0.0.5:2375`. Empty when
    /// unconfigured.
    pub host: String,
    /// Display label; empty means "use the host as display name".
    pub label: String,
    /// Whether a usable private key file is on disk.
    pub ssh_key_configured: bool,
}

/// Reads and rewrites the persisted environment file and the optional
/// SSH key file under the configured data directory.
pub struct ConfigStore {
    paths: StoragePaths,
}

impl ConfigStore {
    pub fn new(paths: StoragePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Load the current snapshot. Never fails: a missing or unreadable
    /// file yields an all-empty snapshot.
    pub fn load(&self) -> ConfigSnapshot {
        let mut snapshot = ConfigSnapshot::default();

        if let Ok(content) = fs::read_to_string(self.paths.env_file()) {
            let vars = envfile::parse(&content);
            for key in HOST_KEYS {
                if let Some(value) = vars.get(key) {
                    if !value.is_empty() {
                        snapshot.host = value.clone();
                        break;
                    }
                }
            }
            if let Some(label) = vars.get(LABEL_KEY) {
                snapshot.label = label.clone();
            }
        }

        // Legacy combined form: label embedded in the host value.
        if snapshot.label.is_empty() && snapshot.host.contains('|') {
            let (host, label) = split_label(&snapshot.host);
            snapshot.host = host;
            snapshot.label = label;
        }

        snapshot.ssh_key_configured = file_has_content(self.paths.ssh_key());
        snapshot
    }

    /// Rewrite the environment file with the given host and label.
    /// Empty values drop their line entirely rather than writing an
    /// empty assignment.
    pub fn save(&self, host: &str, label: &str) -> Result<(), StoreError> {
        create_dir_mode(self.paths.data_dir(), 0o755).map_err(|source| {
            StoreError::CreateDir {
                path: self.paths.data_dir().to_path_buf(),
                source,
            }
        })?;

        let mut content = String::new();
        content.push_str(ENV_HEADER);
        content.push('\n');
        if !host.is_empty() {
            content.push_str("export DOZZLE_REMOTE_HOST=\"");
            content.push_str(&envfile::escape(host));
            content.push_str("\"\n");
        }
        if !label.is_empty() {
            content.push_str("export DOZZLE_REMOTE_LABEL=\"");
            content.push_str(&envfile::escape(label));
            content.push_str("\"\n");
        }
        content.push_str(ENV_TRAILER);
        content.push('\n');

        write_file_mode(self.paths.env_file(), &content, 0o600).map_err(|source| {
            StoreError::WriteFile {
                path: self.paths.env_file().to_path_buf(),
                source,
            }
        })
    }

    /// Write or clear the SSH private key file.
    ///
    /// With no key text and no clear request this is a strict no-op:
    /// an existing key is left byte-for-byte untouched. A clear
    /// request wins over supplied key text. Clearing a key that does
    /// not exist is fine.
    pub fn save_key(&self, raw_key: &str, clear: bool) -> Result<(), StoreError> {
        let key = normalize_key_text(raw_key);
        if !clear && key.is_empty() {
            return Ok(());
        }

        create_dir_mode(self.paths.ssh_dir(), 0o700).map_err(|source| {
            StoreError::CreateDir {
                path: self.paths.ssh_dir().to_path_buf(),
                source,
            }
        })?;

        if clear {
            remove_if_present(self.paths.ssh_key())?;
        } else {
            let mut content = key;
            content.push('\n');
            write_file_mode(self.paths.ssh_key(), &content, 0o600).map_err(|source| {
                StoreError::WriteFile {
                    path: self.paths.ssh_key().to_path_buf(),
                    source,
                }
            })?;
        }

        // This tool never generates an SSH client config, so the
        // companion file must not linger next to the key either way.
        remove_if_present(self.paths.ssh_config())
    }
}

/// True iff the path is a regular file with nonzero size.
fn file_has_content(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.len() > 0,
        Err(_) => false,
    }
}

/// CRLF to LF, then trim surrounding whitespace. Key material pasted
/// from Windows terminals arrives with CRLF line endings.
fn normalize_key_text(raw: &str) -> String {
    raw.replace("\r\n", "\n").trim().to_string()
}

fn remove_if_present(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StoreError::RemoveFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}

//! Storage locations for operator-managed state.
//!
//! Everything durable lives under one data directory (`/app/data` in the
//! shipped container): the env-style file the viewer backend reads, the
//! optional SSH key material, and the reload marker. Derived paths hang off
//! the configured base so components receive one injected value instead of
//! reaching for module-level constants.

use std::fs::{DirBuilder, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::{Path, PathBuf};

// File names beneath the data directory. Fixed: the external supervisor and
// the viewer backend look these up by name.
const ENV_FILE: &str = "env.sh";
const SSH_DIR: &str = ".ssh";
const SSH_KEY_FILE: &str = "id_rsa";
const SSH_CONFIG_FILE: &str = "config";
const RELOAD_MARKER: &str = "reload";

/// Resolved storage paths, derived once from the configured data directory
/// and injected into the store and reload signal at construction.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    data_dir: PathBuf,
    env_file: PathBuf,
    ssh_dir: PathBuf,
    ssh_key: PathBuf,
    ssh_config: PathBuf,
    reload_marker: PathBuf,
}

impl StoragePaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let ssh_dir = data_dir.join(SSH_DIR);
        Self {
            env_file: data_dir.join(ENV_FILE),
            ssh_key: ssh_dir.join(SSH_KEY_FILE),
            ssh_config: ssh_dir.join(SSH_CONFIG_FILE),
            reload_marker: data_dir.join(RELOAD_MARKER),
            ssh_dir,
            data_dir,
        }
    }

    /// Base directory holding all durable state.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Env-style file the viewer backend sources.
    pub fn env_file(&self) -> &Path {
        &self.env_file
    }

    /// Directory holding SSH key material (owner-only).
    pub fn ssh_dir(&self) -> &Path {
        &self.ssh_dir
    }

    /// Private key used for `ssh://` endpoints.
    pub fn ssh_key(&self) -> &Path {
        &self.ssh_key
    }

    /// Companion SSH client config. Never generated here; kept absent.
    pub fn ssh_config(&self) -> &Path {
        &self.ssh_config
    }

    /// Marker file whose existence/mtime asks the external supervisor to
    /// re-read configuration and reconnect.
    pub fn reload_marker(&self) -> &Path {
        &self.reload_marker
    }
}

/// Create a directory (and parents) with the given unix mode. Directories
/// that already exist keep their permissions.
pub(crate) fn create_dir_mode(dir: &Path, mode: u32) -> io::Result<()> {
    DirBuilder::new().recursive(true).mode(mode).create(dir)
}

/// Overwrite a file, applying the given unix mode when the file is created.
/// An existing file keeps its permissions.
pub(crate) fn write_file_mode(path: &Path, contents: &str, mode: u32) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)?;
    file.write_all(contents.as_bytes())
}

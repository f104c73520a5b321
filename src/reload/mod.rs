//! Apply signal for the external supervisor.
//!
//! Saving configuration does not reconnect anything by itself. An external
//! watcher polls a marker file under the data directory and re-establishes
//! the viewer backend's Docker connection (or SSH tunnel) when it changes.
//! This module owns only the write side of that contract: touch the marker,
//! never wait for an acknowledgment.

use std::io;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use thiserror::Error;

use crate::config::paths::{create_dir_mode, write_file_mode, StoragePaths};
use crate::observability::metrics;

/// Errors writing the reload marker.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    WriteMarker { path: PathBuf, source: io::Error },
}

/// Writes the reload marker consumed by the external supervisor.
pub struct ReloadSignal {
    paths: StoragePaths,
}

impl ReloadSignal {
    pub fn new(paths: StoragePaths) -> Self {
        Self { paths }
    }

    /// Request a reload. Overwrites the marker with the current timestamp;
    /// the supervisor keys off existence/mtime, the content is for humans
    /// reading the data directory. Fire-and-forget, idempotent.
    pub fn request(&self) -> Result<(), SignalError> {
        create_dir_mode(self.paths.data_dir(), 0o755).map_err(|source| {
            SignalError::CreateDir {
                path: self.paths.data_dir().to_path_buf(),
                source,
            }
        })?;

        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        write_file_mode(self.paths.reload_marker(), &stamp, 0o600).map_err(|source| {
            SignalError::WriteMarker {
                path: self.paths.reload_marker().to_path_buf(),
                source,
            }
        })?;

        metrics::record_reload_request();
        tracing::info!(
            marker = %self.paths.reload_marker().display(),
            requested_at = %stamp,
            "Reload requested"
        );
        Ok(())
    }
}

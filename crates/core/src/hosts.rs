// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tagged line management for the system hosts file
//!
//! Lines written by reflex carry [`MANAGED_TAG`] so they can be removed
//! again without touching user-authored entries. Matching is substring
//! based on both the tag and the hostname.

use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Trailing marker identifying lines managed by reflex
pub const MANAGED_TAG: &str = "# reflex-managed";

const BACKUP_INFIX: &str = ".reflex.";
const BACKUP_SUFFIX: &str = ".bak";

/// Errors from hosts file operations
#[derive(Debug, Error)]
pub enum HostsError {
    #[error("hosts entry already present")]
    AlreadyPresent,

    #[error("invalid hosts entry: {0}")]
    InvalidInput(&'static str),

    #[error("hosts file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// How many backups of the hosts file to retain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackupPolicy {
    /// Write no backups
    Disabled,
    /// Keep every backup ever written
    #[default]
    KeepAll,
    /// Keep only the newest `n` backups
    KeepLatest(usize),
}

/// A hosts file with reflex-managed entries
#[derive(Debug, Clone)]
pub struct HostsFile {
    path: PathBuf,
    backups: BackupPolicy,
}

impl HostsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backups: BackupPolicy::default(),
        }
    }

    pub fn with_backups(mut self, policy: BackupPolicy) -> Self {
        self.backups = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The exact line written for a mapping
    pub fn managed_line(address: &str, hostname: &str) -> String {
        format!("{} {} {}", address, hostname, MANAGED_TAG)
    }

    /// Append a managed entry mapping `hostname` to `address`.
    ///
    /// Returns [`HostsError::AlreadyPresent`] if the identical managed line
    /// already exists; the file is left untouched in that case.
    pub fn add(&self, address: &str, hostname: &str) -> Result<(), HostsError> {
        if address.is_empty() || hostname.is_empty() {
            return Err(HostsError::InvalidInput("address and hostname required"));
        }

        let original = self.read()?;
        let line = Self::managed_line(address, hostname);
        if original.contains(&line) {
            return Err(HostsError::AlreadyPresent);
        }

        self.write_backup(&original);

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        // Leading newline guards against a file without a trailing one
        file.write_all(format!("\n{}\n", line).as_bytes())
            .map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), hostname, address, "hosts entry added");
        Ok(())
    }

    /// Drop every managed line mentioning `hostname`. Returns the number
    /// of lines removed; zero leaves the file untouched.
    pub fn remove(&self, hostname: &str) -> Result<usize, HostsError> {
        if hostname.is_empty() {
            return Err(HostsError::InvalidInput("hostname required"));
        }
        let removed = self.rewrite(|line| line.contains(MANAGED_TAG) && line.contains(hostname))?;
        debug!(path = %self.path.display(), hostname, removed, "hosts entries removed");
        Ok(removed)
    }

    /// Drop every managed line regardless of hostname
    pub fn remove_all_tagged(&self) -> Result<usize, HostsError> {
        let removed = self.rewrite(|line| line.contains(MANAGED_TAG))?;
        debug!(path = %self.path.display(), removed, "all managed hosts entries removed");
        Ok(removed)
    }

    /// First managed line mentioning `hostname`, verbatim
    pub fn contains(&self, hostname: &str) -> Result<Option<String>, HostsError> {
        let content = self.read()?;
        Ok(content
            .split('\n')
            .find(|line| line.contains(MANAGED_TAG) && line.contains(hostname))
            .map(str::to_string))
    }

    /// Backups of this file currently on disk, oldest first
    pub fn backups(&self) -> Result<Vec<PathBuf>, HostsError> {
        let Some(file_name) = self.path.file_name().and_then(|n| n.to_str()) else {
            return Ok(Vec::new());
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let prefix = format!("{}{}", file_name, BACKUP_INFIX);

        let entries = fs::read_dir(dir).map_err(|e| self.io_error(e))?;
        let mut backups: Vec<PathBuf> = entries
            .flatten()
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(BACKUP_SUFFIX))
            })
            .map(|entry| entry.path())
            .collect();
        // Timestamps are zero-padded, so lexical order is chronological
        backups.sort();
        Ok(backups)
    }

    fn backup_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        let mut name = self.path.clone().into_os_string();
        name.push(format!("{}{}{}", BACKUP_INFIX, stamp, BACKUP_SUFFIX));
        PathBuf::from(name)
    }

    fn write_backup(&self, original: &str) {
        let keep = match self.backups {
            BackupPolicy::Disabled => return,
            BackupPolicy::KeepAll => None,
            BackupPolicy::KeepLatest(n) => Some(n),
        };

        let backup = self.backup_path();
        if let Err(e) = fs::write(&backup, original) {
            warn!(path = %backup.display(), error = %e, "failed to write hosts backup");
            return;
        }
        debug!(path = %backup.display(), "hosts backup written");

        if let Some(keep) = keep {
            self.prune_backups(keep);
        }
    }

    fn prune_backups(&self, keep: usize) {
        let backups = match self.backups() {
            Ok(backups) => backups,
            Err(e) => {
                warn!(error = %e, "failed to list hosts backups");
                return;
            }
        };
        let excess = backups.len().saturating_sub(keep);
        for old in &backups[..excess] {
            if let Err(e) = fs::remove_file(old) {
                warn!(path = %old.display(), error = %e, "failed to prune hosts backup");
            }
        }
    }

    /// Rewrite the file without the lines matching `drop_line`.
    ///
    /// The rewritten file always ends in exactly one newline.
    fn rewrite(&self, drop_line: impl Fn(&str) -> bool) -> Result<usize, HostsError> {
        let content = self.read()?;

        let mut removed = 0;
        let mut kept = Vec::new();
        for line in content.split('\n') {
            if drop_line(line) {
                removed += 1;
            } else {
                kept.push(line);
            }
        }
        if removed == 0 {
            return Ok(0);
        }

        let mut output = kept.join("\n").trim_end_matches('\n').to_string();
        output.push('\n');
        // Written in place: the hosts file may be a bind mount that
        // cannot be replaced by rename
        fs::write(&self.path, output).map_err(|e| self.io_error(e))?;
        Ok(removed)
    }

    fn read(&self) -> Result<String, HostsError> {
        fs::read_to_string(&self.path).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: io::Error) -> HostsError {
        HostsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "hosts_tests.rs"]
mod tests;

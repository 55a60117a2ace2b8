// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-process session lock backed by an exclusively created file
//!
//! The lock file body records the owning PID and creation time. A lock
//! left behind by a crashed or killed session is reclaimed by the next
//! acquirer once it is judged stale (see [`is_stale`]).

use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tracing::{debug, warn};

/// A lock younger than this is never reclaimed on body contents alone,
/// since its owner may still be writing the body.
pub const CREATION_GRACE: Duration = Duration::from_secs(5);

/// Age at which a lock is stale when the owner cannot be probed
pub const UNPROBED_STALE_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Appended to the lock path to name the reclaim sentinel
pub const RECLAIM_SUFFIX: &str = ".reclaim";

/// Errors from lock operations
#[derive(Debug, Error)]
pub enum LockError {
    #[error("another reflex instance appears to be running ({})", path.display())]
    AlreadyLocked { path: PathBuf },

    #[error("no lock present at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("lock file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of probing whether a process is alive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Gone,
    /// The platform cannot probe process identifiers
    Unsupported,
}

/// Probes whether a process identifier refers to a live process
pub trait ProcessProbe {
    fn probe(&self, pid: u32) -> Liveness;
}

/// Probe backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl ProcessProbe for SystemProbe {
    #[cfg(unix)]
    fn probe(&self, pid: u32) -> Liveness {
        use nix::errno::Errno;
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        let Ok(raw) = i32::try_from(pid) else {
            return Liveness::Gone;
        };
        // Signal 0 performs the permission and existence checks only
        match kill(Pid::from_raw(raw), None) {
            Ok(()) => Liveness::Alive,
            // Exists, but owned by another user
            Err(Errno::EPERM) => Liveness::Alive,
            Err(_) => Liveness::Gone,
        }
    }

    #[cfg(not(unix))]
    fn probe(&self, _pid: u32) -> Liveness {
        Liveness::Unsupported
    }
}

/// Owner metadata persisted in the lock file body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockInfo {
    pub pid: u32,
    pub started: DateTime<Utc>,
}

impl LockInfo {
    /// Metadata for the current process
    pub fn current() -> Self {
        Self {
            pid: std::process::id(),
            started: Utc::now(),
        }
    }

    /// Render the lock file body
    pub fn render(&self) -> String {
        format!("pid={}\nstarted={}\n", self.pid, self.started.to_rfc3339())
    }
}

/// Parse the owner PID from a lock file body.
///
/// Only the first `pid=` line is considered. Zero and unparseable
/// values yield `None`.
pub fn parse_owner_pid(body: &str) -> Option<u32> {
    let value = body.lines().find_map(|line| line.strip_prefix("pid="))?;
    match value.trim().parse::<u32>() {
        Ok(pid) if pid > 0 => Some(pid),
        _ => None,
    }
}

/// Decide whether an existing lock no longer reflects a live session.
///
/// The age grace is checked before the PID probe so that a racing
/// acquirer cannot reclaim a lock whose owner has not yet written its body.
pub fn is_stale(body: &str, age: Duration, probe: &impl ProcessProbe) -> bool {
    if body.is_empty() {
        return age > CREATION_GRACE;
    }
    let Some(pid) = parse_owner_pid(body) else {
        return age > CREATION_GRACE;
    };
    match probe.probe(pid) {
        Liveness::Alive => false,
        Liveness::Gone => true,
        Liveness::Unsupported => age > UNPROBED_STALE_AGE,
    }
}

/// Acquires and inspects the file-backed session lock
#[derive(Debug, Clone)]
pub struct LockManager<P = SystemProbe> {
    path: PathBuf,
    probe: P,
}

impl LockManager<SystemProbe> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_probe(path, SystemProbe)
    }
}

impl<P: ProcessProbe> LockManager<P> {
    pub fn with_probe(path: impl Into<PathBuf>, probe: P) -> Self {
        Self {
            path: path.into(),
            probe,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a lock file currently exists
    pub fn is_present(&self) -> bool {
        self.path.exists()
    }

    /// Acquire the lock, reclaiming a stale one at most once
    pub fn acquire(&self) -> Result<SessionLock, LockError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        match self.try_create() {
            Ok(lock) => return Ok(lock),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(self.io_error(e)),
        }

        if !self.existing_is_stale()? {
            return Err(self.already_locked());
        }
        self.reclaim()
    }

    /// Replace a stale lock. Only the holder of the reclaim sentinel may
    /// remove the lock file, and it judges staleness again once it holds
    /// the sentinel, so a lock freshly created by a racing reclaimer is
    /// never removed.
    fn reclaim(&self) -> Result<SessionLock, LockError> {
        let Some(_guard) = self.reclaim_guard()? else {
            return Err(self.already_locked());
        };
        if !self.existing_is_stale()? {
            return Err(self.already_locked());
        }

        warn!(path = %self.path.display(), "reclaiming stale lock");
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(self.io_error(e)),
        }

        match self.try_create() {
            Ok(lock) => Ok(lock),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(self.already_locked()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Take the reclaim sentinel. `None` means another acquirer is
    /// reclaiming right now. A sentinel older than [`CREATION_GRACE`] was
    /// left by a crashed reclaimer and is replaced once.
    fn reclaim_guard(&self) -> Result<Option<ReclaimGuard>, LockError> {
        let path = self.reclaim_path();
        match ReclaimGuard::create(&path) {
            Ok(guard) => return Ok(Some(guard)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(self.io_error(e)),
        }

        if file_age(&path) <= CREATION_GRACE {
            return Ok(None);
        }
        warn!(path = %path.display(), "removing abandoned reclaim sentinel");
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(self.io_error(e)),
        }
        match ReclaimGuard::create(&path) {
            Ok(guard) => Ok(Some(guard)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn reclaim_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(RECLAIM_SUFFIX);
        PathBuf::from(name)
    }

    /// Remove the lock file regardless of staleness
    pub fn force_unlock(&self) -> Result<(), LockError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                warn!(path = %self.path.display(), "lock forcibly removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LockError::NotFound {
                path: self.path.clone(),
            }),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn try_create(&self) -> io::Result<SessionLock> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)?;

        let info = LockInfo::current();
        if let Err(e) = file
            .write_all(info.render().as_bytes())
            .and_then(|()| file.sync_all())
        {
            drop(file);
            let _ = fs::remove_file(&self.path);
            return Err(e);
        }

        debug!(path = %self.path.display(), pid = info.pid, "lock acquired");
        Ok(SessionLock {
            path: self.path.clone(),
            info,
            released: false,
        })
    }

    fn existing_is_stale(&self) -> Result<bool, LockError> {
        let body = match fs::read_to_string(&self.path) {
            Ok(body) => body,
            // Released between our create attempt and this read
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(self.io_error(e)),
        };
        let age = file_age(&self.path);

        let stale = is_stale(&body, age, &self.probe);
        debug!(
            path = %self.path.display(),
            owner = ?parse_owner_pid(&body),
            age_ms = age.as_millis() as u64,
            stale,
            "evaluated existing lock"
        );
        Ok(stale)
    }

    fn already_locked(&self) -> LockError {
        LockError::AlreadyLocked {
            path: self.path.clone(),
        }
    }

    fn io_error(&self, source: io::Error) -> LockError {
        LockError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Age of a file by modification time; zero when unknown
fn file_age(path: &Path) -> Duration {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .unwrap_or(Duration::ZERO)
}

/// Exclusive right to reclaim a stale lock; the sentinel is removed on drop
struct ReclaimGuard {
    path: PathBuf,
}

impl ReclaimGuard {
    fn create(path: &Path) -> io::Result<Self> {
        OpenOptions::new().write(true).create_new(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for ReclaimGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to remove reclaim sentinel");
        }
    }
}

/// Handle for a held lock; releases on drop
#[derive(Debug)]
pub struct SessionLock {
    path: PathBuf,
    info: LockInfo,
    released: bool,
}

impl SessionLock {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self) -> &LockInfo {
        &self.info
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Delete the lock file. Safe to call repeatedly, and after another
    /// actor already removed the file.
    pub fn release(&mut self) -> Result<(), LockError> {
        if self.released {
            return Ok(());
        }
        match fs::remove_file(&self.path) {
            Ok(()) => {
                self.released = true;
                debug!(path = %self.path.display(), "lock released");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.released = true;
                Ok(())
            }
            Err(e) => Err(LockError::Io {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "failed to release lock on drop");
        }
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Well-known locations for reflex state

use std::path::PathBuf;

/// Overrides the base directory for the lock file and certificates
pub const STATE_DIR_ENV: &str = "REFLEX_STATE_DIR";

pub const LOCK_FILE_NAME: &str = "reflex.lock";
pub const CERT_FILE_NAME: &str = "cert.pem";
pub const KEY_FILE_NAME: &str = "key.pem";
/// File that must exist inside a certificate authority root
pub const CA_ROOT_CERT_NAME: &str = "rootCA.pem";

/// Base directory for reflex state.
///
/// Uses the OS temp directory by default. Can be overridden with
/// REFLEX_STATE_DIR for testing.
pub fn state_base() -> PathBuf {
    match std::env::var_os(STATE_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => std::env::temp_dir(),
    }
}

/// The single lock file shared by every reflex process on the host
pub fn lock_path() -> PathBuf {
    state_base().join(LOCK_FILE_NAME)
}

/// Parent of all per-host certificate directories
pub fn cert_base_dir() -> PathBuf {
    state_base().join("reflex")
}

/// Default certificate directory for a host
pub fn cert_dir_for(host: &str) -> PathBuf {
    cert_base_dir().join(host)
}

/// The platform hosts file
pub fn default_hosts_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Windows\System32\drivers\etc\hosts")
    } else {
        PathBuf::from("/etc/hosts")
    }
}

/// Certificate authority root shared between root and the invoking user.
///
/// Only Linux pins one; elsewhere the provisioning tool's default applies.
pub fn pinned_ca_root() -> Option<PathBuf> {
    if cfg!(target_os = "linux") {
        Some(PathBuf::from("/etc/mkcert"))
    } else {
        None
    }
}

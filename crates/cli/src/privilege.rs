// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Privilege checks

use crate::error::CliError;

/// Fail unless running with an effective uid of 0
#[cfg(unix)]
pub fn require_root(command: &str) -> Result<(), CliError> {
    if nix::unistd::geteuid().is_root() {
        Ok(())
    } else {
        Err(CliError::needs_root(command))
    }
}

// Elevation on Windows surfaces as an I/O error when the hosts file is written
#[cfg(not(unix))]
pub fn require_root(_command: &str) -> Result<(), CliError> {
    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! reflex-core: shared local resources for reflex sessions
//!
//! This crate provides:
//! - The cross-process session lock with stale reclaim
//! - Tagged entry management for the hosts file
//! - Referrer hostname parsing and well-known state paths

pub mod hostname;
pub mod hosts;
pub mod lock;
pub mod paths;

pub use hostname::{extract_hostname, HostnameError};
pub use hosts::{BackupPolicy, HostsError, HostsFile, MANAGED_TAG};
pub use lock::{
    is_stale, parse_owner_pid, Liveness, LockError, LockInfo, LockManager, ProcessProbe,
    SessionLock, SystemProbe,
};

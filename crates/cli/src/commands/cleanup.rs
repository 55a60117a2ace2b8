// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `reflex cleanup` - Remove leftovers of a session

use crate::privilege::require_root;
use anyhow::{Context, Result};
use clap::Args;
use reflex_core::{extract_hostname, paths, HostsFile, LockError, LockManager};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Referrer host or URL whose mapping to remove
    #[arg(long, required_unless_present = "all")]
    pub referrer: Option<String>,

    /// Override the hosts file path (testing)
    #[arg(long)]
    pub hosts_file: Option<PathBuf>,

    /// Certificate directory to remove (defaults to the per-host temp dir)
    #[arg(long)]
    pub cert_dir: Option<PathBuf>,

    /// Keep certificates; only remove the hosts mapping
    #[arg(long)]
    pub keep_certs: bool,

    /// Remove every reflex-managed hosts entry, all temp certs, and the lock
    #[arg(long, conflicts_with = "referrer")]
    pub all: bool,
}

pub fn cleanup(args: CleanupArgs) -> Result<()> {
    if args.hosts_file.is_none() {
        require_root("cleanup")?;
    }
    let hosts = HostsFile::new(
        args.hosts_file
            .clone()
            .unwrap_or_else(paths::default_hosts_path),
    );

    if args.all {
        match hosts.remove_all_tagged() {
            Ok(n) => println!("removed {} hosts entries", n),
            Err(e) => tracing::warn!(error = %e, "failed to remove hosts entries"),
        }
        if !args.keep_certs {
            remove_certs(&paths::cert_base_dir());
        }
    } else {
        let referrer = args.referrer.as_deref().unwrap_or_default();
        let host = extract_hostname(referrer).context("invalid --referrer")?;
        match hosts.remove(&host) {
            Ok(0) => println!("no hosts entry for {}", host),
            Ok(_) => println!("removed hosts entry for {}", host),
            Err(e) => tracing::warn!(host = %host, error = %e, "failed to remove hosts entry"),
        }
        if !args.keep_certs {
            let dir = args.cert_dir.unwrap_or_else(|| paths::cert_dir_for(&host));
            remove_certs(&dir);
        }
    }

    match LockManager::new(paths::lock_path()).force_unlock() {
        Ok(()) => println!("removed lock file"),
        Err(LockError::NotFound { .. }) => {}
        Err(e) => tracing::warn!(error = %e, "failed to remove lock"),
    }
    Ok(())
}

fn remove_certs(dir: &Path) {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => println!("removed certs at {}", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "failed to remove certs"),
    }
}

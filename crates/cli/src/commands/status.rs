// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `reflex status` - Show current state for a referrer

use anyhow::{Context, Result};
use clap::Args;
use reflex_core::{extract_hostname, paths, HostsFile, LockManager};
use reflex_engine::CertPaths;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Referrer host or URL to check
    #[arg(long)]
    pub referrer: String,

    /// Override the hosts file path (testing)
    #[arg(long)]
    pub hosts_file: Option<PathBuf>,
}

pub fn status(args: StatusArgs) -> Result<()> {
    let host = extract_hostname(&args.referrer).context("invalid --referrer")?;
    let hosts = HostsFile::new(args.hosts_file.unwrap_or_else(paths::default_hosts_path));

    match hosts.contains(&host).context("read hosts")? {
        Some(line) => println!("hosts entry present: {}", line.trim()),
        None => println!("hosts entry not present"),
    }

    let dir = paths::cert_dir_for(&host);
    if CertPaths::in_dir(&dir).exist() {
        println!("certs present: {}", dir.display());
    } else {
        println!("certs not present");
    }

    if LockManager::new(paths::lock_path()).is_present() {
        println!("lock: present");
    } else {
        println!("lock: not present");
    }
    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session configuration

use reflex_adapters::RedirectMethod;
use reflex_core::{paths, BackupPolicy};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_FALLBACK_PORT: u16 = 8443;
pub const DEFAULT_REFERRER_POLICY: &str = "origin-when-cross-origin";
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

/// Everything one redirect session needs, resolved up front
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Referrer hostname mapped to the local server
    pub host: String,
    /// Address the hostname is mapped to
    pub address: String,
    pub port: u16,
    pub fallback_port: Option<u16>,
    /// Final navigation target
    pub target: String,
    pub method: RedirectMethod,
    pub referrer_policy: String,
    pub delay: Duration,
    pub open_browser: bool,
    pub private: bool,
    pub keep_certs: bool,
    /// Whether the hosts file is modified at all
    pub manage_hosts: bool,
    pub hosts_path: PathBuf,
    pub backups: BackupPolicy,
    pub cert_dir: PathBuf,
    pub ca_root: Option<PathBuf>,
    /// Auto-shutdown after this long
    pub duration: Option<Duration>,
    pub force_unlock: bool,
    pub lock_path: PathBuf,
    pub verbose: bool,
}

impl SessionConfig {
    /// Defaults for `host` redirecting to `target`, using well-known paths
    pub fn new(host: impl Into<String>, target: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            cert_dir: paths::cert_dir_for(&host),
            host,
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            fallback_port: Some(DEFAULT_FALLBACK_PORT),
            target: target.into(),
            method: RedirectMethod::default(),
            referrer_policy: DEFAULT_REFERRER_POLICY.to_string(),
            delay: DEFAULT_DELAY,
            open_browser: true,
            private: true,
            keep_certs: false,
            manage_hosts: true,
            hosts_path: paths::default_hosts_path(),
            backups: BackupPolicy::default(),
            ca_root: paths::pinned_ca_root(),
            duration: None,
            force_unlock: false,
            lock_path: paths::lock_path(),
            verbose: false,
        }
    }

    /// URL a viewer opens to reach the spoofed referrer
    pub fn viewer_url(&self, port: u16) -> String {
        // IPv6 literals need brackets to be told apart from the port
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        if port == 443 {
            format!("https://{}", host)
        } else {
            format!("https://{}:{}", host, port)
        }
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform browser launcher

use super::user::{platform_adjuster, ProcessSpec, UserAdjuster};
use super::{LaunchAdapter, LaunchError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Chromium-family browsers tried on Linux, in order
const LINUX_CHROMIUM: &[&str] = &[
    "google-chrome-stable",
    "google-chrome",
    "chromium",
    "chromium-browser",
    "brave-browser",
    "microsoft-edge",
    "microsoft-edge-stable",
];

/// Opens URLs in the desktop browser, as the invoking user when run via sudo
#[derive(Clone)]
pub struct BrowserLauncher {
    adjuster: Arc<dyn UserAdjuster>,
}

impl Default for BrowserLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserLauncher {
    pub fn new() -> Self {
        Self {
            adjuster: Arc::from(platform_adjuster()),
        }
    }

    pub fn with_adjuster(adjuster: Arc<dyn UserAdjuster>) -> Self {
        Self { adjuster }
    }

    fn plan(&self, url: &str, private: bool) -> Result<ProcessSpec, LaunchError> {
        if cfg!(target_os = "linux") {
            Ok(plan_linux(url, private, find_on_path))
        } else if cfg!(target_os = "macos") {
            Ok(plan_macos(url, private, app_installed))
        } else if cfg!(windows) {
            Ok(plan_windows(url, private, find_on_path))
        } else {
            Err(LaunchError::Unsupported)
        }
    }
}

#[async_trait]
impl LaunchAdapter for BrowserLauncher {
    async fn open(&self, url: &str, private: bool) -> Result<(), LaunchError> {
        let spec = self.plan(url, private)?;
        let spec = self.adjuster.adjust_for_invoking_user(spec);
        tracing::debug!(program = %spec.program.display(), args = ?spec.args, uid = ?spec.uid, "launching browser");

        // Spawn only; the runtime reaps the child in the background
        tokio::process::Command::from(spec.command())
            .spawn()
            .map(drop)
            .map_err(|source| LaunchError::Spawn {
                program: spec.program.display().to_string(),
                source,
            })
    }
}

fn first_found(candidates: &[&str], find: &impl Fn(&str) -> Option<PathBuf>) -> Option<PathBuf> {
    candidates.iter().find_map(|name| find(name))
}

/// Prefer a browser with a private-window flag, else fall back to xdg-open
pub fn plan_linux(url: &str, private: bool, find: impl Fn(&str) -> Option<PathBuf>) -> ProcessSpec {
    if let Some(bin) = first_found(LINUX_CHROMIUM, &find) {
        let mut spec = ProcessSpec::new(bin).arg("--new-window");
        if private {
            spec = spec.arg("--incognito");
        }
        return spec.arg(url);
    }
    if let Some(bin) = find("firefox") {
        let mut spec = ProcessSpec::new(bin);
        if private {
            spec = spec.arg("-private-window");
        }
        return spec.arg(url);
    }
    ProcessSpec::new("xdg-open").arg(url)
}

/// `open -na` targets a specific app so it receives the private flag
pub fn plan_macos(url: &str, private: bool, app_exists: impl Fn(&str) -> bool) -> ProcessSpec {
    if private {
        if app_exists("Google Chrome") {
            return ProcessSpec::new("open")
                .arg("-na")
                .arg("Google Chrome")
                .arg("--args")
                .arg("--incognito")
                .arg(url);
        }
        if app_exists("Firefox") {
            return ProcessSpec::new("open")
                .arg("-na")
                .arg("Firefox")
                .arg("--args")
                .arg("-private-window")
                .arg(url);
        }
    }
    ProcessSpec::new("open").arg(url)
}

/// Private windows need an explicit browser; otherwise use the shell handler
pub fn plan_windows(url: &str, private: bool, find: impl Fn(&str) -> Option<PathBuf>) -> ProcessSpec {
    if private {
        if let Some(bin) = first_found(&["chrome", "chrome.exe", "msedge", "msedge.exe"], &find) {
            return ProcessSpec::new(bin).arg("--incognito").arg(url);
        }
        if let Some(bin) = first_found(&["firefox", "firefox.exe"], &find) {
            return ProcessSpec::new(bin).arg("-private-window").arg(url);
        }
    }
    ProcessSpec::new("rundll32")
        .arg("url.dll,FileProtocolHandler")
        .arg(url)
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

fn app_installed(name: &str) -> bool {
    let bundle = format!("{}.app", name);
    if Path::new("/Applications").join(&bundle).is_dir() {
        return true;
    }
    std::env::var_os("HOME")
        .map(|home| Path::new(&home).join("Applications").join(&bundle).is_dir())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "browser_tests.rs"]
mod tests;

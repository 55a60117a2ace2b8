// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Running launched processes as the user who invoked sudo

use std::path::PathBuf;
use std::process::{Command, Stdio};

/// A process to start: program, arguments, environment overrides and
/// optional credentials
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Overrides applied on top of the inherited environment
    pub env: Vec<(String, String)>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

impl ProcessSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set an environment override, replacing an earlier one for `key`
    pub fn set_env(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.env.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.env.push((key.to_string(), value)),
        }
    }

    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Build a detached command with stdio closed
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if let Some(gid) = self.gid {
                cmd.gid(gid);
            }
            if let Some(uid) = self.uid {
                cmd.uid(uid);
            }
        }
        cmd
    }
}

/// Adapts a process so it runs in the invoking user's desktop session
pub trait UserAdjuster: Send + Sync {
    fn adjust_for_invoking_user(&self, spec: ProcessSpec) -> ProcessSpec;
}

/// The unprivileged user behind a `sudo` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokingUser {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub home: PathBuf,
}

/// The SUDO_USER account, when running with effective uid 0
#[cfg(unix)]
pub fn invoking_user() -> Option<InvokingUser> {
    use nix::unistd::{geteuid, User};

    if !geteuid().is_root() {
        return None;
    }
    let name = std::env::var("SUDO_USER").ok().filter(|n| !n.is_empty())?;
    let user = User::from_name(&name).ok().flatten()?;
    Some(InvokingUser {
        name,
        uid: user.uid.as_raw(),
        gid: user.gid.as_raw(),
        home: user.dir,
    })
}

#[cfg(not(unix))]
pub fn invoking_user() -> Option<InvokingUser> {
    None
}

fn set_identity_env(spec: &mut ProcessSpec, user: &InvokingUser) {
    spec.set_env("HOME", user.home.display().to_string());
    spec.set_env("USER", user.name.clone());
    spec.set_env("LOGNAME", user.name.clone());
}

/// Linux: drop to the invoking user's uid/gid and point the session bus
/// at their runtime directory
#[derive(Debug, Clone)]
pub struct LinuxSudoAdjuster {
    user: Option<InvokingUser>,
    runtime_root: PathBuf,
    inherited_bus: bool,
}

impl LinuxSudoAdjuster {
    pub fn detect() -> Self {
        Self {
            user: invoking_user(),
            runtime_root: PathBuf::from("/run/user"),
            inherited_bus: std::env::var_os("DBUS_SESSION_BUS_ADDRESS").is_some(),
        }
    }

    pub fn for_user(user: InvokingUser, runtime_root: impl Into<PathBuf>) -> Self {
        Self {
            user: Some(user),
            runtime_root: runtime_root.into(),
            inherited_bus: false,
        }
    }

    fn runtime_dir(&self, uid: u32) -> Option<PathBuf> {
        let dir = self.runtime_root.join(uid.to_string());
        dir.is_dir().then_some(dir)
    }
}

impl UserAdjuster for LinuxSudoAdjuster {
    fn adjust_for_invoking_user(&self, mut spec: ProcessSpec) -> ProcessSpec {
        let Some(user) = &self.user else {
            return spec;
        };
        spec.uid = Some(user.uid);
        spec.gid = Some(user.gid);
        set_identity_env(&mut spec, user);

        if let Some(xdg) = self.runtime_dir(user.uid) {
            spec.set_env("XDG_RUNTIME_DIR", xdg.display().to_string());
            if !self.inherited_bus && spec.env_value("DBUS_SESSION_BUS_ADDRESS").is_none() {
                spec.set_env(
                    "DBUS_SESSION_BUS_ADDRESS",
                    format!("unix:path={}", xdg.join("bus").display()),
                );
            }
        }
        spec
    }
}

/// macOS: keep credentials, adjust the identity environment only
#[derive(Debug, Clone)]
pub struct DarwinSudoAdjuster {
    user: Option<InvokingUser>,
}

impl DarwinSudoAdjuster {
    pub fn detect() -> Self {
        Self {
            user: invoking_user(),
        }
    }

    pub fn for_user(user: InvokingUser) -> Self {
        Self { user: Some(user) }
    }
}

impl UserAdjuster for DarwinSudoAdjuster {
    fn adjust_for_invoking_user(&self, mut spec: ProcessSpec) -> ProcessSpec {
        if let Some(user) = &self.user {
            set_identity_env(&mut spec, user);
        }
        spec
    }
}

/// Leaves processes unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAdjuster;

impl UserAdjuster for NoopAdjuster {
    fn adjust_for_invoking_user(&self, spec: ProcessSpec) -> ProcessSpec {
        spec
    }
}

/// The adjuster for the platform this binary was built for
pub fn platform_adjuster() -> Box<dyn UserAdjuster> {
    if cfg!(target_os = "linux") {
        Box::new(LinuxSudoAdjuster::detect())
    } else if cfg!(target_os = "macos") {
        Box::new(DarwinSudoAdjuster::detect())
    } else {
        Box::new(NoopAdjuster)
    }
}

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;

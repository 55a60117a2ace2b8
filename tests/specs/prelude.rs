//! Shared fixtures for reflex specs

#![allow(dead_code)]

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command as StdCommand, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

pub const HOST: &str = "news.example.test";
pub const ORIGINAL_HOSTS: &str = "127.0.0.1 localhost\n";
pub const MANAGED_LINE: &str = "127.0.0.1 news.example.test # reflex-managed";

/// A scratch directory holding the hosts file, state dir and tool fakes
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Project with a hosts file containing only localhost
    pub fn with_hosts() -> Self {
        let project = Self::empty();
        project.file("hosts", ORIGINAL_HOSTS);
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path().join(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path().join(rel).exists()
    }

    pub fn hosts_path(&self) -> String {
        self.path().join("hosts").display().to_string()
    }

    /// Base for the lock file and certificate directories
    pub fn state_dir(&self) -> PathBuf {
        self.path().join("state")
    }

    pub fn lock_rel(&self) -> &'static str {
        "state/reflex.lock"
    }

    pub fn cert_rel(&self, host: &str) -> String {
        format!("state/reflex/{}", host)
    }

    /// Seed a cached certificate pair for `host`
    pub fn certs(&self, host: &str) {
        self.file(&format!("{}/cert.pem", self.cert_rel(host)), "cert");
        self.file(&format!("{}/key.pem", self.cert_rel(host)), "key");
    }

    /// A CA root directory that passes the preflight check
    pub fn ca_root(&self) -> String {
        self.file("ca/rootCA.pem", "root");
        self.path().join("ca").display().to_string()
    }

    /// An mkcert stand-in that writes unparseable PEM files
    #[cfg(unix)]
    pub fn fake_mkcert(&self) -> String {
        self.mkcert_script(
            "printf 'not a key\\n' > \"$2\"\n\
             printf 'not a cert\\n' > \"$4\"\n",
        )
    }

    /// An mkcert stand-in that installs a self-signed pair the responder
    /// can serve with
    #[cfg(unix)]
    pub fn working_mkcert(&self) -> String {
        let tls = fixtures_dir().join("tls");
        self.mkcert_script(&format!(
            "cp '{0}/key.pem' \"$2\"\ncp '{0}/cert.pem' \"$4\"\n",
            tls.display()
        ))
    }

    /// Answers `--version`, runs `write_pair` with mkcert's argument
    /// layout, then records the CAROOT it was given
    #[cfg(unix)]
    fn mkcert_script(&self, write_pair: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let script = self.file(
            "bin/mkcert",
            &format!(
                "#!/bin/sh\n\
                 if [ \"$1\" = \"--version\" ]; then echo v1.4.4; exit 0; fi\n\
                 {}\
                 echo \"$CAROOT\" > \"$(dirname \"$4\")/../caroot.txt\"\n",
                write_pair
            ),
        );
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script.display().to_string()
    }

    /// Start reflex in the background with the same confinement as
    /// [`Project::reflex`]
    pub fn spawn_reflex(&self, envs: &[(&str, &str)], args: &[&str]) -> Child {
        let mut cmd = StdCommand::new(assert_cmd::cargo::cargo_bin("reflex"));
        cmd.current_dir(self.path())
            .env("REFLEX_STATE_DIR", self.state_dir())
            .env("REFLEX_MKCERT", self.path().join("bin/missing-mkcert"))
            .env_remove("RUST_LOG")
            .env_remove("SUDO_USER")
            .envs(envs.iter().copied())
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.spawn().unwrap()
    }

    /// Poll until `cond` holds, failing after ten seconds
    pub fn wait_for(&self, what: &str, cond: impl Fn(&Project) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !cond(self) {
            assert!(Instant::now() < deadline, "timed out waiting for {}", what);
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    /// Build a reflex invocation confined to this project
    pub fn reflex(&self) -> CliBuilder {
        let mut cmd = Command::cargo_bin("reflex").unwrap();
        cmd.current_dir(self.path())
            .env("REFLEX_STATE_DIR", self.state_dir())
            .env("REFLEX_MKCERT", self.path().join("bin/missing-mkcert"))
            .env_remove("RUST_LOG")
            .env_remove("SUDO_USER")
            .timeout(Duration::from_secs(30));
        CliBuilder { cmd }
    }
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        RunAssert {
            assert: self.cmd.assert().success(),
        }
    }

    pub fn fails(mut self) -> RunAssert {
        RunAssert {
            assert: self.cmd.assert().failure().code(1),
        }
    }

    /// Rejected by argument parsing
    pub fn misuses(mut self) -> RunAssert {
        RunAssert {
            assert: self.cmd.assert().failure().code(2),
        }
    }
}

pub struct RunAssert {
    assert: Assert,
}

impl RunAssert {
    pub fn stdout_has(self, expected: &str) -> Self {
        Self {
            assert: self.assert.stdout(predicate::str::contains(expected)),
        }
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        Self {
            assert: self
                .assert
                .stdout(predicate::str::contains(unexpected).not()),
        }
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        Self {
            assert: self.assert.stderr(predicate::str::contains(expected)),
        }
    }
}

/// Checked-in test data under tests/fixtures
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Wait up to ten seconds for a spawned reflex to exit, returning its
/// status and everything it wrote to stderr
pub fn finish(mut child: Child) -> (ExitStatus, String) {
    let deadline = Instant::now() + Duration::from_secs(10);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            panic!("reflex did not exit in time");
        }
        std::thread::sleep(Duration::from_millis(20));
    };
    let mut stderr = String::new();
    if let Some(mut pipe) = child.stderr.take() {
        pipe.read_to_string(&mut stderr).unwrap();
    }
    (status, stderr)
}

/// Whether the specs run as the superuser
#[cfg(unix)]
pub fn running_as_root() -> bool {
    std::process::Command::new("id")
        .arg("-u")
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).trim() == "0")
        .unwrap_or(false)
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

fn request(dir: &TempDir) -> ProvisionRequest {
    ProvisionRequest {
        domain: "news.example.test".to_string(),
        cert_path: dir.path().join("cert.pem"),
        key_path: dir.path().join("key.pem"),
        ca_root: None,
    }
}

#[tokio::test]
async fn missing_program_is_unavailable() {
    let adapter = MkcertAdapter::with_program("/nonexistent/reflex-mkcert");
    assert!(!adapter.is_available().await);
}

#[tokio::test]
async fn missing_program_fails_to_spawn() {
    let dir = TempDir::new().unwrap();
    let adapter = MkcertAdapter::with_program("/nonexistent/reflex-mkcert");

    let result = adapter.provision(&request(&dir)).await;
    assert!(matches!(result, Err(ProvisionError::Spawn { .. })));
}

#[cfg(unix)]
mod scripted {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("mkcert");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn successful_version_probe_is_available() {
        let dir = TempDir::new().unwrap();
        let adapter = MkcertAdapter::with_program(script(&dir, "exit 0"));
        assert!(adapter.is_available().await);
    }

    #[tokio::test]
    async fn passes_output_paths_domain_and_ca_root() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("args.log");
        let program = script(
            &dir,
            &format!(
                "echo \"$@\" > {log}\necho \"CAROOT=$CAROOT\" >> {log}",
                log = log.display()
            ),
        );
        let adapter = MkcertAdapter::with_program(program);
        let mut req = request(&dir);
        req.ca_root = Some(PathBuf::from("/etc/mkcert"));

        adapter.provision(&req).await.unwrap();

        let logged = std::fs::read_to_string(&log).unwrap();
        assert!(logged.contains(&format!(
            "-key-file {} -cert-file {} news.example.test",
            req.key_path.display(),
            req.cert_path.display()
        )));
        assert!(logged.contains("CAROOT=/etc/mkcert"));
    }

    #[tokio::test]
    async fn nonzero_exit_is_failure_with_stderr() {
        let dir = TempDir::new().unwrap();
        let adapter = MkcertAdapter::with_program(script(&dir, "echo 'no CA' >&2\nexit 3"));

        let result = adapter.provision(&request(&dir)).await;
        match result {
            Err(ProvisionError::Failed { stderr, .. }) => assert_eq!(stderr, "no CA"),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}

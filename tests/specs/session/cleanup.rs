//! `reflex cleanup` specs

use crate::prelude::*;

#[test]
fn cleanup_removes_entry_certs_and_lock() {
    let project = Project::empty();
    project.file("hosts", &format!("{}{}\n", ORIGINAL_HOSTS, MANAGED_LINE));
    project.certs(HOST);
    project.file(project.lock_rel(), "pid=1\n");

    project
        .reflex()
        .args(&["cleanup", "--referrer", HOST, "--hosts-file", &project.hosts_path()])
        .passes()
        .stdout_has("removed hosts entry for news.example.test")
        .stdout_has("removed certs at")
        .stdout_has("removed lock file");

    similar_asserts::assert_eq!(project.read("hosts"), ORIGINAL_HOSTS);
    assert!(!project.exists(&project.cert_rel(HOST)));
    assert!(!project.exists(project.lock_rel()));
}

#[test]
fn cleanup_keep_certs_leaves_certificates() {
    let project = Project::empty();
    project.file("hosts", &format!("{}{}\n", ORIGINAL_HOSTS, MANAGED_LINE));
    project.certs(HOST);

    project
        .reflex()
        .args(&[
            "cleanup",
            "--referrer",
            HOST,
            "--hosts-file",
            &project.hosts_path(),
            "--keep-certs",
        ])
        .passes()
        .stdout_lacks("removed certs");

    assert!(project.exists(&format!("{}/cert.pem", project.cert_rel(HOST))));
}

#[test]
fn cleanup_without_entry_is_not_an_error() {
    let project = Project::with_hosts();

    project
        .reflex()
        .args(&["cleanup", "--referrer", HOST, "--hosts-file", &project.hosts_path()])
        .passes()
        .stdout_has("no hosts entry for news.example.test")
        .stdout_lacks("removed lock file");

    similar_asserts::assert_eq!(project.read("hosts"), ORIGINAL_HOSTS);
}

#[test]
fn cleanup_all_removes_every_managed_line() {
    let project = Project::empty();
    project.file(
        "hosts",
        "127.0.0.1 localhost\n\
         127.0.0.1 a.test # reflex-managed\n\
         10.0.0.1 user.test\n\
         127.0.0.1 b.test # reflex-managed\n",
    );
    project.certs("a.test");
    project.certs("b.test");

    project
        .reflex()
        .args(&["cleanup", "--all", "--hosts-file", &project.hosts_path()])
        .passes()
        .stdout_has("removed 2 hosts entries");

    similar_asserts::assert_eq!(
        project.read("hosts"),
        "127.0.0.1 localhost\n10.0.0.1 user.test\n"
    );
    assert!(!project.exists("state/reflex"));
}

#[test]
fn cleanup_removes_custom_cert_dir() {
    let project = Project::with_hosts();
    project.file("mycerts/cert.pem", "cert");

    project
        .reflex()
        .args(&[
            "cleanup",
            "--referrer",
            HOST,
            "--hosts-file",
            &project.hosts_path(),
            "--cert-dir",
            &project.path().join("mycerts").display().to_string(),
        ])
        .passes();

    assert!(!project.exists("mycerts"));
}

#[cfg(unix)]
#[test]
fn cleanup_of_system_hosts_requires_root() {
    if running_as_root() {
        return;
    }
    Project::empty()
        .reflex()
        .args(&["cleanup", "--referrer", HOST])
        .fails()
        .stderr_has("sudo");
}

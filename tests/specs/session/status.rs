//! `reflex status` specs

use crate::prelude::*;

#[test]
fn status_reports_nothing_present() {
    let project = Project::with_hosts();

    project
        .reflex()
        .args(&["status", "--referrer", HOST, "--hosts-file", &project.hosts_path()])
        .passes()
        .stdout_has("hosts entry not present")
        .stdout_has("certs not present")
        .stdout_has("lock: not present");
}

#[test]
fn status_shows_managed_line_certs_and_lock() {
    let project = Project::empty();
    project.file("hosts", &format!("{}{}\n", ORIGINAL_HOSTS, MANAGED_LINE));
    project.certs(HOST);
    project.file(project.lock_rel(), "pid=1\n");

    project
        .reflex()
        .args(&[
            "status",
            "--referrer",
            "https://news.example.test/story",
            "--hosts-file",
            &project.hosts_path(),
        ])
        .passes()
        .stdout_has(&format!("hosts entry present: {}", MANAGED_LINE))
        .stdout_has("certs present:")
        .stdout_has("lock: present");
}

#[test]
fn status_ignores_unmanaged_lines() {
    let project = Project::empty();
    project.file("hosts", "127.0.0.1 news.example.test\n");

    project
        .reflex()
        .args(&["status", "--referrer", HOST, "--hosts-file", &project.hosts_path()])
        .passes()
        .stdout_has("hosts entry not present");
}

#[test]
fn status_with_missing_hosts_file_fails() {
    let project = Project::empty();

    project
        .reflex()
        .args(&["status", "--referrer", HOST, "--hosts-file", &project.hosts_path()])
        .fails()
        .stderr_has("read hosts");
}

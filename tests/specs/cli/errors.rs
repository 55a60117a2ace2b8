//! Usage error specs

use crate::prelude::*;

#[test]
fn no_command_is_usage_error() {
    Project::empty().reflex().misuses();
}

#[test]
fn run_requires_referrer_and_target() {
    Project::empty()
        .reflex()
        .args(&["run", "--referrer", HOST])
        .misuses()
        .stderr_has("--target");
}

#[test]
fn run_rejects_unknown_method() {
    Project::with_hosts()
        .reflex()
        .args(&[
            "run",
            "--referrer",
            HOST,
            "--target",
            "https://target.test",
            "--method",
            "refresh",
        ])
        .misuses()
        .stderr_has("invalid redirect method");
}

#[test]
fn cleanup_requires_referrer_or_all() {
    Project::empty().reflex().args(&["cleanup"]).misuses();
}

#[test]
fn cleanup_rejects_referrer_with_all() {
    Project::empty()
        .reflex()
        .args(&["cleanup", "--all", "--referrer", HOST])
        .misuses();
}

#[test]
fn status_rejects_empty_referrer() {
    let project = Project::with_hosts();
    project
        .reflex()
        .args(&["status", "--referrer", "", "--hosts-file", &project.hosts_path()])
        .fails()
        .stderr_has("invalid --referrer");
}

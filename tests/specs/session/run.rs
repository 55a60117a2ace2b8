//! `reflex run` specs
//!
//! With `fake_mkcert` the certificates cannot be loaded, so the run ends in
//! a listener failure after the hosts entry, the lock and the certificate
//! directory were all created. With `working_mkcert` the responder really
//! serves until the duration elapses or a signal arrives. Either way all
//! of them must be gone again afterwards.

use crate::prelude::*;

fn run_args<'a>(project_hosts: &'a str, ca_root: &'a str) -> Vec<&'a str> {
    vec![
        "run",
        "--referrer",
        "https://news.example.test/story",
        "--target",
        "https://target.test/landing",
        "--hosts-file",
        project_hosts,
        "--ca-root",
        ca_root,
        "--port",
        "0",
        "--no-browser",
    ]
}

#[test]
fn missing_mkcert_fails_before_touching_anything() {
    let project = Project::with_hosts();
    let hosts = project.hosts_path();
    let ca_root = project.ca_root();

    project
        .reflex()
        .args(&run_args(&hosts, &ca_root))
        .fails()
        .stderr_has("mkcert is required")
        .stderr_has("https://github.com/FiloSottile/mkcert");

    similar_asserts::assert_eq!(project.read("hosts"), ORIGINAL_HOSTS);
    assert!(!project.exists(project.lock_rel()));
}

#[cfg(unix)]
#[test]
fn missing_ca_root_fails_with_setup_steps() {
    let project = Project::with_hosts();
    let hosts = project.hosts_path();
    let missing = project.path().join("no-ca").display().to_string();

    project
        .reflex()
        .env("REFLEX_MKCERT", project.fake_mkcert())
        .args(&run_args(&hosts, &missing))
        .fails()
        .stderr_has("missing certificate authority root")
        .stderr_has("mkcert -install");

    similar_asserts::assert_eq!(project.read("hosts"), ORIGINAL_HOSTS);
}

#[cfg(unix)]
#[test]
fn held_lock_refuses_to_start() {
    let project = Project::with_hosts();
    let hosts = project.hosts_path();
    let ca_root = project.ca_root();
    // This test process is a live owner
    let body = format!("pid={}\n", std::process::id());
    project.file(project.lock_rel(), &body);

    project
        .reflex()
        .env("REFLEX_MKCERT", project.fake_mkcert())
        .args(&run_args(&hosts, &ca_root))
        .fails()
        .stderr_has("another reflex instance appears to be running")
        .stderr_has("--force-unlock");

    similar_asserts::assert_eq!(project.read("hosts"), ORIGINAL_HOSTS);
    similar_asserts::assert_eq!(project.read(project.lock_rel()), body);
}

#[cfg(unix)]
#[test]
fn stale_lock_is_reclaimed() {
    let project = Project::with_hosts();
    let hosts = project.hosts_path();
    let ca_root = project.ca_root();
    let mut child = std::process::Command::new("true").spawn().unwrap();
    let dead = child.id();
    child.wait().unwrap();
    project.file(project.lock_rel(), &format!("pid={}\n", dead));

    // Gets past the lock and fails later, at the listener
    project
        .reflex()
        .env("REFLEX_MKCERT", project.fake_mkcert())
        .args(&run_args(&hosts, &ca_root))
        .fails()
        .stderr_has("server error");

    assert!(!project.exists(project.lock_rel()));
}

#[cfg(unix)]
#[test]
fn listener_failure_restores_everything() {
    let project = Project::with_hosts();
    let hosts = project.hosts_path();
    let ca_root = project.ca_root();

    project
        .reflex()
        .env("REFLEX_MKCERT", project.fake_mkcert())
        .args(&run_args(&hosts, &ca_root))
        .fails()
        .stderr_has("server error")
        .stderr_has("TLS setup failed");

    similar_asserts::assert_eq!(project.read("hosts"), ORIGINAL_HOSTS);
    assert!(!project.exists(project.lock_rel()));
    assert!(!project.exists(&project.cert_rel(HOST)));
    // mkcert ran against the requested CA root
    similar_asserts::assert_eq!(project.read("state/reflex/caroot.txt").trim(), ca_root);
}

#[cfg(unix)]
#[test]
fn hosts_backup_is_written_before_editing() {
    let project = Project::with_hosts();
    let hosts = project.hosts_path();
    let ca_root = project.ca_root();

    project
        .reflex()
        .env("REFLEX_MKCERT", project.fake_mkcert())
        .args(&run_args(&hosts, &ca_root))
        .fails();

    let backups: Vec<_> = std::fs::read_dir(project.path())
        .unwrap()
        .flatten()
        .filter(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            name.starts_with("hosts.reflex.") && name.ends_with(".bak")
        })
        .collect();
    assert_eq!(backups.len(), 1);
    similar_asserts::assert_eq!(
        std::fs::read_to_string(backups[0].path()).unwrap(),
        ORIGINAL_HOSTS
    );
}

#[cfg(unix)]
#[test]
fn no_backup_flag_skips_backup() {
    let project = Project::with_hosts();
    let hosts = project.hosts_path();
    let ca_root = project.ca_root();
    let mut args = run_args(&hosts, &ca_root);
    args.push("--no-backup");

    project
        .reflex()
        .env("REFLEX_MKCERT", project.fake_mkcert())
        .args(&args)
        .fails();

    let backups = std::fs::read_dir(project.path())
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().ends_with(".bak"))
        .count();
    assert_eq!(backups, 0);
}

#[cfg(unix)]
#[test]
fn keep_certs_leaves_provisioned_files() {
    let project = Project::with_hosts();
    let hosts = project.hosts_path();
    let ca_root = project.ca_root();
    let mut args = run_args(&hosts, &ca_root);
    args.push("--keep-certs");

    project
        .reflex()
        .env("REFLEX_MKCERT", project.fake_mkcert())
        .args(&args)
        .fails();

    assert!(project.exists(&format!("{}/cert.pem", project.cert_rel(HOST))));
    similar_asserts::assert_eq!(project.read("hosts"), ORIGINAL_HOSTS);
}

#[cfg(unix)]
#[test]
fn run_against_system_hosts_requires_root() {
    if running_as_root() {
        return;
    }
    Project::empty()
        .reflex()
        .args(&[
            "run",
            "--referrer",
            HOST,
            "--target",
            "https://target.test",
            "--no-browser",
        ])
        .fails()
        .stderr_has("modifies the system hosts file")
        .stderr_has("sudo");
}

#[cfg(unix)]
fn assert_restored(project: &Project) {
    similar_asserts::assert_eq!(project.read("hosts"), ORIGINAL_HOSTS);
    assert!(!project.exists(project.lock_rel()), "lock left behind");
    assert!(!project.exists(&project.cert_rel(HOST)), "certificates left behind");
}

#[cfg(unix)]
#[test]
fn duration_elapsing_shuts_down_cleanly() {
    let project = Project::with_hosts();
    let hosts = project.hosts_path();
    let ca_root = project.ca_root();
    let mut args = run_args(&hosts, &ca_root);
    args.extend(["--duration", "300ms"]);

    project
        .reflex()
        .env("REFLEX_MKCERT", project.working_mkcert())
        .args(&args)
        .passes()
        .stderr_has("serving spoofed referrer")
        .stderr_has("https://news.example.test:")
        .stderr_has("duration elapsed");

    assert_restored(&project);
}

#[cfg(unix)]
fn signal_while_serving_cleans_up_and_exits_zero(signal: &str) {
    let project = Project::with_hosts();
    let hosts = project.hosts_path();
    let ca_root = project.ca_root();
    let mkcert = project.working_mkcert();

    let child = project.spawn_reflex(&[("REFLEX_MKCERT", &mkcert)], &run_args(&hosts, &ca_root));
    project.wait_for("hosts entry and certificates", |p| {
        p.read("hosts").contains(MANAGED_LINE)
            && p.exists(&format!("{}/key.pem", p.cert_rel(HOST)))
    });
    let killed = std::process::Command::new("kill")
        .args([format!("-{}", signal), child.id().to_string()])
        .status()
        .unwrap();
    assert!(killed.success());

    let (status, stderr) = finish(child);
    assert_eq!(status.code(), Some(0), "{}", stderr);
    assert!(stderr.contains("termination requested"), "{}", stderr);
    assert_restored(&project);
}

#[cfg(unix)]
#[test]
fn sigterm_while_serving_cleans_up_and_exits_zero() {
    signal_while_serving_cleans_up_and_exits_zero("TERM");
}

#[cfg(unix)]
#[test]
fn sigint_while_serving_cleans_up_and_exits_zero() {
    signal_while_serving_cleans_up_and_exits_zero("INT");
}

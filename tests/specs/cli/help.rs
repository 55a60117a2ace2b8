//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    Project::empty()
        .reflex()
        .args(&["--help"])
        .passes()
        .stdout_has("run")
        .stdout_has("cleanup")
        .stdout_has("status");
}

#[test]
fn run_help_lists_redirect_options() {
    Project::empty()
        .reflex()
        .args(&["run", "--help"])
        .passes()
        .stdout_has("--referrer")
        .stdout_has("--method")
        .stdout_has("--referrer-policy")
        .stdout_has("--force-unlock")
        .stdout_has("--keep-backups");
}

#[test]
fn version_is_printed() {
    Project::empty()
        .reflex()
        .args(&["--version"])
        .passes()
        .stdout_has("reflex");
}

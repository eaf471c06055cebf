//! Integration tests for the and-cli dispatcher
//!
//! These tests run the real binary against temporary projects with stub
//! sub-command executables.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create an and-cli Command with a clean environment
fn and_cli() -> Command {
    let mut cmd = cargo_bin_cmd!("and-cli");
    cmd.env_remove("AND_CLI_CONFIG").env_remove("AND_CLI_LOG");
    cmd
}

/// Helper to create a temporary project directory
fn create_temp_project() -> TempDir {
    TempDir::new().unwrap()
}

/// Helper to write an and-cli.toml into the project
fn write_config(dir: &Path, content: &str) {
    fs::write(dir.join("and-cli.toml"), content).unwrap();
}

/// Config for a development checkout of and-cli with one alias
const CHECKOUT_CONFIG: &str = r#"
[project]
bin = ["and-cli"]

[aliases]
testdb = "dotnet --cli -- test db migrate"
"#;

/// Helper to install a stub sub-command that echoes its arguments and exits
/// with `code`
#[cfg(unix)]
fn write_stub(dir: &Path, command: &str, code: i32) {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("and-cli-{}", command));
    fs::write(
        &path,
        format!(
            "#!/bin/sh\necho \"{} called with: $*\"\nexit {}\n",
            command, code
        ),
    )
    .unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_help_lists_base_commands() {
        let dir = create_temp_project();

        and_cli()
            .current_dir(dir.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("dotnet"))
            .stdout(predicate::str::contains("nuget"))
            .stdout(predicate::str::contains("webpack"));
    }

    #[test]
    fn test_version() {
        and_cli().arg("--version").assert().success();
    }

    #[test]
    fn test_no_arguments_shows_help_and_fails() {
        let dir = create_temp_project();

        and_cli()
            .current_dir(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Usage"));
    }

    #[test]
    fn test_unknown_command_fails() {
        let dir = create_temp_project();

        and_cli()
            .current_dir(dir.path())
            .arg("not-a-command")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("not-a-command"));
    }

    #[test]
    fn test_missing_executable_fails_with_exit_code_1() {
        let dir = create_temp_project();
        write_config(dir.path(), CHECKOUT_CONFIG);

        and_cli()
            .current_dir(dir.path())
            .arg("nuget")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Failed to run"))
            .stderr(predicate::str::contains("and-cli-nuget"));
    }
}

// =============================================================================
// Dispatch Tests
// =============================================================================

#[cfg(unix)]
mod dispatch {
    use super::*;

    #[test]
    fn test_dispatch_passes_arguments_and_exit_code() {
        let dir = create_temp_project();
        write_config(dir.path(), CHECKOUT_CONFIG);
        write_stub(dir.path(), "dotnet", 3);

        and_cli()
            .current_dir(dir.path())
            .args(["dotnet", "--build", "--help"])
            .assert()
            .code(3)
            .stdout(predicate::str::contains("dotnet called with: --build --help"));
    }

    #[test]
    fn test_dispatch_installed_dependency_uses_package_directory() {
        let dir = create_temp_project();
        write_config(dir.path(), "[project]\nbin = \"web-cli\"\n");
        write_stub(&dir.path().join("node_modules/and-cli"), "jest", 0);

        and_cli()
            .current_dir(dir.path())
            .args(["jest", "--watch"])
            .assert()
            .success()
            .stdout(predicate::str::contains("jest called with: --watch"));
    }

    #[test]
    fn test_dispatch_from_package_json() {
        let dir = create_temp_project();
        fs::write(
            dir.path().join("package.json"),
            r#"{ "name": "web", "bin": { "and-cli": "cli.js" } }"#,
        )
        .unwrap();
        write_stub(dir.path(), "webpack", 0);

        and_cli()
            .current_dir(dir.path())
            .arg("webpack")
            .assert()
            .success()
            .stdout(predicate::str::contains("webpack called with:"));
    }
}

// =============================================================================
// Alias Tests
// =============================================================================

mod aliases {
    use super::*;

    #[test]
    fn test_help_marks_aliases() {
        let dir = create_temp_project();
        write_config(dir.path(), CHECKOUT_CONFIG);

        and_cli()
            .current_dir(dir.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("testdb"))
            .stdout(predicate::str::contains(
                "(alias) dotnet --cli -- test db migrate",
            ));
    }

    #[cfg(unix)]
    #[test]
    fn test_alias_expands_and_dispatches() {
        let dir = create_temp_project();
        write_config(dir.path(), CHECKOUT_CONFIG);
        write_stub(dir.path(), "dotnet", 0);

        and_cli()
            .current_dir(dir.path())
            .arg("testdb")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "dotnet called with: --cli -- test db migrate",
            ))
            .stderr(predicate::str::contains("Expanding alias 'testdb'"));
    }

    #[cfg(unix)]
    #[test]
    fn test_alias_from_config_env_override() {
        let dir = create_temp_project();
        let custom = dir.path().join("custom.toml");
        fs::write(
            &custom,
            "[project]\nbin = \"and-cli\"\n\n[aliases]\npub = \"nuget --publish\"\n",
        )
        .unwrap();
        write_stub(dir.path(), "nuget", 0);

        and_cli()
            .current_dir(dir.path())
            .env("AND_CLI_CONFIG", &custom)
            .arg("pub")
            .assert()
            .success()
            .stdout(predicate::str::contains("nuget called with: --publish"));
    }

    #[test]
    fn test_alias_with_extra_arguments_fails() {
        let dir = create_temp_project();
        write_config(dir.path(), CHECKOUT_CONFIG);

        and_cli()
            .current_dir(dir.path())
            .args(["testdb", "extra"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("must be invoked on its own"));
    }

    #[test]
    fn test_malformed_config_is_ignored() {
        let dir = create_temp_project();
        write_config(dir.path(), "[aliases\ntestdb = ");

        and_cli()
            .current_dir(dir.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("dotnet"))
            .stdout(predicate::str::contains("testdb").not())
            .stderr(predicate::str::contains("Ignoring project configuration"));
    }
}

// replication-check/tests/cli_exit_codes.rs
//
// Spawns the built binaries for the paths that need no database server.

use std::process::{Command, Output};

fn run(bin: &str, args: &[&str]) -> Output {
    Command::new(bin)
        .args(args)
        .env_remove("MYSQL_HOST")
        .env_remove("MYSQL_TCP_PORT")
        .env_remove("MYSQL_PWD")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to spawn binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn test_check_without_arguments_prints_usage_and_exits_1() {
    let output = run(env!("CARGO_BIN_EXE_check-mysql-replication"), &[]);

    assert_eq!(output.status.code(), Some(1));
    let usage = String::from_utf8_lossy(&output.stderr);
    assert!(usage.contains("--warning_delay"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_check_connection_refused_exits_2() {
    let output = run(
        env!("CARGO_BIN_EXE_check-mysql-replication"),
        &[
            "--host",
            "127.0.0.1",
            "--port",
            "1",
            "--username",
            "monitor",
            "--use_ssl",
            "false",
        ],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).starts_with("ERROR: Cannot connect to the MySQL server:"));
}

#[test]
fn test_check_missing_options_file_exits_2() {
    let output = run(
        env!("CARGO_BIN_EXE_check-mysql-replication"),
        &["--options_file", "/nonexistent/replication-check/.my.cnf"],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).starts_with("ERROR: Configuration Error:"));
}

#[test]
fn test_probe_connection_refused_reports_error() {
    let output = run(
        env!("CARGO_BIN_EXE_test-replication"),
        &[
            "--master_host",
            "127.0.0.1",
            "--slave_host",
            "127.0.0.1",
            "--port",
            "1",
            "--username",
            "probe",
            "--use_ssl",
            "no",
        ],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).starts_with("An error occurred: Cannot connect to the MySQL server:"));
}

#[test]
fn test_probe_rejects_invalid_table_name() {
    let output = run(
        env!("CARGO_BIN_EXE_test-replication"),
        &[
            "--master_host",
            "db-a",
            "--slave_host",
            "db-b",
            "--username",
            "probe",
            "--table",
            "test`; DROP TABLE users; --",
        ],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).starts_with("An error occurred: Configuration Error: invalid table name"));
}

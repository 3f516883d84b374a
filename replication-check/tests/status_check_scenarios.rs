// replication-check/tests/status_check_scenarios.rs
//
// Status check scenarios end to end: fake replica -> service -> report line.

mod common;

use common::{config_for, status_row, FakeCluster, REPLICA_HOST};
use replication_check::domain::LagThresholds;
use replication_check::services::StatusCheckService;
use replication_check::Report;
use std::sync::Arc;

async fn check(cluster: Arc<FakeCluster>) -> Report {
    let service = StatusCheckService::new(cluster, LagThresholds::new(10, 30));
    Report::from(&service.run(&config_for(REPLICA_HOST)).await)
}

fn cluster_with_lag(lag: &str) -> Arc<FakeCluster> {
    let cluster = FakeCluster::new(true);
    cluster.replica.set_status(Some(status_row(&[
        ("Replica_IO_Running", Some("Yes")),
        ("Replica_SQL_Running", Some("Yes")),
        ("Source_Host", Some("db-primary")),
        ("Source_SSL_Allowed", Some("Yes")),
        ("Seconds_Behind_Source", Some(lag)),
    ])));
    Arc::new(cluster)
}

#[tokio::test]
async fn test_lag_over_critical_threshold() {
    let cluster = cluster_with_lag("45");
    let report = check(cluster.clone()).await;

    assert_eq!(
        report.line,
        "IO: Yes, SQL: Yes, Server: db-primary, SSL: Yes, Delay: 45, \
         CRITICAL: Replica replication delay is over the critical delay"
    );
    assert_eq!(report.exit_code(), 2);
    assert_eq!(cluster.open_sessions(), 0);
}

#[tokio::test]
async fn test_lag_over_warning_threshold() {
    let report = check(cluster_with_lag("15")).await;

    assert!(report.line.contains("Delay: 15, WARNING: "));
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_lag_within_thresholds() {
    let report = check(cluster_with_lag("5")).await;

    assert!(report.line.contains("Delay: 5, OK: "));
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_lag_equal_to_critical_is_only_warning() {
    let report = check(cluster_with_lag("30")).await;

    assert!(report.line.contains("WARNING"));
}

#[tokio::test]
async fn test_missing_lag_field_is_error() {
    let cluster = FakeCluster::new(true);
    cluster.replica.set_status(Some(status_row(&[
        ("Replica_IO_Running", Some("Yes")),
        ("Replica_SQL_Running", Some("Yes")),
    ])));
    let cluster = Arc::new(cluster);

    let report = check(cluster.clone()).await;

    assert!(report.line.starts_with("ERROR: lag field missing"));
    assert_eq!(report.exit_code(), 2);
    assert_eq!(cluster.open_sessions(), 0);
}

#[tokio::test]
async fn test_server_without_replication_is_error() {
    let report = check(Arc::new(FakeCluster::new(true))).await;

    assert_eq!(report.line, "ERROR: no replication status available");
    assert_eq!(report.exit_code(), 2);
}

#[tokio::test]
async fn test_legacy_server_column_names() {
    let cluster = FakeCluster::with_replica_version("5.7.44-log");
    cluster.replica.set_status(Some(status_row(&[
        ("Slave_IO_Running", Some("Yes")),
        ("Slave_SQL_Running", Some("No")),
        ("Master_Host", Some("db-primary")),
        ("Seconds_Behind_Master", None),
    ])));

    let report = check(Arc::new(cluster)).await;

    assert_eq!(
        report.line,
        "IO: Yes, SQL: No, Server: db-primary, SSL: No, Delay: NULL, \
         CRITICAL: Replica replication delay is unknown (replication threads not running)"
    );
    assert_eq!(report.exit_code(), 2);
}

#[tokio::test]
async fn test_unreachable_server_is_error() {
    let cluster = Arc::new(FakeCluster::new(true));
    let service = StatusCheckService::new(cluster, LagThresholds::default());

    let report = Report::from(&service.run(&config_for("offline")).await);

    assert!(report
        .line
        .starts_with("ERROR: Cannot connect to the MySQL server:"));
    assert_eq!(report.exit_code(), 2);
}

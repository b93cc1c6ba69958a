//! Integration tests for the directory watcher
//!
//! These tests verify that:
//! - Committed files are deleted
//! - Undecodable files are quarantined with a `.FAILED` suffix
//! - Files whose commit failed in transport stay in place for the next scan,
//!   and their acknowledged transactions are not resent
//! - Files the gateway rejects are quarantined
//! - Both run modes stop on the shutdown signal

use pharmagate::adapters::gateway::MemoryConnector;
use pharmagate::config::{RunMode, WatcherConfig};
use pharmagate::core::commit::{GatewayWriter, TransactionFlags};
use pharmagate::core::dispatch::Dispatcher;
use pharmagate::core::ingest::{DirectoryWatcher, WatchSummary, QUARANTINE_SUFFIX};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;

const STORE: &str = "<Record><Table>Store</Table><Action>Add</Action></Record>";

fn watcher(dir: &Path, gateway: &MemoryConnector, format: &str) -> DirectoryWatcher {
    let writer = Arc::new(GatewayWriter::new(Arc::new(gateway.clone())));
    let dispatcher = Arc::new(Dispatcher::new(writer, TransactionFlags::default()));
    let config = WatcherConfig {
        enabled: true,
        directory: dir.to_string_lossy().to_string(),
        poll_interval_ms: 100,
        run_mode: RunMode::Blocking,
        format: format.to_string(),
    };
    DirectoryWatcher::new(&config, dispatcher).unwrap()
}

fn names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn test_scan_processes_and_quarantines() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a-store.txt"), STORE).unwrap();
    fs::write(dir.path().join("b-garbage.txt"), "hello world").unwrap();
    let gateway = MemoryConnector::new();

    let summary = watcher(dir.path(), &gateway, "auto").scan().unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.quarantined, 1);
    assert_eq!(names(dir.path()), vec![format!("b-garbage.txt{QUARANTINE_SUFFIX}")]);
    assert_eq!(gateway.writes()[0], STORE);
}

#[test]
fn test_quarantined_files_are_not_retried() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.txt"), "hello world").unwrap();
    let gateway = MemoryConnector::new();
    let watcher = watcher(dir.path(), &gateway, "auto");

    assert_eq!(watcher.scan().unwrap().quarantined, 1);
    let second = watcher.scan().unwrap();
    assert_eq!(second.quarantined, 0);
    assert_eq!(second.processed, 0);
    assert_eq!(names(dir.path()), vec!["bad.txt.FAILED".to_string()]);
}

#[test]
fn test_gateway_failure_defers_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("store.txt"), STORE).unwrap();
    let gateway = MemoryConnector::new().failing_at(0);
    let watcher = watcher(dir.path(), &gateway, "auto");

    let first = watcher.scan().unwrap();
    assert_eq!(first.deferred, 1);
    assert_eq!(names(dir.path()), vec!["store.txt".to_string()]);

    // The scripted failure was the first write only
    let second = watcher.scan().unwrap();
    assert_eq!(second.processed, 1);
    assert!(names(dir.path()).is_empty());
}

fn parada_row(rx: &str) -> String {
    let mut cols = vec![""; 26];
    cols[0] = "F1";
    cols[1] = "Sunrise";
    cols[12] = "123456789";
    cols[15] = rx;
    format!("{}~\r\n", cols.join("~"))
}

fn rx_deliveries(gateway: &MemoryConnector, rx: &str) -> usize {
    let tag = format!("<RxSys_RxNum>{rx}</RxSys_RxNum>");
    gateway.writes().iter().filter(|w| w.contains(&tag)).count()
}

#[test]
fn test_retry_does_not_resend_committed_groups() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("parada.txt"),
        [parada_row("1"), parada_row("2")].concat(),
    )
    .unwrap();
    // Batch framing: group 1 is writes 0-1, group 2 starts at write 2
    let gateway = MemoryConnector::new().failing_at(2);
    let watcher = watcher(dir.path(), &gateway, "auto");

    let first = watcher.scan().unwrap();
    assert_eq!(first.deferred, 1);
    assert_eq!(rx_deliveries(&gateway, "1"), 1);
    assert_eq!(rx_deliveries(&gateway, "2"), 0);

    let second = watcher.scan().unwrap();
    assert_eq!(second.processed, 1);
    assert!(names(dir.path()).is_empty());
    assert_eq!(rx_deliveries(&gateway, "1"), 1);
    assert_eq!(rx_deliveries(&gateway, "2"), 1);
}

#[test]
fn test_gateway_rejection_quarantines_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("parada.txt"),
        [parada_row("1"), parada_row("2")].concat(),
    )
    .unwrap();
    let gateway = MemoryConnector::new().rejecting_at(2);
    let watcher = watcher(dir.path(), &gateway, "auto");

    let first = watcher.scan().unwrap();
    assert_eq!(first.quarantined, 1);
    assert_eq!(names(dir.path()), vec!["parada.txt.FAILED".to_string()]);

    let second = watcher.scan().unwrap();
    assert_eq!(
        second,
        WatchSummary {
            scans: 1,
            ..WatchSummary::default()
        }
    );
    assert_eq!(rx_deliveries(&gateway, "1"), 1);
}

#[test]
fn test_format_hint_applies_to_every_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("batch.csv"),
        "F1001,DOE,JANE\nM42,ASPIRIN 81 MG TABLET,TAB,DAILY,,,,,,30,0,01;00;00;00,123456789\n",
    )
    .unwrap();
    let gateway = MemoryConnector::new();

    let summary = watcher(dir.path(), &gateway, "dispill").scan().unwrap();

    assert_eq!(summary.processed, 1);
    assert!(gateway.writes()[0].contains("<Table>Patient</Table>"));
}

#[test]
fn test_missing_directory_is_rejected() {
    let gateway = MemoryConnector::new();
    let writer = Arc::new(GatewayWriter::new(Arc::new(gateway)));
    let dispatcher = Arc::new(Dispatcher::new(writer, TransactionFlags::default()));
    let config = WatcherConfig {
        enabled: true,
        directory: "/nonexistent/pharmagate/inbound".to_string(),
        ..WatcherConfig::default()
    };
    assert!(DirectoryWatcher::new(&config, dispatcher).is_err());
}

#[tokio::test]
async fn test_blocking_mode_stops_on_shutdown() {
    let dir = TempDir::new().unwrap();
    let gateway = MemoryConnector::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = watcher(dir.path(), &gateway, "auto")
        .start(RunMode::Blocking, shutdown_rx)
        .unwrap();
    fs::write(dir.path().join("store.txt"), STORE).unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;

    shutdown_tx.send(true).unwrap();
    let summary = handle.join().await.unwrap();

    assert!(summary.scans >= 1);
    assert_eq!(summary.processed, 1);
    assert!(names(dir.path()).is_empty());
}

#[tokio::test]
async fn test_async_mode_stops_on_shutdown() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("store.txt"), STORE).unwrap();
    let gateway = MemoryConnector::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = watcher(dir.path(), &gateway, "auto")
        .start(RunMode::Async, shutdown_rx)
        .unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    shutdown_tx.send(true).unwrap();
    let summary = handle.join().await.unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(gateway.connections(), 1);
}

#[tokio::test]
async fn test_dropped_sender_stops_watcher() {
    let dir = TempDir::new().unwrap();
    let gateway = MemoryConnector::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = watcher(dir.path(), &gateway, "auto")
        .start(RunMode::Blocking, shutdown_rx)
        .unwrap();
    drop(shutdown_tx);

    let summary = tokio::time::timeout(Duration::from_secs(5), handle.join())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.processed, 0);
}

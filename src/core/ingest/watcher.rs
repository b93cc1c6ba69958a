//! Directory watcher
//!
//! Polls one directory. Every regular file whose name does not contain
//! `.FAILED` is read whole and handed to the [`Dispatcher`]:
//!
//! - committed: the file is deleted
//! - input error or gateway rejection: the file is quarantined as
//!   `<name>.FAILED` and never picked up again
//! - connection, transport or I/O error: the file stays where it is and is
//!   retried on the next scan. Transactions the gateway already acknowledged
//!   are remembered (keyed by path and content digest) and not resent.
//!
//! The loop runs either on a dedicated thread ([`RunMode::Blocking`]) or as
//! a tokio task ([`RunMode::Async`]); both stop cooperatively on the
//! shutdown signal.

use crate::config::{RunMode, WatcherConfig};
use crate::core::dispatch::Dispatcher;
use crate::domain::{InputFormat, PharmaGateError, Result};
use crate::logging::payload;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;
use tokio::sync::watch;

/// Marker that excludes a file from scans
pub const QUARANTINE_SUFFIX: &str = ".FAILED";

/// Slice the blocking loop sleeps in between shutdown checks
const SHUTDOWN_CHECK: Duration = Duration::from_millis(100);

/// Counters for one or more scans
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    /// Directory passes performed
    pub scans: usize,
    /// Files committed and deleted
    pub processed: usize,
    /// Files renamed to `.FAILED`
    pub quarantined: usize,
    /// Files left in place for the next scan
    pub deferred: usize,
}

impl WatchSummary {
    /// Adds another summary's counters
    pub fn merge(&mut self, other: WatchSummary) {
        self.scans += other.scans;
        self.processed += other.processed;
        self.quarantined += other.quarantined;
        self.deferred += other.deferred;
    }
}

/// What happened to one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Processed,
    Quarantined,
    Deferred,
}

/// Transactions of a deferred file that already reached the gateway
#[derive(Debug, Clone)]
struct PartialCommit {
    digest: String,
    committed: usize,
}

/// Polling directory watcher
pub struct DirectoryWatcher {
    directory: PathBuf,
    poll_interval: Duration,
    hint: Option<InputFormat>,
    dispatcher: Arc<Dispatcher>,
    partial: Mutex<HashMap<PathBuf, PartialCommit>>,
}

impl DirectoryWatcher {
    /// Creates a watcher for `config.directory`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the directory does not exist.
    pub fn new(config: &WatcherConfig, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        let directory = PathBuf::from(&config.directory);
        if !directory.is_dir() {
            return Err(PharmaGateError::Configuration(format!(
                "watcher.directory {} is not a directory",
                directory.display()
            )));
        }
        Ok(Self {
            directory,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            hint: config.format_hint(),
            dispatcher,
            partial: Mutex::new(HashMap::new()),
        })
    }

    /// Watched directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Runs one pass over the directory
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be listed. Failures on
    /// individual files are counted, not returned.
    pub fn scan(&self) -> Result<WatchSummary> {
        let mut summary = WatchSummary {
            scans: 1,
            ..WatchSummary::default()
        };

        for path in self.pending_files()? {
            match self.process_file(&path) {
                FileOutcome::Processed => summary.processed += 1,
                FileOutcome::Quarantined => summary.quarantined += 1,
                FileOutcome::Deferred => summary.deferred += 1,
            }
        }

        if summary.processed + summary.quarantined + summary.deferred > 0 {
            tracing::info!(
                directory = %self.directory.display(),
                processed = summary.processed,
                quarantined = summary.quarantined,
                deferred = summary.deferred,
                "Directory scan complete"
            );
        }
        Ok(summary)
    }

    /// Files eligible for processing, in name order
    fn pending_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let quarantined = path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().contains(QUARANTINE_SUFFIX));
            if !quarantined {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn process_file(&self, path: &Path) -> FileOutcome {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not read input file");
                return FileOutcome::Deferred;
            }
        };

        tracing::debug!(path = %path.display(), bytes = raw.len(), "Processing input file");
        let digest = payload::digest(&raw);
        let mut committed = self.resume_point(path, &digest);
        match self
            .dispatcher
            .classify_and_parse_resuming(&raw, self.hint, &mut committed)
        {
            Ok(_) => {
                self.forget(path);
                if let Err(e) = fs::remove_file(path) {
                    tracing::error!(
                        path = %path.display(),
                        error = %e,
                        "Committed input file could not be removed"
                    );
                }
                FileOutcome::Processed
            }
            Err(e) if e.is_input_error() || e.is_gateway_rejection() => {
                self.forget(path);
                if committed > 0 {
                    tracing::warn!(
                        path = %path.display(),
                        committed,
                        "Quarantined input was partially committed"
                    );
                }
                quarantine(path, &e);
                FileOutcome::Quarantined
            }
            Err(e) => {
                if committed > 0 {
                    self.partial_commits()
                        .insert(path.to_path_buf(), PartialCommit { digest, committed });
                } else {
                    self.forget(path);
                }
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    committed,
                    "Input file left for retry"
                );
                FileOutcome::Deferred
            }
        }
    }

    /// Transactions of `path` already acknowledged, if its content is unchanged
    fn resume_point(&self, path: &Path, digest: &str) -> usize {
        match self.partial_commits().get(path) {
            Some(partial) if partial.digest == digest => partial.committed,
            Some(_) => {
                tracing::info!(
                    path = %path.display(),
                    "Input file changed since partial commit, starting over"
                );
                0
            }
            None => 0,
        }
    }

    fn forget(&self, path: &Path) {
        self.partial_commits().remove(path);
    }

    fn partial_commits(&self) -> MutexGuard<'_, HashMap<PathBuf, PartialCommit>> {
        self.partial.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Blocking poll loop; returns when `shutdown` flips to `true` or its
    /// sender is dropped
    pub fn run_blocking(&self, shutdown: &watch::Receiver<bool>) -> WatchSummary {
        tracing::info!(
            directory = %self.directory.display(),
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Directory watcher started (blocking)"
        );
        let mut total = WatchSummary::default();

        while !stop_requested(shutdown) {
            match self.scan() {
                Ok(pass) => total.merge(pass),
                Err(e) => {
                    crate::log_error_with_context!(e, "Directory scan failed");
                }
            }

            let mut slept = Duration::ZERO;
            while slept < self.poll_interval && !stop_requested(shutdown) {
                let step = SHUTDOWN_CHECK.min(self.poll_interval - slept);
                thread::sleep(step);
                slept += step;
            }
        }

        tracing::info!(?total, "Directory watcher stopped");
        total
    }

    /// Async poll loop; each scan runs on the blocking pool
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> WatchSummary {
        tracing::info!(
            directory = %self.directory.display(),
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Directory watcher started (async)"
        );
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut total = WatchSummary::default();

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }
            if *shutdown.borrow() {
                break;
            }

            let watcher = Arc::clone(&self);
            match tokio::task::spawn_blocking(move || watcher.scan()).await {
                Ok(Ok(pass)) => total.merge(pass),
                Ok(Err(e)) => {
                    crate::log_error_with_context!(e, "Directory scan failed");
                }
                Err(e) => tracing::error!(error = %e, "Directory scan task failed"),
            }
        }

        tracing::info!(?total, "Directory watcher stopped");
        total
    }

    /// Starts the watcher in the given mode
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the watcher thread cannot be spawned.
    pub fn start(self, mode: RunMode, shutdown: watch::Receiver<bool>) -> Result<WatcherHandle> {
        match mode {
            RunMode::Blocking => {
                let handle = thread::Builder::new()
                    .name("pharmagate-watcher".to_string())
                    .spawn(move || self.run_blocking(&shutdown))?;
                Ok(WatcherHandle::Thread(handle))
            }
            RunMode::Async => Ok(WatcherHandle::Task(tokio::spawn(
                Arc::new(self).run(shutdown),
            ))),
        }
    }
}

/// A running watcher
#[derive(Debug)]
pub enum WatcherHandle {
    /// Dedicated OS thread
    Thread(thread::JoinHandle<WatchSummary>),
    /// Tokio task
    Task(tokio::task::JoinHandle<WatchSummary>),
}

impl WatcherHandle {
    /// Waits for the watcher to stop and returns its totals
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher thread or task panicked.
    pub async fn join(self) -> Result<WatchSummary> {
        match self {
            WatcherHandle::Thread(handle) => tokio::task::spawn_blocking(move || handle.join())
                .await
                .map_err(|e| PharmaGateError::Other(format!("watcher join failed: {e}")))?
                .map_err(|_| PharmaGateError::Other("watcher thread panicked".to_string())),
            WatcherHandle::Task(handle) => handle
                .await
                .map_err(|e| PharmaGateError::Other(format!("watcher task failed: {e}"))),
        }
    }
}

fn stop_requested(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow() || shutdown.has_changed().is_err()
}

/// `<path>.FAILED`
pub fn quarantine_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(QUARANTINE_SUFFIX);
    path.with_file_name(name)
}

/// Renames `path` to `<path>.FAILED` unless that name is already taken,
/// then removes the original if it is still present
fn quarantine(path: &Path, reason: &PharmaGateError) {
    let target = quarantine_path(path);
    if target.exists() {
        tracing::warn!(
            path = %target.display(),
            "Quarantine file already exists, keeping the earlier one"
        );
    } else if let Err(e) = fs::rename(path, &target) {
        tracing::error!(path = %path.display(), error = %e, "Quarantine rename failed");
    }

    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            tracing::error!(path = %path.display(), error = %e, "Failed input could not be removed");
        }
    }
    crate::log_quarantine!(path, reason);
}

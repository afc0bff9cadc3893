//! # Live Monitor Module
//!
//! Watches a folder and organizes files as they arrive.
//!
//! ## How it works
//! - A non-recursive `notify` watcher reports new files (and files renamed
//!   into the folder, which is how most browsers finish a download)
//! - The watcher callback only forwards paths over a channel; a dedicated
//!   worker thread does the organizing
//! - Before touching a file the worker waits for its size to settle, so a
//!   file that is still being written is never classified half-done
//!
//! ## Example
//! ```rust,ignore
//! use file_organizer::core::monitor::LiveMonitor;
//! use file_organizer::events::EventChannel;
//!
//! let (sender, receiver) = EventChannel::new();
//! let mut monitor = LiveMonitor::new();
//! monitor.start(Path::new("/home/me/Downloads"), false, sender)?;
//!
//! for event in receiver.iter() {
//!     println!("{:?}", event);
//! }
//! ```

use crate::core::classifier::Classifier;
use crate::core::organize::{Attempt, Organizer};
use crate::core::scanner::validate_root;
use crate::error::MonitorError;
use crate::events::{Event, EventSink, FileEvent, MonitorEvent};
use crossbeam_channel::{select, unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event as FsEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Timing for the live monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Wait after a file appears before looking at it
    pub settle_delay: Duration,
    /// Gap between two size readings, and between retries
    pub stability_interval: Duration,
    /// Size readings, and move attempts, before giving up on a file
    pub max_attempts: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(500),
            stability_interval: Duration::from_millis(250),
            max_attempts: 5,
        }
    }
}

impl MonitorConfig {
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn stability_interval(mut self, interval: Duration) -> Self {
        self.stability_interval = interval;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }
}

/// What the watcher callback hands to the worker
enum Notice {
    Arrived(PathBuf),
    WatchError(String),
}

struct Session {
    root: PathBuf,
    // Dropping the watcher ends filesystem notifications
    _watcher: RecommendedWatcher,
    // Never sent on; dropping it tells the worker to stop
    stop_tx: Sender<()>,
    worker: JoinHandle<()>,
    sink: Arc<dyn EventSink>,
}

/// Organizes files dropped into a folder while it is running.
///
/// At most one folder is watched at a time. Dropping the monitor stops it.
pub struct LiveMonitor {
    organizer: Organizer,
    config: MonitorConfig,
    session: Option<Session>,
}

impl Default for LiveMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveMonitor {
    pub fn new() -> Self {
        Self {
            organizer: Organizer::new(),
            config: MonitorConfig::default(),
            session: None,
        }
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom organizer (e.g. one that skips hidden files)
    pub fn with_organizer(mut self, organizer: Organizer) -> Self {
        self.organizer = organizer;
        self
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Folder being watched, while running
    pub fn watched_path(&self) -> Option<&Path> {
        self.session.as_ref().map(|s| s.root.as_path())
    }

    /// Start watching `root`.
    ///
    /// Every processed file is reported to `sink` as a file event. Fails if
    /// the monitor is already running or the folder cannot be watched.
    ///
    /// A sink that is full delays delivery but never delays [`stop`].
    /// Closure sinks must not block.
    ///
    /// [`stop`]: LiveMonitor::stop
    pub fn start(
        &mut self,
        root: &Path,
        date_based: bool,
        sink: impl EventSink + 'static,
    ) -> Result<(), MonitorError> {
        if let Some(session) = &self.session {
            return Err(MonitorError::AlreadyRunning {
                path: session.root.clone(),
            });
        }

        validate_root(root)?;
        // Backends report resolved paths; compare against the same form
        let root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

        let sink: Arc<dyn EventSink> = Arc::new(sink);
        let pending = Arc::new(Mutex::new(HashSet::new()));
        let (notice_tx, notice_rx) = unbounded();
        let (stop_tx, stop_rx) = unbounded();

        let mut watcher = {
            let root = root.clone();
            let pending = Arc::clone(&pending);
            let config = self.organizer.config().clone();

            notify::recommended_watcher(move |result: notify::Result<FsEvent>| match result {
                Ok(event) => {
                    for path in arrivals(&event, &root) {
                        if !config.accepts(&file_name_of(&path)) {
                            continue;
                        }
                        let newly_queued = pending
                            .lock()
                            .map(|mut queued| queued.insert(path.clone()))
                            .unwrap_or(true);
                        if newly_queued {
                            let _ = notice_tx.send(Notice::Arrived(path));
                        }
                    }
                }
                Err(e) => {
                    let _ = notice_tx.send(Notice::WatchError(e.to_string()));
                }
            })
            .map_err(|e| MonitorError::InitFailed(e.to_string()))?
        };

        watcher
            .watch(&root, RecursiveMode::NonRecursive)
            .map_err(|e| MonitorError::WatchFailed {
                path: root.clone(),
                reason: e.to_string(),
            })?;

        let worker = Worker {
            organizer: self.organizer.clone(),
            config: self.config.clone(),
            root: root.clone(),
            date_based,
            sink: Arc::clone(&sink),
            pending,
            stop_rx,
        };
        let handle = thread::Builder::new()
            .name("organizer-monitor".to_string())
            .spawn(move || worker.run(notice_rx))
            .map_err(MonitorError::WorkerSpawn)?;

        tracing::info!(path = %root.display(), date_based, "monitor started");
        let started = Event::Monitor(MonitorEvent::Started {
            path: root.clone(),
            date_based,
        });
        if sink.on_event_within(started, self.config.settle_delay).is_some() {
            tracing::debug!(path = %root.display(), "sink full, started event dropped");
        }

        self.session = Some(Session {
            root,
            _watcher: watcher,
            stop_tx,
            worker: handle,
            sink,
        });
        Ok(())
    }

    /// Stop watching. Does nothing when not running.
    ///
    /// Returns once the worker has finished; no file event is delivered
    /// after that. A move already under way is completed, not rolled back.
    pub fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        let Session {
            root,
            _watcher,
            stop_tx,
            worker,
            sink,
        } = session;

        drop(_watcher);
        drop(stop_tx);
        if worker.join().is_err() {
            tracing::error!(path = %root.display(), "monitor worker panicked");
        }

        tracing::info!(path = %root.display(), "monitor stopped");
        let stopped = Event::Monitor(MonitorEvent::Stopped { path: root.clone() });
        if sink.on_event_within(stopped, Duration::ZERO).is_some() {
            tracing::debug!(path = %root.display(), "sink full, stopped event dropped");
        }
    }
}

impl Drop for LiveMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Regular files that just appeared directly under `root`
fn arrivals(event: &FsEvent, root: &Path) -> Vec<PathBuf> {
    let candidates: Vec<&PathBuf> = match event.kind {
        EventKind::Create(CreateKind::File) | EventKind::Create(CreateKind::Any) => {
            event.paths.iter().collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To))
        | EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => event.paths.iter().collect(),
        // (from, to)
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.get(1).into_iter().collect()
        }
        _ => Vec::new(),
    };

    candidates
        .into_iter()
        .filter(|path| path.parent() == Some(root))
        .filter(|path| {
            fs::symlink_metadata(path)
                .map(|m| m.file_type().is_file())
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// How waiting for a file to finish being written ended
enum Settled {
    Stable,
    StillChanging,
    Gone,
    Stopped,
}

/// Runs on the monitor thread; owns everything it touches
struct Worker {
    organizer: Organizer,
    config: MonitorConfig,
    root: PathBuf,
    date_based: bool,
    sink: Arc<dyn EventSink>,
    pending: Arc<Mutex<HashSet<PathBuf>>>,
    stop_rx: Receiver<()>,
}

impl Worker {
    fn run(self, notices: Receiver<Notice>) {
        loop {
            select! {
                recv(self.stop_rx) -> _ => break,
                recv(notices) -> notice => match notice {
                    Ok(Notice::Arrived(path)) => {
                        let event = self.handle(&path);
                        // The same name may arrive again once this one is moved
                        if let Ok(mut queued) = self.pending.lock() {
                            queued.remove(&path);
                        }
                        if let Some(event) = event {
                            self.deliver(Event::File(event));
                        }
                    }
                    Ok(Notice::WatchError(message)) => {
                        tracing::warn!(error = %message, "watcher reported an error");
                        self.deliver(Event::Monitor(MonitorEvent::Error { message }));
                    }
                    Err(_) => break,
                },
            }
        }
    }

    fn handle(&self, path: &Path) -> Option<FileEvent> {
        match self.wait_until_stable(path) {
            Settled::Stopped => None,
            Settled::Stable => self.organize_with_retry(path),
            // Usually a temporary download file renamed to its final name
            Settled::Gone => {
                tracing::debug!(path = %path.display(), "file vanished before it settled");
                None
            }
            Settled::StillChanging => {
                tracing::warn!(path = %path.display(), "file kept changing, giving up");
                let category = Classifier::new().classify(path);
                Some(FileEvent::failed(
                    path,
                    category,
                    format!(
                        "File was still being written after {} checks",
                        self.config.max_attempts
                    ),
                ))
            }
        }
    }

    /// Poll the size until two consecutive readings agree
    fn wait_until_stable(&self, path: &Path) -> Settled {
        if !self.pause(self.config.settle_delay) {
            return Settled::Stopped;
        }

        let mut previous = None;
        for _ in 0..self.config.max_attempts.max(1) {
            let size = match fs::metadata(path) {
                Ok(metadata) => metadata.len(),
                Err(_) => return Settled::Gone,
            };
            if previous == Some(size) {
                return Settled::Stable;
            }
            previous = Some(size);

            if !self.pause(self.config.stability_interval) {
                return Settled::Stopped;
            }
        }
        Settled::StillChanging
    }

    /// Organize `path`, retrying transient I/O failures.
    /// `None` means the monitor was stopped while waiting to retry.
    fn organize_with_retry(&self, path: &Path) -> Option<FileEvent> {
        retry_transient(
            self.config.max_attempts,
            || self.organizer.attempt(&self.root, path, self.date_based),
            |attempt| {
                tracing::debug!(path = %path.display(), attempt, "move failed, retrying");
                self.pause(self.config.stability_interval)
            },
        )
        .map(|outcome| outcome.into_event(path))
    }

    /// Sleep for `duration`; false if the monitor was stopped meanwhile
    fn pause(&self, duration: Duration) -> bool {
        matches!(
            self.stop_rx.recv_timeout(duration),
            Err(RecvTimeoutError::Timeout)
        )
    }

    fn is_stopped(&self) -> bool {
        matches!(self.stop_rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Hand `event` to the sink unless the monitor has been stopped.
    /// A full sink is retried in short slices so `stop` is never held up.
    fn deliver(&self, event: Event) {
        let slice = self.config.stability_interval.max(MIN_DELIVERY_SLICE);
        let mut event = event;
        while !self.is_stopped() {
            match self.sink.on_event_within(event, slice) {
                None => return,
                Some(returned) => event = returned,
            }
        }
        tracing::debug!("monitor stopped, event not delivered");
    }
}

const MIN_DELIVERY_SLICE: Duration = Duration::from_millis(10);

/// Call `try_once` until it succeeds, fails for good, or has run
/// `max_attempts` times. Only transient errors are retried.
///
/// `wait` runs between attempts with the number of the attempt that just
/// failed; returning false abandons the file and yields `None`.
fn retry_transient(
    max_attempts: u32,
    mut try_once: impl FnMut() -> Attempt,
    mut wait: impl FnMut(u32) -> bool,
) -> Option<Attempt> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let outcome = try_once();
        let transient = matches!(&outcome.result, Err(e) if e.is_transient());
        if !transient || attempt >= max_attempts {
            return Some(outcome);
        }
        if !wait(attempt) {
            return None;
        }
        attempt += 1;
    }
}

//! Batch organizer: classify, resolve, prepare and move every top-level file.

use super::types::{OrganizerConfig, RunStatistics};
use crate::core::classifier::{Category, Classifier};
use crate::core::mover::{move_file, MoveOutcome};
use crate::core::resolver::{DestinationResolver, OrganizationPlan};
use crate::core::scanner::{scan_root, FileEntry, ScanConfig};
use crate::error::{MoveError, PathError};
use crate::events::{null_sink, Event, EventSink, FileEvent, RunEvent};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

/// Sorts the files of a folder into category subfolders.
///
/// Holds no per-run state, so one organizer can serve many runs and
/// threads.
#[derive(Debug, Clone, Default)]
pub struct Organizer {
    classifier: Classifier,
    config: OrganizerConfig,
}

/// One attempt at organizing a file, before it is turned into an event
pub(crate) struct Attempt {
    pub category: Category,
    pub size: u64,
    pub result: Result<MoveOutcome, MoveError>,
}

impl Attempt {
    pub(crate) fn into_event(self, path: &Path) -> FileEvent {
        match self.result {
            Ok(outcome) => FileEvent::moved(
                path,
                self.category,
                self.size,
                outcome.destination,
                outcome.cross_volume,
            ),
            Err(e) => FileEvent::failed(path, self.category, e.to_string()),
        }
    }
}

impl Organizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OrganizerConfig) -> Self {
        Self {
            classifier: Classifier::new(),
            config,
        }
    }

    pub fn config(&self) -> &OrganizerConfig {
        &self.config
    }

    /// Organize `root` and return the run statistics
    pub fn organize(&self, root: &Path, date_based: bool) -> Result<RunStatistics, PathError> {
        self.organize_with_events(root, date_based, &null_sink())
    }

    /// Organize `root`, reporting every step to `sink`.
    ///
    /// Only an invalid root fails the run. Problems with individual files
    /// are reported as failed file events and counted.
    pub fn organize_with_events(
        &self,
        root: &Path,
        date_based: bool,
        sink: &dyn EventSink,
    ) -> Result<RunStatistics, PathError> {
        let start = Instant::now();
        let entries = scan_root(root, &self.scan_config())?;

        let run_id = Uuid::new_v4();
        tracing::info!(
            %run_id,
            root = %root.display(),
            date_based,
            files = entries.len(),
            "organize run started"
        );
        sink.on_event(Event::Run(RunEvent::Started {
            run_id,
            root: root.to_path_buf(),
            date_based,
        }));

        let resolver = DestinationResolver::new(root);
        let mut stats = RunStatistics::new();

        for entry in &entries {
            let event = self.organize_entry(&resolver, entry, date_based).into_event(&entry.path);
            stats.record(&event);
            sink.on_event(Event::File(event));
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            %run_id,
            moved = stats.files_moved,
            failed = stats.failures,
            duration_ms = stats.duration_ms,
            "organize run completed"
        );
        sink.on_event(Event::Run(RunEvent::Completed {
            run_id,
            stats: stats.clone(),
        }));

        Ok(stats)
    }

    /// Work out where every file would go, without creating or moving anything.
    ///
    /// Two files that would collide with each other get distinct targets,
    /// exactly as a real run would give them.
    pub fn preview(&self, root: &Path, date_based: bool) -> Result<Vec<OrganizationPlan>, PathError> {
        let entries = scan_root(root, &self.scan_config())?;
        let resolver = DestinationResolver::new(root);
        let mut reserved = HashSet::new();

        let plans = entries
            .iter()
            .map(|entry| {
                let category = self.classifier.classify(&entry.path);
                let plan = resolver.plan_avoiding(entry, category, date_based, &reserved);
                reserved.insert(plan.destination());
                plan
            })
            .collect();

        Ok(plans)
    }

    /// Organize a single file that sits directly under `root`
    pub fn process_file(&self, root: &Path, path: &Path, date_based: bool) -> FileEvent {
        self.attempt(root, path, date_based).into_event(path)
    }

    pub(crate) fn attempt(&self, root: &Path, path: &Path, date_based: bool) -> Attempt {
        match FileEntry::from_path(path) {
            Ok(entry) => self.organize_entry(&DestinationResolver::new(root), &entry, date_based),
            Err(e) => Attempt {
                category: self.classifier.classify(path),
                size: 0,
                result: Err(if e.kind() == std::io::ErrorKind::NotFound {
                    MoveError::SourceVanished {
                        path: path.to_path_buf(),
                    }
                } else {
                    MoveError::Io {
                        path: path.to_path_buf(),
                        source: e,
                    }
                }),
            },
        }
    }

    fn organize_entry(
        &self,
        resolver: &DestinationResolver,
        entry: &FileEntry,
        date_based: bool,
    ) -> Attempt {
        let category = self.classifier.classify(&entry.path);
        let target_dir = resolver.resolve(entry, category, date_based);

        let result = ensure_present(&entry.path)
            .and_then(|()| resolver.prepare(&target_dir))
            .and_then(|()| move_file(&entry.path, &target_dir));

        match &result {
            Ok(outcome) => tracing::debug!(
                path = %entry.path.display(),
                dest = %outcome.destination.display(),
                %category,
                "file organized"
            ),
            Err(e) => tracing::warn!(
                path = %entry.path.display(),
                %category,
                error = %e,
                "failed to organize file"
            ),
        }

        Attempt {
            category,
            size: entry.size,
            result,
        }
    }

    fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            include_hidden: self.config.include_hidden,
        }
    }
}

/// Fail early for a file that is already gone, so no empty folder is
/// created on its behalf.
fn ensure_present(path: &Path) -> Result<(), MoveError> {
    fs::symlink_metadata(path)
        .map(|_| ())
        .map_err(|_| MoveError::SourceVanished {
            path: path.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, content: &[u8]) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn organizes_by_type() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "cat.jpg", b"meow");
        touch(dir.path(), "notes.txt", b"todo");
        touch(dir.path(), "main.rs", b"fn main() {}");
        touch(dir.path(), "mystery.zzz", b"???");

        let stats = Organizer::new().organize(dir.path(), false).unwrap();

        assert_eq!(stats.files_moved, 4);
        assert_eq!(stats.failures, 0);
        assert!(dir.path().join("Images/cat.jpg").exists());
        assert!(dir.path().join("Documents/notes.txt").exists());
        assert!(dir.path().join("Code/main.rs").exists());
        assert!(dir.path().join("Other/mystery.zzz").exists());
        assert_eq!(stats.moved_into(Category::Images), 1);
    }

    #[test]
    fn subfolders_are_left_alone() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("projects")).unwrap();
        touch(&dir.path().join("projects"), "deep.txt", b"x");

        let stats = Organizer::new().organize(dir.path(), false).unwrap();

        assert_eq!(stats.files_processed(), 0);
        assert!(dir.path().join("projects/deep.txt").exists());
    }

    #[test]
    fn events_bracket_the_run() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.mp3", b"ID3\x03\x00");
        touch(dir.path(), "b.zip", b"PK\x03\x04");

        let (sender, receiver) = EventChannel::new();
        let stats = Organizer::new()
            .organize_with_events(dir.path(), false, &sender)
            .unwrap();
        drop(sender);

        let events: Vec<Event> = receiver.iter().collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], Event::Run(RunEvent::Started { .. })));
        assert!(matches!(events[3], Event::Run(RunEvent::Completed { .. })));

        let mut replayed = RunStatistics::new();
        for event in &events {
            if let Event::File(file) = event {
                replayed.record(file);
            }
        }
        assert_eq!(replayed.files_moved, stats.files_moved);
        assert_eq!(replayed.by_category, stats.by_category);
    }

    #[test]
    fn hidden_files_respect_config() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), ".hidden.txt", b"x");

        let organizer = Organizer::with_config(OrganizerConfig::new().include_hidden(false));
        let stats = organizer.organize(dir.path(), false).unwrap();

        assert_eq!(stats.files_processed(), 0);
        assert!(dir.path().join(".hidden.txt").exists());
    }

    #[test]
    fn preview_changes_nothing() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.png", b"x");
        touch(dir.path(), "b.pdf", b"x");

        let plans = Organizer::new().preview(dir.path(), false).unwrap();

        assert_eq!(plans.len(), 2);
        assert!(dir.path().join("a.png").exists());
        assert!(!dir.path().join("Images").exists());
        assert!(!dir.path().join("Documents").exists());
    }

    #[test]
    fn preview_keeps_targets_distinct() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("Images")).unwrap();
        touch(&dir.path().join("Images"), "a.png", b"old");
        touch(dir.path(), "a.png", b"new");

        let plans = Organizer::new().preview(dir.path(), false).unwrap();

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].destination_name, "a_1.png");
    }

    #[test]
    fn process_file_reports_vanished_file() {
        let dir = TempDir::new().unwrap();
        let ghost = dir.path().join("ghost.mp4");

        let event = Organizer::new().process_file(dir.path(), &ghost, false);

        assert!(!event.is_success());
        assert_eq!(event.category, Category::Videos);
        assert!(event.detail.is_some());
        assert!(!dir.path().join("Videos").exists());
    }

    #[test]
    fn process_file_moves_one_file() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "clip.mkv", b"\x1a\x45\xdf\xa3rest");

        let event = Organizer::new().process_file(dir.path(), &dir.path().join("clip.mkv"), false);

        assert!(event.is_success());
        assert_eq!(event.destination(), Some(dir.path().join("Videos/clip.mkv").as_path()));
    }
}

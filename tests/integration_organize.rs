use chrono::{Local, TimeZone};
use file_organizer::core::classifier::Category;
use file_organizer::core::organize::{Organizer, RunStatistics};
use file_organizer::error::PathError;
use file_organizer::events::{Event, FileEvent};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::SystemTime;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &[u8]) {
    fs::write(dir.join(name), content).unwrap();
}

fn top_level_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_mixed_downloads_folder() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(root, "holiday.jpg", b"\xff\xd8\xff\xe0\x00\x10JFIF");
    write(root, "invoice.pdf", b"%PDF-1.4\n");
    write(root, "trailer.mp4", b"\x00\x00\x00\x20ftypisom\x00\x00\x02\x00");
    write(root, "podcast.mp3", b"ID3\x03\x00\x00");
    write(root, "backup.tar.gz", b"\x1f\x8b\x08\x00");
    write(root, "script.py", b"print('hi')\n");
    write(root, "unknown.bin", b"\x00\x01\x02\x03");
    // Misleading extension: a PNG saved as .txt
    write(root, "screenshot.txt", b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR");

    let stats = Organizer::new().organize(root, false).unwrap();

    assert_eq!(stats.files_moved, 8);
    assert_eq!(stats.failures, 0);
    assert!(root.join("Images/holiday.jpg").exists());
    assert!(root.join("Images/screenshot.txt").exists());
    assert!(root.join("Documents/invoice.pdf").exists());
    assert!(root.join("Videos/trailer.mp4").exists());
    assert!(root.join("Audio/podcast.mp3").exists());
    assert!(root.join("Archives/backup.tar.gz").exists());
    assert!(root.join("Code/script.py").exists());
    assert!(root.join("Other/unknown.bin").exists());
    assert_eq!(stats.moved_into(Category::Images), 2);
    assert!(top_level_files(root).is_empty());
}

#[test]
fn test_second_run_moves_nothing() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.png", b"x");
    write(temp.path(), "b.docx", b"PK\x03\x04");

    let organizer = Organizer::new();
    let first = organizer.organize(temp.path(), false).unwrap();
    let second = organizer.organize(temp.path(), false).unwrap();

    assert_eq!(first.files_moved, 2);
    assert_eq!(second.files_moved, 0);
    assert_eq!(second.failures, 0);
    assert!(temp.path().join("Documents/b.docx").exists());
}

#[test]
fn test_collision_gets_suffix() {
    let temp = TempDir::new().unwrap();
    let documents = temp.path().join("Documents");
    fs::create_dir(&documents).unwrap();
    write(&documents, "a.txt", b"first");
    write(temp.path(), "a.txt", b"second");

    let stats = Organizer::new().organize(temp.path(), false).unwrap();

    assert_eq!(stats.files_moved, 1);
    assert_eq!(fs::read(documents.join("a.txt")).unwrap(), b"first");
    assert_eq!(fs::read(documents.join("a_1.txt")).unwrap(), b"second");
}

#[test]
fn test_only_needed_folders_are_created() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "one.png", b"x");
    write(temp.path(), "two.gif", b"GIF89a");

    Organizer::new().organize(temp.path(), false).unwrap();

    let mut folders: Vec<String> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    folders.sort();
    assert_eq!(folders, vec!["Images"]);
}

#[test]
fn test_file_deleted_mid_run_is_a_single_failure() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();
    for i in 1..=5 {
        write(&root, &format!("file{}.txt", i), b"content");
    }

    // As soon as the first file is done, delete one that is still waiting
    let deleted = AtomicBool::new(false);
    let sink_root = root.clone();
    let sink = move |event: Event| {
        if let Event::File(_) = event {
            if !deleted.swap(true, Ordering::SeqCst) {
                let waiting = top_level_files(&sink_root);
                fs::remove_file(sink_root.join(&waiting[0])).unwrap();
            }
        }
    };

    let stats = Organizer::new()
        .organize_with_events(&root, false, &sink)
        .unwrap();

    assert_eq!(stats.files_moved, 4);
    assert_eq!(stats.failures, 1);
    assert_eq!(fs::read_dir(root.join("Documents")).unwrap().count(), 4);
}

#[test]
fn test_date_mode_uses_modification_time() {
    let temp = TempDir::new().unwrap();
    let photo = temp.path().join("beach.jpg");
    fs::write(&photo, b"\xff\xd8\xff\xe1").unwrap();

    let june: SystemTime = Local
        .with_ymd_and_hms(2023, 6, 15, 10, 30, 0)
        .unwrap()
        .into();
    fs::File::options()
        .write(true)
        .open(&photo)
        .unwrap()
        .set_modified(june)
        .unwrap();

    let stats = Organizer::new().organize(temp.path(), true).unwrap();

    assert_eq!(stats.files_moved, 1);
    assert!(temp.path().join("Images/2023/06/beach.jpg").exists());
}

#[test]
fn test_invalid_root_is_an_error() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("not-a-folder.txt");
    fs::write(&file, b"x").unwrap();

    let organizer = Organizer::new();
    assert!(matches!(
        organizer.organize(&temp.path().join("missing"), false),
        Err(PathError::NotFound { .. })
    ));
    assert!(matches!(
        organizer.organize(&file, false),
        Err(PathError::NotADirectory { .. })
    ));
}

#[test]
fn test_recorded_events_match_returned_statistics() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.wav", b"RIFF\x24\x00\x00\x00WAVEfmt ");
    write(temp.path(), "b.zip", b"PK\x03\x04");
    write(temp.path(), "c.css", b"body {}");

    let seen: Mutex<Vec<FileEvent>> = Mutex::new(Vec::new());
    let sink = |event: Event| {
        if let Event::File(file) = event {
            seen.lock().unwrap().push(file);
        }
    };
    let stats = Organizer::new()
        .organize_with_events(temp.path(), false, &sink)
        .unwrap();

    let mut replayed = RunStatistics::new();
    for file in seen.lock().unwrap().iter() {
        replayed.record(file);
    }
    assert_eq!(replayed.files_moved, stats.files_moved);
    assert_eq!(replayed.failures, stats.failures);
    assert_eq!(replayed.by_category, stats.by_category);
    assert_eq!(replayed.bytes_moved, stats.bytes_moved);
}

#[test]
fn test_preview_then_organize_agree() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.md", b"# notes");
    write(temp.path(), "b.flac", b"fLaC\x00");

    let organizer = Organizer::new();
    let mut planned: Vec<_> = organizer
        .preview(temp.path(), false)
        .unwrap()
        .iter()
        .map(|plan| plan.destination())
        .collect();
    planned.sort();

    assert!(!temp.path().join("Documents").exists());
    organizer.organize(temp.path(), false).unwrap();

    for destination in &planned {
        assert!(destination.exists(), "{} should exist", destination.display());
    }
}

use file_organizer::core::classifier::Category;
use file_organizer::core::monitor::{LiveMonitor, MonitorConfig};
use file_organizer::core::organize::RunStatistics;
use file_organizer::events::{Event, EventChannel, EventReceiver, FileEvent};
use std::fs;
use std::io::Write;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn quick_monitor() -> LiveMonitor {
    LiveMonitor::new().with_config(
        MonitorConfig::default()
            .settle_delay(Duration::from_millis(300))
            .stability_interval(Duration::from_millis(150))
            .max_attempts(10),
    )
}

fn collect_file_events(receiver: &EventReceiver, expected: usize) -> Vec<FileEvent> {
    let mut files = Vec::new();
    while files.len() < expected {
        match receiver.recv_timeout(Duration::from_secs(10)) {
            Some(Event::File(file)) => files.push(file),
            Some(_) => {}
            None => break,
        }
    }
    files
}

#[test]
fn test_monitor_organizes_several_arrivals() {
    let temp = TempDir::new().unwrap();
    let (sender, receiver) = EventChannel::new();
    let mut monitor = quick_monitor();
    monitor.start(temp.path(), false, sender).unwrap();

    fs::write(temp.path().join("report.pdf"), b"%PDF-1.7\n").unwrap();
    fs::write(temp.path().join("theme.ogg"), b"OggS\x00\x02").unwrap();

    let files = collect_file_events(&receiver, 2);
    monitor.stop();

    assert_eq!(files.len(), 2);
    assert!(files.iter().all(FileEvent::is_success));

    let mut stats = RunStatistics::new();
    for file in &files {
        stats.record(file);
    }
    assert_eq!(stats.moved_into(Category::Documents), 1);
    assert_eq!(stats.moved_into(Category::Audio), 1);
    assert!(temp.path().join("Documents/report.pdf").exists());
    assert!(temp.path().join("Audio/theme.ogg").exists());
}

#[test]
fn test_monitor_waits_for_slow_writer() {
    let temp = TempDir::new().unwrap();
    let (sender, receiver) = EventChannel::new();
    let mut monitor = quick_monitor();
    monitor.start(temp.path(), false, sender).unwrap();

    // The ZIP signature only appears once the second chunk lands
    let path = temp.path().join("bundle");
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(b"P").unwrap();
    file.flush().unwrap();
    thread::sleep(Duration::from_millis(100));
    file.write_all(b"K\x03\x04\x14\x00").unwrap();
    drop(file);

    let files = collect_file_events(&receiver, 1);
    monitor.stop();

    assert_eq!(files.len(), 1);
    assert!(files[0].is_success());
    assert_eq!(files[0].category, Category::Archives);
    assert!(temp.path().join("Archives/bundle").exists());
}

#[test]
fn test_monitor_date_mode() {
    let temp = TempDir::new().unwrap();
    let (sender, receiver) = EventChannel::new();
    let mut monitor = quick_monitor();
    monitor.start(temp.path(), true, sender).unwrap();

    fs::write(temp.path().join("photo.png"), b"\x89PNG\r\n\x1a\n").unwrap();

    let files = collect_file_events(&receiver, 1);
    monitor.stop();

    let destination = files[0].destination().unwrap();
    // <root>/Images/<YYYY>/<MM>/photo.png
    let month = destination.parent().unwrap();
    let year = month.parent().unwrap();
    assert_eq!(year.parent().unwrap().file_name().unwrap(), "Images");
    assert_eq!(month.file_name().unwrap().len(), 2);
    assert_eq!(year.file_name().unwrap().len(), 4);
}

#[test]
fn test_monitor_can_restart() {
    let temp = TempDir::new().unwrap();
    let mut monitor = quick_monitor();

    monitor.start(temp.path(), false, |_: Event| {}).unwrap();
    monitor.stop();
    assert!(!monitor.is_running());

    let (sender, receiver) = EventChannel::new();
    monitor.start(temp.path(), false, sender).unwrap();
    assert!(monitor.watched_path().is_some());

    fs::write(temp.path().join("main.go"), b"package main\n").unwrap();
    let files = collect_file_events(&receiver, 1);
    monitor.stop();

    assert_eq!(files.len(), 1);
    assert!(temp.path().join("Code/main.go").exists());
}

//! File watching for live re-conversion.
//!
//! Uses notify crate for cross-platform file system events.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{trace, warn};

use crate::editor::Debouncer;

/// Watches a single file and emits debounced change notifications.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    target_path: PathBuf,
    target_name: Option<OsString>,
    debouncer: Debouncer,
}

impl FileWatcher {
    /// Create a watcher for `path` that settles after `debounce_ms`.
    ///
    /// # Errors
    /// Returns an error if the file watcher cannot be created or the path cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce_ms: u64) -> notify::Result<Self> {
        // Event paths from the OS are canonical.
        let target_path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let target_name = target_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&target_path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            target_path,
            target_name,
            debouncer: Debouncer::new(debounce_ms),
        })
    }

    /// The canonical path of the file being watched.
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Drain pending events; returns true once a debounced change is ready.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let mut relevant = 0u32;
        let mut irrelevant = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => relevant += 1,
                Ok(ev) => {
                    irrelevant += 1;
                    trace!(kind = ?ev.kind, paths = ?ev.paths, "watcher: irrelevant event");
                }
                Err(err) => warn!(%err, "watcher error"),
            }
        }

        if relevant + irrelevant > 0 {
            trace!(
                relevant,
                irrelevant,
                target = %self.target_path.display(),
                root = %self.watch_root.display(),
                "watcher poll"
            );
        }
        if relevant > 0 {
            self.debouncer.touch(now_ms);
        }
        self.debouncer.take_ready(now_ms)
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.watch_root
                || path == &self.target_path
                || self
                    .target_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    fn event_for(path: PathBuf) -> Event {
        Event {
            kind: EventKind::Any,
            paths: vec![path],
            attrs: notify::event::EventAttributes::new(),
        }
    }

    #[test]
    fn test_directory_level_event_is_relevant_for_watched_file() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("doc.md");
        std::fs::write(&path, "hi").expect("write");
        let watcher = FileWatcher::new(&path, 10).expect("watcher");

        assert!(watcher.is_relevant(&event_for(canonical_dir)));
    }

    #[test]
    fn test_sibling_file_event_is_irrelevant() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("doc.md");
        std::fs::write(&path, "hi").expect("write");
        let watcher = FileWatcher::new(&path, 10).expect("watcher");

        assert!(!watcher.is_relevant(&event_for(canonical_dir.join("other.md"))));
    }

    #[test]
    fn test_watch_root_for_relative_file_is_dot() {
        let root = watch_root_for(Path::new("notes.md"));
        assert_eq!(root, PathBuf::from("."));
    }

    #[test]
    fn test_canonical_event_path_matches_relative_watcher() {
        let dir = tempdir().expect("tempdir");
        let relative_path = dir.path().join("page.html");
        std::fs::write(&relative_path, "<p>x</p>").expect("write");
        let watcher = FileWatcher::new(&relative_path, 10).expect("watcher");

        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        assert!(watcher.is_relevant(&event_for(canonical_dir)));
    }

    /// Same debounce and poll interval as the CLI watch loop.
    #[test]
    fn test_real_modification_with_cli_timing() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("watched.md");
        std::fs::write(&path, "original").expect("write");

        let mut watcher = FileWatcher::new(&path, 200).expect("watcher");
        std::thread::sleep(Duration::from_millis(500));
        std::fs::write(&path, "# modified").expect("write");

        let start = Instant::now();
        let deadline = start + Duration::from_secs(5);
        let mut detected = false;
        while Instant::now() < deadline {
            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            if watcher.poll(now_ms) {
                detected = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(250));
        }

        assert!(detected, "watcher should detect modification within 5 seconds");
    }
}

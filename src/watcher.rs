//! File system watcher for `--watch` rebuilds

use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

const DEBOUNCE_MS: u64 = 300;

/// Watches the data file (and optionally a config file) and reports changes
pub struct DatasetWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<notify::Event>>,
    targets: Vec<PathBuf>,
}

fn is_create_or_modify(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

/// Canonical form when the file exists, so event paths compare equal
fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

impl DatasetWatcher {
    /// Start watching the given files. Their parent directories are watched
    /// so editors that replace files on save are still picked up.
    pub fn watch(files: &[&Path]) -> notify::Result<Self> {
        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default().with_poll_interval(Duration::from_millis(DEBOUNCE_MS)),
        )?;

        let targets: Vec<PathBuf> = files.iter().map(|p| normalize(p)).collect();
        let mut dirs = HashSet::new();
        for target in &targets {
            let dir = match target.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            if dirs.insert(dir.clone()) {
                watcher.watch(&dir, RecursiveMode::NonRecursive)?;
                tracing::debug!(dir = %dir.display(), "watching");
            }
        }

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            targets,
        })
    }

    /// Files being watched, normalized
    pub fn targets(&self) -> &[PathBuf] {
        &self.targets
    }

    /// Whether a path from an event is one of the watched files
    pub fn is_target(&self, path: &Path) -> bool {
        let path = normalize(path);
        self.targets.iter().any(|t| *t == path)
    }

    fn paths_from_event(&self, event: &notify::Event) -> Vec<PathBuf> {
        if !is_create_or_modify(&event.kind) {
            return vec![];
        }
        event
            .paths
            .iter()
            .filter(|p| self.is_target(p))
            .cloned()
            .collect()
    }

    /// Wait for the next batch of changes (debounced). Blocks until a watched
    /// file changes, then drains further events for DEBOUNCE_MS.
    /// Returns an empty list when the channel closes.
    pub fn next_changes(&self) -> Vec<PathBuf> {
        let mut all = HashSet::new();

        loop {
            match self.receiver.recv() {
                Ok(Ok(event)) => {
                    all.extend(self.paths_from_event(&event));
                    if !all.is_empty() {
                        break;
                    }
                }
                Ok(Err(e)) => tracing::warn!(error = %e, "watch error"),
                Err(_) => return vec![],
            }
        }

        std::thread::sleep(Duration::from_millis(DEBOUNCE_MS));
        while let Ok(ev) = self.receiver.try_recv() {
            if let Ok(event) = ev {
                all.extend(self.paths_from_event(&event));
            }
        }

        all.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, ModifyKind, RemoveKind};
    use std::fs;
    use tempfile::TempDir;

    fn event(kind: EventKind, paths: Vec<PathBuf>) -> notify::Event {
        notify::Event {
            kind,
            paths,
            attrs: Default::default(),
        }
    }

    #[test]
    fn test_is_create_or_modify() {
        assert!(is_create_or_modify(&EventKind::Create(CreateKind::File)));
        assert!(is_create_or_modify(&EventKind::Modify(ModifyKind::Data(
            DataChange::Content
        ))));
        assert!(!is_create_or_modify(&EventKind::Remove(RemoveKind::File)));
    }

    #[test]
    fn test_only_watched_files_are_reported() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data.js");
        let other = dir.path().join("notes.txt");
        fs::write(&data, "window.emailData = {};").unwrap();
        fs::write(&other, "x").unwrap();

        let watcher = DatasetWatcher::watch(&[&data]).unwrap();
        let modify = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            vec![data.clone(), other.clone()],
        );
        let paths = watcher.paths_from_event(&modify);
        assert_eq!(paths, vec![data.clone()]);

        let removed = event(EventKind::Remove(RemoveKind::File), vec![data]);
        assert!(watcher.paths_from_event(&removed).is_empty());
    }

    #[test]
    fn test_watch_data_and_config_in_different_dirs() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("exports");
        fs::create_dir_all(&data_dir).unwrap();
        let data = data_dir.join("data.json");
        let config = dir.path().join(".maildashrc.json");
        fs::write(&data, "{}").unwrap();
        fs::write(&config, "{}").unwrap();

        let watcher = DatasetWatcher::watch(&[&data, &config]).unwrap();
        assert_eq!(watcher.targets().len(), 2);
        assert!(watcher.is_target(&config));
        assert!(!watcher.is_target(&dir.path().join("other.json")));
    }
}

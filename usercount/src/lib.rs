//! Unique-user counter shared by every request handler.
//!
//! State lives in a flat JSON file next to the bot:
//!
//! ```json
//! {
//!   "total_users": 2,
//!   "unique_users": [17, 42],
//!   "first_start": "01.12.2025"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

pub type UserId = u64;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot encode stats: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Outcome of recording one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    pub is_new: bool,
    pub total: usize,
}

pub trait UserCounter: Send + Sync {
    fn has_seen(&self, id: UserId) -> bool;

    /// Adds `id` if unseen and persists; returns the unique-user total.
    fn record_seen(&self, id: UserId) -> Result<Visit, StatsError>;

    fn unique_count(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub total_users: u64,
    pub unique_users: BTreeSet<UserId>,
    pub first_start: String,
}

impl Snapshot {
    fn fresh() -> Snapshot {
        Snapshot {
            total_users: 0,
            unique_users: BTreeSet::new(),
            first_start: chrono::Local::now().format("%d.%m.%Y").to_string(),
        }
    }

    pub fn render_summary(&self) -> String {
        format!(
            "Статистика:\nУникальных: <b>{}</b>\nВсего взаимодействий: <b>{}</b>\nЗапущен: {}",
            self.unique_users.len(),
            self.total_users,
            self.first_start
        )
    }
}

/// Greeting shown on first contact.
pub fn welcome_text(visit: Visit) -> String {
    let mut text = String::from(
        "Привет! Я показываю <b>живые данные о воздухе в Ташкенте</b> с IQAir.\n\n",
    );
    if visit.is_new {
        text.push_str(&format!("Ты — <b>пользователь №{}</b>!", visit.total));
    }
    else {
        text.push_str(&format!("Нас уже: <b>{}</b> человек", visit.total));
    }
    text
}

/// Counter persisted as JSON. The lock is held across check, insert and
/// write so concurrent callers never lose an update.
pub struct JsonUserCounter {
    path: PathBuf,
    state: Mutex<Snapshot>,
}

impl JsonUserCounter {
    /// Loads `path`; a missing or unreadable file starts a fresh counter.
    pub fn open(path: &Path) -> JsonUserCounter {
        let state = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Snapshot>(&raw) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    log::warn!("ignoring corrupt stats file {}: {}", path.display(), e);
                    Snapshot::fresh()
                },
            },
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("cannot read stats file {}: {}", path.display(), e);
                }
                Snapshot::fresh()
            },
        };
        JsonUserCounter {
            path: path.to_path_buf(),
            state: Mutex::new(state),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StatsError> {
        let raw = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, raw).map_err(|source| StatsError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl UserCounter for JsonUserCounter {
    fn has_seen(&self, id: UserId) -> bool {
        self.lock().unique_users.contains(&id)
    }

    fn record_seen(&self, id: UserId) -> Result<Visit, StatsError> {
        let mut state = self.lock();
        let is_new = state.unique_users.insert(id);
        if is_new {
            state.total_users += 1;
            self.save(&state)?;
        }
        Ok(Visit {
            is_new,
            total: state.unique_users.len(),
        })
    }

    fn unique_count(&self) -> usize {
        self.lock().unique_users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_record_seen() {
        let dir = tempfile::tempdir().unwrap();
        let counter = JsonUserCounter::open(&dir.path().join("stats.json"));

        assert!(!counter.has_seen(7));
        assert_eq!(counter.record_seen(7).unwrap(), Visit { is_new: true, total: 1 });
        assert_eq!(counter.record_seen(7).unwrap(), Visit { is_new: false, total: 1 });
        assert_eq!(counter.record_seen(9).unwrap(), Visit { is_new: true, total: 2 });
        assert!(counter.has_seen(7));
        assert_eq!(counter.unique_count(), 2);
    }

    #[test]
    fn test_persisted_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        {
            let counter = JsonUserCounter::open(&path);
            counter.record_seen(1).unwrap();
            counter.record_seen(2).unwrap();
        }
        let counter = JsonUserCounter::open(&path);
        assert_eq!(counter.unique_count(), 2);
        assert!(counter.has_seen(2));
        assert_eq!(counter.snapshot().total_users, 2);

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["unique_users"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        fs::write(&path, "{not json").unwrap();
        let counter = JsonUserCounter::open(&path);
        assert_eq!(counter.unique_count(), 0);
        assert_eq!(counter.snapshot().first_start.len(), "01.12.2025".len());
    }

    #[test]
    fn test_concurrent_records() {
        let dir = tempfile::tempdir().unwrap();
        let counter = Arc::new(JsonUserCounter::open(&dir.path().join("stats.json")));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for id in 0..20 {
                        counter.record_seen(i * 100 + id).unwrap();
                        counter.record_seen(id).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let snapshot = counter.snapshot();
        assert_eq!(snapshot.unique_users.len(), 160);
        assert_eq!(snapshot.total_users, 160);
    }

    #[test]
    fn test_texts() {
        let snapshot = Snapshot {
            total_users: 3,
            unique_users: [1, 2, 3].into_iter().collect(),
            first_start: "01.12.2025".to_string(),
        };
        assert_eq!(
            snapshot.render_summary(),
            "Статистика:\nУникальных: <b>3</b>\nВсего взаимодействий: <b>3</b>\nЗапущен: 01.12.2025"
        );
        assert!(welcome_text(Visit { is_new: true, total: 5 }).ends_with("Ты — <b>пользователь №5</b>!"));
        assert!(welcome_text(Visit { is_new: false, total: 5 }).ends_with("Нас уже: <b>5</b> человек"));
    }
}

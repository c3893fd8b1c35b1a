//! CSV-backed storage connection.

use anyhow::Result;
use log::info;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::storage::csv::{
    goal_repository::GoalRepository, ledger_repository::LedgerRepository,
    payscale_repository::PayscaleRepository, profile_repository::ProfileRepository,
    task_repository::TaskRepository,
};
use crate::storage::traits::Connection;

/// Manages file paths for the CSV store and carries the shared write lock.
///
/// The lock is the store's transaction primitive: every compound
/// read-modify-write operation (conditional task update, ledger append plus
/// balance adjust, withdrawal toggle) holds it for the whole cycle, so
/// concurrent callers serialize instead of losing updates.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvConnection {
    /// Create a new CSV connection rooted at `base_directory`, creating the
    /// directory tree if needed.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }
        let ledger_dir = base_path.join("ledger");
        if !ledger_dir.exists() {
            fs::create_dir_all(&ledger_dir)?;
        }
        Ok(Self {
            base_directory: base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Create a connection in the default data directory, honoring the
    /// `HOMEWORK_DATA_DIR` environment override.
    pub fn new_default() -> Result<Self> {
        let data_dir = match std::env::var("HOMEWORK_DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => PathBuf::from("homework-data"),
        };
        info!("Using data directory: {}", data_dir.display());
        Self::new(data_dir)
    }

    /// Acquire the store-wide write lock. Held across a full
    /// read-modify-write cycle by every mutating repository operation.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn profiles_file_path(&self) -> PathBuf {
        self.base_directory.join("profiles.csv")
    }

    pub(crate) fn tasks_file_path(&self) -> PathBuf {
        self.base_directory.join("tasks.csv")
    }

    pub(crate) fn payscale_file_path(&self) -> PathBuf {
        self.base_directory.join("payscale.csv")
    }

    pub(crate) fn goals_file_path(&self) -> PathBuf {
        self.base_directory.join("goals.csv")
    }

    /// Ledger entries live in one file per profile.
    pub(crate) fn ledger_file_path(&self, profile_id: &str) -> PathBuf {
        let safe_name: String = profile_id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.base_directory.join("ledger").join(format!("{}.csv", safe_name))
    }

    /// Create `path` with the given CSV header if it does not exist yet.
    pub(crate) fn ensure_file_exists(&self, path: &Path, header: &[&str]) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        writeln!(file, "{}", header.join(","))?;
        Ok(())
    }
}

impl Connection for CsvConnection {
    type ProfileRepository = ProfileRepository;
    type TaskRepository = TaskRepository;
    type LedgerRepository = LedgerRepository;
    type PayscaleRepository = PayscaleRepository;
    type GoalRepository = GoalRepository;

    fn create_profile_repository(&self) -> ProfileRepository {
        ProfileRepository::new(self.clone())
    }

    fn create_task_repository(&self) -> TaskRepository {
        TaskRepository::new(self.clone())
    }

    fn create_ledger_repository(&self) -> LedgerRepository {
        LedgerRepository::new(self.clone())
    }

    fn create_payscale_repository(&self) -> PayscaleRepository {
        PayscaleRepository::new(self.clone())
    }

    fn create_goal_repository(&self) -> GoalRepository {
        GoalRepository::new(self.clone())
    }
}

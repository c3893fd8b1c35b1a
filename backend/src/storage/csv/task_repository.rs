//! CSV-based task repository, including the conditional status update that
//! makes claim races safe.

use anyhow::Result;
use chrono::Utc;
use csv::{Reader, Writer};
use log::warn;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use super::profile_repository::parse_timestamp;
use crate::domain::models::task::{Task, TaskStatus};
use crate::storage::traits::{ConditionalUpdate, TaskFieldPatch, TaskStorage};

const HEADER: [&str; 12] = [
    "id",
    "household_id",
    "name",
    "baseline_minutes",
    "status",
    "assignee_id",
    "value_cents",
    "multiplier",
    "bonus_cents",
    "rejection_comment",
    "created_at",
    "updated_at",
];

/// CSV-backed task storage.
#[derive(Clone)]
pub struct TaskRepository {
    connection: CsvConnection,
}

impl TaskRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn load_all(&self) -> Result<Vec<Task>> {
        let path = self.connection.tasks_file_path();
        self.connection.ensure_file_exists(&path, &HEADER)?;

        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));
        let mut tasks = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            tasks.push(decode_task(&record));
        }
        Ok(tasks)
    }

    fn save_all(&self, tasks: &[Task]) -> Result<()> {
        let path = self.connection.tasks_file_path();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        let mut csv_writer = Writer::from_writer(BufWriter::new(file));

        csv_writer.write_record(HEADER)?;
        for task in tasks {
            csv_writer.write_record(&encode_task(task))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

fn encode_task(task: &Task) -> Vec<String> {
    vec![
        task.id.clone(),
        task.household_id.clone(),
        task.name.clone(),
        task.baseline_minutes.to_string(),
        task.status.as_str().to_string(),
        task.assignee_id.clone().unwrap_or_default(),
        task.value_cents.map(|v| v.to_string()).unwrap_or_default(),
        task.multiplier.map(|m| m.to_string()).unwrap_or_default(),
        task.bonus_cents.map(|b| b.to_string()).unwrap_or_default(),
        task.rejection_comment.clone().unwrap_or_default(),
        task.created_at.to_rfc3339(),
        task.updated_at.to_rfc3339(),
    ]
}

fn decode_task(record: &csv::StringRecord) -> Task {
    let optional = |i: usize| -> Option<String> {
        record
            .get(i)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    Task {
        id: record.get(0).unwrap_or("").to_string(),
        household_id: record.get(1).unwrap_or("").to_string(),
        name: record.get(2).unwrap_or("").to_string(),
        baseline_minutes: record.get(3).unwrap_or("0").parse().unwrap_or_else(|_| {
            warn!("Non-numeric baseline_minutes in task row, defaulting to 0");
            0
        }),
        status: TaskStatus::parse_lenient(record.get(4).unwrap_or("")),
        assignee_id: optional(5),
        value_cents: optional(6).and_then(|v| v.parse().ok()),
        multiplier: optional(7).and_then(|v| v.parse().ok()),
        bonus_cents: optional(8).and_then(|v| v.parse().ok()),
        rejection_comment: optional(9),
        created_at: parse_timestamp(record.get(10).unwrap_or("")),
        updated_at: parse_timestamp(record.get(11).unwrap_or("")),
    }
}

impl TaskStorage for TaskRepository {
    fn store_task(&self, task: &Task) -> Result<()> {
        let _guard = self.connection.lock();
        let mut tasks = self.load_all()?;
        tasks.push(task.clone());
        self.save_all(&tasks)
    }

    fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        let _guard = self.connection.lock();
        Ok(self.load_all()?.into_iter().find(|t| t.id == task_id))
    }

    fn list_tasks(&self, household_id: &str) -> Result<Vec<Task>> {
        let _guard = self.connection.lock();
        let mut tasks: Vec<Task> = self
            .load_all()?
            .into_iter()
            .filter(|t| t.household_id == household_id && t.status != TaskStatus::Deleted)
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    fn update_task(&self, task: &Task) -> Result<()> {
        let _guard = self.connection.lock();
        let mut tasks = self.load_all()?;
        let existing = tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| anyhow::anyhow!("Task not found: {}", task.id))?;
        *existing = task.clone();
        self.save_all(&tasks)
    }

    fn conditional_update_status(
        &self,
        task_id: &str,
        expected: TaskStatus,
        new_status: TaskStatus,
        patch: TaskFieldPatch,
    ) -> Result<ConditionalUpdate> {
        let _guard = self.connection.lock();
        let mut tasks = self.load_all()?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| anyhow::anyhow!("Task not found: {}", task_id))?;

        // The condition is evaluated under the write lock, so a racing
        // claimer cannot slip in between this check and the save below.
        if task.status != expected {
            return Ok(ConditionalUpdate::Conflict { actual: task.status });
        }

        task.status = new_status;
        if let Some(assignee_id) = patch.assignee_id {
            task.assignee_id = Some(assignee_id);
        }
        if let Some(comment) = patch.rejection_comment {
            task.rejection_comment = Some(comment);
        }
        if patch.clear_rejection_comment {
            task.rejection_comment = None;
        }
        task.updated_at = Utc::now();

        let updated = task.clone();
        self.save_all(&tasks)?;
        Ok(ConditionalUpdate::Applied(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            household_id: "household::1".to_string(),
            name: "Rake leaves".to_string(),
            baseline_minutes: 45,
            status,
            assignee_id: None,
            value_cents: None,
            multiplier: None,
            bonus_cents: None,
            rejection_comment: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn create_test_repository() -> (TaskRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        (TaskRepository::new(connection), temp_dir)
    }

    #[test]
    fn test_store_and_get_round_trip() {
        let (repo, _temp_dir) = create_test_repository();
        let mut task = test_task("task::1-aaaa", TaskStatus::Open);
        task.multiplier = Some(1.5);
        task.bonus_cents = Some(100);
        repo.store_task(&task).unwrap();

        let loaded = repo.get_task("task::1-aaaa").unwrap().unwrap();
        assert_eq!(loaded.status, TaskStatus::Open);
        assert_eq!(loaded.baseline_minutes, 45);
        assert_eq!(loaded.multiplier, Some(1.5));
        assert_eq!(loaded.bonus_cents, Some(100));
        assert_eq!(loaded.assignee_id, None);
    }

    #[test]
    fn test_list_tasks_filters_deleted() {
        let (repo, _temp_dir) = create_test_repository();
        repo.store_task(&test_task("task::1-aaaa", TaskStatus::Open)).unwrap();
        repo.store_task(&test_task("task::2-bbbb", TaskStatus::Deleted)).unwrap();

        let listed = repo.list_tasks("household::1").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "task::1-aaaa");
    }

    #[test]
    fn test_conditional_update_applies_when_status_matches() {
        let (repo, _temp_dir) = create_test_repository();
        repo.store_task(&test_task("task::1-aaaa", TaskStatus::Open)).unwrap();

        let outcome = repo
            .conditional_update_status(
                "task::1-aaaa",
                TaskStatus::Open,
                TaskStatus::Assigned,
                TaskFieldPatch {
                    assignee_id: Some("profile::9-ffff".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        match outcome {
            ConditionalUpdate::Applied(task) => {
                assert_eq!(task.status, TaskStatus::Assigned);
                assert_eq!(task.assignee_id.as_deref(), Some("profile::9-ffff"));
            }
            ConditionalUpdate::Conflict { .. } => panic!("expected the update to apply"),
        }
    }

    #[test]
    fn test_conditional_update_conflicts_when_status_moved() {
        let (repo, _temp_dir) = create_test_repository();
        repo.store_task(&test_task("task::1-aaaa", TaskStatus::Assigned)).unwrap();

        let outcome = repo
            .conditional_update_status(
                "task::1-aaaa",
                TaskStatus::Open,
                TaskStatus::Assigned,
                TaskFieldPatch::default(),
            )
            .unwrap();

        match outcome {
            ConditionalUpdate::Conflict { actual } => assert_eq!(actual, TaskStatus::Assigned),
            ConditionalUpdate::Applied(_) => panic!("expected a conflict"),
        }
    }

    #[test]
    fn test_unknown_status_decodes_as_open() {
        let (repo, _temp_dir) = create_test_repository();
        let path = repo.connection.tasks_file_path();
        std::fs::write(
            &path,
            "id,household_id,name,baseline_minutes,status,assignee_id,value_cents,multiplier,bonus_cents,rejection_comment,created_at,updated_at\n\
             task::1-aaaa,household::1,Old row,30,archived,,,,,,2024-01-01T00:00:00Z,2024-01-01T00:00:00Z\n",
        )
        .unwrap();

        let loaded = repo.get_task("task::1-aaaa").unwrap().unwrap();
        assert_eq!(loaded.status, TaskStatus::Open);
    }
}

//! CSV-based savings goal repository.

use anyhow::Result;
use csv::{Reader, Writer};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use super::profile_repository::parse_timestamp;
use crate::domain::models::goal::{GoalState, SavingsGoal};
use crate::domain::money::sanitize_cents;
use crate::storage::traits::GoalStorage;

const HEADER: [&str; 8] = [
    "id",
    "profile_id",
    "name",
    "target_amount_cents",
    "current_amount_cents",
    "state",
    "created_at",
    "updated_at",
];

/// CSV-backed goal storage.
#[derive(Clone)]
pub struct GoalRepository {
    connection: CsvConnection,
}

impl GoalRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn load_all(&self) -> Result<Vec<SavingsGoal>> {
        let path = self.connection.goals_file_path();
        self.connection.ensure_file_exists(&path, &HEADER)?;

        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));
        let mut goals = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            goals.push(SavingsGoal {
                id: record.get(0).unwrap_or("").to_string(),
                profile_id: record.get(1).unwrap_or("").to_string(),
                name: record.get(2).unwrap_or("").to_string(),
                target_amount_cents: sanitize_cents(
                    record.get(3).unwrap_or("0").parse::<f64>().unwrap_or(0.0),
                ),
                current_amount_cents: sanitize_cents(
                    record.get(4).unwrap_or("0").parse::<f64>().unwrap_or(0.0),
                ),
                state: GoalState::parse(record.get(5).unwrap_or("")).unwrap_or(GoalState::Cancelled),
                created_at: parse_timestamp(record.get(6).unwrap_or("")),
                updated_at: parse_timestamp(record.get(7).unwrap_or("")),
            });
        }
        Ok(goals)
    }

    fn save_all(&self, goals: &[SavingsGoal]) -> Result<()> {
        let path = self.connection.goals_file_path();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        let mut csv_writer = Writer::from_writer(BufWriter::new(file));

        csv_writer.write_record(HEADER)?;
        for goal in goals {
            csv_writer.write_record(&[
                goal.id.clone(),
                goal.profile_id.clone(),
                goal.name.clone(),
                goal.target_amount_cents.to_string(),
                goal.current_amount_cents.to_string(),
                goal.state.as_str().to_string(),
                goal.created_at.to_rfc3339(),
                goal.updated_at.to_rfc3339(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl GoalStorage for GoalRepository {
    fn store_goal(&self, goal: &SavingsGoal) -> Result<()> {
        let _guard = self.connection.lock();
        let mut goals = self.load_all()?;
        goals.push(goal.clone());
        self.save_all(&goals)
    }

    fn get_active_goal(&self, profile_id: &str) -> Result<Option<SavingsGoal>> {
        let _guard = self.connection.lock();
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|g| g.profile_id == profile_id && g.state == GoalState::Active)
            .max_by(|a, b| a.created_at.cmp(&b.created_at)))
    }

    fn list_goals(&self, profile_id: &str) -> Result<Vec<SavingsGoal>> {
        let _guard = self.connection.lock();
        let mut goals: Vec<SavingsGoal> = self
            .load_all()?
            .into_iter()
            .filter(|g| g.profile_id == profile_id)
            .collect();
        goals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(goals)
    }

    fn update_goal(&self, goal: &SavingsGoal) -> Result<()> {
        let _guard = self.connection.lock();
        let mut goals = self.load_all()?;
        let existing = goals
            .iter_mut()
            .find(|g| g.id == goal.id)
            .ok_or_else(|| anyhow::anyhow!("Goal not found: {}", goal.id))?;
        *existing = goal.clone();
        self.save_all(&goals)
    }
}

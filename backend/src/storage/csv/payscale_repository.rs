//! CSV-based payscale (grade config) repository.

use anyhow::Result;
use csv::{Reader, Writer};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use crate::domain::models::grade::{Grade, GradeConfig};
use crate::domain::money::sanitize_cents;
use crate::storage::traits::PayscaleStorage;

const HEADER: [&str; 3] = ["household_id", "grade", "value_cents"];

/// CSV-backed payscale storage. One row per (household, grade); writes are
/// upserts so the one-config-per-grade invariant holds by construction.
#[derive(Clone)]
pub struct PayscaleRepository {
    connection: CsvConnection,
}

impl PayscaleRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn load_all(&self) -> Result<Vec<GradeConfig>> {
        let path = self.connection.payscale_file_path();
        self.connection.ensure_file_exists(&path, &HEADER)?;

        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));
        let mut configs = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            configs.push(GradeConfig {
                household_id: record.get(0).unwrap_or("").to_string(),
                grade: Grade::parse_lenient(record.get(1).unwrap_or("")),
                value_cents: sanitize_cents(
                    record.get(2).unwrap_or("0").parse::<f64>().unwrap_or(0.0),
                ),
            });
        }
        Ok(configs)
    }

    fn save_all(&self, configs: &[GradeConfig]) -> Result<()> {
        let path = self.connection.payscale_file_path();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        let mut csv_writer = Writer::from_writer(BufWriter::new(file));

        csv_writer.write_record(HEADER)?;
        for config in configs {
            csv_writer.write_record(&[
                config.household_id.clone(),
                config.grade.as_str().to_string(),
                config.value_cents.to_string(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl PayscaleStorage for PayscaleRepository {
    fn upsert_grade_config(&self, config: &GradeConfig) -> Result<()> {
        let _guard = self.connection.lock();
        let mut configs = self.load_all()?;
        match configs
            .iter_mut()
            .find(|c| c.household_id == config.household_id && c.grade == config.grade)
        {
            Some(existing) => *existing = config.clone(),
            None => configs.push(config.clone()),
        }
        self.save_all(&configs)
    }

    fn list_grade_configs(&self, household_id: &str) -> Result<Vec<GradeConfig>> {
        let _guard = self.connection.lock();
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|c| c.household_id == household_id)
            .collect())
    }
}

//! CSV-based profile repository.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::{Reader, Writer};
use log::warn;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use crate::domain::models::grade::{Grade, Subject};
use crate::domain::models::profile::{Profile, Role};
use crate::domain::money::sanitize_cents;
use crate::storage::traits::ProfileStorage;

const HEADER: [&str; 9] = [
    "id",
    "household_id",
    "name",
    "role",
    "subjects",
    "rates",
    "balance_cents",
    "created_at",
    "updated_at",
];

/// CSV-backed profile storage. Subjects and rate overrides are embedded as
/// JSON columns so the row stays one line per profile.
#[derive(Clone)]
pub struct ProfileRepository {
    connection: CsvConnection,
}

impl ProfileRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read every profile row. No locking; callers that mutate hold the
    /// connection lock around the whole read-modify-write cycle.
    pub(crate) fn load_all(&self) -> Result<Vec<Profile>> {
        let path = self.connection.profiles_file_path();
        self.connection.ensure_file_exists(&path, &HEADER)?;

        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));
        let mut profiles = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            profiles.push(decode_profile(&record));
        }
        Ok(profiles)
    }

    /// Rewrite the profiles file. Same locking contract as [`load_all`].
    pub(crate) fn save_all(&self, profiles: &[Profile]) -> Result<()> {
        let path = self.connection.profiles_file_path();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        let mut csv_writer = Writer::from_writer(BufWriter::new(file));

        csv_writer.write_record(HEADER)?;
        for profile in profiles {
            csv_writer.write_record(&encode_profile(profile))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

fn encode_profile(profile: &Profile) -> Vec<String> {
    vec![
        profile.id.clone(),
        profile.household_id.clone(),
        profile.name.clone(),
        profile.role.as_str().to_string(),
        serde_json::to_string(&profile.subjects).unwrap_or_else(|_| "[]".to_string()),
        profile
            .rates
            .as_ref()
            .and_then(|rates| serde_json::to_string(rates).ok())
            .unwrap_or_default(),
        profile.balance_cents.to_string(),
        profile.created_at.to_rfc3339(),
        profile.updated_at.to_rfc3339(),
    ]
}

fn decode_profile(record: &csv::StringRecord) -> Profile {
    let subjects: Vec<Subject> = serde_json::from_str(record.get(4).unwrap_or("[]"))
        .unwrap_or_else(|e| {
            warn!("Failed to decode subjects column: {}", e);
            Vec::new()
        });
    let rates_raw = record.get(5).unwrap_or("");
    let rates: Option<HashMap<Grade, f64>> = if rates_raw.trim().is_empty() {
        None
    } else {
        match serde_json::from_str(rates_raw) {
            Ok(rates) => Some(rates),
            Err(e) => {
                warn!("Failed to decode rates column: {}", e);
                None
            }
        }
    };

    Profile {
        id: record.get(0).unwrap_or("").to_string(),
        household_id: record.get(1).unwrap_or("").to_string(),
        name: record.get(2).unwrap_or("").to_string(),
        role: Role::parse_lenient(record.get(3).unwrap_or("")),
        subjects,
        rates,
        balance_cents: sanitize_cents(record.get(6).unwrap_or("0").parse::<f64>().unwrap_or(0.0)),
        created_at: parse_timestamp(record.get(7).unwrap_or("")),
        updated_at: parse_timestamp(record.get(8).unwrap_or("")),
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            if !raw.is_empty() {
                warn!("Failed to parse timestamp '{}', using current time", raw);
            }
            Utc::now()
        })
}

impl ProfileStorage for ProfileRepository {
    fn store_profile(&self, profile: &Profile) -> Result<()> {
        let _guard = self.connection.lock();
        let mut profiles = self.load_all()?;
        profiles.push(profile.clone());
        self.save_all(&profiles)
    }

    fn get_profile(&self, profile_id: &str) -> Result<Option<Profile>> {
        let _guard = self.connection.lock();
        Ok(self.load_all()?.into_iter().find(|p| p.id == profile_id))
    }

    fn list_profiles(&self, household_id: &str) -> Result<Vec<Profile>> {
        let _guard = self.connection.lock();
        let mut profiles: Vec<Profile> = self
            .load_all()?
            .into_iter()
            .filter(|p| p.household_id == household_id)
            .collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    fn update_profile(&self, profile: &Profile) -> Result<()> {
        let _guard = self.connection.lock();
        let mut profiles = self.load_all()?;
        let existing = profiles
            .iter_mut()
            .find(|p| p.id == profile.id)
            .ok_or_else(|| anyhow::anyhow!("Profile not found: {}", profile.id))?;
        // The stored balance is owned by the ledger primitives; keep it.
        let balance_cents = existing.balance_cents;
        *existing = profile.clone();
        existing.balance_cents = balance_cents;
        self.save_all(&profiles)
    }
}

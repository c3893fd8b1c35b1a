//! CSV-based ledger repository.
//!
//! Entries are append-only, one file per profile. The two compound
//! operations pair a ledger write with the profile balance update under the
//! connection's write lock, which is what keeps concurrent postings from
//! losing updates.

use anyhow::Result;
use csv::{Reader, Writer, WriterBuilder};
use log::warn;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use super::profile_repository::{parse_timestamp, ProfileRepository};
use crate::domain::models::ledger::{LedgerEntry, LedgerEntryType, WithdrawalStatus};
use crate::domain::money::sanitize_cents;
use crate::storage::traits::{LedgerStorage, WithdrawalUpdate};

const HEADER: [&str; 9] = [
    "id",
    "profile_id",
    "entry_type",
    "amount_cents",
    "memo",
    "date",
    "status",
    "task_id",
    "balance_after_cents",
];

/// CSV-backed ledger storage.
#[derive(Clone)]
pub struct LedgerRepository {
    connection: CsvConnection,
    profile_repository: ProfileRepository,
}

impl LedgerRepository {
    pub fn new(connection: CsvConnection) -> Self {
        let profile_repository = ProfileRepository::new(connection.clone());
        Self {
            connection,
            profile_repository,
        }
    }

    fn load_entries(&self, profile_id: &str) -> Result<Vec<LedgerEntry>> {
        let path = self.connection.ledger_file_path(profile_id);
        self.connection.ensure_file_exists(&path, &HEADER)?;

        let file = File::open(&path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));
        let mut entries = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            entries.push(decode_entry(&record));
        }
        Ok(entries)
    }

    fn save_entries(&self, profile_id: &str, entries: &[LedgerEntry]) -> Result<()> {
        let path = self.connection.ledger_file_path(profile_id);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        let mut csv_writer = Writer::from_writer(BufWriter::new(file));

        csv_writer.write_record(HEADER)?;
        for entry in entries {
            csv_writer.write_record(&encode_entry(entry))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    fn append_entry(&self, entry: &LedgerEntry) -> Result<()> {
        let path = self.connection.ledger_file_path(&entry.profile_id);
        self.connection.ensure_file_exists(&path, &HEADER)?;

        let file = OpenOptions::new().append(true).open(&path)?;
        let mut csv_writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        csv_writer.write_record(&encode_entry(entry))?;
        csv_writer.flush()?;
        Ok(())
    }

    /// Adjust the stored balance of one profile. Caller holds the lock.
    fn adjust_balance(&self, profile_id: &str, delta_cents: i64) -> Result<i64> {
        let mut profiles = self.profile_repository.load_all()?;
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == profile_id)
            .ok_or_else(|| anyhow::anyhow!("Profile not found: {}", profile_id))?;
        profile.balance_cents += delta_cents;
        profile.updated_at = chrono::Utc::now();
        let new_balance = profile.balance_cents;
        self.profile_repository.save_all(&profiles)?;
        Ok(new_balance)
    }
}

fn encode_entry(entry: &LedgerEntry) -> Vec<String> {
    vec![
        entry.id.clone(),
        entry.profile_id.clone(),
        entry.entry_type.as_str().to_string(),
        entry.amount_cents.to_string(),
        entry.memo.clone(),
        entry.date.to_rfc3339(),
        entry.status.map(|s| s.as_str().to_string()).unwrap_or_default(),
        entry.task_id.clone().unwrap_or_default(),
        entry
            .balance_after_cents
            .map(|b| b.to_string())
            .unwrap_or_default(),
    ]
}

fn decode_entry(record: &csv::StringRecord) -> LedgerEntry {
    let optional = |i: usize| -> Option<String> {
        record
            .get(i)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    let entry_type = LedgerEntryType::parse(record.get(2).unwrap_or("")).unwrap_or_else(|e| {
        warn!("{}; defaulting to adjustment", e);
        LedgerEntryType::Adjustment
    });

    LedgerEntry {
        id: record.get(0).unwrap_or("").to_string(),
        profile_id: record.get(1).unwrap_or("").to_string(),
        entry_type,
        amount_cents: sanitize_cents(record.get(3).unwrap_or("0").parse::<f64>().unwrap_or(0.0)),
        memo: record.get(4).unwrap_or("").to_string(),
        date: parse_timestamp(record.get(5).unwrap_or("")),
        status: optional(6).and_then(|s| WithdrawalStatus::parse(&s).ok()),
        task_id: optional(7),
        balance_after_cents: optional(8).and_then(|b| b.parse().ok()),
    }
}

impl LedgerStorage for LedgerRepository {
    fn append_entry_and_adjust_balance(
        &self,
        profile_id: &str,
        mut entry: LedgerEntry,
        delta_cents: i64,
    ) -> Result<LedgerEntry> {
        let _guard = self.connection.lock();

        // Resolve the post-adjustment balance before any write so the entry
        // row records it.
        let profiles = self.profile_repository.load_all()?;
        let profile = profiles
            .iter()
            .find(|p| p.id == profile_id)
            .ok_or_else(|| anyhow::anyhow!("Profile not found: {}", profile_id))?;
        entry.balance_after_cents = Some(profile.balance_cents + delta_cents);

        self.append_entry(&entry)?;
        self.adjust_balance(profile_id, delta_cents)?;
        Ok(entry)
    }

    fn get_entry(&self, profile_id: &str, entry_id: &str) -> Result<Option<LedgerEntry>> {
        let _guard = self.connection.lock();
        Ok(self
            .load_entries(profile_id)?
            .into_iter()
            .find(|e| e.id == entry_id))
    }

    fn list_entries(&self, profile_id: &str, limit: Option<u32>) -> Result<Vec<LedgerEntry>> {
        let _guard = self.connection.lock();
        let mut entries = self.load_entries(profile_id)?;
        entries.reverse(); // file order is chronological; callers want newest first
        if let Some(limit) = limit {
            entries.truncate(limit as usize);
        }
        Ok(entries)
    }

    fn resolve_withdrawal_and_adjust_balance(
        &self,
        profile_id: &str,
        entry_id: &str,
        new_status: WithdrawalStatus,
        delta_cents: i64,
    ) -> Result<WithdrawalUpdate> {
        let _guard = self.connection.lock();
        let mut entries = self.load_entries(profile_id)?;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| anyhow::anyhow!("Ledger entry not found: {}", entry_id))?;

        if entry.entry_type != LedgerEntryType::WithdrawalRequest {
            return Err(anyhow::anyhow!(
                "Ledger entry {} is not a withdrawal request",
                entry_id
            ));
        }
        match entry.status {
            Some(WithdrawalStatus::Pending) => {}
            Some(actual) => return Ok(WithdrawalUpdate::Conflict { actual }),
            None => {
                return Err(anyhow::anyhow!(
                    "Withdrawal request {} has no status",
                    entry_id
                ))
            }
        }

        entry.status = Some(new_status);
        if delta_cents != 0 {
            let new_balance = self.adjust_balance(profile_id, delta_cents)?;
            entry.balance_after_cents = Some(new_balance);
        }
        let updated = entry.clone();
        self.save_entries(profile_id, &entries)?;
        Ok(WithdrawalUpdate::Applied(updated))
    }
}

//! Payscale service: the household Grade→cents table and the hourly-rate
//! resolution built on top of it.

use anyhow::Result;
use log::info;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::commands::payscale::{
    ListGradeConfigsResult, UpsertGradeConfigCommand, UpsertGradeConfigResult,
};
use crate::domain::models::grade::{Grade, GradeConfig};
use crate::domain::models::profile::Profile;
use crate::domain::rate;
use crate::storage::csv::{CsvConnection, PayscaleRepository};
use crate::storage::traits::PayscaleStorage;

/// Service resolving hourly rates from grade configs.
///
/// The fallback payscale is injected at construction rather than read from a
/// module global, so tests can run the engine against any table.
#[derive(Clone)]
pub struct PayscaleService {
    payscale_repository: PayscaleRepository,
    default_rates: HashMap<Grade, f64>,
}

impl PayscaleService {
    pub fn new(connection: Arc<CsvConnection>, default_rates: HashMap<Grade, f64>) -> Self {
        let payscale_repository = PayscaleRepository::new((*connection).clone());
        Self {
            payscale_repository,
            default_rates,
        }
    }

    /// Set the cents-per-hour value one subject at `grade` contributes.
    pub fn upsert_grade_config(
        &self,
        command: UpsertGradeConfigCommand,
    ) -> Result<UpsertGradeConfigResult> {
        if command.value_cents < 0 {
            return Err(anyhow::anyhow!("Grade value must not be negative"));
        }

        let config = GradeConfig {
            household_id: command.household_id,
            grade: command.grade,
            value_cents: command.value_cents,
        };
        self.payscale_repository.upsert_grade_config(&config)?;
        info!(
            "Set payscale for household {}: {} = {} cents/hr",
            config.household_id, config.grade, config.value_cents
        );
        Ok(UpsertGradeConfigResult { config })
    }

    pub fn list_grade_configs(&self, household_id: &str) -> Result<ListGradeConfigsResult> {
        let configs = self.payscale_repository.list_grade_configs(household_id)?;
        Ok(ListGradeConfigsResult { configs })
    }

    /// The complete Grade→dollars map in effect for a profile: profile rate
    /// overrides first, then household configs, then the injected default.
    pub fn resolved_rates(&self, profile: &Profile) -> Result<HashMap<Grade, f64>> {
        let household = rate::build_rate_map(
            &self
                .payscale_repository
                .list_grade_configs(&profile.household_id)?,
            &self.default_rates,
        );
        match &profile.rates {
            Some(overrides) => {
                let mut resolved = household;
                for (grade, dollars) in overrides {
                    resolved.insert(*grade, *dollars);
                }
                Ok(resolved)
            }
            None => Ok(household),
        }
    }

    /// Current hourly rate for a profile, in cents.
    pub fn hourly_rate_cents_for(&self, profile: &Profile) -> Result<i64> {
        let rates = self.resolved_rates(profile)?;
        Ok(rate::hourly_rate_cents(&profile.subjects, &rates))
    }
}

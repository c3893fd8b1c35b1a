//! Ledger posting service.
//!
//! Every balance-affecting operation validates its amount, appends exactly
//! one entry, and adjusts the profile's stored balance by the same signed
//! amount through the store's atomic primitive. The stored `balance_cents`
//! must always equal the signed sum of the profile's applicable entries;
//! `check_balance_consistency` verifies exactly that.

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::ledger::{
    BalanceResult, LedgerListQuery, LedgerListResult, PostingResult, RecordAdjustmentCommand,
    RecordAdvanceCommand, RecordEarningCommand, RequestWithdrawalCommand,
    ResolveWithdrawalCommand,
};
use crate::domain::models::ledger::{
    LedgerEntry, LedgerEntryType, LedgerError, WithdrawalStatus,
};
use crate::storage::traits::{
    Connection, LedgerStorage, ProfileStorage, WithdrawalUpdate,
};

/// Service for posting ledger entries and answering balance queries.
///
/// Generic over the storage connection so any backend with the right
/// transaction primitives can sit underneath.
#[derive(Clone)]
pub struct LedgerService<C: Connection> {
    ledger_repository: C::LedgerRepository,
    profile_repository: C::ProfileRepository,
}

impl<C: Connection> LedgerService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let ledger_repository = connection.create_ledger_repository();
        let profile_repository = connection.create_profile_repository();
        Self {
            ledger_repository,
            profile_repository,
        }
    }

    /// Post a balance-increasing earning, usually a task payout.
    pub fn record_earning(&self, command: RecordEarningCommand) -> Result<PostingResult> {
        if command.amount_cents <= 0 {
            return Err(LedgerError::NonPositiveAmount.into());
        }

        let entry = self.new_entry(
            &command.profile_id,
            LedgerEntryType::Earning,
            command.amount_cents,
            command.memo,
        );
        let entry = LedgerEntry {
            task_id: command.task_id,
            ..entry
        };
        self.post(entry, command.amount_cents)
    }

    /// Hand out money ahead of earnings; balance-decreasing.
    pub fn record_advance(&self, command: RecordAdvanceCommand) -> Result<PostingResult> {
        if command.amount_cents <= 0 {
            return Err(LedgerError::NonPositiveAmount.into());
        }

        let entry = self.new_entry(
            &command.profile_id,
            LedgerEntryType::Advance,
            -command.amount_cents,
            command.memo,
        );
        self.post(entry, -command.amount_cents)
    }

    /// Manual signed correction; must be non-zero.
    pub fn record_manual_adjustment(
        &self,
        command: RecordAdjustmentCommand,
    ) -> Result<PostingResult> {
        if command.amount_cents == 0 {
            return Err(LedgerError::ZeroAdjustment.into());
        }

        let entry = self.new_entry(
            &command.profile_id,
            LedgerEntryType::Adjustment,
            command.amount_cents,
            command.memo,
        );
        self.post(entry, command.amount_cents)
    }

    /// File a cash-out request. The amount is encumbered against the
    /// spendable balance but `balance_cents` itself does not move until the
    /// payout is confirmed.
    pub fn request_withdrawal(&self, command: RequestWithdrawalCommand) -> Result<PostingResult> {
        if command.amount_cents <= 0 {
            return Err(LedgerError::NonPositiveAmount.into());
        }
        let balance = self.balance(&command.profile_id)?;
        if command.amount_cents > balance.spendable_balance_cents {
            return Err(LedgerError::InsufficientSpendableBalance {
                requested_cents: command.amount_cents,
                available_cents: balance.spendable_balance_cents,
            }
            .into());
        }

        let mut entry = self.new_entry(
            &command.profile_id,
            LedgerEntryType::WithdrawalRequest,
            -command.amount_cents,
            command.memo,
        );
        entry.status = Some(WithdrawalStatus::Pending);
        // Zero delta: the deduction is deferred until confirmation.
        self.post(entry, 0)
    }

    /// Pay out a pending withdrawal: flips the request to `Paid` and applies
    /// the deferred deduction atomically.
    pub fn confirm_withdrawal_payout(
        &self,
        command: ResolveWithdrawalCommand,
    ) -> Result<PostingResult> {
        let entry = self.require_entry(&command.profile_id, &command.entry_id)?;
        let outcome = self.ledger_repository.resolve_withdrawal_and_adjust_balance(
            &command.profile_id,
            &command.entry_id,
            WithdrawalStatus::Paid,
            entry.amount_cents,
        )?;
        match outcome {
            WithdrawalUpdate::Applied(entry) => {
                info!(
                    "Confirmed withdrawal {} for profile {}: {} cents",
                    entry.id, command.profile_id, entry.amount_cents
                );
                let new_balance_cents = entry.balance_after_cents.unwrap_or(0);
                Ok(PostingResult {
                    entry,
                    new_balance_cents,
                })
            }
            WithdrawalUpdate::Conflict { actual } => Err(LedgerError::InvalidWithdrawalState {
                entry_id: command.entry_id,
                actual,
            }
            .into()),
        }
    }

    /// Decline a pending withdrawal; the encumbrance is released and no money
    /// moves.
    pub fn reject_withdrawal(&self, command: ResolveWithdrawalCommand) -> Result<PostingResult> {
        self.require_entry(&command.profile_id, &command.entry_id)?;
        let outcome = self.ledger_repository.resolve_withdrawal_and_adjust_balance(
            &command.profile_id,
            &command.entry_id,
            WithdrawalStatus::Rejected,
            0,
        )?;
        match outcome {
            WithdrawalUpdate::Applied(entry) => {
                let new_balance_cents = self.balance(&command.profile_id)?.balance_cents;
                Ok(PostingResult {
                    entry,
                    new_balance_cents,
                })
            }
            WithdrawalUpdate::Conflict { actual } => Err(LedgerError::InvalidWithdrawalState {
                entry_id: command.entry_id,
                actual,
            }
            .into()),
        }
    }

    pub fn list_entries(&self, query: LedgerListQuery) -> Result<LedgerListResult> {
        let entries = self
            .ledger_repository
            .list_entries(&query.profile_id, query.limit)?;
        Ok(LedgerListResult { entries })
    }

    /// Current balance and spendable balance (balance minus pending
    /// withdrawal encumbrances).
    pub fn balance(&self, profile_id: &str) -> Result<BalanceResult> {
        let profile = self
            .profile_repository
            .get_profile(profile_id)?
            .ok_or_else(|| LedgerError::ProfileNotFound {
                profile_id: profile_id.to_string(),
            })?;

        let pending_cents: i64 = self
            .ledger_repository
            .list_entries(profile_id, None)?
            .iter()
            .filter(|e| {
                e.entry_type == LedgerEntryType::WithdrawalRequest
                    && e.status == Some(WithdrawalStatus::Pending)
            })
            .map(|e| e.amount_cents)
            .sum();

        Ok(BalanceResult {
            balance_cents: profile.balance_cents,
            // Pending requests are stored negative, so adding releases them.
            spendable_balance_cents: profile.balance_cents + pending_cents,
        })
    }

    /// Verify that the stored balance equals the signed sum of applicable
    /// entries. Returns a description of each mismatch found.
    pub fn check_balance_consistency(&self, profile_id: &str) -> Result<Vec<String>> {
        let profile = self
            .profile_repository
            .get_profile(profile_id)?
            .ok_or_else(|| LedgerError::ProfileNotFound {
                profile_id: profile_id.to_string(),
            })?;

        let entries = self.ledger_repository.list_entries(profile_id, None)?;
        let expected: i64 = entries
            .iter()
            .filter(|e| e.affects_balance())
            .map(|e| e.amount_cents)
            .sum();

        let mut errors = Vec::new();
        if expected != profile.balance_cents {
            let error = format!(
                "Profile {} balance mismatch: stored {} cents, ledger sum {} cents",
                profile_id, profile.balance_cents, expected
            );
            warn!("{}", error);
            errors.push(error);
        }
        Ok(errors)
    }

    fn new_entry(
        &self,
        profile_id: &str,
        entry_type: LedgerEntryType,
        amount_cents: i64,
        memo: String,
    ) -> LedgerEntry {
        LedgerEntry {
            id: LedgerEntry::generate_id(),
            profile_id: profile_id.to_string(),
            entry_type,
            amount_cents,
            memo,
            date: Utc::now(),
            status: None,
            task_id: None,
            balance_after_cents: None,
        }
    }

    fn post(&self, entry: LedgerEntry, delta_cents: i64) -> Result<PostingResult> {
        let profile_id = entry.profile_id.clone();
        let entry = self
            .ledger_repository
            .append_entry_and_adjust_balance(&profile_id, entry, delta_cents)?;
        info!(
            "Posted {} of {} cents for profile {} (delta {})",
            entry.entry_type, entry.amount_cents, profile_id, delta_cents
        );
        Ok(PostingResult {
            new_balance_cents: entry.balance_after_cents.unwrap_or(0),
            entry,
        })
    }

    fn require_entry(&self, profile_id: &str, entry_id: &str) -> Result<LedgerEntry> {
        self.ledger_repository
            .get_entry(profile_id, entry_id)?
            .ok_or_else(|| {
                LedgerError::EntryNotFound {
                    entry_id: entry_id.to_string(),
                }
                .into()
            })
    }
}

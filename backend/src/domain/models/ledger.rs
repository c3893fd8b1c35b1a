//! Domain model for ledger entries, the append-only record of every
//! balance-affecting event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Category of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEntryType {
    /// Task payout; balance-increasing.
    Earning,
    /// Money handed out ahead of earnings; balance-decreasing.
    Advance,
    /// Manual correction, signed either way.
    Adjustment,
    /// Cash-out request; carries a status and only hits the balance once
    /// confirmed.
    WithdrawalRequest,
    /// Movement between the spendable balance and a savings goal.
    GoalAllocation,
}

impl LedgerEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryType::Earning => "earning",
            LedgerEntryType::Advance => "advance",
            LedgerEntryType::Adjustment => "adjustment",
            LedgerEntryType::WithdrawalRequest => "withdrawal_request",
            LedgerEntryType::GoalAllocation => "goal_allocation",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "earning" => Ok(LedgerEntryType::Earning),
            "advance" => Ok(LedgerEntryType::Advance),
            "adjustment" => Ok(LedgerEntryType::Adjustment),
            "withdrawal_request" => Ok(LedgerEntryType::WithdrawalRequest),
            "goal_allocation" => Ok(LedgerEntryType::GoalAllocation),
            _ => Err(format!("Invalid ledger entry type: {}", s)),
        }
    }
}

impl fmt::Display for LedgerEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle of a withdrawal request. The status toggle is the single
/// mutation the append-only ledger permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawalStatus {
    Pending,
    Paid,
    Rejected,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Paid => "paid",
            WithdrawalStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(WithdrawalStatus::Pending),
            "paid" => Ok(WithdrawalStatus::Paid),
            "rejected" => Ok(WithdrawalStatus::Rejected),
            _ => Err(format!("Invalid withdrawal status: {}", s)),
        }
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of a profile's ledger. `amount_cents` is signed: deductions
/// (advances, withdrawals, goal allocations) are negative. Pending and
/// rejected withdrawal requests are excluded from the balance sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub profile_id: String,
    pub entry_type: LedgerEntryType,
    pub amount_cents: i64,
    pub memo: String,
    pub date: DateTime<Utc>,
    /// Set for withdrawal requests only.
    pub status: Option<WithdrawalStatus>,
    /// Set on earnings posted for a task payout.
    pub task_id: Option<String>,
    /// Balance after this entry was applied; informational, recorded at post
    /// time.
    pub balance_after_cents: Option<i64>,
}

impl LedgerEntry {
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Whether this entry currently counts toward `balance_cents`.
    pub fn affects_balance(&self) -> bool {
        match self.entry_type {
            LedgerEntryType::WithdrawalRequest => {
                self.status == Some(WithdrawalStatus::Paid)
            }
            _ => true,
        }
    }
}

/// Ledger posting failures.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("amount must be a positive number of cents")]
    NonPositiveAmount,
    #[error("adjustment amount must be non-zero")]
    ZeroAdjustment,
    #[error("insufficient spendable balance: requested {requested_cents} cents, available {available_cents} cents")]
    InsufficientSpendableBalance {
        requested_cents: i64,
        available_cents: i64,
    },
    #[error("withdrawal request {entry_id} is {actual}, expected pending")]
    InvalidWithdrawalState {
        entry_id: String,
        actual: WithdrawalStatus,
    },
    #[error("ledger entry not found: {entry_id}")]
    EntryNotFound { entry_id: String },
    #[error("profile not found: {profile_id}")]
    ProfileNotFound { profile_id: String },
}

//! Domain model for a task and its lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::models::profile::random_suffix;
use crate::domain::valuation;

/// Lifecycle status of a task. `Deleted` is a soft-delete marker; rows are
/// never physically removed, only filtered out of active views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Draft,
    Open,
    Assigned,
    PendingApproval,
    PendingPayment,
    Rejected,
    Paid,
    Deleted,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Draft => "draft",
            TaskStatus::Open => "open",
            TaskStatus::Assigned => "assigned",
            TaskStatus::PendingApproval => "pending_approval",
            TaskStatus::PendingPayment => "pending_payment",
            TaskStatus::Rejected => "rejected",
            TaskStatus::Paid => "paid",
            TaskStatus::Deleted => "deleted",
        }
    }

    /// Strict parse, used at the API boundary.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(TaskStatus::Draft),
            "open" => Ok(TaskStatus::Open),
            "assigned" => Ok(TaskStatus::Assigned),
            "pending_approval" => Ok(TaskStatus::PendingApproval),
            "pending_payment" => Ok(TaskStatus::PendingPayment),
            "rejected" => Ok(TaskStatus::Rejected),
            "paid" => Ok(TaskStatus::Paid),
            "deleted" => Ok(TaskStatus::Deleted),
            _ => Err(format!("Invalid task status: {}", s)),
        }
    }

    /// Lenient parse for stored records. Unknown values fall back to `Open`,
    /// the documented default policy for schemaless rows.
    pub fn parse_lenient(s: &str) -> Self {
        TaskStatus::parse(s).unwrap_or_else(|_| {
            log::warn!("Unknown task status '{}', defaulting to open", s);
            TaskStatus::Open
        })
    }

    /// Whether the state machine permits moving from `self` to `next`.
    ///
    /// `Draft` has no inbound edges besides creation; `Paid` and `Deleted`
    /// are terminal. `Rejected` only appears in stored legacy rows, so its
    /// outbound edges mirror `Assigned`'s recovery path.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        match (self, next) {
            (Draft, Open) | (Draft, Assigned) => true,
            (Open, Assigned) => true,
            (Assigned, PendingApproval) => true,
            (PendingApproval, PendingPayment) => true,
            (PendingApproval, Assigned) => true,
            (PendingPayment, Paid) => true,
            (PendingPayment, PendingApproval) => true,
            (Rejected, Assigned) => true,
            // Soft delete is reachable from every non-terminal state.
            (from, Deleted) => from != Paid && from != Deleted,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Paid | TaskStatus::Deleted)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A unit of assignable work. `baseline_minutes` is the estimated duration
/// used for rate-based valuation whenever no explicit `value_cents` override
/// is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub household_id: String,
    pub name: String,
    pub baseline_minutes: u32,
    pub status: TaskStatus,
    pub assignee_id: Option<String>,
    /// Manually set flat payment; preferred over the computed value.
    pub value_cents: Option<i64>,
    pub multiplier: Option<f64>,
    pub bonus_cents: Option<i64>,
    pub rejection_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Generate a unique task ID.
    /// Format: task::<timestamp_ms>-<random_suffix>
    pub fn generate_id(timestamp_ms: u64) -> String {
        format!("task::{}-{}", timestamp_ms, random_suffix(4))
    }

    /// The cents value this task pays out: the explicit override when set,
    /// otherwise the rate-based computation.
    pub fn effective_value_cents(&self, hourly_rate_cents: i64) -> i64 {
        if let Some(value) = self.value_cents {
            return value;
        }
        valuation::task_value_cents(
            self.baseline_minutes as f64,
            hourly_rate_cents,
            self.multiplier.unwrap_or(1.0),
            self.bonus_cents.unwrap_or(0),
        )
    }
}

/// State-machine and task-validation failures.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task {task_id} is {actual}, expected {expected}")]
    InvalidStatus {
        task_id: String,
        expected: TaskStatus,
        actual: TaskStatus,
    },
    #[error("task {task_id} was already claimed")]
    AlreadyClaimed { task_id: String },
    #[error("task {task_id} is not assigned to profile {profile_id}")]
    NotAssignee { task_id: String, profile_id: String },
    #[error("a rejection comment is required")]
    MissingRejectionComment,
    #[error("paid tasks cannot be deleted")]
    PaidTaskNotDeletable { task_id: String },
    #[error("task not found: {task_id}")]
    NotFound { task_id: String },
}

//! # Storage Traits
//!
//! Storage abstraction traits that let different backends be used
//! interchangeably by the domain layer. All operations are synchronous; the
//! backend is responsible for making the compound operations
//! (`conditional_update_status`, `append_entry_and_adjust_balance`,
//! `resolve_withdrawal_and_adjust_balance`) atomic with respect to concurrent
//! callers. These are the store-level transaction primitives the domain
//! relies on instead of application-level check-then-act.

use anyhow::Result;

use crate::domain::models::grade::GradeConfig;
use crate::domain::models::goal::SavingsGoal;
use crate::domain::models::ledger::{LedgerEntry, WithdrawalStatus};
use crate::domain::models::profile::Profile;
use crate::domain::models::task::{Task, TaskStatus};

/// Outcome of a conditional task-status update. `Conflict` means the task's
/// status no longer matched the expectation at write time; the caller decides
/// whether that is a retryable race or a state-machine violation.
#[derive(Debug, Clone)]
pub enum ConditionalUpdate {
    Applied(Task),
    Conflict { actual: TaskStatus },
}

/// Field changes applied together with a conditional status update.
#[derive(Debug, Clone, Default)]
pub struct TaskFieldPatch {
    pub assignee_id: Option<String>,
    pub rejection_comment: Option<String>,
    pub clear_rejection_comment: bool,
}

/// Outcome of a conditional withdrawal-status toggle.
#[derive(Debug, Clone)]
pub enum WithdrawalUpdate {
    Applied(LedgerEntry),
    Conflict { actual: WithdrawalStatus },
}

/// Interface for profile storage operations.
pub trait ProfileStorage: Send + Sync {
    /// Store a new profile.
    fn store_profile(&self, profile: &Profile) -> Result<()>;

    /// Retrieve a specific profile by ID.
    fn get_profile(&self, profile_id: &str) -> Result<Option<Profile>>;

    /// List all profiles in a household, ordered by name.
    fn list_profiles(&self, household_id: &str) -> Result<Vec<Profile>>;

    /// Update an existing profile (subjects, rates, timestamps). Balance
    /// changes go through the ledger primitives, never through this method.
    fn update_profile(&self, profile: &Profile) -> Result<()>;
}

/// Interface for task storage operations.
pub trait TaskStorage: Send + Sync {
    /// Store a new task.
    fn store_task(&self, task: &Task) -> Result<()>;

    /// Retrieve a specific task by ID.
    fn get_task(&self, task_id: &str) -> Result<Option<Task>>;

    /// List tasks in a household, newest first. Soft-deleted tasks are
    /// always filtered out.
    fn list_tasks(&self, household_id: &str) -> Result<Vec<Task>>;

    /// Update an existing task unconditionally.
    fn update_task(&self, task: &Task) -> Result<()>;

    /// Compare-and-swap a task's status: apply `new_status` and `patch` only
    /// if the stored status still equals `expected`. This is what makes the
    /// claim race safe: the loser gets `Conflict`, never a silent overwrite.
    fn conditional_update_status(
        &self,
        task_id: &str,
        expected: TaskStatus,
        new_status: TaskStatus,
        patch: TaskFieldPatch,
    ) -> Result<ConditionalUpdate>;
}

/// Interface for ledger storage operations.
pub trait LedgerStorage: Send + Sync {
    /// Append one entry and adjust the profile's stored balance by
    /// `delta_cents`, as a single atomic unit. Returns the stored entry with
    /// `balance_after_cents` filled in.
    fn append_entry_and_adjust_balance(
        &self,
        profile_id: &str,
        entry: LedgerEntry,
        delta_cents: i64,
    ) -> Result<LedgerEntry>;

    /// Retrieve a specific entry.
    fn get_entry(&self, profile_id: &str, entry_id: &str) -> Result<Option<LedgerEntry>>;

    /// List a profile's entries, most recent first.
    fn list_entries(&self, profile_id: &str, limit: Option<u32>) -> Result<Vec<LedgerEntry>>;

    /// Toggle a pending withdrawal request to `new_status` and adjust the
    /// balance by `delta_cents`, atomically. Only applies while the stored
    /// status is still `Pending`; anything else yields `Conflict`.
    fn resolve_withdrawal_and_adjust_balance(
        &self,
        profile_id: &str,
        entry_id: &str,
        new_status: WithdrawalStatus,
        delta_cents: i64,
    ) -> Result<WithdrawalUpdate>;
}

/// Interface for payscale (grade config) storage operations.
pub trait PayscaleStorage: Send + Sync {
    /// Insert or replace the config for one grade; a household holds at most
    /// one config per grade.
    fn upsert_grade_config(&self, config: &GradeConfig) -> Result<()>;

    /// List a household's grade configs.
    fn list_grade_configs(&self, household_id: &str) -> Result<Vec<GradeConfig>>;
}

/// Interface for savings goal storage operations.
pub trait GoalStorage: Send + Sync {
    /// Store a new goal.
    fn store_goal(&self, goal: &SavingsGoal) -> Result<()>;

    /// Get the current active goal for a profile.
    fn get_active_goal(&self, profile_id: &str) -> Result<Option<SavingsGoal>>;

    /// List all goals for a profile, most recent first.
    fn list_goals(&self, profile_id: &str) -> Result<Vec<SavingsGoal>>;

    /// Update an existing goal.
    fn update_goal(&self, goal: &SavingsGoal) -> Result<()>;
}

/// Interface for storage connections: factory methods for the repositories a
/// backend provides, so the domain layer never names a concrete store type.
pub trait Connection: Send + Sync + Clone {
    type ProfileRepository: ProfileStorage + Clone;
    type TaskRepository: TaskStorage + Clone;
    type LedgerRepository: LedgerStorage + Clone;
    type PayscaleRepository: PayscaleStorage + Clone;
    type GoalRepository: GoalStorage + Clone;

    fn create_profile_repository(&self) -> Self::ProfileRepository;
    fn create_task_repository(&self) -> Self::TaskRepository;
    fn create_ledger_repository(&self) -> Self::LedgerRepository;
    fn create_payscale_repository(&self) -> Self::PayscaleRepository;
    fn create_goal_repository(&self) -> Self::GoalRepository;
}

//! Domain-level command and query types.
//!
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer is responsible for mapping the
//! public DTOs defined in the `shared` crate to these internal types. All
//! amounts here are integer cents.

pub mod profiles {
    use crate::domain::models::grade::{Grade, Subject};
    use crate::domain::models::profile::{Profile, Role};

    /// Input for creating a new profile.
    #[derive(Debug, Clone)]
    pub struct CreateProfileCommand {
        pub household_id: String,
        pub name: String,
        pub role: Role,
    }

    /// Input for adding a subject to a profile.
    #[derive(Debug, Clone)]
    pub struct AddSubjectCommand {
        pub profile_id: String,
        pub name: String,
        pub grade: Grade,
    }

    /// Input for changing the grade of an existing subject.
    #[derive(Debug, Clone)]
    pub struct UpdateSubjectGradeCommand {
        pub profile_id: String,
        pub subject_id: String,
        pub grade: Grade,
    }

    /// Input for removing a subject from a profile.
    #[derive(Debug, Clone)]
    pub struct RemoveSubjectCommand {
        pub profile_id: String,
        pub subject_id: String,
    }

    /// Result of creating a profile.
    #[derive(Debug, Clone)]
    pub struct CreateProfileResult {
        pub profile: Profile,
    }

    /// Result of adding a subject.
    #[derive(Debug, Clone)]
    pub struct AddSubjectResult {
        pub profile: Profile,
        pub subject: Subject,
    }

    /// Result of a subject mutation.
    #[derive(Debug, Clone)]
    pub struct SubjectMutationResult {
        pub profile: Profile,
    }

    /// Result of listing profiles in a household.
    #[derive(Debug, Clone)]
    pub struct ListProfilesResult {
        pub profiles: Vec<Profile>,
    }
}

pub mod payscale {
    use crate::domain::models::grade::{Grade, GradeConfig};

    /// Input for setting the cents-per-hour value of one grade.
    #[derive(Debug, Clone)]
    pub struct UpsertGradeConfigCommand {
        pub household_id: String,
        pub grade: Grade,
        pub value_cents: i64,
    }

    /// Result of upserting a grade config.
    #[derive(Debug, Clone)]
    pub struct UpsertGradeConfigResult {
        pub config: GradeConfig,
    }

    /// Result of listing a household's payscale.
    #[derive(Debug, Clone)]
    pub struct ListGradeConfigsResult {
        pub configs: Vec<GradeConfig>,
    }
}

pub mod tasks {
    use crate::domain::models::ledger::LedgerEntry;
    use crate::domain::models::task::Task;

    /// Input for creating a new task. An assignee sends the task straight to
    /// `Assigned`; `draft` keeps it parent-only; otherwise it opens for any
    /// child to claim.
    #[derive(Debug, Clone)]
    pub struct CreateTaskCommand {
        pub household_id: String,
        pub name: String,
        pub baseline_minutes: u32,
        pub assignee_id: Option<String>,
        pub draft: bool,
        pub value_cents: Option<i64>,
        pub multiplier: Option<f64>,
        pub bonus_cents: Option<i64>,
    }

    /// Input for publishing a draft.
    #[derive(Debug, Clone)]
    pub struct PublishTaskCommand {
        pub task_id: String,
        pub assignee_id: Option<String>,
    }

    /// Input for a child claiming an open task.
    #[derive(Debug, Clone)]
    pub struct ClaimTaskCommand {
        pub task_id: String,
        pub profile_id: String,
    }

    /// Input for a child submitting finished work.
    #[derive(Debug, Clone)]
    pub struct SubmitTaskCommand {
        pub task_id: String,
        pub profile_id: String,
    }

    /// Input for rejecting submitted work; the comment is mandatory.
    #[derive(Debug, Clone)]
    pub struct RejectTaskCommand {
        pub task_id: String,
        pub comment: String,
    }

    /// Query parameters for listing tasks.
    #[derive(Debug, Clone, Default)]
    pub struct TaskListQuery {
        pub household_id: String,
        pub assignee_id: Option<String>,
        /// Drafts are parent-only; child-facing views leave this false.
        pub include_drafts: bool,
    }

    /// Result wrapping a single task after a transition.
    #[derive(Debug, Clone)]
    pub struct TaskResult {
        pub task: Task,
    }

    /// Result of marking a task paid. `entry` is `None` when the call was an
    /// idempotent repeat on an already-paid task.
    #[derive(Debug, Clone)]
    pub struct MarkTaskPaidResult {
        pub task: Task,
        pub entry: Option<LedgerEntry>,
        pub amount_cents: i64,
    }

    /// Result of listing tasks.
    #[derive(Debug, Clone)]
    pub struct TaskListResult {
        pub tasks: Vec<Task>,
    }
}

pub mod ledger {
    use crate::domain::models::ledger::LedgerEntry;

    /// Input for posting a task payout or other earning.
    #[derive(Debug, Clone)]
    pub struct RecordEarningCommand {
        pub profile_id: String,
        pub amount_cents: i64,
        pub memo: String,
        pub task_id: Option<String>,
    }

    /// Input for handing out an advance.
    #[derive(Debug, Clone)]
    pub struct RecordAdvanceCommand {
        pub profile_id: String,
        pub amount_cents: i64,
        pub memo: String,
    }

    /// Input for a manual signed correction.
    #[derive(Debug, Clone)]
    pub struct RecordAdjustmentCommand {
        pub profile_id: String,
        pub amount_cents: i64,
        pub memo: String,
    }

    /// Input for requesting a cash-out.
    #[derive(Debug, Clone)]
    pub struct RequestWithdrawalCommand {
        pub profile_id: String,
        pub amount_cents: i64,
        pub memo: String,
    }

    /// Input for confirming or rejecting a pending withdrawal.
    #[derive(Debug, Clone)]
    pub struct ResolveWithdrawalCommand {
        pub profile_id: String,
        pub entry_id: String,
    }

    /// Query parameters for listing a profile's ledger.
    #[derive(Debug, Clone)]
    pub struct LedgerListQuery {
        pub profile_id: String,
        pub limit: Option<u32>,
    }

    /// Result of a ledger posting.
    #[derive(Debug, Clone)]
    pub struct PostingResult {
        pub entry: LedgerEntry,
        pub new_balance_cents: i64,
    }

    /// Current balance figures for a profile.
    #[derive(Debug, Clone)]
    pub struct BalanceResult {
        pub balance_cents: i64,
        pub spendable_balance_cents: i64,
    }

    /// Result of listing ledger entries.
    #[derive(Debug, Clone)]
    pub struct LedgerListResult {
        pub entries: Vec<LedgerEntry>,
    }
}

pub mod goals {
    use crate::domain::models::goal::SavingsGoal;
    use crate::domain::models::ledger::LedgerEntry;

    /// Input for creating a savings goal.
    #[derive(Debug, Clone)]
    pub struct CreateGoalCommand {
        pub profile_id: String,
        pub name: String,
        pub target_amount_cents: i64,
    }

    /// Input for moving spendable funds into the active goal.
    #[derive(Debug, Clone)]
    pub struct AllocateToGoalCommand {
        pub profile_id: String,
        pub amount_cents: i64,
    }

    /// Input for cancelling the active goal.
    #[derive(Debug, Clone)]
    pub struct CancelGoalCommand {
        pub profile_id: String,
    }

    /// Result of creating a goal.
    #[derive(Debug, Clone)]
    pub struct CreateGoalResult {
        pub goal: SavingsGoal,
    }

    /// Result of an allocation.
    #[derive(Debug, Clone)]
    pub struct AllocateToGoalResult {
        pub goal: SavingsGoal,
        pub entry: LedgerEntry,
        pub new_balance_cents: i64,
        pub completed: bool,
    }

    /// Result of cancelling a goal; the accumulated cents return to the
    /// profile's spendable balance.
    #[derive(Debug, Clone)]
    pub struct CancelGoalResult {
        pub goal: SavingsGoal,
        pub returned_cents: i64,
    }

    /// Result of fetching the active goal.
    #[derive(Debug, Clone)]
    pub struct GetCurrentGoalResult {
        pub goal: Option<SavingsGoal>,
    }
}

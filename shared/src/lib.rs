//! Public DTO types shared across the HomeWork API boundary.
//!
//! These are wire shapes only: amounts appear both as display dollars and as
//! canonical integer cents, enums travel as strings, and all business rules
//! live behind the backend's domain layer.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Profiles & subjects
// ---------------------------------------------------------------------------

/// A school subject attached to a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectDto {
    pub id: String,
    pub name: String,
    /// Letter grade, "A+" through "F".
    pub grade: String,
}

/// A household member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDto {
    pub id: String,
    pub household_id: String,
    pub name: String,
    /// "admin", "child" or "member".
    pub role: String,
    pub subjects: Vec<SubjectDto>,
    /// Display dollars, derived from `balance_cents`.
    pub balance: f64,
    /// Canonical integer-cents balance.
    pub balance_cents: i64,
    /// Current hourly rate in dollars, derived from subjects and payscale.
    pub hourly_rate: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// Request for creating a new profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub household_id: String,
    pub name: String,
    pub role: String,
}

/// Request for adding a subject to a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddSubjectRequest {
    pub name: String,
    pub grade: String,
}

/// Request for changing an existing subject's grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSubjectGradeRequest {
    pub grade: String,
}

/// Response wrapping a single profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: ProfileDto,
    pub success_message: String,
}

/// Response containing a household's profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileListResponse {
    pub profiles: Vec<ProfileDto>,
}

// ---------------------------------------------------------------------------
// Payscale
// ---------------------------------------------------------------------------

/// One grade's payscale row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeConfigDto {
    pub grade: String,
    pub value_cents: i64,
    /// Display dollars, derived from `value_cents`.
    pub value: f64,
}

/// Request for setting one grade's cents-per-hour value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateGradeConfigRequest {
    pub grade: String,
    pub value_cents: i64,
}

/// Response containing a household's payscale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayscaleResponse {
    pub configs: Vec<GradeConfigDto>,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// A task as seen over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDto {
    pub id: String,
    pub household_id: String,
    pub name: String,
    pub baseline_minutes: u32,
    /// Lifecycle status, e.g. "open" or "pending_approval".
    pub status: String,
    pub assignee_id: Option<String>,
    /// Flat-value override in display dollars, when set.
    pub value: Option<f64>,
    pub value_cents: Option<i64>,
    pub multiplier: Option<f64>,
    pub bonus_cents: Option<i64>,
    pub rejection_comment: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request for creating a task. `value` and `bonus` are dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub household_id: String,
    pub name: String,
    pub baseline_minutes: u32,
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub draft: bool,
    pub value: Option<f64>,
    pub multiplier: Option<f64>,
    pub bonus: Option<f64>,
}

/// Request for publishing a draft task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishTaskRequest {
    pub assignee_id: Option<String>,
}

/// Request for a child claiming an open task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimTaskRequest {
    pub profile_id: String,
}

/// Request for submitting finished work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitTaskRequest {
    pub profile_id: String,
}

/// Request for rejecting submitted work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectTaskRequest {
    pub comment: String,
}

/// Response wrapping a single task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub task: TaskDto,
    pub success_message: String,
}

/// Response containing a task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskDto>,
}

/// Response after paying out a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayTaskResponse {
    pub task: TaskDto,
    /// Amount paid, display dollars.
    pub amount: f64,
    pub amount_cents: i64,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// One ledger entry as seen over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntryDto {
    pub id: String,
    pub profile_id: String,
    /// "earning", "advance", "adjustment", "withdrawal_request" or
    /// "goal_allocation".
    pub entry_type: String,
    /// Signed display dollars.
    pub amount: f64,
    /// Signed canonical cents.
    pub amount_cents: i64,
    pub memo: String,
    pub date: String,
    /// "pending", "paid" or "rejected"; withdrawal requests only.
    pub status: Option<String>,
    pub task_id: Option<String>,
    pub balance_after_cents: Option<i64>,
}

/// Request for posting an earning, advance, or withdrawal request. The
/// amount is positive display dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountRequest {
    pub amount: f64,
    pub memo: String,
}

/// Request for a manual adjustment; the amount is signed dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    pub amount: f64,
    pub memo: String,
}

/// Response after a ledger posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingResponse {
    pub entry: LedgerEntryDto,
    pub new_balance: f64,
    pub new_balance_cents: i64,
    pub success_message: String,
}

/// Current balance figures for a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: f64,
    pub balance_cents: i64,
    /// Balance minus pending withdrawal encumbrances.
    pub spendable_balance: f64,
    pub spendable_balance_cents: i64,
}

/// Response containing ledger entries, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerListResponse {
    pub entries: Vec<LedgerEntryDto>,
}

// ---------------------------------------------------------------------------
// Savings goals
// ---------------------------------------------------------------------------

/// A savings goal as seen over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalDto {
    pub id: String,
    pub profile_id: String,
    pub name: String,
    pub target_amount: f64,
    pub target_amount_cents: i64,
    pub current_amount: f64,
    pub current_amount_cents: i64,
    /// "active", "completed" or "cancelled".
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Request for creating a goal; the target is display dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGoalRequest {
    pub name: String,
    pub target_amount: f64,
}

/// Request for moving spendable dollars into the active goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocateToGoalRequest {
    pub amount: f64,
}

/// Response wrapping a single goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalResponse {
    pub goal: GoalDto,
    pub success_message: String,
}

/// Response for the current-goal query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentGoalResponse {
    pub goal: Option<GoalDto>,
}

/// Response after an allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocateToGoalResponse {
    pub goal: GoalDto,
    pub new_balance: f64,
    pub completed: bool,
    pub success_message: String,
}

/// Response after cancelling a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelGoalResponse {
    pub goal: GoalDto,
    /// Dollars returned to the spendable balance.
    pub returned_amount: f64,
    pub success_message: String,
}

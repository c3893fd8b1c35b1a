//! REST surface for the HomeWork backend.
//!
//! Thin axum handlers: map DTOs from the `shared` crate onto domain
//! commands, call the services, and map domain errors onto HTTP status
//! codes. No business rules live here.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::domain::commands::goals::{AllocateToGoalCommand, CancelGoalCommand, CreateGoalCommand};
use crate::domain::commands::ledger::{
    LedgerListQuery, RecordAdjustmentCommand, RecordAdvanceCommand, RequestWithdrawalCommand,
    ResolveWithdrawalCommand,
};
use crate::domain::commands::payscale::UpsertGradeConfigCommand;
use crate::domain::commands::profiles::{
    AddSubjectCommand, CreateProfileCommand, RemoveSubjectCommand, UpdateSubjectGradeCommand,
};
use crate::domain::commands::tasks::{
    ClaimTaskCommand, CreateTaskCommand, PublishTaskCommand, RejectTaskCommand, SubmitTaskCommand,
    TaskListQuery,
};
use crate::domain::models::goal::{GoalError, SavingsGoal};
use crate::domain::models::grade::{Grade, GradeConfig};
use crate::domain::models::ledger::{LedgerEntry, LedgerError};
use crate::domain::models::profile::{Profile, Role};
use crate::domain::models::task::{Task, TaskError};
use crate::domain::money::{cents_to_dollars, dollars_to_cents};
use crate::domain::{GoalService, LedgerService, PayscaleService, ProfileService, TaskService};
use crate::storage::csv::CsvConnection;

/// Application state holding the domain services.
#[derive(Clone)]
pub struct AppState {
    pub profile_service: ProfileService,
    pub payscale_service: PayscaleService,
    pub task_service: TaskService,
    pub ledger_service: LedgerService<CsvConnection>,
    pub goal_service: GoalService,
}

impl AppState {
    /// Wire up the full service graph over one storage connection.
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        let profile_service = ProfileService::new(connection.clone());
        let payscale_service = PayscaleService::new(
            connection.clone(),
            crate::domain::rate::default_payscale().clone(),
        );
        let ledger_service = LedgerService::new(connection.clone());
        let task_service = TaskService::new(
            connection.clone(),
            payscale_service.clone(),
            ledger_service.clone(),
        );
        let goal_service = GoalService::new(connection, ledger_service.clone());
        Self {
            profile_service,
            payscale_service,
            task_service,
            ledger_service,
            goal_service,
        }
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/profiles", post(create_profile).get(list_profiles))
        .route("/api/profiles/:profile_id", get(get_profile))
        .route("/api/profiles/:profile_id/subjects", post(add_subject))
        .route(
            "/api/profiles/:profile_id/subjects/:subject_id",
            put(update_subject_grade).delete(remove_subject),
        )
        .route(
            "/api/households/:household_id/payscale",
            get(get_payscale).put(update_grade_config),
        )
        .route("/api/tasks", post(create_task).get(list_tasks))
        .route("/api/tasks/:task_id", delete(delete_task))
        .route("/api/tasks/:task_id/publish", post(publish_task))
        .route("/api/tasks/:task_id/claim", post(claim_task))
        .route("/api/tasks/:task_id/submit", post(submit_task))
        .route("/api/tasks/:task_id/approve", post(approve_task))
        .route("/api/tasks/:task_id/reject", post(reject_task))
        .route("/api/tasks/:task_id/undo-approval", post(undo_approval))
        .route("/api/tasks/:task_id/pay", post(pay_task))
        .route("/api/profiles/:profile_id/advances", post(record_advance))
        .route("/api/profiles/:profile_id/adjustments", post(record_adjustment))
        .route("/api/profiles/:profile_id/withdrawals", post(request_withdrawal))
        .route(
            "/api/profiles/:profile_id/withdrawals/:entry_id/confirm",
            post(confirm_withdrawal),
        )
        .route(
            "/api/profiles/:profile_id/withdrawals/:entry_id/reject",
            post(reject_withdrawal),
        )
        .route("/api/profiles/:profile_id/ledger", get(list_ledger))
        .route("/api/profiles/:profile_id/balance", get(get_balance))
        .route(
            "/api/profiles/:profile_id/goals",
            post(create_goal).delete(cancel_goal),
        )
        .route("/api/profiles/:profile_id/goals/current", get(get_current_goal))
        .route("/api/profiles/:profile_id/goals/allocate", post(allocate_to_goal))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn error_response(err: anyhow::Error) -> Response {
    let status = if let Some(task_err) = err.downcast_ref::<TaskError>() {
        match task_err {
            TaskError::AlreadyClaimed { .. } => StatusCode::CONFLICT,
            TaskError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    } else if let Some(ledger_err) = err.downcast_ref::<LedgerError>() {
        match ledger_err {
            LedgerError::EntryNotFound { .. } | LedgerError::ProfileNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            LedgerError::InvalidWithdrawalState { .. } => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        }
    } else if err.downcast_ref::<GoalError>().is_some() {
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!("Internal error: {:#}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, err.to_string()).into_response()
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, message).into_response()
}

// ---------------------------------------------------------------------------
// DTO mapping
// ---------------------------------------------------------------------------

fn profile_to_dto(state: &AppState, profile: &Profile) -> shared::ProfileDto {
    let hourly_rate_cents = state
        .payscale_service
        .hourly_rate_cents_for(profile)
        .unwrap_or(0);
    shared::ProfileDto {
        id: profile.id.clone(),
        household_id: profile.household_id.clone(),
        name: profile.name.clone(),
        role: profile.role.as_str().to_string(),
        subjects: profile
            .subjects
            .iter()
            .map(|s| shared::SubjectDto {
                id: s.id.clone(),
                name: s.name.clone(),
                grade: s.grade.as_str().to_string(),
            })
            .collect(),
        balance: profile.balance(),
        balance_cents: profile.balance_cents,
        hourly_rate: cents_to_dollars(hourly_rate_cents),
        created_at: profile.created_at.to_rfc3339(),
        updated_at: profile.updated_at.to_rfc3339(),
    }
}

fn task_to_dto(task: &Task) -> shared::TaskDto {
    shared::TaskDto {
        id: task.id.clone(),
        household_id: task.household_id.clone(),
        name: task.name.clone(),
        baseline_minutes: task.baseline_minutes,
        status: task.status.as_str().to_string(),
        assignee_id: task.assignee_id.clone(),
        value: task.value_cents.map(cents_to_dollars),
        value_cents: task.value_cents,
        multiplier: task.multiplier,
        bonus_cents: task.bonus_cents,
        rejection_comment: task.rejection_comment.clone(),
        created_at: task.created_at.to_rfc3339(),
        updated_at: task.updated_at.to_rfc3339(),
    }
}

fn entry_to_dto(entry: &LedgerEntry) -> shared::LedgerEntryDto {
    shared::LedgerEntryDto {
        id: entry.id.clone(),
        profile_id: entry.profile_id.clone(),
        entry_type: entry.entry_type.as_str().to_string(),
        amount: cents_to_dollars(entry.amount_cents),
        amount_cents: entry.amount_cents,
        memo: entry.memo.clone(),
        date: entry.date.to_rfc3339(),
        status: entry.status.map(|s| s.as_str().to_string()),
        task_id: entry.task_id.clone(),
        balance_after_cents: entry.balance_after_cents,
    }
}

fn goal_to_dto(goal: &SavingsGoal) -> shared::GoalDto {
    shared::GoalDto {
        id: goal.id.clone(),
        profile_id: goal.profile_id.clone(),
        name: goal.name.clone(),
        target_amount: cents_to_dollars(goal.target_amount_cents),
        target_amount_cents: goal.target_amount_cents,
        current_amount: cents_to_dollars(goal.current_amount_cents),
        current_amount_cents: goal.current_amount_cents,
        state: goal.state.as_str().to_string(),
        created_at: goal.created_at.to_rfc3339(),
        updated_at: goal.updated_at.to_rfc3339(),
    }
}

fn config_to_dto(config: &GradeConfig) -> shared::GradeConfigDto {
    shared::GradeConfigDto {
        grade: config.grade.as_str().to_string(),
        value_cents: config.value_cents,
        value: cents_to_dollars(config.value_cents),
    }
}

fn posting_response(
    entry: &LedgerEntry,
    new_balance_cents: i64,
    success_message: String,
) -> shared::PostingResponse {
    shared::PostingResponse {
        entry: entry_to_dto(entry),
        new_balance: cents_to_dollars(new_balance_cents),
        new_balance_cents,
        success_message,
    }
}

// ---------------------------------------------------------------------------
// Profile handlers
// ---------------------------------------------------------------------------

pub async fn create_profile(
    State(state): State<AppState>,
    Json(request): Json<shared::CreateProfileRequest>,
) -> impl IntoResponse {
    info!("POST /api/profiles - name: {}", request.name);

    let role = match Role::parse(&request.role) {
        Ok(role) => role,
        Err(e) => return bad_request(e),
    };
    let command = CreateProfileCommand {
        household_id: request.household_id,
        name: request.name,
        role,
    };
    match state.profile_service.create_profile(command) {
        Ok(result) => (
            StatusCode::CREATED,
            Json(shared::ProfileResponse {
                profile: profile_to_dto(&state, &result.profile),
                success_message: "Profile created successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize, Debug)]
pub struct HouseholdQuery {
    pub household_id: String,
}

pub async fn list_profiles(
    State(state): State<AppState>,
    Query(query): Query<HouseholdQuery>,
) -> impl IntoResponse {
    match state.profile_service.list_profiles(&query.household_id) {
        Ok(result) => Json(shared::ProfileListResponse {
            profiles: result
                .profiles
                .iter()
                .map(|p| profile_to_dto(&state, p))
                .collect(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> impl IntoResponse {
    match state.profile_service.get_profile(&profile_id) {
        Ok(Some(profile)) => Json(profile_to_dto(&state, &profile)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Profile not found").into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn add_subject(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Json(request): Json<shared::AddSubjectRequest>,
) -> impl IntoResponse {
    let grade = match Grade::parse(&request.grade) {
        Ok(grade) => grade,
        Err(e) => return bad_request(e),
    };
    let command = AddSubjectCommand {
        profile_id,
        name: request.name,
        grade,
    };
    match state.profile_service.add_subject(command) {
        Ok(result) => (
            StatusCode::CREATED,
            Json(shared::ProfileResponse {
                profile: profile_to_dto(&state, &result.profile),
                success_message: format!("Subject {} added", result.subject.name),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_subject_grade(
    State(state): State<AppState>,
    Path((profile_id, subject_id)): Path<(String, String)>,
    Json(request): Json<shared::UpdateSubjectGradeRequest>,
) -> impl IntoResponse {
    let grade = match Grade::parse(&request.grade) {
        Ok(grade) => grade,
        Err(e) => return bad_request(e),
    };
    let command = UpdateSubjectGradeCommand {
        profile_id,
        subject_id,
        grade,
    };
    match state.profile_service.update_subject_grade(command) {
        Ok(result) => Json(shared::ProfileResponse {
            profile: profile_to_dto(&state, &result.profile),
            success_message: "Grade updated".to_string(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn remove_subject(
    State(state): State<AppState>,
    Path((profile_id, subject_id)): Path<(String, String)>,
) -> impl IntoResponse {
    let command = RemoveSubjectCommand {
        profile_id,
        subject_id,
    };
    match state.profile_service.remove_subject(command) {
        Ok(result) => Json(shared::ProfileResponse {
            profile: profile_to_dto(&state, &result.profile),
            success_message: "Subject removed".to_string(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

// ---------------------------------------------------------------------------
// Payscale handlers
// ---------------------------------------------------------------------------

pub async fn get_payscale(
    State(state): State<AppState>,
    Path(household_id): Path<String>,
) -> impl IntoResponse {
    match state.payscale_service.list_grade_configs(&household_id) {
        Ok(result) => Json(shared::PayscaleResponse {
            configs: result.configs.iter().map(config_to_dto).collect(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_grade_config(
    State(state): State<AppState>,
    Path(household_id): Path<String>,
    Json(request): Json<shared::UpdateGradeConfigRequest>,
) -> impl IntoResponse {
    let grade = match Grade::parse(&request.grade) {
        Ok(grade) => grade,
        Err(e) => return bad_request(e),
    };
    let command = UpsertGradeConfigCommand {
        household_id,
        grade,
        value_cents: request.value_cents,
    };
    match state.payscale_service.upsert_grade_config(command) {
        Ok(result) => Json(config_to_dto(&result.config)).into_response(),
        Err(e) => error_response(e),
    }
}

// ---------------------------------------------------------------------------
// Task handlers
// ---------------------------------------------------------------------------

pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<shared::CreateTaskRequest>,
) -> impl IntoResponse {
    info!("POST /api/tasks - name: {}", request.name);

    let command = CreateTaskCommand {
        household_id: request.household_id,
        name: request.name,
        baseline_minutes: request.baseline_minutes,
        assignee_id: request.assignee_id,
        draft: request.draft,
        value_cents: request.value.map(dollars_to_cents),
        multiplier: request.multiplier,
        bonus_cents: request.bonus.map(dollars_to_cents),
    };
    match state.task_service.create_task(command) {
        Ok(result) => (
            StatusCode::CREATED,
            Json(shared::TaskResponse {
                task: task_to_dto(&result.task),
                success_message: "Task created successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize, Debug)]
pub struct TaskListParams {
    pub household_id: String,
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub include_drafts: bool,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
) -> impl IntoResponse {
    let query = TaskListQuery {
        household_id: params.household_id,
        assignee_id: params.assignee_id,
        include_drafts: params.include_drafts,
    };
    match state.task_service.list_tasks(query) {
        Ok(result) => Json(shared::TaskListResponse {
            tasks: result.tasks.iter().map(task_to_dto).collect(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

fn task_response(
    result: anyhow::Result<crate::domain::commands::tasks::TaskResult>,
    message: &str,
) -> Response {
    match result {
        Ok(result) => Json(shared::TaskResponse {
            task: task_to_dto(&result.task),
            success_message: message.to_string(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn publish_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<shared::PublishTaskRequest>,
) -> impl IntoResponse {
    let command = PublishTaskCommand {
        task_id,
        assignee_id: request.assignee_id,
    };
    task_response(state.task_service.publish_task(command), "Task published")
}

pub async fn claim_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<shared::ClaimTaskRequest>,
) -> impl IntoResponse {
    let command = ClaimTaskCommand {
        task_id,
        profile_id: request.profile_id,
    };
    task_response(state.task_service.claim_task(command), "Task claimed")
}

pub async fn submit_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<shared::SubmitTaskRequest>,
) -> impl IntoResponse {
    let command = SubmitTaskCommand {
        task_id,
        profile_id: request.profile_id,
    };
    task_response(
        state.task_service.submit_task(command),
        "Task submitted for approval",
    )
}

pub async fn approve_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> impl IntoResponse {
    task_response(state.task_service.approve_task(&task_id), "Task approved")
}

pub async fn reject_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<shared::RejectTaskRequest>,
) -> impl IntoResponse {
    let command = RejectTaskCommand {
        task_id,
        comment: request.comment,
    };
    task_response(
        state.task_service.reject_task(command),
        "Task sent back for rework",
    )
}

pub async fn undo_approval(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> impl IntoResponse {
    task_response(state.task_service.undo_approval(&task_id), "Approval undone")
}

pub async fn pay_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> impl IntoResponse {
    match state.task_service.mark_task_paid(&task_id) {
        Ok(result) => {
            let amount = cents_to_dollars(result.amount_cents);
            Json(shared::PayTaskResponse {
                task: task_to_dto(&result.task),
                amount,
                amount_cents: result.amount_cents,
                success_message: if result.entry.is_some() {
                    format!("Paid ${:.2}", amount)
                } else {
                    "Task was already paid".to_string()
                },
            })
            .into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> impl IntoResponse {
    task_response(state.task_service.delete_task(&task_id), "Task deleted")
}

// ---------------------------------------------------------------------------
// Ledger handlers
// ---------------------------------------------------------------------------

pub async fn record_advance(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Json(request): Json<shared::AmountRequest>,
) -> impl IntoResponse {
    let command = RecordAdvanceCommand {
        profile_id,
        amount_cents: dollars_to_cents(request.amount),
        memo: request.memo,
    };
    match state.ledger_service.record_advance(command) {
        Ok(result) => (
            StatusCode::CREATED,
            Json(posting_response(
                &result.entry,
                result.new_balance_cents,
                "Advance recorded".to_string(),
            )),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn record_adjustment(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Json(request): Json<shared::AdjustmentRequest>,
) -> impl IntoResponse {
    let command = RecordAdjustmentCommand {
        profile_id,
        amount_cents: dollars_to_cents(request.amount),
        memo: request.memo,
    };
    match state.ledger_service.record_manual_adjustment(command) {
        Ok(result) => (
            StatusCode::CREATED,
            Json(posting_response(
                &result.entry,
                result.new_balance_cents,
                "Adjustment recorded".to_string(),
            )),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn request_withdrawal(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Json(request): Json<shared::AmountRequest>,
) -> impl IntoResponse {
    let command = RequestWithdrawalCommand {
        profile_id,
        amount_cents: dollars_to_cents(request.amount),
        memo: request.memo,
    };
    match state.ledger_service.request_withdrawal(command) {
        Ok(result) => (
            StatusCode::CREATED,
            Json(posting_response(
                &result.entry,
                result.new_balance_cents,
                "Withdrawal requested".to_string(),
            )),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn confirm_withdrawal(
    State(state): State<AppState>,
    Path((profile_id, entry_id)): Path<(String, String)>,
) -> impl IntoResponse {
    let command = ResolveWithdrawalCommand {
        profile_id,
        entry_id,
    };
    match state.ledger_service.confirm_withdrawal_payout(command) {
        Ok(result) => Json(posting_response(
            &result.entry,
            result.new_balance_cents,
            "Withdrawal paid out".to_string(),
        ))
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn reject_withdrawal(
    State(state): State<AppState>,
    Path((profile_id, entry_id)): Path<(String, String)>,
) -> impl IntoResponse {
    let command = ResolveWithdrawalCommand {
        profile_id,
        entry_id,
    };
    match state.ledger_service.reject_withdrawal(command) {
        Ok(result) => Json(posting_response(
            &result.entry,
            result.new_balance_cents,
            "Withdrawal rejected".to_string(),
        ))
        .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize, Debug)]
pub struct LedgerListParams {
    pub limit: Option<u32>,
}

pub async fn list_ledger(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Query(params): Query<LedgerListParams>,
) -> impl IntoResponse {
    let query = LedgerListQuery {
        profile_id,
        limit: params.limit,
    };
    match state.ledger_service.list_entries(query) {
        Ok(result) => Json(shared::LedgerListResponse {
            entries: result.entries.iter().map(entry_to_dto).collect(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_balance(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> impl IntoResponse {
    match state.ledger_service.balance(&profile_id) {
        Ok(result) => Json(shared::BalanceResponse {
            balance: cents_to_dollars(result.balance_cents),
            balance_cents: result.balance_cents,
            spendable_balance: cents_to_dollars(result.spendable_balance_cents),
            spendable_balance_cents: result.spendable_balance_cents,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

// ---------------------------------------------------------------------------
// Goal handlers
// ---------------------------------------------------------------------------

pub async fn create_goal(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Json(request): Json<shared::CreateGoalRequest>,
) -> impl IntoResponse {
    let command = CreateGoalCommand {
        profile_id,
        name: request.name,
        target_amount_cents: dollars_to_cents(request.target_amount),
    };
    match state.goal_service.create_goal(command) {
        Ok(result) => (
            StatusCode::CREATED,
            Json(shared::GoalResponse {
                goal: goal_to_dto(&result.goal),
                success_message: "Goal created successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_current_goal(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> impl IntoResponse {
    match state.goal_service.get_current_goal(&profile_id) {
        Ok(result) => Json(shared::CurrentGoalResponse {
            goal: result.goal.as_ref().map(goal_to_dto),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn allocate_to_goal(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Json(request): Json<shared::AllocateToGoalRequest>,
) -> impl IntoResponse {
    let command = AllocateToGoalCommand {
        profile_id,
        amount_cents: dollars_to_cents(request.amount),
    };
    match state.goal_service.allocate_to_goal(command) {
        Ok(result) => Json(shared::AllocateToGoalResponse {
            goal: goal_to_dto(&result.goal),
            new_balance: cents_to_dollars(result.new_balance_cents),
            completed: result.completed,
            success_message: if result.completed {
                "Goal funded and completed!".to_string()
            } else {
                "Allocation saved".to_string()
            },
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn cancel_goal(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> impl IntoResponse {
    let command = CancelGoalCommand { profile_id };
    match state.goal_service.cancel_goal(command) {
        Ok(result) => Json(shared::CancelGoalResponse {
            goal: goal_to_dto(&result.goal),
            returned_amount: cents_to_dollars(result.returned_cents),
            success_message: "Goal cancelled, funds returned".to_string(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Helper to create test handlers backed by a temp data directory.
    fn setup_test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        (AppState::new(connection), temp_dir)
    }

    async fn create_profile_via_handler(state: &AppState, name: &str) -> shared::ProfileDto {
        let response = create_profile(
            State(state.clone()),
            Json(shared::CreateProfileRequest {
                household_id: "household::1".to_string(),
                name: name.to_string(),
                role: "child".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: shared::ProfileResponse = serde_json::from_slice(&body).unwrap();
        parsed.profile
    }

    #[tokio::test]
    async fn test_create_profile_rejects_unknown_role() {
        let (state, _temp_dir) = setup_test_state();
        let response = create_profile(
            State(state),
            Json(shared::CreateProfileRequest {
                household_id: "household::1".to_string(),
                name: "Alice".to_string(),
                role: "owner".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_task_flow_over_handlers() {
        let (state, _temp_dir) = setup_test_state();
        let profile = create_profile_via_handler(&state, "Alice").await;

        let response = create_task(
            State(state.clone()),
            Json(shared::CreateTaskRequest {
                household_id: "household::1".to_string(),
                name: "Sweep the porch".to_string(),
                baseline_minutes: 30,
                assignee_id: None,
                draft: false,
                value: Some(2.50),
                multiplier: None,
                bonus: None,
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let created: shared::TaskResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(created.task.status, "open");
        assert_eq!(created.task.value_cents, Some(250));

        let response = claim_task(
            State(state.clone()),
            Path(created.task.id.clone()),
            Json(shared::ClaimTaskRequest {
                profile_id: profile.id.clone(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        // A second claim hits the conflict path.
        let response = claim_task(
            State(state.clone()),
            Path(created.task.id.clone()),
            Json(shared::ClaimTaskRequest {
                profile_id: profile.id.clone(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_reject_without_comment_is_bad_request() {
        let (state, _temp_dir) = setup_test_state();
        let profile = create_profile_via_handler(&state, "Alice").await;

        let task = state
            .task_service
            .create_task(CreateTaskCommand {
                household_id: "household::1".to_string(),
                name: "Fold laundry".to_string(),
                baseline_minutes: 20,
                assignee_id: Some(profile.id.clone()),
                draft: false,
                value_cents: None,
                multiplier: None,
                bonus_cents: None,
            })
            .unwrap()
            .task;
        state
            .task_service
            .submit_task(SubmitTaskCommand {
                task_id: task.id.clone(),
                profile_id: profile.id,
            })
            .unwrap();

        let response = reject_task(
            State(state),
            Path(task.id),
            Json(shared::RejectTaskRequest {
                comment: "   ".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_balance_endpoint_reports_spendable() {
        let (state, _temp_dir) = setup_test_state();
        let profile = create_profile_via_handler(&state, "Alice").await;
        state
            .ledger_service
            .record_earning(crate::domain::commands::ledger::RecordEarningCommand {
                profile_id: profile.id.clone(),
                amount_cents: 1000,
                memo: "Chores".to_string(),
                task_id: None,
            })
            .unwrap();

        let response = request_withdrawal(
            State(state.clone()),
            Path(profile.id.clone()),
            Json(shared::AmountRequest {
                amount: 4.00,
                memo: "Cash".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = get_balance(State(state), Path(profile.id))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let balance: shared::BalanceResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(balance.balance_cents, 1000);
        assert_eq!(balance.spendable_balance_cents, 600);
    }
}

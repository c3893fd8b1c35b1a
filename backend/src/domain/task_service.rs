//! Task lifecycle service.
//!
//! Owns the status state machine: which transitions are legal, who may
//! trigger them, and the one transition (claiming) where two children can
//! race. Transitions go through the store's conditional update so the status
//! check and the write are a single atomic step.

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::ledger::RecordEarningCommand;
use crate::domain::commands::tasks::{
    ClaimTaskCommand, CreateTaskCommand, MarkTaskPaidResult, PublishTaskCommand,
    RejectTaskCommand, SubmitTaskCommand, TaskListQuery, TaskListResult, TaskResult,
};
use crate::domain::ledger_service::LedgerService;
use crate::domain::models::task::{Task, TaskError, TaskStatus};
use crate::domain::payscale_service::PayscaleService;
use crate::storage::csv::{CsvConnection, ProfileRepository, TaskRepository};
use crate::storage::traits::{ConditionalUpdate, ProfileStorage, TaskFieldPatch, TaskStorage};

/// Service driving tasks through their lifecycle.
#[derive(Clone)]
pub struct TaskService {
    task_repository: TaskRepository,
    profile_repository: ProfileRepository,
    payscale_service: PayscaleService,
    ledger_service: LedgerService<CsvConnection>,
}

impl TaskService {
    pub fn new(
        connection: Arc<CsvConnection>,
        payscale_service: PayscaleService,
        ledger_service: LedgerService<CsvConnection>,
    ) -> Self {
        let task_repository = TaskRepository::new((*connection).clone());
        let profile_repository = ProfileRepository::new((*connection).clone());
        Self {
            task_repository,
            profile_repository,
            payscale_service,
            ledger_service,
        }
    }

    /// Create a task. An assignee sends it straight to `Assigned`; otherwise
    /// `draft` keeps it parent-only and anything else opens it for claiming.
    pub fn create_task(&self, command: CreateTaskCommand) -> Result<TaskResult> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(anyhow::anyhow!("Task name cannot be empty"));
        }
        if command.value_cents.is_some_and(|v| v < 0) {
            return Err(anyhow::anyhow!("Task value must not be negative"));
        }
        if command.bonus_cents.is_some_and(|b| b < 0) {
            return Err(anyhow::anyhow!("Task bonus must not be negative"));
        }

        let status = match &command.assignee_id {
            Some(assignee_id) => {
                self.require_profile_exists(assignee_id)?;
                TaskStatus::Assigned
            }
            None if command.draft => TaskStatus::Draft,
            None => TaskStatus::Open,
        };

        let now = Utc::now();
        let task = Task {
            id: Task::generate_id(now.timestamp_millis() as u64),
            household_id: command.household_id,
            name: name.to_string(),
            baseline_minutes: command.baseline_minutes,
            status,
            assignee_id: command.assignee_id,
            value_cents: command.value_cents,
            multiplier: command.multiplier,
            bonus_cents: command.bonus_cents,
            rejection_comment: None,
            created_at: now,
            updated_at: now,
        };
        self.task_repository.store_task(&task)?;
        info!("Created task {} ({}) as {}", task.name, task.id, task.status);
        Ok(TaskResult { task })
    }

    /// Publish a draft: visible to children as `Open`, or handed straight to
    /// an assignee.
    pub fn publish_task(&self, command: PublishTaskCommand) -> Result<TaskResult> {
        let (new_status, patch) = match command.assignee_id {
            Some(assignee_id) => {
                self.require_profile_exists(&assignee_id)?;
                (
                    TaskStatus::Assigned,
                    TaskFieldPatch {
                        assignee_id: Some(assignee_id),
                        ..Default::default()
                    },
                )
            }
            None => (TaskStatus::Open, TaskFieldPatch::default()),
        };
        self.transition(&command.task_id, TaskStatus::Draft, new_status, patch)
    }

    /// A child takes ownership of an open task. This is the one
    /// concurrency-sensitive transition: the conditional write decides the
    /// winner and the loser gets an explicit conflict.
    pub fn claim_task(&self, command: ClaimTaskCommand) -> Result<TaskResult> {
        self.require_profile_exists(&command.profile_id)?;
        self.require_task(&command.task_id)?;

        let outcome = self.task_repository.conditional_update_status(
            &command.task_id,
            TaskStatus::Open,
            TaskStatus::Assigned,
            TaskFieldPatch {
                assignee_id: Some(command.profile_id.clone()),
                ..Default::default()
            },
        )?;
        match outcome {
            ConditionalUpdate::Applied(task) => {
                info!("Task {} claimed by {}", task.id, command.profile_id);
                Ok(TaskResult { task })
            }
            ConditionalUpdate::Conflict { actual: TaskStatus::Assigned } => {
                Err(TaskError::AlreadyClaimed {
                    task_id: command.task_id,
                }
                .into())
            }
            ConditionalUpdate::Conflict { actual } => Err(TaskError::InvalidStatus {
                task_id: command.task_id,
                expected: TaskStatus::Open,
                actual,
            }
            .into()),
        }
    }

    /// The assignee submits finished work for approval. Any prior rejection
    /// comment is cleared so the parent reviews a fresh submission.
    pub fn submit_task(&self, command: SubmitTaskCommand) -> Result<TaskResult> {
        let task = self.require_task(&command.task_id)?;
        if task.assignee_id.as_deref() != Some(command.profile_id.as_str()) {
            return Err(TaskError::NotAssignee {
                task_id: command.task_id,
                profile_id: command.profile_id,
            }
            .into());
        }

        self.transition(
            &command.task_id,
            TaskStatus::Assigned,
            TaskStatus::PendingApproval,
            TaskFieldPatch {
                clear_rejection_comment: true,
                ..Default::default()
            },
        )
    }

    /// Parent accepts the work; payment is a separate step.
    pub fn approve_task(&self, task_id: &str) -> Result<TaskResult> {
        self.transition(
            task_id,
            TaskStatus::PendingApproval,
            TaskStatus::PendingPayment,
            TaskFieldPatch::default(),
        )
    }

    /// Parent sends the work back with a mandatory comment so the child can
    /// see why and resubmit.
    pub fn reject_task(&self, command: RejectTaskCommand) -> Result<TaskResult> {
        let comment = command.comment.trim();
        if comment.is_empty() {
            return Err(TaskError::MissingRejectionComment.into());
        }

        self.transition(
            &command.task_id,
            TaskStatus::PendingApproval,
            TaskStatus::Assigned,
            TaskFieldPatch {
                rejection_comment: Some(comment.to_string()),
                ..Default::default()
            },
        )
    }

    /// Back out a not-yet-paid approval. No ledger effect.
    pub fn undo_approval(&self, task_id: &str) -> Result<TaskResult> {
        self.transition(
            task_id,
            TaskStatus::PendingPayment,
            TaskStatus::PendingApproval,
            TaskFieldPatch::default(),
        )
    }

    /// Pay out an approved task: flips it to `Paid` and posts one earning of
    /// its effective value. Idempotent: repeating the call on an already-paid
    /// task is a no-op success, never a second posting. The conditional
    /// status flip is what guards the ledger post.
    pub fn mark_task_paid(&self, task_id: &str) -> Result<MarkTaskPaidResult> {
        let task = self.require_task(task_id)?;
        if task.status == TaskStatus::Paid {
            info!("Task {} already paid, skipping duplicate payment", task_id);
            return Ok(MarkTaskPaidResult {
                task,
                entry: None,
                amount_cents: 0,
            });
        }
        if task.status != TaskStatus::PendingPayment {
            return Err(TaskError::InvalidStatus {
                task_id: task_id.to_string(),
                expected: TaskStatus::PendingPayment,
                actual: task.status,
            }
            .into());
        }

        let assignee_id = task
            .assignee_id
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Task {} has no assignee to pay", task_id))?;
        let profile = self
            .profile_repository
            .get_profile(&assignee_id)?
            .ok_or_else(|| anyhow::anyhow!("Profile not found: {}", assignee_id))?;
        let hourly_rate_cents = self.payscale_service.hourly_rate_cents_for(&profile)?;
        let amount_cents = task.effective_value_cents(hourly_rate_cents);

        let outcome = self.task_repository.conditional_update_status(
            task_id,
            TaskStatus::PendingPayment,
            TaskStatus::Paid,
            TaskFieldPatch::default(),
        )?;
        let task = match outcome {
            ConditionalUpdate::Applied(task) => task,
            ConditionalUpdate::Conflict { actual: TaskStatus::Paid } => {
                // A concurrent payer won the flip; their posting stands.
                info!("Task {} paid concurrently, skipping duplicate payment", task_id);
                return Ok(MarkTaskPaidResult {
                    task: self.require_task(task_id)?,
                    entry: None,
                    amount_cents: 0,
                });
            }
            ConditionalUpdate::Conflict { actual } => {
                return Err(TaskError::InvalidStatus {
                    task_id: task_id.to_string(),
                    expected: TaskStatus::PendingPayment,
                    actual,
                }
                .into())
            }
        };

        let entry = if amount_cents > 0 {
            let posting = self.ledger_service.record_earning(RecordEarningCommand {
                profile_id: assignee_id.clone(),
                amount_cents,
                memo: task.name.clone(),
                task_id: Some(task.id.clone()),
            })?;
            Some(posting.entry)
        } else {
            warn!("Task {} has zero value, marking paid without a posting", task.id);
            None
        };

        info!(
            "Task {} paid: {} cents to profile {}",
            task.id, amount_cents, assignee_id
        );
        Ok(MarkTaskPaidResult {
            task,
            entry,
            amount_cents,
        })
    }

    /// Soft-delete. Paid tasks are immutable history and cannot be deleted.
    pub fn delete_task(&self, task_id: &str) -> Result<TaskResult> {
        let task = self.require_task(task_id)?;
        if task.status == TaskStatus::Paid {
            return Err(TaskError::PaidTaskNotDeletable {
                task_id: task_id.to_string(),
            }
            .into());
        }

        self.transition(
            task_id,
            task.status,
            TaskStatus::Deleted,
            TaskFieldPatch::default(),
        )
    }

    /// List a household's tasks. Deleted tasks are always filtered out;
    /// drafts only appear when the caller asks for them (parent views).
    pub fn list_tasks(&self, query: TaskListQuery) -> Result<TaskListResult> {
        let tasks = self
            .task_repository
            .list_tasks(&query.household_id)?
            .into_iter()
            .filter(|t| query.include_drafts || t.status != TaskStatus::Draft)
            .filter(|t| match &query.assignee_id {
                Some(assignee_id) => t.assignee_id.as_deref() == Some(assignee_id.as_str()),
                None => true,
            })
            .collect();
        Ok(TaskListResult { tasks })
    }

    pub fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        self.task_repository.get_task(task_id)
    }

    fn require_task(&self, task_id: &str) -> Result<Task> {
        self.task_repository
            .get_task(task_id)?
            .ok_or_else(|| {
                TaskError::NotFound {
                    task_id: task_id.to_string(),
                }
                .into()
            })
    }

    fn require_profile_exists(&self, profile_id: &str) -> Result<()> {
        self.profile_repository
            .get_profile(profile_id)?
            .ok_or_else(|| anyhow::anyhow!("Profile not found: {}", profile_id))?;
        Ok(())
    }

    /// Run one conditional transition, mapping a conflict to the
    /// expected-vs-actual domain error.
    fn transition(
        &self,
        task_id: &str,
        expected: TaskStatus,
        new_status: TaskStatus,
        patch: TaskFieldPatch,
    ) -> Result<TaskResult> {
        self.require_task(task_id)?;
        let outcome =
            self.task_repository
                .conditional_update_status(task_id, expected, new_status, patch)?;
        match outcome {
            ConditionalUpdate::Applied(task) => {
                info!("Task {}: {} -> {}", task.id, expected, new_status);
                Ok(TaskResult { task })
            }
            ConditionalUpdate::Conflict { actual } => Err(TaskError::InvalidStatus {
                task_id: task_id.to_string(),
                expected,
                actual,
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::payscale::UpsertGradeConfigCommand;
    use crate::domain::commands::profiles::{AddSubjectCommand, CreateProfileCommand};
    use crate::domain::models::grade::Grade;
    use crate::domain::models::ledger::LedgerEntryType;
    use crate::domain::models::profile::{Profile, Role};
    use crate::domain::profile_service::ProfileService;
    use crate::domain::rate;
    use tempfile::TempDir;

    struct TestContext {
        task_service: TaskService,
        profile_service: ProfileService,
        payscale_service: PayscaleService,
        ledger_service: LedgerService<CsvConnection>,
        _temp_dir: TempDir,
    }

    fn create_test_context() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let profile_service = ProfileService::new(connection.clone());
        let payscale_service =
            PayscaleService::new(connection.clone(), rate::default_payscale().clone());
        let ledger_service = LedgerService::new(connection.clone());
        let task_service = TaskService::new(
            connection,
            payscale_service.clone(),
            ledger_service.clone(),
        );
        TestContext {
            task_service,
            profile_service,
            payscale_service,
            ledger_service,
            _temp_dir: temp_dir,
        }
    }

    fn create_test_child(ctx: &TestContext, name: &str) -> Profile {
        ctx.profile_service
            .create_profile(CreateProfileCommand {
                household_id: "household::1".to_string(),
                name: name.to_string(),
                role: Role::Child,
            })
            .unwrap()
            .profile
    }

    fn open_task(ctx: &TestContext, name: &str) -> Task {
        ctx.task_service
            .create_task(CreateTaskCommand {
                household_id: "household::1".to_string(),
                name: name.to_string(),
                baseline_minutes: 30,
                assignee_id: None,
                draft: false,
                value_cents: None,
                multiplier: None,
                bonus_cents: None,
            })
            .unwrap()
            .task
    }

    /// Walk a task to PendingPayment for the given child.
    fn approved_task(ctx: &TestContext, child: &Profile) -> Task {
        let task = open_task(ctx, "Clean the garage");
        ctx.task_service
            .claim_task(ClaimTaskCommand {
                task_id: task.id.clone(),
                profile_id: child.id.clone(),
            })
            .unwrap();
        ctx.task_service
            .submit_task(SubmitTaskCommand {
                task_id: task.id.clone(),
                profile_id: child.id.clone(),
            })
            .unwrap();
        ctx.task_service.approve_task(&task.id).unwrap().task
    }

    #[test]
    fn test_create_task_statuses() {
        let ctx = create_test_context();
        let child = create_test_child(&ctx, "Alice");

        let open = open_task(&ctx, "Open chore");
        assert_eq!(open.status, TaskStatus::Open);

        let draft = ctx
            .task_service
            .create_task(CreateTaskCommand {
                household_id: "household::1".to_string(),
                name: "Draft chore".to_string(),
                baseline_minutes: 20,
                assignee_id: None,
                draft: true,
                value_cents: None,
                multiplier: None,
                bonus_cents: None,
            })
            .unwrap()
            .task;
        assert_eq!(draft.status, TaskStatus::Draft);

        let assigned = ctx
            .task_service
            .create_task(CreateTaskCommand {
                household_id: "household::1".to_string(),
                name: "Assigned chore".to_string(),
                baseline_minutes: 20,
                assignee_id: Some(child.id.clone()),
                draft: false,
                value_cents: None,
                multiplier: None,
                bonus_cents: None,
            })
            .unwrap()
            .task;
        assert_eq!(assigned.status, TaskStatus::Assigned);
        assert_eq!(assigned.assignee_id, Some(child.id));
    }

    #[test]
    fn test_publish_draft() {
        let ctx = create_test_context();
        let draft = ctx
            .task_service
            .create_task(CreateTaskCommand {
                household_id: "household::1".to_string(),
                name: "Draft chore".to_string(),
                baseline_minutes: 20,
                assignee_id: None,
                draft: true,
                value_cents: None,
                multiplier: None,
                bonus_cents: None,
            })
            .unwrap()
            .task;

        let published = ctx
            .task_service
            .publish_task(PublishTaskCommand {
                task_id: draft.id.clone(),
                assignee_id: None,
            })
            .unwrap()
            .task;
        assert_eq!(published.status, TaskStatus::Open);

        // Publishing twice is a state-machine violation.
        let result = ctx.task_service.publish_task(PublishTaskCommand {
            task_id: draft.id,
            assignee_id: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_claim_race_has_exactly_one_winner() {
        let ctx = create_test_context();
        let alice = create_test_child(&ctx, "Alice");
        let bob = create_test_child(&ctx, "Bob");
        let task = open_task(&ctx, "Walk the dog");

        let mut handles = Vec::new();
        for profile in [&alice, &bob] {
            let service = ctx.task_service.clone();
            let command = ClaimTaskCommand {
                task_id: task.id.clone(),
                profile_id: profile.id.clone(),
            };
            handles.push(std::thread::spawn(move || service.claim_task(command)));
        }
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "exactly one claim must succeed");

        let loser_error = results
            .iter()
            .find(|r| r.is_err())
            .unwrap()
            .as_ref()
            .unwrap_err();
        assert!(
            loser_error
                .downcast_ref::<TaskError>()
                .is_some_and(|e| matches!(e, TaskError::AlreadyClaimed { .. })),
            "loser must see an already-claimed conflict, got: {loser_error}"
        );

        let stored = ctx.task_service.get_task(&task.id).unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Assigned);
        assert!(
            [&alice.id, &bob.id]
                .iter()
                .any(|id| stored.assignee_id.as_ref() == Some(*id)),
            "the stored assignee must be one of the racers"
        );
    }

    #[test]
    fn test_claim_requires_open_status() {
        let ctx = create_test_context();
        let alice = create_test_child(&ctx, "Alice");
        let task = open_task(&ctx, "Dust shelves");
        ctx.task_service.delete_task(&task.id).unwrap();

        let result = ctx.task_service.claim_task(ClaimTaskCommand {
            task_id: task.id,
            profile_id: alice.id,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_submit_requires_assignee() {
        let ctx = create_test_context();
        let alice = create_test_child(&ctx, "Alice");
        let bob = create_test_child(&ctx, "Bob");
        let task = open_task(&ctx, "Dishes");
        ctx.task_service
            .claim_task(ClaimTaskCommand {
                task_id: task.id.clone(),
                profile_id: alice.id,
            })
            .unwrap();

        let result = ctx.task_service.submit_task(SubmitTaskCommand {
            task_id: task.id,
            profile_id: bob.id,
        });
        assert!(result
            .unwrap_err()
            .downcast_ref::<TaskError>()
            .is_some_and(|e| matches!(e, TaskError::NotAssignee { .. })));
    }

    #[test]
    fn test_approve_from_wrong_state_names_both_statuses() {
        let ctx = create_test_context();
        let task = open_task(&ctx, "Vacuum");

        let error = ctx.task_service.approve_task(&task.id).unwrap_err();
        match error.downcast_ref::<TaskError>() {
            Some(TaskError::InvalidStatus { expected, actual, .. }) => {
                assert_eq!(*expected, TaskStatus::PendingApproval);
                assert_eq!(*actual, TaskStatus::Open);
            }
            other => panic!("expected InvalidStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_reject_requires_comment_and_leaves_status_unchanged() {
        let ctx = create_test_context();
        let alice = create_test_child(&ctx, "Alice");
        let task = open_task(&ctx, "Laundry");
        ctx.task_service
            .claim_task(ClaimTaskCommand {
                task_id: task.id.clone(),
                profile_id: alice.id.clone(),
            })
            .unwrap();
        ctx.task_service
            .submit_task(SubmitTaskCommand {
                task_id: task.id.clone(),
                profile_id: alice.id.clone(),
            })
            .unwrap();

        for comment in ["", "   ", "\t\n"] {
            let result = ctx.task_service.reject_task(RejectTaskCommand {
                task_id: task.id.clone(),
                comment: comment.to_string(),
            });
            assert!(result.is_err(), "blank comment {:?} must fail", comment);
        }
        let stored = ctx.task_service.get_task(&task.id).unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::PendingApproval);

        // A real comment sends the task back for rework.
        let rejected = ctx
            .task_service
            .reject_task(RejectTaskCommand {
                task_id: task.id.clone(),
                comment: "Still crumbs under the table".to_string(),
            })
            .unwrap()
            .task;
        assert_eq!(rejected.status, TaskStatus::Assigned);
        assert_eq!(
            rejected.rejection_comment.as_deref(),
            Some("Still crumbs under the table")
        );

        // Resubmission clears the comment.
        let resubmitted = ctx
            .task_service
            .submit_task(SubmitTaskCommand {
                task_id: task.id,
                profile_id: alice.id,
            })
            .unwrap()
            .task;
        assert_eq!(resubmitted.rejection_comment, None);
    }

    #[test]
    fn test_undo_approval_has_no_ledger_effect() {
        let ctx = create_test_context();
        let alice = create_test_child(&ctx, "Alice");
        let task = approved_task(&ctx, &alice);

        let reverted = ctx.task_service.undo_approval(&task.id).unwrap().task;
        assert_eq!(reverted.status, TaskStatus::PendingApproval);
        assert_eq!(ctx.ledger_service.balance(&alice.id).unwrap().balance_cents, 0);
    }

    #[test]
    fn test_mark_paid_is_idempotent() {
        let ctx = create_test_context();
        let alice = create_test_child(&ctx, "Alice");
        let task = ctx
            .task_service
            .create_task(CreateTaskCommand {
                household_id: "household::1".to_string(),
                name: "Weed the garden".to_string(),
                baseline_minutes: 0,
                assignee_id: Some(alice.id.clone()),
                draft: false,
                value_cents: Some(750),
                multiplier: None,
                bonus_cents: None,
            })
            .unwrap()
            .task;
        ctx.task_service
            .submit_task(SubmitTaskCommand {
                task_id: task.id.clone(),
                profile_id: alice.id.clone(),
            })
            .unwrap();
        ctx.task_service.approve_task(&task.id).unwrap();

        let first = ctx.task_service.mark_task_paid(&task.id).unwrap();
        assert_eq!(first.amount_cents, 750);
        assert!(first.entry.is_some());

        let second = ctx.task_service.mark_task_paid(&task.id).unwrap();
        assert!(second.entry.is_none());
        assert_eq!(second.task.status, TaskStatus::Paid);

        // Exactly one EARNING hit the ledger.
        let entries = ctx
            .ledger_service
            .list_entries(crate::domain::commands::ledger::LedgerListQuery {
                profile_id: alice.id.clone(),
                limit: None,
            })
            .unwrap()
            .entries;
        let earnings: Vec<_> = entries
            .iter()
            .filter(|e| e.entry_type == LedgerEntryType::Earning)
            .collect();
        assert_eq!(earnings.len(), 1);
        assert_eq!(earnings[0].amount_cents, 750);
        assert_eq!(earnings[0].task_id.as_deref(), Some(task.id.as_str()));
        assert_eq!(ctx.ledger_service.balance(&alice.id).unwrap().balance_cents, 750);
    }

    #[test]
    fn test_delete_paid_task_is_refused() {
        let ctx = create_test_context();
        let alice = create_test_child(&ctx, "Alice");
        let task = approved_task(&ctx, &alice);
        ctx.task_service.mark_task_paid(&task.id).unwrap();

        let result = ctx.task_service.delete_task(&task.id);
        assert!(result
            .unwrap_err()
            .downcast_ref::<TaskError>()
            .is_some_and(|e| matches!(e, TaskError::PaidTaskNotDeletable { .. })));
    }

    #[test]
    fn test_deleted_tasks_leave_active_views() {
        let ctx = create_test_context();
        let task = open_task(&ctx, "Short-lived chore");
        ctx.task_service.delete_task(&task.id).unwrap();

        let listed = ctx
            .task_service
            .list_tasks(TaskListQuery {
                household_id: "household::1".to_string(),
                assignee_id: None,
                include_drafts: true,
            })
            .unwrap()
            .tasks;
        assert!(listed.is_empty());
        // The row itself survives as history.
        assert!(ctx.task_service.get_task(&task.id).unwrap().is_some());
    }

    #[test]
    fn test_drafts_hidden_from_child_views() {
        let ctx = create_test_context();
        ctx.task_service
            .create_task(CreateTaskCommand {
                household_id: "household::1".to_string(),
                name: "Surprise chore".to_string(),
                baseline_minutes: 10,
                assignee_id: None,
                draft: true,
                value_cents: None,
                multiplier: None,
                bonus_cents: None,
            })
            .unwrap();

        let child_view = ctx
            .task_service
            .list_tasks(TaskListQuery {
                household_id: "household::1".to_string(),
                assignee_id: None,
                include_drafts: false,
            })
            .unwrap()
            .tasks;
        assert!(child_view.is_empty());

        let parent_view = ctx
            .task_service
            .list_tasks(TaskListQuery {
                household_id: "household::1".to_string(),
                assignee_id: None,
                include_drafts: true,
            })
            .unwrap()
            .tasks;
        assert_eq!(parent_view.len(), 1);
    }

    #[test]
    fn test_grade_to_payout_scenario() {
        // Two subjects at grade A worth $5.00/hr each -> $10.00/hr; a
        // 30-minute task pays $5.00.
        let ctx = create_test_context();
        let alice = create_test_child(&ctx, "Alice");
        ctx.payscale_service
            .upsert_grade_config(UpsertGradeConfigCommand {
                household_id: "household::1".to_string(),
                grade: Grade::A,
                value_cents: 500,
            })
            .unwrap();
        for subject in ["Math", "Science"] {
            ctx.profile_service
                .add_subject(AddSubjectCommand {
                    profile_id: alice.id.clone(),
                    name: subject.to_string(),
                    grade: Grade::A,
                })
                .unwrap();
        }

        let task = open_task(&ctx, "Mop the kitchen");
        assert_eq!(task.baseline_minutes, 30);
        ctx.task_service
            .claim_task(ClaimTaskCommand {
                task_id: task.id.clone(),
                profile_id: alice.id.clone(),
            })
            .unwrap();
        ctx.task_service
            .submit_task(SubmitTaskCommand {
                task_id: task.id.clone(),
                profile_id: alice.id.clone(),
            })
            .unwrap();
        ctx.task_service.approve_task(&task.id).unwrap();
        let paid = ctx.task_service.mark_task_paid(&task.id).unwrap();

        assert_eq!(paid.amount_cents, 500);
        let entry = paid.entry.unwrap();
        assert_eq!(entry.entry_type, LedgerEntryType::Earning);
        assert_eq!(entry.amount_cents, 500);
        assert_eq!(ctx.ledger_service.balance(&alice.id).unwrap().balance_cents, 500);
        assert!(ctx
            .ledger_service
            .check_balance_consistency(&alice.id)
            .unwrap()
            .is_empty());
    }
}

//! Savings goal service.
//!
//! A goal is a sub-ledger: allocations move cents out of the spendable
//! balance into the goal through GOAL_ALLOCATION postings, and cancelling the
//! goal posts the accumulated amount back. One active goal per profile.

use anyhow::Result;
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::domain::commands::goals::{
    AllocateToGoalCommand, AllocateToGoalResult, CancelGoalCommand, CancelGoalResult,
    CreateGoalCommand, CreateGoalResult, GetCurrentGoalResult,
};
use crate::domain::ledger_service::LedgerService;
use crate::domain::models::goal::{GoalError, GoalState, SavingsGoal};
use crate::domain::models::ledger::{LedgerEntry, LedgerEntryType};
use crate::storage::csv::{CsvConnection, GoalRepository, LedgerRepository};
use crate::storage::traits::{GoalStorage, LedgerStorage};

const MAX_NAME_LENGTH: usize = 256;

/// Service for managing savings goals.
#[derive(Clone)]
pub struct GoalService {
    goal_repository: GoalRepository,
    ledger_repository: LedgerRepository,
    ledger_service: LedgerService<CsvConnection>,
}

impl GoalService {
    pub fn new(
        connection: Arc<CsvConnection>,
        ledger_service: LedgerService<CsvConnection>,
    ) -> Self {
        let goal_repository = GoalRepository::new((*connection).clone());
        let ledger_repository = LedgerRepository::new((*connection).clone());
        Self {
            goal_repository,
            ledger_repository,
            ledger_service,
        }
    }

    /// Create a new active goal for a profile.
    pub fn create_goal(&self, command: CreateGoalCommand) -> Result<CreateGoalResult> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(GoalError::EmptyName.into());
        }
        if name.len() > MAX_NAME_LENGTH {
            return Err(GoalError::NameTooLong.into());
        }
        if command.target_amount_cents <= 0 {
            return Err(GoalError::NonPositiveTarget.into());
        }
        if self.goal_repository.get_active_goal(&command.profile_id)?.is_some() {
            return Err(GoalError::ActiveGoalAlreadyExists.into());
        }

        let now = Utc::now();
        let goal = SavingsGoal {
            id: SavingsGoal::generate_id(now.timestamp_millis() as u64),
            profile_id: command.profile_id,
            name: name.to_string(),
            target_amount_cents: command.target_amount_cents,
            current_amount_cents: 0,
            state: GoalState::Active,
            created_at: now,
            updated_at: now,
        };
        self.goal_repository.store_goal(&goal)?;
        info!("Created goal {} ({})", goal.name, goal.id);
        Ok(CreateGoalResult { goal })
    }

    pub fn get_current_goal(&self, profile_id: &str) -> Result<GetCurrentGoalResult> {
        let goal = self.goal_repository.get_active_goal(profile_id)?;
        Ok(GetCurrentGoalResult { goal })
    }

    /// Move spendable funds into the active goal. Allocating past 100% is
    /// allowed and completes the goal; allocating past the spendable balance
    /// is not.
    pub fn allocate_to_goal(&self, command: AllocateToGoalCommand) -> Result<AllocateToGoalResult> {
        if command.amount_cents <= 0 {
            return Err(GoalError::NonPositiveAllocation.into());
        }
        let mut goal = self
            .goal_repository
            .get_active_goal(&command.profile_id)?
            .ok_or(GoalError::NoActiveGoal)?;

        let balance = self.ledger_service.balance(&command.profile_id)?;
        if command.amount_cents > balance.spendable_balance_cents {
            return Err(
                crate::domain::models::ledger::LedgerError::InsufficientSpendableBalance {
                    requested_cents: command.amount_cents,
                    available_cents: balance.spendable_balance_cents,
                }
                .into(),
            );
        }

        let posting = self.post_allocation(
            &command.profile_id,
            -command.amount_cents,
            format!("Saved toward {}", goal.name),
        )?;

        goal.current_amount_cents += command.amount_cents;
        let completed = goal.is_funded();
        if completed {
            goal.state = GoalState::Completed;
        }
        goal.updated_at = Utc::now();
        self.goal_repository.update_goal(&goal)?;

        if completed {
            info!("Goal {} completed at {} cents", goal.id, goal.current_amount_cents);
        }
        Ok(AllocateToGoalResult {
            goal,
            new_balance_cents: posting.balance_after_cents.unwrap_or(0),
            entry: posting,
            completed,
        })
    }

    /// Cancel the active goal; the accumulated cents flow back into the
    /// spendable balance.
    pub fn cancel_goal(&self, command: CancelGoalCommand) -> Result<CancelGoalResult> {
        let mut goal = self
            .goal_repository
            .get_active_goal(&command.profile_id)?
            .ok_or(GoalError::NoActiveGoal)?;

        let returned_cents = goal.current_amount_cents;
        if returned_cents > 0 {
            self.post_allocation(
                &command.profile_id,
                returned_cents,
                format!("Returned from {}", goal.name),
            )?;
        }

        goal.state = GoalState::Cancelled;
        goal.current_amount_cents = 0;
        goal.updated_at = Utc::now();
        self.goal_repository.update_goal(&goal)?;

        info!("Cancelled goal {}, returned {} cents", goal.id, returned_cents);
        Ok(CancelGoalResult {
            goal,
            returned_cents,
        })
    }

    fn post_allocation(
        &self,
        profile_id: &str,
        amount_cents: i64,
        memo: String,
    ) -> Result<LedgerEntry> {
        let entry = LedgerEntry {
            id: LedgerEntry::generate_id(),
            profile_id: profile_id.to_string(),
            entry_type: LedgerEntryType::GoalAllocation,
            amount_cents,
            memo,
            date: Utc::now(),
            status: None,
            task_id: None,
            balance_after_cents: None,
        };
        self.ledger_repository
            .append_entry_and_adjust_balance(profile_id, entry, amount_cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::ledger::RecordEarningCommand;
    use crate::domain::commands::profiles::CreateProfileCommand;
    use crate::domain::models::profile::{Profile, Role};
    use crate::domain::profile_service::ProfileService;
    use tempfile::TempDir;

    fn create_test_service() -> (
        GoalService,
        LedgerService<CsvConnection>,
        ProfileService,
        TempDir,
    ) {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let ledger_service = LedgerService::new(connection.clone());
        let goal_service = GoalService::new(connection.clone(), ledger_service.clone());
        let profile_service = ProfileService::new(connection);
        (goal_service, ledger_service, profile_service, temp_dir)
    }

    fn funded_profile(
        profiles: &ProfileService,
        ledger: &LedgerService<CsvConnection>,
        cents: i64,
    ) -> Profile {
        let profile = profiles
            .create_profile(CreateProfileCommand {
                household_id: "household::1".to_string(),
                name: "Alice".to_string(),
                role: Role::Child,
            })
            .unwrap()
            .profile;
        if cents > 0 {
            ledger
                .record_earning(RecordEarningCommand {
                    profile_id: profile.id.clone(),
                    amount_cents: cents,
                    memo: "Chores".to_string(),
                    task_id: None,
                })
                .unwrap();
        }
        profile
    }

    fn bike_goal(profile_id: &str, target_cents: i64) -> CreateGoalCommand {
        CreateGoalCommand {
            profile_id: profile_id.to_string(),
            name: "New bike".to_string(),
            target_amount_cents: target_cents,
        }
    }

    #[test]
    fn test_create_goal_validation() {
        let (goals, ledger, profiles, _temp_dir) = create_test_service();
        let profile = funded_profile(&profiles, &ledger, 0);

        assert!(goals
            .create_goal(CreateGoalCommand {
                profile_id: profile.id.clone(),
                name: "  ".to_string(),
                target_amount_cents: 1000,
            })
            .is_err());
        assert!(goals.create_goal(bike_goal(&profile.id, 0)).is_err());
        assert!(goals.create_goal(bike_goal(&profile.id, -5)).is_err());

        goals.create_goal(bike_goal(&profile.id, 1000)).unwrap();
        // Second active goal is refused.
        let result = goals.create_goal(bike_goal(&profile.id, 2000));
        assert!(result
            .unwrap_err()
            .downcast_ref::<GoalError>()
            .is_some_and(|e| matches!(e, GoalError::ActiveGoalAlreadyExists)));
    }

    #[test]
    fn test_allocation_moves_balance_into_goal() {
        let (goals, ledger, profiles, _temp_dir) = create_test_service();
        let profile = funded_profile(&profiles, &ledger, 1000);
        goals.create_goal(bike_goal(&profile.id, 2000)).unwrap();

        let result = goals
            .allocate_to_goal(AllocateToGoalCommand {
                profile_id: profile.id.clone(),
                amount_cents: 400,
            })
            .unwrap();
        assert_eq!(result.goal.current_amount_cents, 400);
        assert!(!result.completed);
        assert_eq!(result.new_balance_cents, 600);
        assert_eq!(result.entry.amount_cents, -400);

        assert_eq!(ledger.balance(&profile.id).unwrap().balance_cents, 600);
        assert!(ledger.check_balance_consistency(&profile.id).unwrap().is_empty());
    }

    #[test]
    fn test_over_allocation_is_rejected() {
        let (goals, ledger, profiles, _temp_dir) = create_test_service();
        let profile = funded_profile(&profiles, &ledger, 500);
        goals.create_goal(bike_goal(&profile.id, 2000)).unwrap();

        let result = goals.allocate_to_goal(AllocateToGoalCommand {
            profile_id: profile.id.clone(),
            amount_cents: 600,
        });
        assert!(result.is_err());
        assert_eq!(ledger.balance(&profile.id).unwrap().balance_cents, 500);
    }

    #[test]
    fn test_reaching_target_completes_goal() {
        let (goals, ledger, profiles, _temp_dir) = create_test_service();
        let profile = funded_profile(&profiles, &ledger, 2500);
        goals.create_goal(bike_goal(&profile.id, 2000)).unwrap();

        // Past 100% in one allocation is allowed and triggers completion.
        let result = goals
            .allocate_to_goal(AllocateToGoalCommand {
                profile_id: profile.id.clone(),
                amount_cents: 2100,
            })
            .unwrap();
        assert!(result.completed);
        assert_eq!(result.goal.state, GoalState::Completed);

        // The completed goal is no longer current.
        assert!(goals.get_current_goal(&profile.id).unwrap().goal.is_none());
    }

    #[test]
    fn test_cancel_returns_allocated_funds() {
        let (goals, ledger, profiles, _temp_dir) = create_test_service();
        let profile = funded_profile(&profiles, &ledger, 1000);
        goals.create_goal(bike_goal(&profile.id, 2000)).unwrap();
        goals
            .allocate_to_goal(AllocateToGoalCommand {
                profile_id: profile.id.clone(),
                amount_cents: 700,
            })
            .unwrap();
        assert_eq!(ledger.balance(&profile.id).unwrap().balance_cents, 300);

        let cancelled = goals
            .cancel_goal(CancelGoalCommand {
                profile_id: profile.id.clone(),
            })
            .unwrap();
        assert_eq!(cancelled.returned_cents, 700);
        assert_eq!(cancelled.goal.state, GoalState::Cancelled);

        assert_eq!(ledger.balance(&profile.id).unwrap().balance_cents, 1000);
        assert!(ledger.check_balance_consistency(&profile.id).unwrap().is_empty());
    }

    #[test]
    fn test_cancel_without_active_goal_fails() {
        let (goals, ledger, profiles, _temp_dir) = create_test_service();
        let profile = funded_profile(&profiles, &ledger, 0);
        assert!(goals
            .cancel_goal(CancelGoalCommand {
                profile_id: profile.id,
            })
            .is_err());
    }
}

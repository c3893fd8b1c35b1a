//! Domain model for savings goals, a sub-ledger the profile can move
//! spendable funds into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::profile::random_suffix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalState {
    Active,
    Completed,
    Cancelled,
}

impl GoalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalState::Active => "active",
            GoalState::Completed => "completed",
            GoalState::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(GoalState::Active),
            "completed" => Ok(GoalState::Completed),
            "cancelled" => Ok(GoalState::Cancelled),
            _ => Err(format!("Invalid goal state: {}", s)),
        }
    }
}

/// A savings target. `current_amount_cents` grows through GOAL_ALLOCATION
/// postings; reaching the target flips the goal to `Completed`. Allocations
/// past 100% are allowed, over-allocation beyond the spendable balance is
/// not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: String,
    pub profile_id: String,
    pub name: String,
    pub target_amount_cents: i64,
    pub current_amount_cents: i64,
    pub state: GoalState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavingsGoal {
    /// Generate a unique goal ID.
    /// Format: goal::<timestamp_ms>-<random_suffix>
    pub fn generate_id(timestamp_ms: u64) -> String {
        format!("goal::{}-{}", timestamp_ms, random_suffix(4))
    }

    pub fn is_funded(&self) -> bool {
        self.current_amount_cents >= self.target_amount_cents
    }
}

/// Goal validation failures.
#[derive(Debug, thiserror::Error)]
pub enum GoalError {
    #[error("Goal name cannot be empty")]
    EmptyName,
    #[error("Goal name is too long")]
    NameTooLong,
    #[error("Goal target amount must be positive")]
    NonPositiveTarget,
    #[error("Profile already has an active goal")]
    ActiveGoalAlreadyExists,
    #[error("No active goal found")]
    NoActiveGoal,
    #[error("Allocation amount must be positive")]
    NonPositiveAllocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_state_round_trip() {
        for state in [GoalState::Active, GoalState::Completed, GoalState::Cancelled] {
            assert_eq!(GoalState::parse(state.as_str()).unwrap(), state);
        }
    }

    #[test]
    fn test_is_funded_at_and_past_target() {
        let mut goal = SavingsGoal {
            id: SavingsGoal::generate_id(1702516122000),
            profile_id: "profile::1".to_string(),
            name: "New bike".to_string(),
            target_amount_cents: 10_000,
            current_amount_cents: 9_999,
            state: GoalState::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!goal.is_funded());
        goal.current_amount_cents = 10_000;
        assert!(goal.is_funded());
        goal.current_amount_cents = 10_500;
        assert!(goal.is_funded());
    }
}

//! Domain model for an earning profile (a household member).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::models::grade::{Grade, Subject};
use crate::domain::money;

/// Role of a profile within the household.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Child,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Child => "child",
            Role::Member => "member",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "child" => Ok(Role::Child),
            "member" => Ok(Role::Member),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }

    /// Lenient parse for stored records; unknown roles become `Member`.
    pub fn parse_lenient(s: &str) -> Self {
        Role::parse(s).unwrap_or_else(|_| {
            log::warn!("Unknown role '{}', defaulting to member", s);
            Role::Member
        })
    }
}

/// The earning entity. `balance_cents` is the authoritative store of net
/// worth; the dollar view is always re-derived from it and never accumulated
/// on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub household_id: String,
    pub name: String,
    pub role: Role,
    pub subjects: Vec<Subject>,
    /// Profile-specific rate overrides. When present these take precedence
    /// over the household payscale for every grade they map.
    pub rates: Option<HashMap<Grade, f64>>,
    pub balance_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Generate a unique profile ID.
    /// Format: profile::<timestamp_ms>-<random_suffix>
    pub fn generate_id(timestamp_ms: u64) -> String {
        format!("profile::{}-{}", timestamp_ms, random_suffix(4))
    }

    /// Display-only dollars view of the balance.
    pub fn balance(&self) -> f64 {
        money::cents_to_dollars(self.balance_cents)
    }
}

/// Hex suffix derived from the nanosecond clock, enough to keep ids created
/// within the same millisecond distinct.
pub(crate) fn random_suffix(len: usize) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_nanos();
    format!("{:x}", now % (16_u128.pow(len as u32)))
        .chars()
        .take(len)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Admin, Role::Child, Role::Member] {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn test_role_lenient_defaults_to_member() {
        assert_eq!(Role::parse_lenient("owner"), Role::Member);
        assert_eq!(Role::parse_lenient("CHILD"), Role::Child);
    }

    #[test]
    fn test_generate_id_format() {
        let id = Profile::generate_id(1702516122000);
        assert!(id.starts_with("profile::1702516122000-"));
    }

    #[test]
    fn test_balance_is_derived_from_cents() {
        let profile = Profile {
            id: "profile::1".to_string(),
            household_id: "household::1".to_string(),
            name: "Test".to_string(),
            role: Role::Child,
            subjects: vec![],
            rates: None,
            balance_cents: 1234,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(profile.balance(), 12.34);
    }
}

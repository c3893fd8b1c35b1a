//! Letter grades and the household payscale.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Letter grade used as the lookup key into a payscale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    APlus,
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
    CMinus,
    DPlus,
    D,
    DMinus,
    F,
}

impl Grade {
    /// Every grade, best to worst. Rate-map construction iterates this so the
    /// resolved map always covers the full scale.
    pub const ALL: [Grade; 13] = [
        Grade::APlus,
        Grade::A,
        Grade::AMinus,
        Grade::BPlus,
        Grade::B,
        Grade::BMinus,
        Grade::CPlus,
        Grade::C,
        Grade::CMinus,
        Grade::DPlus,
        Grade::D,
        Grade::DMinus,
        Grade::F,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::DPlus => "D+",
            Grade::D => "D",
            Grade::DMinus => "D-",
            Grade::F => "F",
        }
    }

    /// Strict parse, used at the API boundary.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_uppercase().as_str() {
            "A+" => Ok(Grade::APlus),
            "A" => Ok(Grade::A),
            "A-" => Ok(Grade::AMinus),
            "B+" => Ok(Grade::BPlus),
            "B" => Ok(Grade::B),
            "B-" => Ok(Grade::BMinus),
            "C+" => Ok(Grade::CPlus),
            "C" => Ok(Grade::C),
            "C-" => Ok(Grade::CMinus),
            "D+" => Ok(Grade::DPlus),
            "D" => Ok(Grade::D),
            "D-" => Ok(Grade::DMinus),
            "F" => Ok(Grade::F),
            _ => Err(format!("Invalid grade: {}", s)),
        }
    }

    /// Lenient parse for loosely-typed stored records. Unknown values fall
    /// back to `C`, the documented default policy for schemaless rows.
    pub fn parse_lenient(s: &str) -> Self {
        Grade::parse(s).unwrap_or_else(|_| {
            log::warn!("Unknown grade '{}', defaulting to C", s);
            Grade::C
        })
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of a household payscale: how many cents-per-hour a single subject
/// at this grade contributes. Exactly one config per (household, grade);
/// writes are upserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeConfig {
    pub household_id: String,
    pub grade: Grade,
    pub value_cents: i64,
}

/// A school subject belonging to a profile. The grade drives the hourly rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub grade: Grade,
}

impl Subject {
    pub fn new(name: &str, grade: Grade) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            grade,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_round_trip() {
        for grade in Grade::ALL {
            assert_eq!(Grade::parse(grade.as_str()).unwrap(), grade);
        }
    }

    #[test]
    fn test_grade_parse_is_case_insensitive() {
        assert_eq!(Grade::parse("a+").unwrap(), Grade::APlus);
        assert_eq!(Grade::parse(" b- ").unwrap(), Grade::BMinus);
        assert_eq!(Grade::parse("f").unwrap(), Grade::F);
    }

    #[test]
    fn test_grade_parse_rejects_unknown() {
        assert!(Grade::parse("E").is_err());
        assert!(Grade::parse("A++").is_err());
        assert!(Grade::parse("").is_err());
    }

    #[test]
    fn test_lenient_parse_defaults_to_c() {
        assert_eq!(Grade::parse_lenient("E"), Grade::C);
        assert_eq!(Grade::parse_lenient("garbage"), Grade::C);
        assert_eq!(Grade::parse_lenient("B+"), Grade::BPlus);
    }

    #[test]
    fn test_all_covers_thirteen_grades() {
        assert_eq!(Grade::ALL.len(), 13);
    }
}

//! Rate engine: turns a profile's subject grades into an hourly rate via a
//! Grade→dollars payscale.
//!
//! Aggregation happens in integer cents so that summing many subjects cannot
//! compound float error; the single cents→dollars conversion sits at the end.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::models::grade::{Grade, GradeConfig, Subject};
use crate::domain::money::{cents_to_dollars, dollars_to_cents};

/// Built-in fallback payscale, in dollars per hour per subject. Callers pass
/// this (or any other table) into the engine explicitly; nothing in this
/// module consults it on its own.
pub fn default_payscale() -> &'static HashMap<Grade, f64> {
    static DEFAULT: Lazy<HashMap<Grade, f64>> = Lazy::new(|| {
        let mut rates = HashMap::new();
        rates.insert(Grade::APlus, 5.50);
        rates.insert(Grade::A, 5.00);
        rates.insert(Grade::AMinus, 4.50);
        rates.insert(Grade::BPlus, 4.00);
        rates.insert(Grade::B, 3.50);
        rates.insert(Grade::BMinus, 3.00);
        rates.insert(Grade::CPlus, 2.50);
        rates.insert(Grade::C, 2.00);
        rates.insert(Grade::CMinus, 1.50);
        rates.insert(Grade::DPlus, 1.00);
        rates.insert(Grade::D, 0.75);
        rates.insert(Grade::DMinus, 0.50);
        rates.insert(Grade::F, 0.0);
        rates
    });
    &DEFAULT
}

/// Sum the payscale value of each subject's grade, in cents. A grade missing
/// from the table contributes zero. Empty subjects means a zero rate.
pub fn hourly_rate_cents(subjects: &[Subject], rates: &HashMap<Grade, f64>) -> i64 {
    if subjects.is_empty() {
        return 0;
    }
    subjects
        .iter()
        .map(|subject| {
            rates
                .get(&subject.grade)
                .map(|dollars| dollars_to_cents(*dollars))
                .unwrap_or(0)
        })
        .sum()
}

/// Dollars wrapper around [`hourly_rate_cents`].
pub fn hourly_rate(subjects: &[Subject], rates: &HashMap<Grade, f64>) -> f64 {
    cents_to_dollars(hourly_rate_cents(subjects, rates))
}

/// Build a complete Grade→dollars map covering every grade, preferring an
/// explicit config entry over the fallback. The result is normalized through
/// cents so both sources round identically.
pub fn build_rate_map(
    configs: &[GradeConfig],
    fallback: &HashMap<Grade, f64>,
) -> HashMap<Grade, f64> {
    let mut resolved = HashMap::new();
    for grade in Grade::ALL {
        let cents = configs
            .iter()
            .find(|config| config.grade == grade)
            .map(|config| config.value_cents)
            .unwrap_or_else(|| {
                fallback
                    .get(&grade)
                    .map(|dollars| dollars_to_cents(*dollars))
                    .unwrap_or(0)
            });
        resolved.insert(grade, cents_to_dollars(cents));
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subjects(grades: &[Grade]) -> Vec<Subject> {
        grades
            .iter()
            .enumerate()
            .map(|(i, grade)| Subject::new(&format!("Subject {}", i), *grade))
            .collect()
    }

    #[test]
    fn test_empty_subjects_means_zero_rate() {
        assert_eq!(hourly_rate_cents(&[], default_payscale()), 0);
        assert_eq!(hourly_rate(&[], default_payscale()), 0.0);
    }

    #[test]
    fn test_two_a_subjects_at_five_dollars() {
        let mut rates = HashMap::new();
        rates.insert(Grade::A, 5.00);
        let result = hourly_rate(&subjects(&[Grade::A, Grade::A]), &rates);
        assert_eq!(result, 10.00);
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let rates = default_payscale();
        let forward = subjects(&[Grade::APlus, Grade::B, Grade::CMinus, Grade::F]);
        let mut backward = forward.clone();
        backward.reverse();
        assert_eq!(hourly_rate_cents(&forward, rates), hourly_rate_cents(&backward, rates));
    }

    #[test]
    fn test_unmapped_grade_contributes_zero() {
        let mut rates = HashMap::new();
        rates.insert(Grade::A, 5.00);
        let result = hourly_rate_cents(&subjects(&[Grade::A, Grade::B]), &rates);
        assert_eq!(result, 500);
    }

    #[test]
    fn test_summation_in_cents_avoids_float_drift() {
        // Thirty subjects at $0.10 must be exactly $3.00; summing the floats
        // directly would land on 2.9999999999999996.
        let mut rates = HashMap::new();
        rates.insert(Grade::C, 0.10);
        let many = subjects(&[Grade::C; 30]);
        assert_eq!(hourly_rate_cents(&many, &rates), 300);
        assert_eq!(hourly_rate(&many, &rates), 3.00);
    }

    #[test]
    fn test_build_rate_map_covers_every_grade() {
        let resolved = build_rate_map(&[], default_payscale());
        for grade in Grade::ALL {
            assert!(resolved.contains_key(&grade), "missing {}", grade);
        }
    }

    #[test]
    fn test_build_rate_map_prefers_explicit_config() {
        let configs = vec![GradeConfig {
            household_id: "household::1".to_string(),
            grade: Grade::A,
            value_cents: 725,
        }];
        let resolved = build_rate_map(&configs, default_payscale());
        assert_eq!(resolved[&Grade::A], 7.25);
        // Unconfigured grades come from the fallback.
        assert_eq!(resolved[&Grade::B], default_payscale()[&Grade::B]);
    }

    #[test]
    fn test_build_rate_map_empty_fallback_defaults_to_zero() {
        let resolved = build_rate_map(&[], &HashMap::new());
        for grade in Grade::ALL {
            assert_eq!(resolved[&grade], 0.0);
        }
    }
}

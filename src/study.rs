//! Study-level configuration and its validation
//!
//! A run is defined by three parameters: the observation window
//! (start/end dates) and the study type code. All three are checked
//! up front; a run with a bad window cannot classify any record, so
//! configuration failure is fatal.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date format for every date in the system, configuration and records alike
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single violated configuration rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("study start date must be a valid date (YYYY-MM-DD)")]
    InvalidStartDate,

    #[error("study end date must be a valid date (YYYY-MM-DD)")]
    InvalidEndDate,

    #[error("study type must be an integer between 1 and 6")]
    InvalidStudyType,

    #[error("study start date must be before study end date")]
    StartNotBeforeEnd,
}

/// Every configuration rule that failed, in evaluation order
///
/// The loader does not stop at the first bad parameter; the operator gets
/// the full list in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrors(pub Vec<ConfigError>);

impl ConfigErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigError> {
        self.0.iter()
    }

    pub fn contains(&self, error: ConfigError) -> bool {
        self.0.contains(&error)
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inconsistent study parameters: ")?;
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

/// Decrement measured by the study
///
/// Codes share the 1-6 space of [`StatusCode`](crate::policy::StatusCode):
/// a type-3 study observes deaths, a type-2 study observes lapses, and so
/// on. Code 1 mirrors the in-force status code; it passes the range check
/// although no decrement study is defined for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudyType {
    InForce,
    Lapse,
    Mortality,
    AccidentalDeath,
    TpdDisease,
    TpdAccident,
}

impl StudyType {
    /// Map an integer code to a study type, `None` outside 1-6
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(StudyType::InForce),
            2 => Some(StudyType::Lapse),
            3 => Some(StudyType::Mortality),
            4 => Some(StudyType::AccidentalDeath),
            5 => Some(StudyType::TpdDisease),
            6 => Some(StudyType::TpdAccident),
            _ => None,
        }
    }

    /// Integer code as it appears on the command line
    pub fn code(&self) -> u8 {
        match self {
            StudyType::InForce => 1,
            StudyType::Lapse => 2,
            StudyType::Mortality => 3,
            StudyType::AccidentalDeath => 4,
            StudyType::TpdDisease => 5,
            StudyType::TpdAccident => 6,
        }
    }
}

/// Immutable study parameters, built once per run and shared read-only
/// by every validation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Inclusive lower bound of the observation window
    pub start: NaiveDate,

    /// Inclusive upper bound of the observation window
    pub end: NaiveDate,

    /// Which decrement the study measures
    pub study_type: StudyType,
}

impl StudyConfig {
    /// Build a configuration from the raw command-line values.
    ///
    /// Rules are evaluated independently and every violation is collected,
    /// so one pass over the diagnostics is enough to fix the invocation.
    /// The window ordering rule only applies once both dates parse.
    pub fn from_args(start: &str, end: &str, study_type: &str) -> Result<Self, ConfigErrors> {
        let mut errors = Vec::new();

        let start = match parse_date(start) {
            Some(date) => Some(date),
            None => {
                errors.push(ConfigError::InvalidStartDate);
                None
            }
        };

        let end = match parse_date(end) {
            Some(date) => Some(date),
            None => {
                errors.push(ConfigError::InvalidEndDate);
                None
            }
        };

        let study_type = match study_type.trim().parse::<u8>().ok().and_then(StudyType::from_code) {
            Some(study_type) => Some(study_type),
            None => {
                errors.push(ConfigError::InvalidStudyType);
                None
            }
        };

        if let (Some(start), Some(end)) = (start, end) {
            if start >= end {
                errors.push(ConfigError::StartNotBeforeEnd);
            }
        }

        match (start, end, study_type) {
            (Some(start), Some(end), Some(study_type)) if errors.is_empty() => Ok(Self {
                start,
                end,
                study_type,
            }),
            _ => Err(ConfigErrors(errors)),
        }
    }
}

/// Strict `YYYY-MM-DD` parse; empty or non-calendrical input is rejected
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = StudyConfig::from_args("2010-01-01", "2021-12-31", "3").unwrap();
        assert_eq!(config.start, NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());
        assert_eq!(config.end, NaiveDate::from_ymd_opt(2021, 12, 31).unwrap());
        assert_eq!(config.study_type, StudyType::Mortality);
    }

    #[test]
    fn test_all_study_type_codes_round_trip() {
        for code in 1..=6 {
            let study_type = StudyType::from_code(code).unwrap();
            assert_eq!(study_type.code(), code);
        }
        assert_eq!(StudyType::from_code(0), None);
        assert_eq!(StudyType::from_code(7), None);
    }

    #[test]
    fn test_invalid_start_date() {
        let errors = StudyConfig::from_args("2010-13-01", "2021-12-31", "3").unwrap_err();
        assert_eq!(errors.0, vec![ConfigError::InvalidStartDate]);
    }

    #[test]
    fn test_invalid_end_date() {
        let errors = StudyConfig::from_args("2010-01-01", "not-a-date", "3").unwrap_err();
        assert_eq!(errors.0, vec![ConfigError::InvalidEndDate]);
    }

    #[test]
    fn test_invalid_study_type() {
        for bad in ["0", "7", "lapse", "", "3.5"] {
            let errors = StudyConfig::from_args("2010-01-01", "2021-12-31", bad).unwrap_err();
            assert_eq!(errors.0, vec![ConfigError::InvalidStudyType], "type={:?}", bad);
        }
    }

    #[test]
    fn test_start_not_before_end() {
        // Scenario: start=2010-01-01, end=2008-12-31 aborts before any record
        let errors = StudyConfig::from_args("2010-01-01", "2008-12-31", "3").unwrap_err();
        assert_eq!(errors.0, vec![ConfigError::StartNotBeforeEnd]);

        // Equal dates violate the strict ordering too
        let errors = StudyConfig::from_args("2010-01-01", "2010-01-01", "3").unwrap_err();
        assert_eq!(errors.0, vec![ConfigError::StartNotBeforeEnd]);
    }

    #[test]
    fn test_all_violations_reported_together() {
        let errors = StudyConfig::from_args("junk", "also-junk", "99").unwrap_err();
        assert_eq!(
            errors.0,
            vec![
                ConfigError::InvalidStartDate,
                ConfigError::InvalidEndDate,
                ConfigError::InvalidStudyType,
            ]
        );
    }

    #[test]
    fn test_ordering_rule_skipped_when_a_date_is_bad() {
        // With no parsable end date there is no window to order
        let errors = StudyConfig::from_args("2010-01-01", "garbage", "2").unwrap_err();
        assert!(errors.contains(ConfigError::InvalidEndDate));
        assert!(!errors.contains(ConfigError::StartNotBeforeEnd));
    }

    #[test]
    fn test_display_joins_all_errors() {
        let errors = StudyConfig::from_args("junk", "2021-12-31", "0").unwrap_err();
        let text = errors.to_string();
        assert!(text.contains("start date"));
        assert!(text.contains("study type"));
    }
}

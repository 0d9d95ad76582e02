//! Policy data structures matching the delimited inforce extract

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Policy status as of the status date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    /// Still in force; carries no status date
    InForce,
    Lapsed,
    Death,
    AccidentalDeath,
    TpdDisease,
    TpdAccident,
}

impl StatusCode {
    /// Map an integer code to a status, `None` outside 1-6
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(StatusCode::InForce),
            2 => Some(StatusCode::Lapsed),
            3 => Some(StatusCode::Death),
            4 => Some(StatusCode::AccidentalDeath),
            5 => Some(StatusCode::TpdDisease),
            6 => Some(StatusCode::TpdAccident),
            _ => None,
        }
    }

    /// Integer code as it appears in the extract
    pub fn code(&self) -> u8 {
        match self {
            StatusCode::InForce => 1,
            StatusCode::Lapsed => 2,
            StatusCode::Death => 3,
            StatusCode::AccidentalDeath => 4,
            StatusCode::TpdDisease => 5,
            StatusCode::TpdAccident => 6,
        }
    }

    /// Whether the status ends exposure (everything but in force)
    pub fn is_terminated(&self) -> bool {
        !matches!(self, StatusCode::InForce)
    }
}

/// One policy line as read from the input stream
///
/// Fields are kept verbatim as they appeared between delimiters; nothing is
/// checked or reformatted here. The validator owns every date and code rule,
/// so a record with garbage in any field still constructs fine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    /// Opaque identifier; uniqueness is not checked
    pub id: String,

    /// Date of birth of the policyholder, raw `YYYY-MM-DD` text
    pub date_of_birth: String,

    /// Date the policy came into force, raw text
    pub issue_date: String,

    /// Status code 1-6, raw text
    pub status_code: String,

    /// Date of the status change, raw text; empty for in-force policies
    pub status_date: String,
}

impl PolicyRecord {
    /// Re-serialize the raw fields in input order.
    ///
    /// For any line the parser accepted, this returns the parsed portion of
    /// the line byte-for-byte (padded fields come back as empty strings).
    pub fn to_line(&self) -> String {
        [
            self.id.as_str(),
            self.date_of_birth.as_str(),
            self.issue_date.as_str(),
            self.status_code.as_str(),
            self.status_date.as_str(),
        ]
        .join(";")
    }
}

/// A record that passed every validation rule, with fields parsed into
/// their working types for the exposure stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposedPolicy {
    pub id: String,
    pub date_of_birth: NaiveDate,
    pub issue_date: NaiveDate,
    pub status: StatusCode,

    /// Present iff the policy is terminated
    pub status_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_round_trip() {
        for code in 1..=6 {
            let status = StatusCode::from_code(code).unwrap();
            assert_eq!(status.code(), code);
        }
        assert_eq!(StatusCode::from_code(0), None);
        assert_eq!(StatusCode::from_code(7), None);
    }

    #[test]
    fn test_only_in_force_is_not_terminated() {
        assert!(!StatusCode::InForce.is_terminated());
        for code in 2..=6 {
            assert!(StatusCode::from_code(code).unwrap().is_terminated());
        }
    }

    #[test]
    fn test_to_line_preserves_raw_fields() {
        let record = PolicyRecord {
            id: "5678".to_string(),
            date_of_birth: "1977-06-23".to_string(),
            issue_date: "2012-03-04".to_string(),
            status_code: "3".to_string(),
            status_date: "2015-09-17".to_string(),
        };
        assert_eq!(record.to_line(), "5678;1977-06-23;2012-03-04;3;2015-09-17");
    }
}

//! Rule engine deciding whether a policy is in scope for the study
//!
//! Rules are independent probes over a read-only snapshot of the record's
//! parsed fields; none mutate state, so every applicable rule runs and every
//! failure is reported. No short-circuiting. Reasons are appended in a fixed
//! order so rerunning the same record always yields the same sequence.
//!
//! A failing record is excluded from exposure, nothing more: rule failures
//! are data-level and never abort the batch.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::policy::{ExposedPolicy, PolicyRecord, StatusCode};
use crate::study::{parse_date, StudyConfig};

/// Why a record is out of the study. The display text is exactly what lands
/// in the rejection log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Reason {
    InvalidDateOfBirth,
    InvalidIssueDate,
    InvalidStatusCode,
    InvalidStatusDate,
    BirthAfterStudyEnd,
    IssuedAfterStatusChange,
    IssuedAfterStudyEnd,
    StatusBeforeStudyStart,
    BirthAfterIssue,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::InvalidDateOfBirth => "Invalid date of birth",
            Reason::InvalidIssueDate => "Invalid policy issue date",
            Reason::InvalidStatusCode => "Invalid policy status code",
            Reason::InvalidStatusDate => "Invalid policy status date",
            Reason::BirthAfterStudyEnd => "date of birth after study end date",
            Reason::IssuedAfterStatusChange => "policy issued after status change",
            Reason::IssuedAfterStudyEnd => "policy issued after study end date",
            Reason::StatusBeforeStudyStart => "policy status date before study start date",
            Reason::BirthAfterIssue => "date of birth after policy issue date",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating one record
///
/// Reasons appear in rule-evaluation order; a record is exposed exactly when
/// no rule failed, so the flag is derived rather than stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub reasons: Vec<Reason>,
}

impl Verdict {
    /// Whether the record contributes to exposure calculation
    pub fn is_exposed(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Reasons joined for the rejection log, e.g.
    /// `Invalid policy issue date; policy issued after study end date`
    pub fn describe(&self) -> String {
        let reasons: Vec<&str> = self.reasons.iter().map(Reason::as_str).collect();
        reasons.join("; ")
    }
}

/// Per-record result: the typed policy for the exposure stage, or the
/// reasons it stays out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assessment {
    Exposed(ExposedPolicy),
    OutOfStudy(Verdict),
}

/// Parsed view of a record's fields, taken once and shared by all rules
struct Snapshot {
    date_of_birth: Option<NaiveDate>,
    issue_date: Option<NaiveDate>,
    status: Option<StatusCode>,
    status_date: Option<NaiveDate>,
}

impl Snapshot {
    fn take(record: &PolicyRecord) -> Self {
        Self {
            date_of_birth: parse_date(&record.date_of_birth),
            issue_date: parse_date(&record.issue_date),
            status: record
                .status_code
                .trim()
                .parse::<u8>()
                .ok()
                .and_then(StatusCode::from_code),
            status_date: parse_date(&record.status_date),
        }
    }

    /// True when the status code parsed and is not in force; the gate for
    /// every status-date rule
    fn terminated(&self) -> bool {
        self.status.map_or(false, |status| status.is_terminated())
    }

    /// Run the full rule battery. Cross-field rules only fire when the
    /// dates they compare parsed; an unparsable field is reported once, by
    /// its own field rule.
    fn verdict(&self, config: &StudyConfig) -> Verdict {
        let mut reasons = Vec::new();

        // Field rules
        if self.date_of_birth.is_none() {
            reasons.push(Reason::InvalidDateOfBirth);
        }
        if self.issue_date.is_none() {
            reasons.push(Reason::InvalidIssueDate);
        }
        if self.status.is_none() {
            reasons.push(Reason::InvalidStatusCode);
        }
        if self.terminated() && self.status_date.is_none() {
            reasons.push(Reason::InvalidStatusDate);
        }

        // Cross-field rules
        if let Some(dob) = self.date_of_birth {
            if dob >= config.end {
                reasons.push(Reason::BirthAfterStudyEnd);
            }
        }
        if self.terminated() {
            if let (Some(issue), Some(status_date)) = (self.issue_date, self.status_date) {
                if issue >= status_date {
                    reasons.push(Reason::IssuedAfterStatusChange);
                }
            }
        }
        if let Some(issue) = self.issue_date {
            if issue >= config.end {
                reasons.push(Reason::IssuedAfterStudyEnd);
            }
        }
        if self.terminated() {
            if let (Some(_), Some(status_date)) = (self.issue_date, self.status_date) {
                if status_date < config.start {
                    reasons.push(Reason::StatusBeforeStudyStart);
                }
            }
        }
        if let (Some(dob), Some(issue)) = (self.date_of_birth, self.issue_date) {
            if dob >= issue {
                reasons.push(Reason::BirthAfterIssue);
            }
        }

        Verdict { reasons }
    }

    /// Typed policy for the exposure stage; `None` while any required field
    /// is unparsed
    fn into_exposed(self, id: &str) -> Option<ExposedPolicy> {
        let status = self.status?;
        Some(ExposedPolicy {
            id: id.to_string(),
            date_of_birth: self.date_of_birth?,
            issue_date: self.issue_date?,
            status,
            status_date: if status.is_terminated() {
                self.status_date
            } else {
                None
            },
        })
    }
}

/// Validate one record against the study configuration.
///
/// Pure function of its inputs: no shared mutable state, safe to call from
/// any number of workers.
pub fn validate(config: &StudyConfig, record: &PolicyRecord) -> Verdict {
    Snapshot::take(record).verdict(config)
}

/// Validate one record and, when it passes, hand back the typed policy.
pub fn assess(config: &StudyConfig, record: &PolicyRecord) -> Assessment {
    let snapshot = Snapshot::take(record);
    let verdict = snapshot.verdict(config);
    if verdict.is_exposed() {
        if let Some(exposed) = snapshot.into_exposed(&record.id) {
            return Assessment::Exposed(exposed);
        }
    }
    Assessment::OutOfStudy(verdict)
}

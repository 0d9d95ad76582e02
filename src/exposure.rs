//! Exposure stage: the sink for records that passed validation
//!
//! The exposure-by-duration calculation itself (prorating time at risk
//! across policy anniversaries) is not built yet; it is blocked on choosing
//! a day-count convention, and [`DayCountConvention`] keeps the candidates.
//! Until then the stage forwards each accepted policy, in input order, as
//! one row of the `exposures` output.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::policy::ExposedPolicy;
use crate::study::{StudyConfig, DATE_FORMAT};

/// Header row, matching the inforce extract the records came from
const HEADER: [&str; 5] = [
    "id",
    "date_of_birth",
    "policy_issue_date",
    "policy_status_code",
    "policy_status_date",
];

/// Days-in-year conventions for prorating time at risk across policy years
///
/// Which one is authoritative for this study is still an open decision; the
/// calculator will take it as an input rather than bake one in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayCountConvention {
    /// 365 days, no adjustment for leap years
    Exact365,
    /// 365.2425 days, the Gregorian mean year: (291 * 366 + 909 * 365) / 1200
    Gregorian,
    /// 365.25 days, the Julian mean year: (3 * 365 + 366) / 4
    Julian,
}

impl DayCountConvention {
    pub fn days_in_year(&self) -> f64 {
        match self {
            DayCountConvention::Exact365 => 365.0,
            DayCountConvention::Gregorian => 365.2425,
            DayCountConvention::Julian => 365.25,
        }
    }
}

/// Writes accepted policies as `;`-delimited rows
///
/// One header row up front, then one row per policy in the order they are
/// forwarded. Dates are written back in `YYYY-MM-DD`; in-force policies get
/// an empty status-date column.
pub struct ExposureWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ExposureWriter<W> {
    pub fn new(sink: W) -> csv::Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .from_writer(sink);
        writer.write_record(HEADER)?;
        Ok(Self { writer })
    }

    /// Forward one accepted policy to the exposure output.
    pub fn forward(&mut self, _config: &StudyConfig, policy: &ExposedPolicy) -> csv::Result<()> {
        let date_of_birth = policy.date_of_birth.format(DATE_FORMAT).to_string();
        let issue_date = policy.issue_date.format(DATE_FORMAT).to_string();
        let status_code = policy.status.code().to_string();
        let status_date = policy
            .status_date
            .map(|date| date.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        self.writer.write_record([
            policy.id.as_str(),
            date_of_birth.as_str(),
            issue_date.as_str(),
            status_code.as_str(),
            status_date.as_str(),
        ])
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::policy::StatusCode;

    fn study() -> StudyConfig {
        StudyConfig::from_args("2010-01-01", "2021-12-31", "3").unwrap()
    }

    #[test]
    fn test_day_count_candidates() {
        assert_eq!(DayCountConvention::Exact365.days_in_year(), 365.0);
        assert_eq!(DayCountConvention::Gregorian.days_in_year(), 365.2425);
        assert_eq!(DayCountConvention::Julian.days_in_year(), 365.25);
    }

    #[test]
    fn test_rows_written_in_forward_order() {
        let config = study();
        let mut writer = ExposureWriter::new(Vec::new()).unwrap();

        writer
            .forward(
                &config,
                &ExposedPolicy {
                    id: "1234".to_string(),
                    date_of_birth: NaiveDate::from_ymd_opt(1982, 11, 17).unwrap(),
                    issue_date: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
                    status: StatusCode::InForce,
                    status_date: None,
                },
            )
            .unwrap();
        writer
            .forward(
                &config,
                &ExposedPolicy {
                    id: "5678".to_string(),
                    date_of_birth: NaiveDate::from_ymd_opt(1977, 6, 23).unwrap(),
                    issue_date: NaiveDate::from_ymd_opt(2012, 3, 4).unwrap(),
                    status: StatusCode::Death,
                    status_date: NaiveDate::from_ymd_opt(2015, 9, 17),
                },
            )
            .unwrap();
        writer.flush().unwrap();

        let out = String::from_utf8(writer.writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            "id;date_of_birth;policy_issue_date;policy_status_code;policy_status_date\n\
             1234;1982-11-17;2010-01-01;1;\n\
             5678;1977-06-23;2012-03-04;3;2015-09-17\n"
        );
    }
}

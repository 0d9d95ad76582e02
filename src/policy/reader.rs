//! Tolerant parser for the `;`-delimited policy extract
//!
//! One line in, one [`PolicyRecord`] out. The batch keeps going on short
//! lines: missing trailing fields become empty strings and are left for the
//! validator to judge. Only a line with no content at all is malformed.

use thiserror::Error;

use super::PolicyRecord;

/// Field delimiter in the input stream
pub const DELIMITER: char = ';';

/// The line could not be split into fields at all (empty line)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("record cannot be split into fields")]
pub struct MalformedRecord;

/// Split one input line into a record.
///
/// Field order is fixed: `id;date_of_birth;issue_date;status_code;status_date`.
/// A trailing newline (or CRLF) is stripped first. Fields are taken verbatim,
/// fewer than five tokens pads the tail with empty strings, and anything past
/// the fifth token is ignored.
pub fn parse_line(line: &str) -> Result<PolicyRecord, MalformedRecord> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.is_empty() {
        return Err(MalformedRecord);
    }

    let mut tokens = line.split(DELIMITER);
    let mut field = || tokens.next().unwrap_or("").to_string();

    Ok(PolicyRecord {
        id: field(),
        date_of_birth: field(),
        issue_date: field(),
        status_code: field(),
        status_date: field(),
    })
}

//! Batch engine: read, validate in parallel, emit in input order
//!
//! Record validation is a pure function of the shared read-only study
//! configuration and one record, so batches of lines are validated across
//! the rayon pool. Emission stays serial: both sinks receive their lines in
//! input order, making reruns byte-identical.
//!
//! Record-level failures never stop the run. Only the fatal tier does:
//! an unreadable input stream or an unwritable sink.

use std::io::{self, BufRead, BufWriter, Write};

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::exposure::ExposureWriter;
use crate::policy::{parse_line, ExposedPolicy, MalformedRecord};
use crate::study::StudyConfig;
use crate::validate::{assess, Assessment, Verdict};

/// Lines validated per parallel batch
const BATCH_SIZE: usize = 4096;

/// Run-level failures; any of these aborts the batch
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read input stream: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write rejection log: {0}")]
    RejectLog(#[source] io::Error),

    #[error("failed to write accepted records: {0}")]
    Accepted(#[source] csv::Error),
}

/// Counters for one completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Lines taken off the input stream
    pub lines_read: usize,

    /// Records that passed every rule and were forwarded
    pub exposed: usize,

    /// Records rejected by at least one rule
    pub out_of_study: usize,

    /// Lines that could not be split into fields at all
    pub malformed: usize,
}

/// What one line turned into; carries everything emission needs
enum LineOutcome {
    Exposed(ExposedPolicy),
    Rejected { id: String, verdict: Verdict },
    Malformed { line_no: usize },
}

/// Process the whole input stream against one study configuration.
///
/// Reads `input` to EOF, validates in batches, writes accepted records to
/// `accepted` (with header) and one `id;reason; reason...` line per rejected
/// record to `reject_log`. Both sinks are flushed before returning, on the
/// read-error path included.
pub fn run<R, A, L>(
    config: &StudyConfig,
    input: R,
    accepted: A,
    reject_log: L,
) -> Result<RunSummary, PipelineError>
where
    R: BufRead,
    A: Write,
    L: Write,
{
    let mut accepted = ExposureWriter::new(accepted).map_err(PipelineError::Accepted)?;
    let mut reject_log = BufWriter::new(reject_log);

    let mut summary = RunSummary::default();
    let mut lines = input.lines();
    let mut batch: Vec<(usize, String)> = Vec::with_capacity(BATCH_SIZE);

    loop {
        batch.clear();
        while batch.len() < BATCH_SIZE {
            match lines.next() {
                Some(Ok(line)) => {
                    summary.lines_read += 1;
                    batch.push((summary.lines_read, line));
                }
                Some(Err(error)) => {
                    flush_sinks(&mut accepted, &mut reject_log);
                    return Err(PipelineError::Read(error));
                }
                None => break,
            }
        }
        if batch.is_empty() {
            break;
        }

        let outcomes: Vec<LineOutcome> = batch
            .par_iter()
            .map(|(line_no, line)| classify(config, *line_no, line))
            .collect();
        debug!("validated batch of {} lines", outcomes.len());

        for outcome in outcomes {
            match outcome {
                LineOutcome::Exposed(policy) => {
                    accepted
                        .forward(config, &policy)
                        .map_err(PipelineError::Accepted)?;
                    summary.exposed += 1;
                }
                LineOutcome::Rejected { id, verdict } => {
                    writeln!(reject_log, "{};{}", id, verdict.describe())
                        .map_err(PipelineError::RejectLog)?;
                    summary.out_of_study += 1;
                }
                LineOutcome::Malformed { line_no } => {
                    warn!("line {}: skipping record that cannot be split into fields", line_no);
                    summary.malformed += 1;
                }
            }
        }
    }

    accepted
        .flush()
        .map_err(|error| PipelineError::Accepted(error.into()))?;
    reject_log.flush().map_err(PipelineError::RejectLog)?;

    info!(
        "processed {} lines: {} exposed, {} out of study, {} malformed",
        summary.lines_read, summary.exposed, summary.out_of_study, summary.malformed
    );
    Ok(summary)
}

fn classify(config: &StudyConfig, line_no: usize, line: &str) -> LineOutcome {
    match parse_line(line) {
        Err(MalformedRecord) => LineOutcome::Malformed { line_no },
        Ok(record) => match assess(config, &record) {
            Assessment::Exposed(policy) => LineOutcome::Exposed(policy),
            Assessment::OutOfStudy(verdict) => LineOutcome::Rejected {
                id: record.id,
                verdict,
            },
        },
    }
}

/// Best-effort flush of both sinks on the way out of a failing run
fn flush_sinks<A: Write, L: Write>(accepted: &mut ExposureWriter<A>, reject_log: &mut L) {
    if let Err(error) = accepted.flush() {
        warn!("could not flush accepted records: {}", error);
    }
    if let Err(error) = reject_log.flush() {
        warn!("could not flush rejection log: {}", error);
    }
}

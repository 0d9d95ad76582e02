//! Experience Study - exposure pre-processing for policy-level decrement studies
//!
//! This library provides:
//! - Study window configuration with full up-front validation
//! - Tolerant parsing of `;`-delimited policy records
//! - A fixed-order rule engine deciding study membership per record
//! - A batch pipeline with parallel validation and deterministic output order
//! - The accepted-records sink feeding the exposure-by-duration stage

pub mod exposure;
pub mod pipeline;
pub mod policy;
pub mod study;
pub mod validate;

// Re-export commonly used types
pub use pipeline::{PipelineError, RunSummary};
pub use policy::{ExposedPolicy, PolicyRecord, StatusCode};
pub use study::{ConfigError, ConfigErrors, StudyConfig, StudyType};
pub use validate::{assess, validate, Assessment, Reason, Verdict};

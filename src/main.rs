//! Exposure CLI
//!
//! Reads delimited policy records, validates them against the study window,
//! and splits them into the accepted (exposure) output and the rejection log.
//!
//!   tail +2 inforce.txt | exposure --start=2010-01-01 --end=2021-12-31 --type=3

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use experience_study::{pipeline, StudyConfig};

#[derive(Parser)]
#[command(
    name = "exposure",
    version,
    about = "Exposure pre-processing for an actuarial experience study"
)]
struct Cli {
    /// Study window start date (YYYY-MM-DD, inclusive)
    ///
    /// Taken as raw text so every bad parameter can be reported in one
    /// pass, not one failure at a time.
    #[arg(long, value_name = "DATE")]
    start: String,

    /// Study window end date (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE")]
    end: String,

    /// Study type code: 1 in force, 2 lapse, 3 mortality, 4 accidental
    /// death, 5 TPD disease, 6 TPD accident
    #[arg(long = "type", value_name = "CODE")]
    study_type: String,

    /// Read policy records from a file instead of stdin
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Where accepted records are written for the exposure calculation
    #[arg(long, value_name = "PATH", default_value = "exposures.csv")]
    exposures: PathBuf,

    /// Rejection log, one line per out-of-study policy
    #[arg(long = "out-of-study", value_name = "PATH", default_value = "out_of_study.csv")]
    out_of_study: PathBuf,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    summary_json: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = match StudyConfig::from_args(&cli.start, &cli.end, &cli.study_type) {
        Ok(config) => config,
        Err(errors) => {
            for error in errors.iter() {
                eprintln!("{}", error);
            }
            bail!("inconsistent study parameters");
        }
    };
    info!(
        "study window {} to {}, type {}",
        config.start,
        config.end,
        config.study_type.code()
    );

    let accepted = File::create(&cli.exposures)
        .with_context(|| format!("could not open '{}'", cli.exposures.display()))?;
    let rejects = File::create(&cli.out_of_study)
        .with_context(|| format!("could not open '{}'", cli.out_of_study.display()))?;

    let summary = match &cli.input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("could not open '{}'", path.display()))?;
            pipeline::run(&config, BufReader::new(file), accepted, rejects)?
        }
        None => pipeline::run(&config, io::stdin().lock(), accepted, rejects)?,
    };

    if cli.summary_json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!("Lines read:    {}", summary.lines_read);
        println!("Exposed:       {}", summary.exposed);
        println!("Out of study:  {}", summary.out_of_study);
        println!("Malformed:     {}", summary.malformed);
        println!("\nAccepted records written to: {}", cli.exposures.display());
        println!("Rejection log written to:    {}", cli.out_of_study.display());
    }

    Ok(())
}

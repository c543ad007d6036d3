//! Cohort selection command-line tool.
//!
//! Labels n2c2 2018 patient corpora with the rule-based classifiers and
//! scores predictions against gold annotations.

mod config;
mod pipeline;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use config::{Config, Overrides};

#[derive(Parser)]
#[command(name = "cohort")]
#[command(about = "Rule-based cohort selection for clinical trial criteria")]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Label every criterion of a corpus
    Predict {
        /// Directory of patient XML files
        #[arg(short, long)]
        input: PathBuf,

        /// Gold corpus to score the predictions against
        #[arg(short, long)]
        gold: Option<PathBuf>,

        /// Directory to write labeled patient files to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print metrics as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Score a predicted corpus against a gold one
    Evaluate {
        #[arg(short, long)]
        gold: PathBuf,

        #[arg(short, long)]
        pred: PathBuf,

        /// Print metrics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the lab tables of every record as JSON
    Labs {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Normalize text from the argument or stdin
    Normalize { text: Option<String> },
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Predict {
            input,
            gold,
            output,
            json,
            overrides,
        } => {
            let config = config.with_overrides(&overrides);
            log::debug!("Config: {:?}", config);

            let outcome =
                pipeline::predict(&config, &input, gold.as_deref(), output.as_deref())?;
            log::info!("Labeled {} patients", outcome.corpus.len());
            if let (Some(dir), Some(count)) = (&output, outcome.written) {
                log::info!("Wrote {} patient files to {}", count, dir.display());
            }
            match &outcome.metrics {
                Some(metrics) => print!("{}", pipeline::render_metrics(metrics, json)?),
                None => log::info!("No gold corpus given, skipping evaluation"),
            }
        }
        Commands::Evaluate { gold, pred, json } => {
            let metrics = pipeline::evaluate_dirs(&gold, &pred)?;
            print!("{}", pipeline::render_metrics(&metrics, json)?);
        }
        Commands::Labs { input } => {
            println!("{}", pipeline::labs(&input)?);
        }
        Commands::Normalize { text } => {
            println!("{}", pipeline::normalize_text(&config, text, std::io::stdin())?);
        }
    }

    Ok(())
}

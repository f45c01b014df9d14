use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tracing::{debug, info};

use crate::error::{CheckerError, Result};
use crate::output::{output_path, OutputLog};
use crate::pool::{run_pipeline, PipelineConfig, PipelineSummary};
use crate::prober::HttpProber;
use crate::progress::progress_bar;
use crate::session::Session;
use crate::token::fetch_token;
use crate::Args;

const INPUT_EXTENSION: &str = ".txt";

/// Everything a run needs, independent of how it was configured.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub base_url: String,
    pub timeout: Duration,
    pub skip_blank: bool,
    pub pipeline: PipelineConfig,
}

impl From<&Args> for CheckerConfig {
    fn from(args: &Args) -> Self {
        CheckerConfig {
            input: args.file.clone(),
            output_dir: args.output_dir.clone(),
            base_url: args.base_url.clone(),
            timeout: Duration::from_secs(args.timeout_secs),
            skip_blank: args.skip_blank,
            pipeline: PipelineConfig {
                workers: args.workers,
                poll_interval: Duration::from_millis(args.poll_interval_ms),
                grace: Duration::from_millis(args.grace_ms),
            },
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_file: PathBuf,
    pub summary: PipelineSummary,
}

/// Drives one checking run from input file to results file.
pub struct UsernameChecker {
    config: CheckerConfig,
}

impl UsernameChecker {
    /// Validate the configuration. Nothing touches the filesystem or network yet.
    pub fn new(config: CheckerConfig) -> Result<Self> {
        if config.pipeline.workers == 0 {
            return Err(CheckerError::InvalidWorkerCount);
        }
        if !config.input.to_string_lossy().ends_with(INPUT_EXTENSION) {
            return Err(CheckerError::InvalidInputExtension {
                path: config.input.clone(),
            });
        }
        Ok(UsernameChecker { config })
    }

    /// Run the whole check: fetch the token once, then drain every name
    /// through the worker pool.
    pub async fn run(&self) -> Result<RunReport> {
        // Name the results file after the moment the run started
        let started = Local::now();

        // Prepare output directory
        tokio::fs::create_dir_all(&self.config.output_dir)
            .await
            .map_err(|e| CheckerError::io(&self.config.output_dir, e))?;
        let output_file = output_path(&self.config.output_dir, started);

        // Load candidates
        let names = read_names(&self.config.input, self.config.skip_blank).await?;
        info!(
            "Loaded {} names from '{}'",
            names.len(),
            self.config.input.display()
        );

        // One session for the whole run, pool sized to the workers
        let session = Arc::new(Session::new(
            &self.config.base_url,
            self.config.timeout,
            self.config.pipeline.workers,
        )?);

        // Without a token nothing can be checked, so fail before opening the log
        let token = fetch_token(&session).await?;
        debug!("Fetched authenticity token");

        // Create progress display and results file
        let pb = progress_bar(names.len() as u64);
        let log = Arc::new(
            OutputLog::open(&output_file)
                .await?
                .with_status(pb.clone()),
        );
        let prober = Arc::new(HttpProber::new(session, token));

        // Drain every name through the worker pool
        let summary = run_pipeline(names, prober, log, pb.clone(), &self.config.pipeline).await?;

        pb.finish_with_message(format!(
            "{} of {} available",
            summary.available, summary.checked
        ));

        Ok(RunReport {
            output_file,
            summary,
        })
    }
}

/// Read candidate names, one per line. Blank lines are kept as empty names
/// unless `skip_blank` is set.
pub async fn read_names(path: &Path, skip_blank: bool) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CheckerError::io(path, e))?;

    Ok(parse_names(&content, skip_blank))
}

pub fn parse_names(content: &str, skip_blank: bool) -> Vec<String> {
    content
        .lines()
        .filter(|line| !(skip_blank && line.trim().is_empty()))
        .map(str::to_owned)
        .collect()
}

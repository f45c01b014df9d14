//! # GitHub Username Checker
//!
//! A Rust library for checking large lists of GitHub usernames for
//! availability through the signup validation endpoint, with a bounded pool of
//! concurrent probes and progress visualization.
//!
//! ## Main Components
//!
//! - [`UsernameChecker`]: Orchestrates a whole run from input file to results file
//! - [`Session`] and [`fetch_token`]: Shared connection context and the
//!   authenticity token every check needs
//! - [`Prober`] / [`HttpProber`]: One availability check per name
//! - [`WorkQueue`] and [`run_pipeline`]: The queue and worker pool that drain it
//! - [`Args`]: Command line arguments
//!
//! ## Example
//!
//! ```no_run
//! use github_username_checker_lib::{Args, CheckerConfig, UsernameChecker};
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let args = Args::parse();
//!
//!     let checker = UsernameChecker::new(CheckerConfig::from(&args))?;
//!     let report = checker.run().await?;
//!
//!     println!("Results written to {}", report.output_file.display());
//!     Ok(())
//! }
//! ```

mod args;
mod checker;
mod error;
mod output;
mod pool;
mod prober;
mod progress;
mod queue;
mod session;
mod token;

pub use crate::args::Args;
pub use crate::checker::{parse_names, read_names, CheckerConfig, RunReport, UsernameChecker};
pub use crate::error::{CheckerError, Result};
pub use crate::output::{available_line, output_path, OutputLog};
pub use crate::pool::{
    check_availability, run_pipeline, PipelineConfig, PipelineSummary, DEFAULT_GRACE,
    DEFAULT_POLL_INTERVAL, DEFAULT_WORKERS,
};
pub use crate::prober::{available_message, classify_body, HttpProber, ProbeResult, Prober, CHECK_PATH};
pub use crate::progress::{observe_progress, progress_bar, ProgressSink};
pub use crate::queue::WorkQueue;
pub use crate::session::Session;
pub use crate::token::{extract_token, fetch_token, Token, SIGNUP_PATH};

use std::path::PathBuf;

use clap::Parser;

/// Check a list of GitHub usernames for availability.
///
/// Names are read one per line from a `.txt` file and checked concurrently
/// against the signup validation endpoint. Available names are written to a
/// timestamped file in the output directory.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about)]
pub struct Args {
    /// Text file with one candidate username per line.
    #[clap(value_name = "FILE.txt")]
    pub file: PathBuf,

    /// Number of concurrent workers.
    #[clap(short, long, default_value = "512", env = "USERNAME_CHECKER_WORKERS")]
    pub workers: usize,

    /// Directory that receives the results file.
    #[clap(
        short,
        long,
        default_value = "usernames",
        env = "USERNAME_CHECKER_OUTPUT_DIR"
    )]
    pub output_dir: PathBuf,

    /// Base URL of the service that hosts the signup pages.
    #[clap(
        long,
        default_value = "https://github.com/",
        env = "USERNAME_CHECKER_BASE_URL"
    )]
    pub base_url: String,

    /// Interval between progress samples, in milliseconds.
    #[clap(long, default_value = "200", env = "USERNAME_CHECKER_POLL_INTERVAL_MS")]
    pub poll_interval_ms: u64,

    /// Per-request timeout, in seconds.
    #[clap(long, default_value = "30", env = "USERNAME_CHECKER_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// How long to wait for workers to stop once the queue has drained, in milliseconds.
    #[clap(long, default_value = "1000", env = "USERNAME_CHECKER_GRACE_MS")]
    pub grace_ms: u64,

    /// Drop blank lines instead of checking them as empty names.
    #[clap(long, env = "USERNAME_CHECKER_SKIP_BLANK")]
    pub skip_blank: bool,
}

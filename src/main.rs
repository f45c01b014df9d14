use std::error::Error;

use clap::Parser;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use github_username_checker_lib::{
    Args, CheckerConfig, CheckerError, Result, RunReport, UsernameChecker,
};

#[tokio::main]
async fn main() {
    // Settings may come from a .env file as well as the environment.
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    match run(&args).await {
        Ok(report) => {
            info!(
                "Finished: {} of {} names available",
                report.summary.available, report.summary.checked
            );
            println!(
                "{} of {} names available, results saved to '{}'",
                report.summary.available,
                report.summary.checked,
                report.output_file.display()
            );
        }
        Err(e) => {
            eprintln!("Error: {}", describe(&e));
            std::process::exit(1);
        }
    }
}

async fn run(args: &Args) -> Result<RunReport> {
    UsernameChecker::new(CheckerConfig::from(args))?.run().await
}

/// Error message followed by the rest of its cause chain.
fn describe(e: &CheckerError) -> String {
    let mut message = e.to_string();
    // The direct cause is already part of the message
    let mut cause = e.source().and_then(|source| source.source());
    while let Some(inner) = cause {
        message.push_str(&format!(": {}", inner));
        cause = inner.source();
    }
    message
}

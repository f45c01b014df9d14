use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use indicatif::ProgressBar;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::{CheckerError, Result};

const FILE_PREFIX: &str = "usernames";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// `<dir>/usernames-YYYY-MM-DD-HH-MM-SS.txt` for a run started at `started`.
pub fn output_path(dir: &Path, started: DateTime<Local>) -> PathBuf {
    dir.join(format!(
        "{}-{}.txt",
        FILE_PREFIX,
        started.format(TIMESTAMP_FORMAT)
    ))
}

/// Line recorded for every available name, including the trailing newline.
pub fn available_line(name: &str) -> String {
    format!("Username '{}' is available!\n", name)
}

/// Append-only log of available names.
///
/// Each record is a single `write_all` under the lock, so lines from
/// different workers never interleave. Records are mirrored to the status bar.
pub struct OutputLog {
    path: PathBuf,
    file: Mutex<File>,
    status: ProgressBar,
}

impl OutputLog {
    /// Open (or create) `path` in append mode.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| CheckerError::io(&path, e))?;

        Ok(OutputLog {
            path,
            file: Mutex::new(file),
            status: ProgressBar::hidden(),
        })
    }

    /// Mirror every recorded line to `status` (printed above the bar).
    /// Without a visible bar, lines go to stdout.
    pub fn with_status(mut self, status: ProgressBar) -> Self {
        self.status = status;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the line for `name` and mirror it to the status stream.
    pub async fn record_available(&self, name: &str) -> Result<()> {
        let line = available_line(name);

        {
            let mut file = self.file.lock().await;
            file.write_all(line.as_bytes())
                .await
                .map_err(|e| CheckerError::io(&self.path, e))?;
            file.flush()
                .await
                .map_err(|e| CheckerError::io(&self.path, e))?;
        }

        info!("Username '{}' is available", name);
        let line = line.trim_end_matches('\n');
        if self.status.is_hidden() {
            println!("{}", line);
        } else {
            self.status.println(line);
        }
        Ok(())
    }
}

impl fmt::Debug for OutputLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputLog").field("path", &self.path).finish_non_exhaustive()
    }
}

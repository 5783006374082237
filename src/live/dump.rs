use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::MetricsError;
use crate::metrics::RecordedSnapshot;

/// `performance_log_<YYYYmmdd_HHMMSS>.json` for the given capture time.
#[must_use]
pub fn log_file_name(captured_at: &DateTime<Local>) -> String {
    format!("performance_log_{}.json", captured_at.format("%Y%m%d_%H%M%S"))
}

/// Writes the monitor history as one pretty-printed JSON array.
///
/// # Errors
///
/// Returns an error when the directory or file cannot be written or the
/// history cannot be serialized.
pub async fn write_history_log(
    dir: &Path,
    entries: &[&RecordedSnapshot],
    captured_at: &DateTime<Local>,
) -> Result<PathBuf, MetricsError> {
    let path = dir.join(log_file_name(captured_at));
    let json = serde_json::to_vec_pretty(entries).map_err(|source| MetricsError::Serialize {
        context: "monitor history",
        source,
    })?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| MetricsError::Io {
            context: "creating log directory",
            path: dir.to_path_buf(),
            source,
        })?;
    let io_error = |source| MetricsError::Io {
        context: "writing metrics log",
        path: path.clone(),
        source,
    };
    let file = tokio::fs::File::create(&path).await.map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&json).await.map_err(io_error)?;
    writer.flush().await.map_err(io_error)?;
    Ok(path)
}

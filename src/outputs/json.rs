//! JSON output of headline batches.
//!
//! Files are organized by date, one file per run:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── 081502.json
//!     └── 173010.json
//! ```

use crate::models::HeadlineBatch;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`HeadlineBatch`] to `{json_output_dir}/{date}/{HHMMSS}.json`
/// using the batch's fetch time (UTC), returning the path written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_headlines(
    batch: &HeadlineBatch,
    json_output_dir: &str,
) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(batch)?;

    let full_json_dir = format!(
        "{}/{}",
        json_output_dir.trim_end_matches('/'),
        batch.fetched_at.format("%Y-%m-%d")
    );
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(%full_json_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = format!("{}/{}.json", full_json_dir, batch.fetched_at.format("%H%M%S"));
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename, articles = batch.articles.len(), "Wrote headline JSON");

    Ok(output_json_filename)
}

//! Snapshot command - Inspect and recapture the persisted baseline
//!
//! - `dirsync snapshot show` prints the baseline the next cycle diffs against
//! - `dirsync snapshot capture` rescans the sync root and overwrites it
//!
//! Neither touches the sync server or the broker.

use anyhow::{Context, Result};
use clap::Subcommand;
use dirsync_core::{
    config::Config,
    domain::{DirectorySnapshot, FileRecord},
    ports::ISnapshotStore,
};
use tracing::info;

use crate::output::{get_formatter, plural, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum SnapshotCommand {
    /// Display the persisted baseline
    Show,
    /// Scan the sync root and persist the result as the new baseline
    Capture,
}

impl SnapshotCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        super::require_valid(config, &["client.", "sync."])?;
        match self {
            SnapshotCommand::Show => self.execute_show(config, format).await,
            SnapshotCommand::Capture => self.execute_capture(config, format).await,
        }
    }

    async fn execute_show(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format.is_json());
        let (_, store) = super::snapshot_store(config);
        let path = store.snapshot_path().display().to_string();

        let baseline = store
            .last_snapshot()
            .await
            .with_context(|| format!("Failed to read baseline at {path}"))?;

        if format.is_json() {
            let json = serde_json::json!({
                "snapshot_path": path,
                "snapshot": baseline,
            });
            formatter.print_json(&json);
            return Ok(());
        }

        match baseline {
            None => {
                formatter.info(&format!("No baseline at {path}"));
                formatter.info("Run 'dirsync sync' or 'dirsync snapshot capture' to create one.");
            }
            Some(snapshot) => {
                formatter.success(&format!(
                    "Baseline ({path}): {} entr{}",
                    snapshot.len(),
                    if snapshot.len() == 1 { "y" } else { "ies" }
                ));
                for line in describe(&snapshot) {
                    formatter.info(&line);
                }
            }
        }
        Ok(())
    }

    async fn execute_capture(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format.is_json());
        let (_, store) = super::snapshot_store(config);
        let path = store.snapshot_path().display().to_string();

        let snapshot = store
            .create_directory_snapshot()
            .await
            .context("Failed to capture snapshot")?;
        info!(entries = snapshot.len(), path = %path, "Baseline captured");

        if format.is_json() {
            let json = serde_json::json!({
                "success": true,
                "snapshot_path": path,
                "entries": snapshot.len(),
            });
            formatter.print_json(&json);
        } else {
            formatter.success(&format!(
                "Captured {} entr{} to {path}",
                snapshot.len(),
                if snapshot.len() == 1 { "y" } else { "ies" }
            ));
        }
        Ok(())
    }
}

/// One line per record: directories end in `/`, files show their size,
/// tombstones are marked
fn describe(snapshot: &DirectorySnapshot) -> Vec<String> {
    let files = snapshot.iter().filter(|(_, r)| !r.is_directory).count();
    let mut lines = Vec::with_capacity(snapshot.len() + 1);
    lines.push(format!(
        "{} file{}, {} director{}",
        files,
        plural(files),
        snapshot.len() - files,
        if snapshot.len() - files == 1 { "y" } else { "ies" }
    ));
    lines.extend(snapshot.iter().map(|(_, record)| describe_record(record)));
    lines
}

fn describe_record(record: &FileRecord) -> String {
    let marker = if record.is_tombstone() { "deleted " } else { "" };
    if record.is_directory {
        format!("  {marker}{}/", record.path)
    } else {
        format!("  {marker}{} ({} bytes)", record.path, record.size)
    }
}

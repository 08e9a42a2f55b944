//! Sync command - Run one sync cycle
//!
//! Provides the `dirsync sync` CLI command which:
//! 1. Validates the configuration
//! 2. Creates the adapters (filesystem, snapshot store, sync server, broker)
//! 3. Runs the SyncEngine and displays the cycle summary
//!
//! With `--dry-run` only the baseline and the sync root are read, and the
//! snapshot that would be submitted is printed.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use dirsync_api::{client::SyncServerClient, queue::RabbitMqManagementClient};
use dirsync_core::{config::Config, domain::SyncContext};
use dirsync_sync::engine::{PreparedSnapshot, SyncEngine, SyncResult};
use tracing::info;

use crate::output::{format_duration, get_formatter, plural, OutputFormat, OutputFormatter};

#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Show the snapshot that would be submitted without contacting the
    /// server or the broker
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncCommand {
    /// Wires up all adapters, creates the SyncEngine and runs one cycle
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format.is_json());

        super::require_valid(config, &[])?;
        let engine = build_engine(config)?;

        if self.dry_run {
            formatter.info("Dry run mode - no changes will be made");
            let prepared = engine.plan_snapshot().await?;
            print_dry_run(&prepared, format, &*formatter)?;
            return Ok(());
        }

        formatter.info("Starting synchronization...");
        let result = engine.sync().await.map_err(|e| {
            let stage = e.stage();
            anyhow::Error::new(e).context(format!("Sync cycle aborted during {stage}"))
        })?;

        print_result(&result, format, &*formatter)
    }
}

fn build_engine(config: &Config) -> Result<SyncEngine> {
    let context = SyncContext::from_config(config)?;
    let timeout = Duration::from_secs(config.server.timeout_secs);

    let (local_fs, store) = super::snapshot_store(config);
    let server = Arc::new(SyncServerClient::new(
        config.server.url.clone(),
        config.sync.root.clone(),
        timeout,
    )?);
    let queue = Arc::new(RabbitMqManagementClient::new(
        &config.queue.address,
        config.queue.vhost.clone(),
        timeout,
    )?);

    info!(
        client_id = %context.client_id(),
        server = %server.base_url(),
        snapshot = %store.snapshot_path().display(),
        "Adapters ready"
    );

    Ok(SyncEngine::new(
        context,
        queue,
        store,
        server.clone(),
        server,
        local_fs,
        config.sync.max_concurrent_actions,
    ))
}

fn print_dry_run(
    prepared: &PreparedSnapshot,
    format: OutputFormat,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    let snapshot = &prepared.snapshot;

    if format.is_json() {
        let json = serde_json::json!({
            "dry_run": true,
            "first_run": prepared.first_run,
            "entries": snapshot.len(),
            "tombstones": snapshot.tombstone_count(),
            "final_snapshot": serde_json::to_value(snapshot)
                .context("Failed to serialize snapshot")?,
        });
        formatter.print_json(&json);
        return Ok(());
    }

    formatter.success(&format!(
        "Would submit {} entr{} ({} tombstone{})",
        snapshot.len(),
        if snapshot.len() == 1 { "y" } else { "ies" },
        snapshot.tombstone_count(),
        plural(snapshot.tombstone_count()),
    ));
    if prepared.first_run {
        formatter.info("No baseline found; this would be a first run");
    }
    for record in snapshot.tombstones() {
        formatter.info(&format!("  deleted  {}", record.path));
    }
    Ok(())
}

fn print_result(
    result: &SyncResult,
    format: OutputFormat,
    formatter: &dyn OutputFormatter,
) -> Result<()> {
    if format.is_json() {
        let json = serde_json::to_value(result).context("Failed to serialize sync result")?;
        formatter.print_json(&json);
        return Ok(());
    }

    let applied = (result.files_uploaded + result.files_downloaded + result.directories_created)
        as usize;

    if result.planned_actions == 0 && result.errors.is_empty() {
        formatter.success("Already up to date");
    } else {
        formatter.success(&format!(
            "Sync completed in {}",
            format_duration(result.duration_ms)
        ));
    }

    if result.purged_messages > 0 {
        formatter.info(&format!(
            "Discarded:  {} stale notification{}",
            result.purged_messages,
            plural(result.purged_messages as usize)
        ));
    }
    formatter.info(&format!(
        "Submitted:  {} entr{} ({} tombstone{}){}",
        result.submitted_entries,
        if result.submitted_entries == 1 { "y" } else { "ies" },
        result.tombstones,
        plural(result.tombstones),
        if result.first_run { ", first run" } else { "" }
    ));

    if result.files_uploaded > 0 {
        formatter.info(&format!(
            "Uploaded:   {} file{}",
            result.files_uploaded,
            plural(result.files_uploaded as usize)
        ));
    }
    if result.files_downloaded > 0 {
        formatter.info(&format!(
            "Downloaded: {} file{}",
            result.files_downloaded,
            plural(result.files_downloaded as usize)
        ));
    }
    if result.directories_created > 0 {
        formatter.info(&format!(
            "Created:    {} director{}",
            result.directories_created,
            if result.directories_created == 1 { "y" } else { "ies" }
        ));
    }
    if result.unknown_actions > 0 {
        formatter.warn(&format!(
            "Skipped {} directive{} with an unrecognized action",
            result.unknown_actions,
            plural(result.unknown_actions as usize)
        ));
    }

    if !result.snapshot_refreshed {
        formatter.warn("Baseline was not refreshed; the next cycle will resubmit these changes");
    }

    if !result.errors.is_empty() {
        formatter.error(&format!(
            "{} error{} occurred:",
            result.errors.len(),
            plural(result.errors.len())
        ));
        for err in &result.errors {
            formatter.info(&format!("  - {}", err));
        }
    } else if applied > 0 {
        formatter.info(&format!("Applied {} action{}", applied, plural(applied)));
    }

    Ok(())
}

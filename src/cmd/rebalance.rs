//! Offline lane maintenance — `taskboard rebalance <STATUS>`.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use taskboard::board::server::open_database;
use taskboard::board::service;
use taskboard_common::Status;

pub fn cmd_rebalance(db_path: &Path, status: Status) -> Result<()> {
    let db = open_database(db_path)?;
    let lane = service::rebalance_lane(&db, status, Utc::now())
        .with_context(|| format!("Failed to rebalance lane {}", status))?;

    if lane.is_empty() {
        println!("Lane {} is empty, nothing to rebalance.", status);
        return Ok(());
    }

    println!("Rebalanced {} task(s) in {}:", lane.len(), status);
    for task in &lane {
        println!("  {:>8}  {}", task.position, task.title);
    }
    Ok(())
}

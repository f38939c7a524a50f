//! Database bootstrap command — `taskboard init`.

use std::path::Path;

use anyhow::Result;
use taskboard::board::server::open_database;

pub fn cmd_init(db_path: &Path) -> Result<()> {
    open_database(db_path)?;
    println!("Task board database initialized at {}", db_path.display());
    Ok(())
}

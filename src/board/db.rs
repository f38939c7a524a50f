use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use taskboard_common::{Status, Task, TaskPatch};

use super::store::TaskStore;

/// Async-safe handle to the board database.
///
/// Wraps `BoardDb` behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`, preventing synchronous SQLite
/// I/O from tying up async worker threads.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<BoardDb>>,
}

impl DbHandle {
    pub fn new(db: BoardDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    /// Run a closure with access to the database on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R, E>(&self, f: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&BoardDb) -> std::result::Result<R, E> + Send + 'static,
        R: Send + 'static,
        E: From<anyhow::Error> + Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
            f(&guard)
        })
        .await
        .context("DB task panicked")
        .map_err(E::from)?
    }

    /// Acquire the database mutex synchronously. For startup and tests only;
    /// never from an async request path.
    pub fn lock_sync(&self) -> Result<std::sync::MutexGuard<'_, BoardDb>> {
        self.inner
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))
    }
}

pub struct BoardDb {
    conn: Connection,
}

const TASK_COLUMNS: &str = "id, title, description, status, position, created_at, updated_at";

impl BoardDb {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.conn
            .execute_batch("PRAGMA journal_mode = WAL;")
            .context("Failed to set journal mode")?;
        self.run_migrations().context("Failed to run migrations")?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS tasks (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    status TEXT NOT NULL DEFAULT 'BACKLOG'
                        CHECK (status IN ('BACKLOG', 'TODO', 'IN_PROGRESS', 'IN_QA', 'READY_FOR_LIVE', 'DONE')),
                    position REAL NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_tasks_status_position ON tasks(status, position);
                ",
            )
            .context("Failed to create tables")?;
        Ok(())
    }

    fn query_tasks(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(sql).context("Failed to prepare task query")?;
        let rows = stmt
            .query_map(params, TaskRow::from_row)
            .context("Failed to query tasks")?;
        let mut tasks = Vec::new();
        for row in rows {
            let r = row.context("Failed to read task row")?;
            tasks.push(r.into_task()?);
        }
        Ok(tasks)
    }

    /// Number of tasks in a lane (used by the CLI and tests).
    pub fn count_in_lane(&self, status: Status) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM tasks WHERE status = ?1",
                params![status.as_str()],
                |row| row.get(0),
            )
            .context("Failed to count lane")?;
        Ok(count as usize)
    }
}

impl TaskStore for BoardDb {
    fn find_by_status_ordered(&self, status: Status) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE status = ?1 ORDER BY position, id"
            ),
            params![status.as_str()],
        )
    }

    fn find_all_ordered(&self) -> Result<Vec<Task>> {
        let mut tasks = self.query_tasks(
            &format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY position, id"),
            [],
        )?;
        // Lane order is the enum's declaration order, not the text order.
        tasks.sort_by(Task::board_order);
        Ok(tasks)
    }

    fn last_in_lane(&self, status: Status) -> Result<Option<Task>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE status = ?1
                     ORDER BY position DESC, id DESC LIMIT 1"
                ),
                params![status.as_str()],
                TaskRow::from_row,
            )
            .optional()
            .context("Failed to query lane tail")?;
        row.map(TaskRow::into_task).transpose()
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Task>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                TaskRow::from_row,
            )
            .optional()
            .context("Failed to query task")?;
        row.map(TaskRow::into_task).transpose()
    }

    fn insert(&self, task: &Task) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO tasks (id, title, description, status, position, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    task.id,
                    task.title,
                    task.description,
                    task.status.as_str(),
                    task.position,
                    format_timestamp(&task.created_at),
                    format_timestamp(&task.updated_at),
                ],
            )
            .context("Failed to insert task")?;
        Ok(())
    }

    fn update_fields(
        &self,
        id: &str,
        changes: &TaskPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Task>> {
        // Use unchecked_transaction so all updates are atomic.
        // Safety: DbHandle's Mutex already guarantees single-threaded access.
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;

        let touched = tx
            .execute(
                "UPDATE tasks SET updated_at = ?1 WHERE id = ?2",
                params![format_timestamp(&updated_at), id],
            )
            .context("Failed to stamp task")?;
        if touched == 0 {
            return Ok(None);
        }

        if let Some(t) = &changes.title {
            tx.execute("UPDATE tasks SET title = ?1 WHERE id = ?2", params![t, id])
                .context("Failed to update task title")?;
        }
        if let Some(d) = &changes.description {
            tx.execute(
                "UPDATE tasks SET description = ?1 WHERE id = ?2",
                params![d, id],
            )
            .context("Failed to update task description")?;
        }
        if let Some(s) = changes.status {
            tx.execute(
                "UPDATE tasks SET status = ?1 WHERE id = ?2",
                params![s.as_str(), id],
            )
            .context("Failed to update task status")?;
        }
        if let Some(p) = changes.position {
            tx.execute(
                "UPDATE tasks SET position = ?1 WHERE id = ?2",
                params![p, id],
            )
            .context("Failed to update task position")?;
        }

        tx.commit().context("Failed to commit task update")?;
        self.find_by_id(id)
    }

    fn delete_by_id(&self, id: &str) -> Result<bool> {
        let count = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])
            .context("Failed to delete task")?;
        Ok(count > 0)
    }

    fn reposition_lane(
        &self,
        status: Status,
        positions: &[(String, f64)],
        updated_at: DateTime<Utc>,
    ) -> Result<Vec<Task>> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;
        let stamp = format_timestamp(&updated_at);
        for (id, position) in positions {
            tx.execute(
                "UPDATE tasks SET position = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
                params![position, stamp, id, status.as_str()],
            )
            .with_context(|| format!("Failed to reposition task {}", id))?;
        }
        tx.commit().context("Failed to commit lane reposition")?;
        self.find_by_status_ordered(status)
    }
}

// ── Row mapping ───────────────────────────────────────────────────────

struct TaskRow {
    id: String,
    title: String,
    description: String,
    status: String,
    position: f64,
    created_at: String,
    updated_at: String,
}

impl TaskRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            status: row.get(3)?,
            position: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn into_task(self) -> Result<Task> {
        Ok(Task {
            status: Status::from_str(&self.status).map_err(|e| anyhow::anyhow!(e))?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
            title: self.title,
            description: self.description,
            position: self.position,
        })
    }
}

/// Fixed-width UTC form so stored timestamps also sort as text.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid stored timestamp '{}'", raw))?
        .with_timezone(&Utc))
}

//! CLI integration tests for the `taskboard` binary.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use chrono::Utc;
use predicates::prelude::*;
use tempfile::TempDir;

use taskboard::board::db::BoardDb;
use taskboard::board::service;
use taskboard::board::store::TaskStore;
use taskboard_common::{Status, TaskDraft};

/// Helper to create a taskboard Command running inside `dir`, isolated from
/// any `.env` or config file in the repository.
fn taskboard(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("taskboard");
    cmd.current_dir(dir.path())
        .env_remove("TASKBOARD_DB")
        .env_remove("TASKBOARD_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        let dir = TempDir::new().unwrap();
        taskboard(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("serve"))
            .stdout(predicate::str::contains("rebalance"));
    }

    #[test]
    fn test_version() {
        let dir = TempDir::new().unwrap();
        taskboard(&dir).arg("--version").assert().success();
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let dir = TempDir::new().unwrap();
        taskboard(&dir)
            .args(["rebalance", "ARCHIVED"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid status"));
    }
}

mod init {
    use super::*;

    #[test]
    fn test_init_creates_default_database() {
        let dir = TempDir::new().unwrap();
        taskboard(&dir)
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("initialized"));
        assert!(dir.path().join(".taskboard/board.db").exists());
    }

    #[test]
    fn test_init_respects_db_path_flag() {
        let dir = TempDir::new().unwrap();
        taskboard(&dir)
            .args(["init", "--db-path", "data/custom.db"])
            .assert()
            .success();
        assert!(dir.path().join("data/custom.db").exists());
    }

    #[test]
    fn test_init_reads_config_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".taskboard")).unwrap();
        std::fs::write(
            dir.path().join(".taskboard/taskboard.toml"),
            "[storage]\ndb_path = \"from-config.db\"\n",
        )
        .unwrap();

        taskboard(&dir).arg("init").assert().success();
        assert!(dir.path().join("from-config.db").exists());
    }

    #[test]
    fn test_init_is_idempotent() {
        let dir = TempDir::new().unwrap();
        taskboard(&dir).arg("init").assert().success();
        taskboard(&dir).arg("init").assert().success();
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let dir = TempDir::new().unwrap();
        taskboard(&dir)
            .args(["--config", "nope.toml", "init"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("configuration"));
    }
}

mod rebalance {
    use super::*;

    #[test]
    fn test_rebalance_empty_lane() {
        let dir = TempDir::new().unwrap();
        taskboard(&dir)
            .args(["rebalance", "DONE"])
            .assert()
            .success()
            .stdout(predicate::str::contains("empty"));
    }

    #[test]
    fn test_rebalance_renumbers_lane() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("board.db");
        {
            let db = BoardDb::new(&db_path).unwrap();
            for title in ["First task", "Second task", "Third task"] {
                service::create_task(&db, &TaskDraft::new(title), Utc::now()).unwrap();
            }
        }

        taskboard(&dir)
            .args(["rebalance", "BACKLOG", "--db-path", "board.db"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Rebalanced 3 task(s) in BACKLOG"));

        let db = BoardDb::new(&db_path).unwrap();
        let lane = db.find_by_status_ordered(Status::Backlog).unwrap();
        let positions: Vec<f64> = lane.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![1000.0, 2000.0, 3000.0]);
        assert_eq!(lane[0].title, "First task");
    }
}

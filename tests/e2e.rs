//! End-to-end: a real server on an ephemeral port, driven through
//! `HttpBoardApi` and `BoardClient`.

use std::sync::Arc;

use taskboard::board::api::AppState;
use taskboard::board::db::{BoardDb, DbHandle};
use taskboard::board::server::{build_router, serve};
use taskboard::client::{BoardApi, BoardClient, ClientError, HttpBoardApi};
use taskboard_common::{Status, TaskDraft, TaskPatch};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct TestServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    _dir: TempDir,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn spawn_server(api_token: Option<&str>) -> TestServer {
    let dir = TempDir::new().unwrap();
    let db = BoardDb::new(&dir.path().join("board.db")).unwrap();
    let state = Arc::new(AppState {
        db: DbHandle::new(db),
        api_token: api_token.map(String::from),
    });
    let app = build_router(state, false);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(serve(listener, app, async move {
        let _ = rx.await;
    }));

    TestServer {
        base_url: format!("http://{}", addr),
        shutdown: Some(tx),
        _dir: dir,
    }
}

#[tokio::test]
async fn test_drag_flow_matches_server() {
    let server = spawn_server(None).await;
    let mut client = BoardClient::new(HttpBoardApi::new(&server.base_url));
    client.load().await.unwrap();

    let a = client.create(TaskDraft::new("Task A")).await.unwrap();
    let b = client.create(TaskDraft::new("Task B")).await.unwrap();
    let c = client.create(TaskDraft::new("Task C")).await.unwrap();
    assert_eq!(
        [a.position, b.position, c.position],
        [1000.0, 1001.0, 1002.0]
    );

    client.move_task(&a.id, Status::Todo, 0).await.unwrap();
    client.move_task(&b.id, Status::Todo, 1).await.unwrap();
    let moved = client.move_task(&c.id, Status::Todo, 1).await.unwrap();
    assert_eq!(moved.position, 1000.5);

    // A second client sees exactly what the first one holds.
    let mut other = BoardClient::new(HttpBoardApi::new(&server.base_url));
    other.load().await.unwrap();
    let ids: Vec<&str> = other
        .board()
        .lane(Status::Todo)
        .into_iter()
        .map(|t| t.id.as_str())
        .collect();
    assert_eq!(ids, vec![a.id.as_str(), c.id.as_str(), b.id.as_str()]);
    assert_eq!(other.board().tasks().len(), client.board().tasks().len());
    for task in other.board().tasks() {
        assert_eq!(client.board().get(&task.id), Some(task));
    }
}

#[tokio::test]
async fn test_edit_and_delete() {
    let server = spawn_server(None).await;
    let mut client = BoardClient::new(HttpBoardApi::new(&server.base_url));

    let task = client.create(TaskDraft::new("Rough draft")).await.unwrap();
    let patch = TaskPatch {
        title: Some("Final draft".into()),
        status: Some(Status::InQa),
        ..Default::default()
    };
    let edited = client.edit(&task.id, patch).await.unwrap();
    assert_eq!(edited.title, "Final draft");
    assert_eq!(edited.status, Status::InQa);
    assert_eq!(edited.position, 1000.0);

    client.delete(&task.id).await.unwrap();
    assert!(client.board().tasks().is_empty());

    let err = client.api().delete(&task.id).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound));
}

#[tokio::test]
async fn test_server_validation_reaches_client() {
    let server = spawn_server(None).await;
    let api = HttpBoardApi::new(&server.base_url);

    // Bypass the client's local check to see the server's answer.
    let draft = TaskDraft::new("ab").with_description("d".repeat(10_001));
    match api.create(&draft).await {
        Err(ClientError::Validation(errors)) => assert_eq!(errors.len(), 2),
        other => panic!("Expected Validation, got {:?}", other),
    }
    assert!(api.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_token_gate() {
    let server = spawn_server(Some("s3cret")).await;

    let mut anonymous = BoardClient::new(HttpBoardApi::new(&server.base_url));
    let err = anonymous
        .create(TaskDraft::new("Not allowed"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    assert!(anonymous.board().tasks().is_empty());
    assert_eq!(anonymous.notices().len(), 1);

    let mut authorized =
        BoardClient::new(HttpBoardApi::new(&server.base_url).with_token("s3cret"));
    let task = authorized.create(TaskDraft::new("Allowed")).await.unwrap();

    // Reads are open to everyone.
    anonymous.load().await.unwrap();
    assert_eq!(anonymous.board().get(&task.id), Some(&task));
}

#[tokio::test]
async fn test_rebalance_route() {
    let server = spawn_server(None).await;
    let api = HttpBoardApi::new(&server.base_url);
    for title in ["One task", "Two task"] {
        api.create(&TaskDraft::new(title)).await.unwrap();
    }

    let resp = reqwest::Client::new()
        .post(format!("{}/api/lanes/BACKLOG/rebalance", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let lane: Vec<taskboard_common::Task> = resp.json().await.unwrap();
    let positions: Vec<f64> = lane.iter().map(|t| t.position).collect();
    assert_eq!(positions, vec![1000.0, 2000.0]);
}

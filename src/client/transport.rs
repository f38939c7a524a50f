//! HTTP transport for the board client.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use taskboard_common::{Status, Task, TaskDraft, TaskPatch};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{}", .0.join(" "))]
    Validation(Vec<String>),

    #[error("Task not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The task is not in the local replica, so nothing was sent.
    #[error("Unknown task {0}")]
    UnknownTask(String),
}

/// Body of `PATCH /api/tasks/{id}/move`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub to_status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_position: Option<f64>,
}

impl MoveRequest {
    pub fn to_index(status: Status, index: usize) -> Self {
        Self {
            to_status: status,
            to_index: Some(index),
            to_position: None,
        }
    }

    pub fn to_position(status: Status, position: f64) -> Self {
        Self {
            to_status: status,
            to_index: None,
            to_position: Some(position),
        }
    }
}

/// The board's HTTP contract as seen by the client.
#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>, ClientError>;
    async fn create(&self, draft: &TaskDraft) -> Result<Task, ClientError>;
    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, ClientError>;
    async fn move_to(&self, id: &str, request: &MoveRequest) -> Result<Task, ClientError>;
    async fn delete(&self, id: &str) -> Result<(), ClientError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

/// [`BoardApi`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpBoardApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBoardApi {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }
}

/// Turn a non-success response into the matching [`ClientError`].
async fn error_from_response(resp: reqwest::Response) -> ClientError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let body: Option<ErrorBody> = serde_json::from_str(&text).ok();
    match status {
        StatusCode::BAD_REQUEST => {
            let errors = body.map(|b| b.errors).unwrap_or_default();
            ClientError::Validation(if errors.is_empty() { vec![text] } else { errors })
        }
        StatusCode::NOT_FOUND => ClientError::NotFound,
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        _ => ClientError::Server {
            status: status.as_u16(),
            message: body.and_then(|b| b.error).unwrap_or(text),
        },
    }
}

async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    if resp.status().is_success() {
        Ok(resp.json::<T>().await?)
    } else {
        Err(error_from_response(resp).await)
    }
}

#[async_trait]
impl BoardApi for HttpBoardApi {
    async fn list(&self) -> Result<Vec<Task>, ClientError> {
        let resp = self.client.get(self.url("/tasks")).send().await?;
        decode(resp).await
    }

    async fn create(&self, draft: &TaskDraft) -> Result<Task, ClientError> {
        let resp = self
            .authorize(self.client.post(self.url("/tasks")))
            .json(draft)
            .send()
            .await?;
        decode(resp).await
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, ClientError> {
        let resp = self
            .authorize(self.client.patch(self.url(&format!("/tasks/{}", id))))
            .json(patch)
            .send()
            .await?;
        decode(resp).await
    }

    async fn move_to(&self, id: &str, request: &MoveRequest) -> Result<Task, ClientError> {
        let resp = self
            .authorize(self.client.patch(self.url(&format!("/tasks/{}/move", id))))
            .json(request)
            .send()
            .await?;
        decode(resp).await
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let resp = self
            .authorize(self.client.delete(self.url(&format!("/tasks/{}", id))))
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(resp).await)
        }
    }
}

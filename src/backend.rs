use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tokio::runtime::Handle;

use crate::event::{AppEvent, Command, ConnectionStatus};

/// Pause after a document is chosen before the session is treated as ready
/// for questions. Selection needs no network call of its own; the delay
/// absorbs backend warm-up on the freshly activated collection.
pub const SETTLE_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub collection_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskError {
    Server(String),
    MalformedResponse,
    Transport(String),
}

/// Executes controller commands against the backend service. Every command
/// settles with exactly one event on the session channel; nothing is ever
/// retried or cancelled here.
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
    tx: mpsc::Sender<AppEvent>,
    runtime: Handle,
}

impl BackendClient {
    pub fn new(base_url: &str, tx: mpsc::Sender<AppEvent>, runtime: Handle) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            tx,
            runtime,
        }
    }

    pub fn execute(&self, command: Command) {
        let client = self.clone();
        match command {
            Command::ProbeBackend => {
                self.runtime.spawn(async move {
                    let (status, label) = client.probe().await;
                    let _ = client.tx.send(AppEvent::ConnectionChecked { status, label });
                });
            }
            Command::FetchDocuments => {
                self.runtime.spawn(async move {
                    let result = client.fetch_documents().await;
                    let _ = client.tx.send(AppEvent::DocumentsFetched(result));
                });
            }
            Command::SettleSelection { name } => {
                self.runtime.spawn(async move {
                    tokio::time::sleep(SETTLE_DELAY).await;
                    let _ = client.tx.send(AppEvent::SelectionSettled {
                        name,
                        result: Ok(()),
                    });
                });
            }
            Command::UploadDocument { path } => {
                self.runtime.spawn(async move {
                    let result = client.upload(path).await;
                    let _ = client.tx.send(AppEvent::UploadFinished(result));
                });
            }
            Command::AskQuestion {
                question,
                collection,
            } => {
                self.runtime.spawn(async move {
                    let result = client.ask(&question, &collection).await;
                    let _ = client.tx.send(AppEvent::AnswerFinished(result));
                });
            }
        }
    }

    async fn probe(&self) -> (ConnectionStatus, String) {
        let url = format!("{}/api/ollama-health", self.base_url);
        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => (
                ConnectionStatus::Connected,
                "Connected to Ollama".to_string(),
            ),
            Ok(_) => (
                ConnectionStatus::Disconnected,
                "Ollama connection failed".to_string(),
            ),
            Err(err) => {
                log::warn!("health probe failed: {err}");
                (
                    ConnectionStatus::Disconnected,
                    "Ollama not reachable".to_string(),
                )
            }
        }
    }

    async fn fetch_documents(&self) -> Result<Vec<String>, String> {
        let url = format!("{}/api/documents", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| err.to_string())?;
        response
            .json::<Vec<String>>()
            .await
            .map_err(|err| err.to_string())
    }

    async fn upload(&self, path: PathBuf) -> Result<UploadReceipt, String> {
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(|err| err.to_string())?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = format!("{}/api/upload", self.base_url);
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| err.to_string())?;

        // The service reports rejections as `{status, message}` bodies on
        // non-2xx responses, so the receipt is decoded regardless of status.
        response
            .json::<UploadReceipt>()
            .await
            .map_err(|err| err.to_string())
    }

    async fn ask(&self, question: &str, collection: &str) -> Result<String, AskError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = serde_json::json!({
            "question": question,
            "collection_name": collection,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| AskError::Transport(err.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| AskError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(AskError::Server(error_message_from_body(&text)));
        }

        answer_from_body(&text)
    }
}

pub fn error_message_from_body(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Unknown server error".to_string())
}

pub fn answer_from_body(body: &str) -> Result<String, AskError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| AskError::Transport(err.to_string()))?;
    match value.get("response").and_then(Value::as_str) {
        Some(answer) => Ok(answer.to_string()),
        None => Err(AskError::MalformedResponse),
    }
}

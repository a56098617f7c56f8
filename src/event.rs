use std::path::PathBuf;

use crate::backend::{AskError, UploadReceipt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Probing,
    Connected,
    Disconnected,
}

/// Work the controller asks the backend client to perform. Each command
/// settles with exactly one `AppEvent` on the session channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ProbeBackend,
    FetchDocuments,
    SettleSelection { name: String },
    UploadDocument { path: PathBuf },
    AskQuestion { question: String, collection: String },
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    ConnectionChecked {
        status: ConnectionStatus,
        label: String,
    },
    DocumentsFetched(Result<Vec<String>, String>),
    SelectionSettled {
        name: String,
        result: Result<(), String>,
    },
    UploadFinished(Result<UploadReceipt, String>),
    AnswerFinished(Result<String, AskError>),
}

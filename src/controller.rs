use std::collections::HashSet;
use std::mem;
use std::path::PathBuf;

use crate::backend::{AskError, UploadReceipt};
use crate::event::{AppEvent, Command, ConnectionStatus};
use crate::message::{self, Message};

pub const UPLOAD_IDLE_LABEL: &str = "Upload PDF";
pub const UPLOAD_BUSY_LABEL: &str = "Uploading…";
const PLACEHOLDER_TEXT: &str = "Processing your question…";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryView {
    Pending,
    Loaded(Vec<String>),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusLine {
    fn new(text: impl Into<String>, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SelectionPhase {
    Idle,
    Settling(String),
}

// The upload workflow stays busy through the whole chain, from transfer
// until the auto-activated selection has settled.
#[derive(Debug, Clone, PartialEq, Eq)]
enum UploadPhase {
    Idle,
    Transferring,
    Refreshing { collection: Option<String> },
    Activating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AskPhase {
    Idle,
    Pending { placeholder: u64 },
}

/// Owns every piece of session coordination state: the active document, the
/// per-workflow phases, the message log, and the enablement of the shared
/// input/upload surface. UI actions call the `select_document` /
/// `begin_upload` / `send_question` entry points; backend completions come
/// back through `apply_event`. Both return the commands the backend client
/// must execute next, so the controller itself never touches the network.
pub struct SessionController {
    pub connection: ConnectionStatus,
    pub connection_label: String,
    pub registry: RegistryView,
    pub active_document: Option<String>,
    pub messages: Vec<Message>,
    pub upload_status: Option<StatusLine>,
    pub question_input: String,
    pub selected_file: String,
    pub input_enabled: bool,
    pub upload_enabled: bool,
    pub upload_label: &'static str,
    selection: SelectionPhase,
    upload: UploadPhase,
    ask: AskPhase,
    focus_input: bool,
    next_placeholder: u64,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            connection: ConnectionStatus::Probing,
            connection_label: "Checking Ollama…".to_string(),
            registry: RegistryView::Pending,
            active_document: None,
            messages: Vec::new(),
            upload_status: None,
            question_input: String::new(),
            selected_file: String::new(),
            input_enabled: true,
            upload_enabled: true,
            upload_label: UPLOAD_IDLE_LABEL,
            selection: SelectionPhase::Idle,
            upload: UploadPhase::Idle,
            ask: AskPhase::Idle,
            focus_input: false,
            next_placeholder: 0,
        }
    }

    pub fn startup(&mut self) -> Vec<Command> {
        vec![Command::ProbeBackend, Command::FetchDocuments]
    }

    pub fn document_loading(&self) -> bool {
        !matches!(self.selection, SelectionPhase::Idle)
    }

    pub fn uploading(&self) -> bool {
        !matches!(self.upload, UploadPhase::Idle)
    }

    pub fn answer_pending(&self) -> bool {
        !matches!(self.ask, AskPhase::Idle)
    }

    /// True while `name` is the entry whose selection is still settling;
    /// the registry marks it as loading.
    pub fn is_settling(&self, name: &str) -> bool {
        matches!(&self.selection, SelectionPhase::Settling(pending) if pending == name)
    }

    /// One-shot: consumed by the frame that returns focus to the question
    /// input after a selection settles or an answer lands.
    pub fn take_focus_input(&mut self) -> bool {
        mem::take(&mut self.focus_input)
    }

    pub fn select_document(&mut self, name: &str) -> Vec<Command> {
        if self.document_loading() {
            return Vec::new();
        }

        // Optimistic: the entry highlights as active immediately, the
        // authoritative state arrives with the post-settle refresh.
        self.selection = SelectionPhase::Settling(name.to_string());
        self.active_document = Some(name.to_string());
        self.input_enabled = false;
        self.upload_enabled = false;

        vec![Command::SettleSelection {
            name: name.to_string(),
        }]
    }

    pub fn begin_upload(&mut self) -> Vec<Command> {
        let path = self.selected_file.trim();
        if path.is_empty() || self.uploading() {
            return Vec::new();
        }
        let path = PathBuf::from(path);

        self.upload = UploadPhase::Transferring;
        self.upload_enabled = false;
        self.upload_label = UPLOAD_BUSY_LABEL;
        self.upload_status = Some(StatusLine::new(
            "Uploading and processing document…",
            StatusKind::Info,
        ));

        vec![Command::UploadDocument { path }]
    }

    pub fn send_question(&mut self) -> Vec<Command> {
        let question = self.question_input.trim().to_string();
        if question.is_empty() || self.document_loading() || self.answer_pending() {
            return Vec::new();
        }
        let Some(collection) = self.active_document.clone() else {
            return Vec::new();
        };

        self.messages.push(Message::user(question.clone()));
        self.question_input.clear();
        self.input_enabled = false;

        self.next_placeholder += 1;
        let placeholder = self.next_placeholder;
        self.messages
            .push(Message::placeholder(PLACEHOLDER_TEXT, placeholder));
        self.ask = AskPhase::Pending { placeholder };

        vec![Command::AskQuestion {
            question,
            collection,
        }]
    }

    pub fn apply_event(&mut self, event: AppEvent) -> Vec<Command> {
        match event {
            AppEvent::ConnectionChecked { status, label } => {
                self.connection = status;
                self.connection_label = label;
                Vec::new()
            }
            AppEvent::DocumentsFetched(result) => {
                self.registry = match result {
                    Ok(names) => RegistryView::Loaded(dedupe_registry(names)),
                    Err(err) => RegistryView::Error(format!("Error loading documents: {err}")),
                };
                self.continue_upload_chain()
            }
            AppEvent::SelectionSettled { name, result } => self.finish_selection(&name, result),
            AppEvent::UploadFinished(result) => self.finish_upload(result),
            AppEvent::AnswerFinished(result) => self.finish_answer(result),
        }
    }

    // A registry fetch settled; if the upload workflow was waiting on that
    // refresh, hand the new document over to the selection workflow.
    fn continue_upload_chain(&mut self) -> Vec<Command> {
        if !matches!(self.upload, UploadPhase::Refreshing { .. }) {
            return Vec::new();
        }
        let UploadPhase::Refreshing { collection } =
            mem::replace(&mut self.upload, UploadPhase::Activating)
        else {
            return Vec::new();
        };

        let Some(name) = collection else {
            self.finalize_upload();
            return Vec::new();
        };

        let commands = self.select_document(&name);
        if commands.is_empty() {
            // A selection was already settling (the user clicked an entry
            // mid-refresh), so the guard swallowed the auto-activation.
            self.finalize_upload();
        }
        commands
    }

    fn finish_selection(&mut self, name: &str, result: Result<(), String>) -> Vec<Command> {
        match &self.selection {
            SelectionPhase::Settling(pending) if pending == name => {}
            _ => return Vec::new(),
        }

        match result {
            Ok(()) => {
                self.messages
                    .push(Message::bot(format!("Document loaded: {name}")));
                self.input_enabled = true;
                self.focus_input = true;
            }
            Err(err) => {
                self.messages
                    .push(Message::error(format!("Error loading document: {err}")));
            }
        }

        // Finalization runs on every outcome: the flag drops, the upload
        // trigger comes back, and the registry is re-fetched so highlighting
        // reflects the server instead of local patching.
        self.selection = SelectionPhase::Idle;
        self.upload_enabled = true;
        if matches!(self.upload, UploadPhase::Activating) {
            self.finalize_upload();
        }
        vec![Command::FetchDocuments]
    }

    fn finish_upload(&mut self, result: Result<UploadReceipt, String>) -> Vec<Command> {
        if !matches!(self.upload, UploadPhase::Transferring) {
            return Vec::new();
        }

        match result {
            Ok(receipt) if receipt.status == "success" => {
                self.upload_status = Some(StatusLine::new(receipt.message, StatusKind::Success));
                self.upload = UploadPhase::Refreshing {
                    collection: receipt.collection_name,
                };
                vec![Command::FetchDocuments]
            }
            Ok(receipt) => {
                self.upload_status = Some(StatusLine::new(receipt.message, StatusKind::Error));
                self.finalize_upload();
                Vec::new()
            }
            Err(err) => {
                self.upload_status = Some(StatusLine::new(
                    format!("Error uploading file: {err}"),
                    StatusKind::Error,
                ));
                self.finalize_upload();
                Vec::new()
            }
        }
    }

    fn finalize_upload(&mut self) {
        self.upload = UploadPhase::Idle;
        self.upload_enabled = true;
        self.upload_label = UPLOAD_IDLE_LABEL;
        self.selected_file.clear();
    }

    fn finish_answer(&mut self, result: Result<String, AskError>) -> Vec<Command> {
        let AskPhase::Pending { placeholder } = self.ask else {
            return Vec::new();
        };

        // The placeholder goes away on every outcome, before the terminal
        // message is appended.
        message::remove_by_id(&mut self.messages, placeholder);

        match result {
            Ok(answer) => self.messages.push(Message::bot(answer)),
            Err(AskError::Server(msg)) => self.messages.push(Message::error(format!("Error: {msg}"))),
            Err(AskError::MalformedResponse) => self
                .messages
                .push(Message::error("Error: Unexpected response format from server")),
            Err(AskError::Transport(detail)) => {
                self.messages.push(Message::error(format!("Error: {detail}")));
            }
        }

        self.ask = AskPhase::Idle;
        self.input_enabled = true;
        self.focus_input = true;
        Vec::new()
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

/// Rebuild the display registry from a raw listing: drop names that repeat
/// case-insensitively (first occurrence wins), then order case-insensitively
/// with the original spelling as tie-break.
pub fn dedupe_registry(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique: Vec<String> = names
        .into_iter()
        .filter(|name| seen.insert(name.to_lowercase()))
        .collect();
    unique.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    unique
}

#[cfg(test)]
mod tests {
    use super::{
        dedupe_registry, RegistryView, SessionController, StatusKind, UPLOAD_BUSY_LABEL,
        UPLOAD_IDLE_LABEL,
    };
    use crate::backend::{AskError, UploadReceipt};
    use crate::event::{AppEvent, Command, ConnectionStatus};
    use crate::message::Sender;

    fn controller_with_documents(names: &[&str]) -> SessionController {
        let mut controller = SessionController::new();
        let fetched = names.iter().map(|name| name.to_string()).collect();
        controller.apply_event(AppEvent::DocumentsFetched(Ok(fetched)));
        controller
    }

    fn settle(controller: &mut SessionController, name: &str) -> Vec<Command> {
        controller.apply_event(AppEvent::SelectionSettled {
            name: name.to_string(),
            result: Ok(()),
        })
    }

    fn success_receipt(collection: Option<&str>) -> UploadReceipt {
        UploadReceipt {
            status: "success".to_string(),
            message: "'notes.pdf' processed.".to_string(),
            collection_name: collection.map(str::to_string),
        }
    }

    #[test]
    fn startup_issues_one_probe_and_one_fetch() {
        let mut controller = SessionController::new();
        assert_eq!(
            controller.startup(),
            vec![Command::ProbeBackend, Command::FetchDocuments]
        );
        assert_eq!(controller.connection, ConnectionStatus::Probing);
    }

    #[test]
    fn connection_check_updates_indicator() {
        let mut controller = SessionController::new();
        let commands = controller.apply_event(AppEvent::ConnectionChecked {
            status: ConnectionStatus::Disconnected,
            label: "Ollama not reachable".to_string(),
        });
        assert!(commands.is_empty());
        assert_eq!(controller.connection, ConnectionStatus::Disconnected);
        assert_eq!(controller.connection_label, "Ollama not reachable");
    }

    #[test]
    fn registry_dedupes_case_insensitively_and_sorts() {
        let names = vec![
            "Report.pdf".to_string(),
            "report.pdf".to_string(),
            "Alpha.pdf".to_string(),
        ];
        assert_eq!(
            dedupe_registry(names),
            vec!["Alpha.pdf".to_string(), "Report.pdf".to_string()]
        );
    }

    #[test]
    fn registry_keeps_first_spelling_of_duplicates() {
        let names = vec!["GUIDE.pdf".to_string(), "guide.pdf".to_string()];
        assert_eq!(dedupe_registry(names), vec!["GUIDE.pdf".to_string()]);
    }

    #[test]
    fn registry_fetch_failure_renders_inline_error() {
        let mut controller = SessionController::new();
        controller.apply_event(AppEvent::DocumentsFetched(Err(
            "connection refused".to_string()
        )));
        assert_eq!(
            controller.registry,
            RegistryView::Error("Error loading documents: connection refused".to_string())
        );
    }

    #[test]
    fn empty_listing_becomes_an_empty_registry() {
        let controller = controller_with_documents(&[]);
        assert_eq!(controller.registry, RegistryView::Loaded(Vec::new()));
    }

    #[test]
    fn select_document_locks_surface_and_schedules_settle() {
        let mut controller = controller_with_documents(&["a.pdf", "b.pdf"]);
        let commands = controller.select_document("a.pdf");

        assert_eq!(
            commands,
            vec![Command::SettleSelection {
                name: "a.pdf".to_string()
            }]
        );
        assert_eq!(controller.active_document.as_deref(), Some("a.pdf"));
        assert!(controller.document_loading());
        assert!(controller.is_settling("a.pdf"));
        assert!(!controller.input_enabled);
        assert!(!controller.upload_enabled);
    }

    #[test]
    fn second_selection_during_settle_is_a_silent_no_op() {
        let mut controller = controller_with_documents(&["a.pdf", "b.pdf"]);
        controller.select_document("a.pdf");
        let before = controller.messages.len();

        let commands = controller.select_document("b.pdf");

        assert!(commands.is_empty());
        assert_eq!(controller.active_document.as_deref(), Some("a.pdf"));
        assert_eq!(controller.messages.len(), before);
    }

    #[test]
    fn settle_confirms_reenables_input_and_refreshes_registry() {
        let mut controller = controller_with_documents(&["a.pdf"]);
        controller.select_document("a.pdf");

        let commands = settle(&mut controller, "a.pdf");

        assert_eq!(commands, vec![Command::FetchDocuments]);
        assert!(!controller.document_loading());
        assert!(controller.input_enabled);
        assert!(controller.upload_enabled);
        assert!(controller.take_focus_input());
        let last = controller.messages.last().expect("confirmation expected");
        assert_eq!(last.sender, Sender::Bot);
        assert_eq!(last.text, "Document loaded: a.pdf");
    }

    #[test]
    fn settle_failure_surfaces_error_and_still_finalizes() {
        let mut controller = controller_with_documents(&["a.pdf"]);
        controller.select_document("a.pdf");

        let commands = controller.apply_event(AppEvent::SelectionSettled {
            name: "a.pdf".to_string(),
            result: Err("collection warm-up failed".to_string()),
        });

        assert_eq!(commands, vec![Command::FetchDocuments]);
        assert!(!controller.document_loading());
        assert!(controller.upload_enabled);
        let last = controller.messages.last().expect("error message expected");
        assert_eq!(last.sender, Sender::Error);
        assert_eq!(last.text, "Error loading document: collection warm-up failed");
    }

    #[test]
    fn stale_settle_event_is_ignored_when_nothing_is_settling() {
        let mut controller = controller_with_documents(&["a.pdf"]);
        let commands = settle(&mut controller, "a.pdf");
        assert!(commands.is_empty());
        assert!(controller.messages.is_empty());
    }

    #[test]
    fn blank_question_produces_no_message_and_no_request() {
        let mut controller = controller_with_documents(&["a.pdf"]);
        controller.select_document("a.pdf");
        settle(&mut controller, "a.pdf");
        let before = controller.messages.len();

        controller.question_input = "   \t".to_string();
        let commands = controller.send_question();

        assert!(commands.is_empty());
        assert_eq!(controller.messages.len(), before);
    }

    #[test]
    fn question_without_active_document_is_rejected() {
        let mut controller = controller_with_documents(&["a.pdf"]);
        controller.question_input = "what is this about?".to_string();

        let commands = controller.send_question();

        assert!(commands.is_empty());
        assert!(controller.messages.is_empty());
    }

    #[test]
    fn question_during_selection_settle_is_rejected() {
        let mut controller = controller_with_documents(&["a.pdf"]);
        controller.select_document("a.pdf");

        controller.question_input = "too early".to_string();
        let commands = controller.send_question();

        assert!(commands.is_empty());
        assert!(controller.messages.is_empty());
    }

    #[test]
    fn accepted_question_appends_user_turn_and_placeholder() {
        let mut controller = controller_with_documents(&["a.pdf"]);
        controller.select_document("a.pdf");
        settle(&mut controller, "a.pdf");

        controller.question_input = "  what changed in Q3?  ".to_string();
        let commands = controller.send_question();

        assert_eq!(
            commands,
            vec![Command::AskQuestion {
                question: "what changed in Q3?".to_string(),
                collection: "a.pdf".to_string(),
            }]
        );
        assert!(controller.question_input.is_empty());
        assert!(!controller.input_enabled);

        let turns = &controller.messages;
        let user = &turns[turns.len() - 2];
        assert_eq!(user.sender, Sender::User);
        assert_eq!(user.text, "what changed in Q3?");
        let placeholder = turns.last().expect("placeholder expected");
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.sender, Sender::Bot);
    }

    #[test]
    fn second_question_while_answer_is_pending_is_rejected() {
        let mut controller = controller_with_documents(&["a.pdf"]);
        controller.select_document("a.pdf");
        settle(&mut controller, "a.pdf");

        controller.question_input = "first".to_string();
        controller.send_question();
        let before = controller.messages.len();

        controller.question_input = "second".to_string();
        let commands = controller.send_question();

        assert!(commands.is_empty());
        assert_eq!(controller.messages.len(), before);
    }

    #[test]
    fn answer_replaces_placeholder_with_bot_turn() {
        let mut controller = controller_with_documents(&["a.pdf"]);
        controller.select_document("a.pdf");
        settle(&mut controller, "a.pdf");
        controller.question_input = "summary please".to_string();
        controller.send_question();
        controller.take_focus_input();

        let commands = controller.apply_event(AppEvent::AnswerFinished(Ok(
            "It covers **three** findings.".to_string(),
        )));

        assert!(commands.is_empty());
        let placeholders = controller
            .messages
            .iter()
            .filter(|turn| turn.is_placeholder())
            .count();
        assert_eq!(placeholders, 0);
        let last = controller.messages.last().expect("answer expected");
        assert_eq!(last.sender, Sender::Bot);
        assert_eq!(last.text, "It covers **three** findings.");
        assert!(controller.input_enabled);
        assert!(controller.take_focus_input());
    }

    #[test]
    fn server_error_text_is_surfaced_verbatim() {
        let mut controller = controller_with_documents(&["a.pdf"]);
        controller.select_document("a.pdf");
        settle(&mut controller, "a.pdf");
        controller.question_input = "q".to_string();
        controller.send_question();

        controller.apply_event(AppEvent::AnswerFinished(Err(AskError::Server(
            "Unknown server error".to_string(),
        ))));

        let last = controller.messages.last().expect("error expected");
        assert_eq!(last.sender, Sender::Error);
        assert_eq!(last.text, "Error: Unknown server error");
        assert!(controller.input_enabled);
    }

    #[test]
    fn malformed_answer_payload_reports_unexpected_shape() {
        let mut controller = controller_with_documents(&["a.pdf"]);
        controller.select_document("a.pdf");
        settle(&mut controller, "a.pdf");
        controller.question_input = "q".to_string();
        controller.send_question();

        controller.apply_event(AppEvent::AnswerFinished(Err(AskError::MalformedResponse)));

        let last = controller.messages.last().expect("error expected");
        assert_eq!(last.text, "Error: Unexpected response format from server");
        let placeholders = controller
            .messages
            .iter()
            .filter(|turn| turn.is_placeholder())
            .count();
        assert_eq!(placeholders, 0);
    }

    #[test]
    fn transport_failure_removes_placeholder_and_reports() {
        let mut controller = controller_with_documents(&["a.pdf"]);
        controller.select_document("a.pdf");
        settle(&mut controller, "a.pdf");
        controller.question_input = "q".to_string();
        controller.send_question();

        controller.apply_event(AppEvent::AnswerFinished(Err(AskError::Transport(
            "connection reset".to_string(),
        ))));

        let last = controller.messages.last().expect("error expected");
        assert_eq!(last.sender, Sender::Error);
        assert_eq!(last.text, "Error: connection reset");
        assert!(controller.input_enabled);
    }

    #[test]
    fn upload_without_selected_file_is_a_no_op() {
        let mut controller = SessionController::new();
        controller.selected_file = "   ".to_string();
        assert!(controller.begin_upload().is_empty());
        assert!(!controller.uploading());
    }

    #[test]
    fn upload_locks_trigger_and_shows_progress_status() {
        let mut controller = SessionController::new();
        controller.selected_file = "/tmp/notes.pdf".to_string();

        let commands = controller.begin_upload();

        assert_eq!(commands.len(), 1);
        assert!(matches!(commands[0], Command::UploadDocument { .. }));
        assert!(controller.uploading());
        assert!(!controller.upload_enabled);
        assert_eq!(controller.upload_label, UPLOAD_BUSY_LABEL);
        let status = controller.upload_status.as_ref().expect("status expected");
        assert_eq!(status.kind, StatusKind::Info);
    }

    #[test]
    fn second_upload_while_one_is_in_flight_is_rejected() {
        let mut controller = SessionController::new();
        controller.selected_file = "/tmp/notes.pdf".to_string();
        controller.begin_upload();

        controller.selected_file = "/tmp/other.pdf".to_string();
        assert!(controller.begin_upload().is_empty());
    }

    #[test]
    fn upload_success_refreshes_registry_before_auto_selecting() {
        let mut controller = SessionController::new();
        controller.selected_file = "/tmp/notes.pdf".to_string();
        controller.begin_upload();

        let commands =
            controller.apply_event(AppEvent::UploadFinished(Ok(success_receipt(Some(
                "notes.pdf",
            )))));

        // Refresh first; the selection is only invoked once the fetch lands.
        assert_eq!(commands, vec![Command::FetchDocuments]);
        assert!(controller.uploading());
        assert!(controller.active_document.is_none());
        let status = controller.upload_status.as_ref().expect("status expected");
        assert_eq!(status.kind, StatusKind::Success);

        let commands =
            controller.apply_event(AppEvent::DocumentsFetched(Ok(vec!["notes.pdf".to_string()])));
        assert_eq!(
            commands,
            vec![Command::SettleSelection {
                name: "notes.pdf".to_string()
            }]
        );
        assert_eq!(controller.active_document.as_deref(), Some("notes.pdf"));
        assert!(controller.uploading());

        let commands = settle(&mut controller, "notes.pdf");
        assert_eq!(commands, vec![Command::FetchDocuments]);
        assert!(!controller.uploading());
        assert!(controller.upload_enabled);
        assert_eq!(controller.upload_label, UPLOAD_IDLE_LABEL);
        assert!(controller.selected_file.is_empty());
    }

    #[test]
    fn upload_rejection_leaves_selection_untouched() {
        let mut controller = controller_with_documents(&["a.pdf"]);
        controller.select_document("a.pdf");
        settle(&mut controller, "a.pdf");
        controller.selected_file = "/tmp/a.pdf".to_string();
        controller.begin_upload();

        let receipt = UploadReceipt {
            status: "error".to_string(),
            message: "'a.pdf' is already uploaded.".to_string(),
            collection_name: None,
        };
        let commands = controller.apply_event(AppEvent::UploadFinished(Ok(receipt)));

        assert!(commands.is_empty());
        assert_eq!(controller.active_document.as_deref(), Some("a.pdf"));
        assert!(!controller.uploading());
        assert!(controller.upload_enabled);
        assert_eq!(controller.upload_label, UPLOAD_IDLE_LABEL);
        let status = controller.upload_status.as_ref().expect("status expected");
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "'a.pdf' is already uploaded.");
    }

    #[test]
    fn upload_transport_failure_reports_and_finalizes() {
        let mut controller = SessionController::new();
        controller.selected_file = "/tmp/notes.pdf".to_string();
        controller.begin_upload();

        let commands = controller.apply_event(AppEvent::UploadFinished(Err(
            "connection reset".to_string(),
        )));

        assert!(commands.is_empty());
        assert!(!controller.uploading());
        assert!(controller.upload_enabled);
        assert!(controller.selected_file.is_empty());
        let status = controller.upload_status.as_ref().expect("status expected");
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "Error uploading file: connection reset");
    }

    #[test]
    fn upload_success_without_collection_name_skips_auto_selection() {
        let mut controller = SessionController::new();
        controller.selected_file = "/tmp/notes.pdf".to_string();
        controller.begin_upload();
        controller.apply_event(AppEvent::UploadFinished(Ok(success_receipt(None))));

        let commands = controller.apply_event(AppEvent::DocumentsFetched(Ok(vec![
            "notes.pdf".to_string(),
        ])));

        assert!(commands.is_empty());
        assert!(controller.active_document.is_none());
        assert!(!controller.uploading());
        assert!(controller.upload_enabled);
    }

    #[test]
    fn manual_selection_mid_refresh_swallows_auto_activation() {
        let mut controller = controller_with_documents(&["a.pdf"]);
        controller.selected_file = "/tmp/notes.pdf".to_string();
        controller.begin_upload();
        controller.apply_event(AppEvent::UploadFinished(Ok(success_receipt(Some(
            "notes.pdf",
        )))));

        // The user clicks an existing entry before the refresh lands.
        controller.select_document("a.pdf");

        let commands =
            controller.apply_event(AppEvent::DocumentsFetched(Ok(vec![
                "a.pdf".to_string(),
                "notes.pdf".to_string(),
            ])));

        assert!(commands.is_empty());
        assert_eq!(controller.active_document.as_deref(), Some("a.pdf"));
        assert!(!controller.uploading());
    }

    // The selection and upload guards are independent of each other, so an
    // upload may start while a selection is settling (and the other way
    // around). That permissiveness is intentional session behavior, kept
    // rather than papered over with extra locking.
    #[test]
    fn upload_may_start_while_a_selection_is_settling() {
        let mut controller = controller_with_documents(&["a.pdf"]);
        controller.select_document("a.pdf");

        controller.selected_file = "/tmp/notes.pdf".to_string();
        let commands = controller.begin_upload();

        assert_eq!(commands.len(), 1);
        assert!(controller.uploading());
        assert!(controller.document_loading());
    }
}

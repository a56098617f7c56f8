use crate::backend::BackendClient;
use crate::controller::{RegistryView, SessionController, StatusKind};
use crate::event::{AppEvent, Command, ConnectionStatus};
use crate::markdown::markdown_to_text;
use crate::message::Sender;
use crate::theme::Theme;
use eframe::egui::{self, Color32, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

pub struct DocChatApp {
    rx: Receiver<AppEvent>,
    backend: BackendClient,
    controller: SessionController,
    theme: Theme,
    scroll_to_bottom: bool,
}

impl DocChatApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        backend: BackendClient,
        controller: SessionController,
        theme: Theme,
    ) -> Self {
        Self {
            rx,
            backend,
            controller,
            theme,
            scroll_to_bottom: false,
        }
    }

    fn dispatch(&self, commands: Vec<Command>) {
        for command in commands {
            self.backend.execute(command);
        }
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        let before = self.controller.messages.len();
        let mut received = false;
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    received = true;
                    let commands = self.controller.apply_event(event);
                    self.dispatch(commands);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("backend event channel disconnected");
                    break;
                }
            }
        }
        if received {
            ctx.request_repaint();
        }
        if self.controller.messages.len() != before {
            self.scroll_to_bottom = true;
        }
    }

    // Dropping a file onto the window fills the path field, same as typing it.
    fn accept_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        if let Some(path) = dropped.into_iter().find_map(|file| file.path) {
            self.controller.selected_file = path.display().to_string();
        }
    }

    fn connection_color(&self) -> Color32 {
        match self.controller.connection {
            ConnectionStatus::Probing => self.theme.warning,
            ConnectionStatus::Connected => self.theme.success,
            ConnectionStatus::Disconnected => self.theme.danger,
        }
    }

    fn status_color(&self, kind: StatusKind) -> Color32 {
        match kind {
            StatusKind::Info => self.theme.text_dim,
            StatusKind::Success => self.theme.success,
            StatusKind::Error => self.theme.danger,
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("DocChat");
                ui.separator();
                let color = self.connection_color();
                ui.label(RichText::new(&self.controller.connection_label).color(color));
            });
        });
    }

    fn render_documents_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("documents_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Documents");

                self.theme.card_frame().show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.controller.selected_file)
                            .desired_width(f32::INFINITY)
                            .hint_text("Path to a PDF (or drop a file here)"),
                    );
                    let upload_enabled = self.controller.upload_enabled
                        && !self.controller.selected_file.trim().is_empty();
                    let clicked = ui
                        .add_enabled(upload_enabled, egui::Button::new(self.controller.upload_label))
                        .clicked();
                    if clicked {
                        let commands = self.controller.begin_upload();
                        self.dispatch(commands);
                    }
                    if let Some(status) = &self.controller.upload_status {
                        ui.label(
                            RichText::new(&status.text)
                                .color(self.status_color(status.kind))
                                .small(),
                        );
                    }
                });

                ui.separator();

                let mut clicked_document: Option<String> = None;
                match &self.controller.registry {
                    RegistryView::Pending => {
                        ui.label(RichText::new("Loading documents…").color(self.theme.text_dim));
                    }
                    RegistryView::Loaded(documents) if documents.is_empty() => {
                        ui.label(
                            RichText::new("No documents uploaded yet.")
                                .color(self.theme.text_dim),
                        );
                    }
                    RegistryView::Loaded(documents) => {
                        ScrollArea::vertical()
                            .id_salt("documents_list")
                            .show(ui, |ui| {
                                for name in documents {
                                    let active = self.controller.active_document.as_deref()
                                        == Some(name.as_str());
                                    ui.horizontal(|ui| {
                                        if ui.selectable_label(active, name).clicked() {
                                            clicked_document = Some(name.clone());
                                        }
                                        if self.controller.is_settling(name) {
                                            ui.add(egui::Spinner::new().size(12.0));
                                        }
                                    });
                                }
                            });
                    }
                    RegistryView::Error(text) => {
                        ui.colored_label(self.theme.danger, text);
                    }
                }

                if let Some(name) = clicked_document {
                    let commands = self.controller.select_document(&name);
                    self.dispatch(commands);
                }
            });
    }

    fn render_chat_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let transcript_height = (ui.available_height() - 80.0).max(120.0);
            ScrollArea::vertical()
                .id_salt("chat_transcript")
                .max_height(transcript_height)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for message in &self.controller.messages {
                        match message.sender {
                            Sender::User => {
                                ui.label(format!("[You] {}", message.text));
                            }
                            Sender::Bot if message.is_placeholder() => {
                                ui.horizontal(|ui| {
                                    ui.add(egui::Spinner::new().size(12.0));
                                    ui.label(
                                        RichText::new(&message.text).color(self.theme.text_dim),
                                    );
                                });
                            }
                            Sender::Bot => {
                                ui.label(format!(
                                    "[DocChat] {}",
                                    markdown_to_text(&message.text)
                                ));
                            }
                            Sender::Error => {
                                ui.colored_label(self.theme.danger, &message.text);
                            }
                        }
                    }

                    if self.scroll_to_bottom {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
            self.scroll_to_bottom = false;

            ui.separator();

            let input_enabled = self.controller.input_enabled;
            let hint = if self.controller.active_document.is_none() {
                "Select a document to get started"
            } else if self.controller.document_loading() {
                "Loading document…"
            } else if self.controller.answer_pending() {
                "Waiting for the answer…"
            } else {
                "Ask a question about the active document…"
            };

            let mut send_now = false;
            self.theme.composer_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    let response = ui.add_enabled(
                        input_enabled,
                        egui::TextEdit::singleline(&mut self.controller.question_input)
                            .desired_width(f32::INFINITY)
                            .hint_text(hint),
                    );
                    if self.controller.take_focus_input() {
                        response.request_focus();
                    }
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        send_now = true;
                    }

                    let send_enabled = input_enabled
                        && self.controller.active_document.is_some()
                        && !self.controller.question_input.trim().is_empty();
                    send_now |= ui
                        .add_enabled(send_enabled, egui::Button::new("Send"))
                        .clicked();
                });
            });

            if send_now && input_enabled {
                let commands = self.controller.send_question();
                self.dispatch(commands);
            }
        });
    }
}

impl eframe::App for DocChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);
        self.accept_dropped_files(ctx);
        self.render_top_bar(ctx);
        self.render_documents_panel(ctx);
        self.render_chat_panel(ctx);
        // Backend completions arrive on a plain channel, so keep polling at a
        // coarse cadence even when no input events are coming in.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

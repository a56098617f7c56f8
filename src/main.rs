mod app;
mod backend;
mod controller;
mod event;
mod markdown;
mod message;
mod theme;

use anyhow::Result;
use app::DocChatApp;
use backend::BackendClient;
use clap::Parser;
use controller::SessionController;
use eframe::egui;
use std::sync::mpsc;
use theme::Theme;

#[derive(Parser)]
#[command(name = "docchat", about = "Desktop client for a document question-answering service")]
struct Args {
    /// Base URL of the backend service
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    base_url: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (tx, rx) = mpsc::channel();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("docchat-runtime")
        .build()?;

    let backend = BackendClient::new(&args.base_url, tx, runtime.handle().clone());
    let mut controller = SessionController::new();
    for command in controller.startup() {
        backend.execute(command);
    }
    log::info!("session started against {}", args.base_url);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([860.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "DocChat",
        native_options,
        Box::new(move |creation_context| {
            let theme = Theme::default();
            theme.apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(DocChatApp::new(rx, backend, controller, theme)))
        }),
    )
    .map_err(|err| anyhow::anyhow!("failed to run the docchat window: {err}"))?;

    Ok(())
}

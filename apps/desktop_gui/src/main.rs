use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::config::{load_settings, SettingsOverrides};
use crossbeam_channel::bounded;
use eframe::egui;
use shared::domain::FailurePolicy;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::GreeterApp;

#[derive(Parser, Debug)]
#[command(about = "Desktop greeter form")]
struct Args {
    /// TOML settings file; defaults to ./greeter.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: Option<u64>,
    /// `leave-disabled` or `recover`.
    #[arg(long, value_parser = parse_failure_policy)]
    failure_policy: Option<FailurePolicy>,
}

fn parse_failure_policy(raw: &str) -> Result<FailurePolicy, String> {
    FailurePolicy::parse(raw).ok_or_else(|| format!("unknown failure policy '{raw}'"))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = load_settings(
        args.config.as_deref(),
        &SettingsOverrides {
            server_url: args.server_url,
            request_timeout_ms: args.timeout_ms,
            failure_policy: args.failure_policy,
        },
    )?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();
    tracing::info!(
        server_url = %settings.server_url,
        failure_policy = ?settings.failure_policy,
        "starting greeter"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, &settings);

    let failure_policy = settings.failure_policy;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Greeter")
            .with_inner_size([480.0, 240.0])
            .with_min_inner_size([360.0, 180.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Greeter",
        options,
        Box::new(move |_cc| Ok(Box::new(GreeterApp::new(cmd_tx, ui_rx, failure_policy)))),
    )
    .map_err(|err| anyhow::anyhow!("greeter window failed: {err}"))
}

//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{config::Settings, GreetService, HttpGreetService, MissingGreetService};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Starts the worker against the HTTP greet service described by `settings`.
///
/// A service that cannot be built is reported to the UI and replaced with one
/// that fails every call, so submissions still complete.
pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    settings: &Settings,
) -> thread::JoinHandle<()> {
    let service: Arc<dyn GreetService> =
        match HttpGreetService::new(&settings.server_url, settings.request_timeout()) {
            Ok(service) => {
                tracing::info!(endpoint = %service.endpoint(), "greet service configured");
                Arc::new(service)
            }
            Err(err) => {
                tracing::error!("failed to configure greet service: {err:#}");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("{err:#}"),
                )));
                Arc::new(MissingGreetService)
            }
        };
    launch_with_service(cmd_rx, ui_tx, service)
}

pub fn launch_with_service(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    service: Arc<dyn GreetService>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            let mut tasks = Vec::new();
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Greet { submission, name } => {
                        let service = Arc::clone(&service);
                        let ui_tx = ui_tx.clone();
                        tasks.push(tokio::spawn(async move {
                            let outcome = service
                                .greet(&name)
                                .await
                                .map_err(|err| format!("{err:#}"));
                            if let Err(err) = &outcome {
                                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                    UiErrorContext::Greet,
                                    err.clone(),
                                )));
                            }
                            if ui_tx
                                .send(UiEvent::GreetCompleted {
                                    submission,
                                    outcome,
                                })
                                .is_err()
                            {
                                tracing::warn!(%submission, "ui closed before greet completed");
                            }
                        }));
                    }
                }
                tasks.retain(|task| !task.is_finished());
            }

            for task in tasks {
                let _ = task.await;
            }
            tracing::info!("backend worker stopped");
        });
    })
}

#[cfg(test)]
#[path = "../tests/runtime_tests.rs"]
mod tests;

use client_core::{FormDocument, SubmitEvent, SubmitHandler};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{FailurePolicy, GREETING_OUTPUT_ID, NAME_INPUT_ID};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Error,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

pub struct GreeterApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    form: FormDocument,
    handler: SubmitHandler,
    status: String,
    status_banner: Option<StatusBanner>,
}

impl GreeterApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        failure_policy: FailurePolicy,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            form: FormDocument::new(),
            handler: SubmitHandler::new(failure_policy),
            status: String::new(),
            status_banner: None,
        }
    }

    /// Handles a submit of the form, from the button or from Enter in the input.
    fn submit_form(&mut self) {
        let mut event = SubmitEvent::new();
        let pending = self.handler.on_submit(&mut event, &mut self.form);
        let submission = pending.submission;

        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Greet {
                submission,
                name: pending.name,
            },
            &mut self.status,
        );
        if !queued {
            let reason = self.status.clone();
            self.handler.on_complete(&mut self.form, submission, Err(reason));
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::GreetCompleted {
                    submission,
                    outcome,
                } => {
                    if outcome.is_ok() {
                        self.status = "Greeting received".to_string();
                    }
                    self.handler.on_complete(&mut self.form, submission, outcome);
                }
                UiEvent::Error(err) => {
                    self.status = err.display();
                    let show_banner = match err.context() {
                        UiErrorContext::BackendStartup => true,
                        UiErrorContext::Greet => self.handler.policy() == FailurePolicy::Recover,
                    };
                    if show_banner {
                        self.status_banner = Some(StatusBanner {
                            severity: StatusBannerSeverity::Error,
                            message: self.status.clone(),
                        });
                    }
                }
            }
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            let (fill, stroke) = match banner.severity {
                StatusBannerSeverity::Error => (
                    egui::Color32::from_rgb(111, 53, 53),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
                ),
            };

            egui::Frame::NONE
                .fill(fill)
                .stroke(stroke)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
        }
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        let mut submitted = false;

        ui.horizontal(|ui| {
            ui.label("Enter your name:");
            let input = ui.push_id(NAME_INPUT_ID, |ui| {
                ui.text_edit_singleline(self.form.name_mut())
            });
            let enter_pressed =
                input.inner.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            let enabled = !self.form.submit_disabled();
            let clicked = ui
                .add_enabled(enabled, egui::Button::new("Click Me!"))
                .clicked();
            submitted = enabled && (clicked || enter_pressed);
        });

        if submitted {
            self.submit_form();
        }

        ui.add_space(12.0);
        ui.push_id(GREETING_OUTPUT_ID, |ui| {
            if let Ok(greeting) = self.form.text_content(GREETING_OUTPUT_ID) {
                ui.heading(greeting);
            }
        });

        if let Some(status) = self.form.status() {
            ui.colored_label(egui::Color32::from_rgb(200, 90, 90), status);
        }
    }
}

impl eframe::App for GreeterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.label(self.status.as_str());
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            ui.add_space(8.0);
            self.show_form(ui);
        });

        if self.handler.in_flight() > 0 {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
#[path = "../tests/app_tests.rs"]
mod tests;

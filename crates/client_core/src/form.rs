//! Greeting form: the element contract the submit handler works against, and the
//! handler itself.

use std::fmt;

use shared::domain::{FailurePolicy, SubmissionId, GREETING_OUTPUT_ID, NAME_INPUT_ID};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::GreetService;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("no element with id '{0}'")]
    MissingElement(String),
    #[error("element '{0}' has no editable value")]
    NotEditable(String),
}

/// The submit event delivered to the handler.
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// `false` means the host would go on to navigate away.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// One form with a submit button, a `name` input and a `greeting` output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDocument {
    name: String,
    greeting: String,
    submit_disabled: bool,
    status: Option<String>,
}

impl FormDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_element(&self, id: &str) -> bool {
        id == NAME_INPUT_ID || id == GREETING_OUTPUT_ID
    }

    /// Current value of an input element.
    pub fn value(&self, id: &str) -> Result<&str, FormError> {
        match id {
            NAME_INPUT_ID => Ok(&self.name),
            GREETING_OUTPUT_ID => Err(FormError::NotEditable(id.to_string())),
            _ => Err(FormError::MissingElement(id.to_string())),
        }
    }

    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> Result<(), FormError> {
        match id {
            NAME_INPUT_ID => {
                self.name = value.into();
                Ok(())
            }
            GREETING_OUTPUT_ID => Err(FormError::NotEditable(id.to_string())),
            _ => Err(FormError::MissingElement(id.to_string())),
        }
    }

    pub fn text_content(&self, id: &str) -> Result<&str, FormError> {
        match id {
            NAME_INPUT_ID => Ok(""),
            GREETING_OUTPUT_ID => Ok(&self.greeting),
            _ => Err(FormError::MissingElement(id.to_string())),
        }
    }

    /// Mutable access for widgets that edit the `name` input in place.
    pub fn name_mut(&mut self) -> &mut String {
        &mut self.name
    }

    pub fn submit_disabled(&self) -> bool {
        self.submit_disabled
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    fn set_submit_disabled(&mut self, disabled: bool) {
        self.submit_disabled = disabled;
    }

    fn set_greeting(&mut self, text: String) {
        self.greeting = text;
    }
}

/// A greet call that has been issued but not completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGreet {
    pub submission: SubmissionId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Rendered,
    FailedLeftDisabled,
    FailedRecovered,
}

#[derive(Debug, Default)]
pub struct SubmitHandler {
    policy: FailurePolicy,
    in_flight: usize,
}

impl SubmitHandler {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            in_flight: 0,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Prevents navigation, disables the button and captures the name to send.
    ///
    /// A disabled button does not stop a second programmatic submit; every
    /// call here yields a new pending greet.
    pub fn on_submit(
        &mut self,
        event: &mut SubmitEvent,
        document: &mut FormDocument,
    ) -> PendingGreet {
        event.prevent_default();
        document.set_submit_disabled(true);

        let pending = PendingGreet {
            submission: SubmissionId::new(),
            name: document.name.clone(),
        };
        self.in_flight += 1;
        debug!(
            submission = %pending.submission,
            name_len = pending.name.len(),
            in_flight = self.in_flight,
            "greet submission started"
        );
        pending
    }

    /// Applies the result of a greet call to the form.
    pub fn on_complete<E>(
        &mut self,
        document: &mut FormDocument,
        submission: SubmissionId,
        outcome: Result<String, E>,
    ) -> Completion
    where
        E: fmt::Display,
    {
        self.in_flight = self.in_flight.saturating_sub(1);
        match outcome {
            Ok(greeting) => {
                document.set_submit_disabled(false);
                document.clear_status();
                document.set_greeting(greeting);
                info!(%submission, "greeting rendered");
                Completion::Rendered
            }
            Err(err) => {
                document.status = Some(format!("Greeting failed: {err}"));
                match self.policy {
                    FailurePolicy::LeaveDisabled => {
                        warn!(
                            %submission,
                            error = %err,
                            "greet call failed; submit stays disabled"
                        );
                        Completion::FailedLeftDisabled
                    }
                    FailurePolicy::Recover => {
                        warn!(
                            %submission,
                            error = %err,
                            "greet call failed; submit re-enabled"
                        );
                        document.set_submit_disabled(false);
                        Completion::FailedRecovered
                    }
                }
            }
        }
    }

    /// Runs one full submission against `service` on the current task.
    ///
    /// The document is only locked around the two form updates, so it stays
    /// readable while the greet call is pending.
    pub async fn submit<S>(
        &mut self,
        event: &mut SubmitEvent,
        document: &Mutex<FormDocument>,
        service: &S,
    ) -> Completion
    where
        S: GreetService + ?Sized,
    {
        let pending = {
            let mut document = document.lock().await;
            self.on_submit(event, &mut document)
        };
        let outcome = service
            .greet(&pending.name)
            .await
            .map_err(|err| format!("{err:#}"));
        let mut document = document.lock().await;
        self.on_complete(&mut document, pending.submission, outcome)
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;

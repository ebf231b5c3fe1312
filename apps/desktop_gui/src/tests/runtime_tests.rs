use super::*;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use crossbeam_channel::bounded;
use shared::domain::SubmissionId;
use std::time::Duration;

struct EchoGreetService;

#[async_trait]
impl GreetService for EchoGreetService {
    async fn greet(&self, name: &str) -> Result<String> {
        if name == "fail" {
            return Err(anyhow!("greet transport failure: connection refused"));
        }
        Ok(format!("Hello, {name}!"))
    }
}

fn next_completion(ui_rx: &Receiver<UiEvent>) -> (SubmissionId, Result<String, String>) {
    loop {
        match ui_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("ui event before timeout")
        {
            UiEvent::GreetCompleted {
                submission,
                outcome,
            } => return (submission, outcome),
            UiEvent::Info(_) | UiEvent::Error(_) => continue,
        }
    }
}

#[test]
fn worker_answers_greet_commands() {
    let (cmd_tx, cmd_rx) = bounded(8);
    let (ui_tx, ui_rx) = bounded(64);
    let worker = launch_with_service(cmd_rx, ui_tx, Arc::new(EchoGreetService));

    let submission = SubmissionId::new();
    cmd_tx
        .send(BackendCommand::Greet {
            submission,
            name: "Ada".to_string(),
        })
        .expect("queue command");

    let (completed, outcome) = next_completion(&ui_rx);
    assert_eq!(completed, submission);
    assert_eq!(outcome, Ok("Hello, Ada!".to_string()));

    drop(cmd_tx);
    worker.join().expect("worker exits");
}

#[test]
fn worker_reports_failed_greet_as_error_and_completion() {
    let (cmd_tx, cmd_rx) = bounded(8);
    let (ui_tx, ui_rx) = bounded(64);
    let worker = launch_with_service(cmd_rx, ui_tx, Arc::new(EchoGreetService));

    cmd_tx
        .send(BackendCommand::Greet {
            submission: SubmissionId::new(),
            name: "fail".to_string(),
        })
        .expect("queue command");

    let mut saw_error = false;
    let outcome = loop {
        match ui_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("ui event before timeout")
        {
            UiEvent::Error(err) => {
                assert_eq!(err.context(), UiErrorContext::Greet);
                saw_error = true;
            }
            UiEvent::GreetCompleted { outcome, .. } => break outcome,
            UiEvent::Info(_) => {}
        }
    };

    assert!(saw_error);
    assert!(outcome.expect_err("failed outcome").contains("connection refused"));

    drop(cmd_tx);
    worker.join().expect("worker exits");
}

#[test]
fn invalid_server_url_falls_back_to_failing_service() {
    let (cmd_tx, cmd_rx) = bounded(8);
    let (ui_tx, ui_rx) = bounded(64);
    let settings = Settings {
        server_url: "not a url".to_string(),
        ..Settings::default()
    };
    let worker = launch(cmd_rx, ui_tx, &settings);

    match ui_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("startup error")
    {
        UiEvent::Error(err) => assert_eq!(err.context(), UiErrorContext::BackendStartup),
        other => panic!("unexpected first event: {other:?}"),
    }

    cmd_tx
        .send(BackendCommand::Greet {
            submission: SubmissionId::new(),
            name: "Ada".to_string(),
        })
        .expect("queue command");
    let (_, outcome) = next_completion(&ui_rx);
    assert!(outcome.is_err());

    drop(cmd_tx);
    worker.join().expect("worker exits");
}

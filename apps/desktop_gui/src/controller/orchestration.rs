//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` for the backend worker. On failure the reason is written to
/// `status` and `false` is returned.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = match &cmd {
        BackendCommand::Greet { .. } => "greet",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure)"
                    .to_string();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use shared::domain::SubmissionId;

    fn greet_command() -> BackendCommand {
        BackendCommand::Greet {
            submission: SubmissionId::new(),
            name: "Ada".to_string(),
        }
    }

    #[test]
    fn reports_full_queue() {
        let (cmd_tx, _cmd_rx) = bounded(1);
        let mut status = String::new();
        assert!(dispatch_backend_command(&cmd_tx, greet_command(), &mut status));
        assert!(!dispatch_backend_command(&cmd_tx, greet_command(), &mut status));
        assert!(status.contains("full"));
    }

    #[test]
    fn reports_disconnected_worker() {
        let (cmd_tx, cmd_rx) = bounded(1);
        drop(cmd_rx);
        let mut status = String::new();
        assert!(!dispatch_backend_command(&cmd_tx, greet_command(), &mut status));
        assert!(status.contains("disconnected"));
    }
}

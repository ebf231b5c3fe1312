//! Backend commands queued from UI to backend worker.

use shared::domain::SubmissionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    Greet {
        submission: SubmissionId,
        name: String,
    },
}

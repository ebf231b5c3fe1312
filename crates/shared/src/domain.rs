use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Element id of the text input the submit handler reads from.
pub const NAME_INPUT_ID: &str = "name";
/// Element id of the output the greeting is written into.
pub const GREETING_OUTPUT_ID: &str = "greeting";

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(SubmissionId);

/// What the form does when the greet call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Leave the submit button disabled and the greeting untouched.
    #[default]
    LeaveDisabled,
    /// Re-enable the submit button and report the failure on the status line.
    Recover,
}

impl FailurePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "leave_disabled" | "none" => Some(Self::LeaveDisabled),
            "recover" => Some(Self::Recover),
            _ => None,
        }
    }
}

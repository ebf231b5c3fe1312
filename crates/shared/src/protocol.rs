use serde::{Deserialize, Serialize};

/// Route of the greet procedure, relative to the service base url.
pub const GREET_PATH: &str = "greet";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetResponse {
    pub greeting: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greet_request_wire_shape() {
        let body = serde_json::to_value(GreetRequest {
            name: String::new(),
        })
        .expect("serialize");
        assert_eq!(body, serde_json::json!({ "name": "" }));
    }

    #[test]
    fn greet_response_reads_greeting_field() {
        let parsed: GreetResponse =
            serde_json::from_str(r#"{"greeting":"Hello, Ada!"}"#).expect("parse");
        assert_eq!(parsed.greeting, "Hello, Ada!");
    }
}

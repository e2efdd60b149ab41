use serde::{Deserialize, Serialize};

/// Message sent from the browser to the session
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClientMessage {
    pub message_type: String,
    pub cell: Option<usize>,
    pub text: Option<String>,
}

/// Error reply for a browser message that could not be handled
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorMessage {
    pub message_type: String,
    pub error: String,
}

impl ErrorMessage {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            message_type: "error".to_string(),
            error: error.into(),
        }
    }
}

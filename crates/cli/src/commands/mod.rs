pub mod ask;
pub mod config;
pub mod doctor;
pub mod migrate;
pub mod seed;

use serde::Serialize;
use serde_json::json;

/// What a subcommand hands back to `run`: the text to print and the
/// process exit code.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    /// Pre-rendered output (human text or JSON the command built itself).
    pub fn raw(output: String) -> Self {
        Self { exit_code: 0, output }
    }

    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self { exit_code: 0, output: envelope(command, "ok", None, message.into()) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self {
            exit_code,
            output: envelope(command, "error", Some(error_class), message.into()),
        }
    }
}

fn envelope(command: &str, status: &str, error_class: Option<&str>, message: String) -> String {
    let payload = CommandOutcome {
        command: command.to_string(),
        status: status.to_string(),
        error_class: error_class.map(str::to_string),
        message,
    };
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        json!({
            "command": "unknown",
            "status": "error",
            "error_class": "serialization",
            "message": error.to_string(),
        })
        .to_string()
    })
}

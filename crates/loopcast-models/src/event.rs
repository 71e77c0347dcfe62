//! Progress and stream event types.

use serde::{Deserialize, Serialize};

/// An item carried on the in-process event queue, produced by the
/// conversion supervisor and consumed by the delivery loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// One parsed diagnostic line, optionally `Progress: N% - ` prefixed.
    Line(String),
    /// The external process has fully terminated. Pushed by the supervisor
    /// after `wait()` so completion detection does not rely solely on
    /// queue silence.
    ProcessExited { success: bool },
}

/// Terminal stream status values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamStatus {
    Complete,
}

/// A single framed message on the progress stream.
///
/// Serializes untagged to match the wire format the frontend expects:
/// `{"output": <line>}`, `{"heartbeat": true}` and `{"status": "complete"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamEvent {
    Output { output: String },
    Heartbeat { heartbeat: bool },
    Status { status: StreamStatus },
}

impl StreamEvent {
    /// Create an output event carrying one diagnostic line.
    pub fn output(line: impl Into<String>) -> Self {
        StreamEvent::Output {
            output: line.into(),
        }
    }

    /// Create a heartbeat event.
    pub fn heartbeat() -> Self {
        StreamEvent::Heartbeat { heartbeat: true }
    }

    /// Create the terminal completion event.
    pub fn complete() -> Self {
        StreamEvent::Status {
            status: StreamStatus::Complete,
        }
    }

    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Status { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_wire_format() {
        let json = serde_json::to_string(&StreamEvent::output("frame= 10")).unwrap();
        assert_eq!(json, r#"{"output":"frame= 10"}"#);
    }

    #[test]
    fn test_heartbeat_wire_format() {
        let json = serde_json::to_string(&StreamEvent::heartbeat()).unwrap();
        assert_eq!(json, r#"{"heartbeat":true}"#);
    }

    #[test]
    fn test_complete_wire_format() {
        let json = serde_json::to_string(&StreamEvent::complete()).unwrap();
        assert_eq!(json, r#"{"status":"complete"}"#);
    }

    #[test]
    fn test_terminal_detection() {
        assert!(StreamEvent::complete().is_terminal());
        assert!(!StreamEvent::heartbeat().is_terminal());
        assert!(!StreamEvent::output("x").is_terminal());
    }
}

//! Progress events emitted by the PDF extraction service.
//!
//! Each frame is a JSON object `{status, message, progress?, data?, type?}`.
//! The status string is decoded once here into a closed set of variants.

use crate::error::TimetableError;
use crate::schedule::WeekSchedule;
use serde::Deserialize;
use serde_json::Value;

/// Non-terminal stages reported while an upload is being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Uploading,
    Uploaded,
    Processing,
    Processed,
    Analyzing,
    Extracting,
    Finalizing,
    Extracted,
}

/// What a `complete` event carried.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    /// A parsed week schedule, ready to replace the current one
    Timetable(WeekSchedule),
    /// The document was read as plain text, not as a timetable
    NotATimetable,
    /// The payload reported an error of its own
    Failed { message: String },
}

/// One decoded progress event.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Progress {
        stage: Stage,
        message: Option<String>,
        /// Clamped to `0..=100`
        percent: Option<u8>,
    },
    Complete {
        message: Option<String>,
        result: ExtractionResult,
    },
    Error {
        message: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Complete,
    Error,
    #[serde(untagged)]
    Stage(Stage),
}

#[derive(Deserialize)]
struct RawEvent {
    status: Status,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct ExtractedPayload {
    schedule: WeekSchedule,
}

impl ProgressEvent {
    /// Decodes the JSON payload of one SSE frame.
    ///
    /// Fails with [`TimetableError::StreamDecode`] on invalid JSON or an
    /// unknown status.
    pub fn decode(payload: &str) -> Result<Self, TimetableError> {
        let raw: RawEvent =
            serde_json::from_str(payload).map_err(|e| TimetableError::StreamDecode {
                message: e.to_string(),
            })?;

        Ok(match raw.status {
            Status::Stage(stage) => ProgressEvent::Progress {
                stage,
                message: raw.message,
                percent: raw.progress.map(|p| p.clamp(0.0, 100.0).round() as u8),
            },
            Status::Error => ProgressEvent::Error {
                message: raw.message,
            },
            Status::Complete => ProgressEvent::Complete {
                result: classify_completion(raw.kind.as_deref(), raw.data),
                message: raw.message,
            },
        })
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressEvent::Progress { .. })
    }
}

fn classify_completion(kind: Option<&str>, data: Option<Value>) -> ExtractionResult {
    let data = match data {
        Some(Value::String(_)) if kind == Some("text") => return ExtractionResult::NotATimetable,
        Some(data @ Value::Object(_)) => data,
        _ => {
            return ExtractionResult::Failed {
                message: "Extraction returned no timetable".to_string(),
            }
        }
    };

    let embedded_error = data.get("status").and_then(Value::as_str) == Some("error")
        || data.get("type").and_then(Value::as_str) == Some("text");
    if embedded_error {
        let message = data
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Extraction failed")
            .to_string();
        return ExtractionResult::Failed { message };
    }

    match serde_json::from_value::<ExtractedPayload>(data) {
        Ok(payload) => ExtractionResult::Timetable(payload.schedule),
        Err(e) => ExtractionResult::Failed {
            message: format!("Extracted timetable is malformed: {}", e),
        },
    }
}

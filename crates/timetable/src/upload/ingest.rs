//! Upload state machine: `Idle -> Uploading -> {Succeeded, Failed} -> Idle`.
//!
//! Events are handled strictly one at a time in arrival order. Only a
//! `Succeeded` transition hands a week schedule back to the caller, so a
//! failed, cancelled or truncated upload never leaves a partial result.

use super::event::{ExtractionResult, ProgressEvent};
use super::sse::SseDecoder;
use crate::error::TimetableError;
use crate::schedule::WeekSchedule;
use futures::{Stream, StreamExt};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Progress shown when an upload starts, before the server reports any.
const INITIAL_PERCENT: u8 = 10;

/// Message shown to the user when the document is not a timetable.
pub const NOT_A_TIMETABLE: &str = "Please upload a valid academic timetable";

/// Observable state of an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadState {
    #[default]
    Idle,
    Uploading {
        percent: u8,
        message: String,
    },
    Succeeded {
        message: String,
    },
    Failed {
        reason: String,
    },
}

impl UploadState {
    /// Progress to display; a finished upload shows as complete.
    pub fn percent(&self) -> Option<u8> {
        match self {
            UploadState::Uploading { percent, .. } => Some(*percent),
            UploadState::Succeeded { .. } => Some(100),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UploadState::Succeeded { .. } | UploadState::Failed { .. }
        )
    }
}

/// Drives one upload at a time and publishes its state.
pub struct UploadIngestor {
    state: watch::Sender<UploadState>,
    settle_delay: Duration,
}

impl UploadIngestor {
    pub fn new(settle_delay: Duration) -> Self {
        let (state, _) = watch::channel(UploadState::Idle);
        Self {
            state,
            settle_delay,
        }
    }

    /// Current state.
    pub fn state(&self) -> UploadState {
        self.state.borrow().clone()
    }

    /// Receiver that sees every state change, for progress display.
    pub fn subscribe(&self) -> watch::Receiver<UploadState> {
        self.state.subscribe()
    }

    /// `Idle -> Uploading`. Restarting an upload that is in flight resets
    /// its progress.
    pub fn start(&mut self) {
        self.set(UploadState::Uploading {
            percent: INITIAL_PERCENT,
            message: "Starting upload...".to_string(),
        });
    }

    /// Applies one decoded event. Returns the terminal outcome if this
    /// event ended the upload.
    pub fn handle(
        &mut self,
        event: ProgressEvent,
    ) -> Option<Result<WeekSchedule, TimetableError>> {
        if !matches!(self.state(), UploadState::Uploading { .. }) {
            debug!(?event, "Ignoring event outside an upload");
            return None;
        }

        match event {
            ProgressEvent::Progress {
                stage,
                message,
                percent,
            } => {
                debug!(?stage, ?percent, "Upload progress");
                self.state.send_modify(|state| {
                    if let UploadState::Uploading {
                        percent: current,
                        message: current_message,
                    } = state
                    {
                        if let Some(p) = percent {
                            *current = p;
                        }
                        if let Some(m) = message {
                            *current_message = m;
                        }
                    }
                });
                None
            }
            ProgressEvent::Complete { message, result } => Some(match result {
                ExtractionResult::Timetable(week) => {
                    let message = message.unwrap_or_else(|| "Timetable extracted".to_string());
                    info!(periods = week.period_count(), "Upload succeeded");
                    self.set(UploadState::Succeeded { message });
                    Ok(week)
                }
                ExtractionResult::NotATimetable => self.fail(NOT_A_TIMETABLE.to_string()),
                ExtractionResult::Failed { message } => self.fail(message),
            }),
            ProgressEvent::Error { message } => {
                Some(self.fail(message.unwrap_or_else(|| "Extraction failed".to_string())))
            }
        }
    }

    /// Decodes and applies one SSE payload. Malformed payloads are logged
    /// and dropped.
    pub fn handle_payload(
        &mut self,
        payload: &str,
    ) -> Option<Result<WeekSchedule, TimetableError>> {
        match ProgressEvent::decode(payload) {
            Ok(event) => self.handle(event),
            Err(e) => {
                warn!(error = %e, "Dropping malformed progress event");
                None
            }
        }
    }

    /// Consumes an event stream until a terminal event arrives.
    ///
    /// The stream is dropped as soon as the outcome is known. A stream that
    /// errors or ends first fails the upload.
    pub async fn ingest<S>(&mut self, mut stream: S) -> Result<WeekSchedule, TimetableError>
    where
        S: Stream<Item = Result<Vec<u8>, TimetableError>> + Unpin,
    {
        if !matches!(self.state(), UploadState::Uploading { .. }) {
            self.start();
        }

        let mut decoder = SseDecoder::new();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => return self.fail(format!("Upload stream failed: {}", e)),
            };
            for payload in decoder.push(&chunk) {
                if let Some(outcome) = self.handle_payload(&payload) {
                    return outcome;
                }
            }
        }

        decoder.finish();
        self.fail("Upload stream ended before completion".to_string())
    }

    /// Waits out the settle delay after a terminal state, then returns to
    /// `Idle`.
    pub async fn settle(&mut self) {
        if self.state().is_terminal() {
            tokio::time::sleep(self.settle_delay).await;
        }
        self.reset();
    }

    /// Returns to `Idle` immediately, e.g. when the upload is cancelled.
    pub fn reset(&mut self) {
        self.set(UploadState::Idle);
    }

    /// Moves to `Failed` and returns the matching error.
    pub fn fail(&mut self, reason: String) -> Result<WeekSchedule, TimetableError> {
        warn!(reason = %reason, "Upload failed");
        self.set(UploadState::Failed {
            reason: reason.clone(),
        });
        Err(TimetableError::UploadRejected { reason })
    }

    fn set(&self, state: UploadState) {
        self.state.send_replace(state);
    }
}

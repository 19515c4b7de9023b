//! Bulk import of a timetable PDF through the extraction service.
//!
//! The service answers the upload with a server-sent event stream. Bytes
//! are framed by [`SseDecoder`], each payload is decoded once into a
//! [`ProgressEvent`], and [`UploadIngestor`] turns the sequence into either
//! a [`crate::schedule::WeekSchedule`] or a failure.

mod event;
mod ingest;
mod sse;

pub use event::{ExtractionResult, ProgressEvent, Stage};
pub use ingest::{UploadIngestor, UploadState, NOT_A_TIMETABLE};
pub use sse::SseDecoder;

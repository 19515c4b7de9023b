/// Client for the remote schedule, roster, holiday and extraction API
mod cache;
mod client;
mod holiday;
mod types;

pub use cache::{RosterCache, RosterKey};
pub use client::{ApiClient, ByteStream};
pub use types::{IdsResponse, Instructor, MessageResponse, SaveRequest, ScheduleRecord};

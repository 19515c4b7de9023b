//! HTTP client for the remote schedule API.
//!
//! Covers the schedule CRUD endpoints, the instructor roster and the PDF
//! extraction upload, whose response is a server-sent event stream handed
//! back undecoded for [`crate::upload`] to consume.

use super::cache::{RosterCache, RosterKey};
use super::types::{IdsResponse, Instructor, MessageResponse, SaveRequest, ScheduleRecord};
use crate::config::ApiConfig;
use crate::error::TimetableError;
use futures::stream::BoxStream;
use futures::StreamExt;
use rand::Rng;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use url::Url;

/// Multipart field the extraction service reads the PDF from.
const PDF_FIELD: &str = "pdf";

/// Raw chunks of a streamed response body.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, TimetableError>>;

/// Client for the schedule, roster, holiday and extraction endpoints.
#[derive(Clone)]
pub struct ApiClient {
    /// Client with request timeouts, for plain JSON calls
    client: Client,
    /// Client without an overall timeout, for the extraction stream
    streaming_client: Client,
    config: ApiConfig,
    roster_cache: Arc<RosterCache>,
}

impl ApiClient {
    /// Creates a new client for the API described by `config`.
    pub fn new(config: ApiConfig) -> Result<Self, TimetableError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TimetableError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        // A hung extraction blocks until the caller drops the stream
        let streaming_client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| TimetableError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        let roster_cache = Arc::new(RosterCache::new(config.roster_cache_ttl()));

        Ok(Self {
            client,
            streaming_client,
            config,
            roster_cache,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Builds `{base_url}/{segments...}`, percent-encoding each segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, TimetableError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TimetableError::Config {
                message: format!("base URL {} cannot take a path", self.config.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Fetches the ids of every stored schedule, sorted.
    pub async fn fetch_ids(&self) -> Result<Vec<String>, TimetableError> {
        let url = self.endpoint(&["schedule", "ids"])?;
        let body: IdsResponse = self.get_json(url).await?;
        let mut ids = body.ids;
        ids.sort();
        Ok(ids)
    }

    /// Fetches one stored schedule by id.
    pub async fn find(&self, id: &str) -> Result<ScheduleRecord, TimetableError> {
        let url = self.endpoint(&["schedule", "find", id])?;
        self.get_json(url).await
    }

    /// Creates or overwrites a schedule. Returns the server's message.
    pub async fn save(&self, request: &SaveRequest) -> Result<String, TimetableError> {
        let url = self.endpoint(&["schedule", "add"])?;
        let correlation_id = generate_correlation_id();
        info!(
            correlation_id = %correlation_id,
            id = %request.id,
            "Saving schedule"
        );

        let response = self.client.post(url).json(request).send().await?;
        let body: MessageResponse = read_json(response, &correlation_id).await?;
        Ok(body.message)
    }

    /// Deletes a stored schedule. Returns the server's message.
    pub async fn delete(&self, id: &str) -> Result<String, TimetableError> {
        let url = self.endpoint(&["schedule", "delete", id])?;
        self.delete_url(url).await
    }

    /// Fetches the instructor roster for a university and program, using the
    /// cache when possible. Either filter may be empty but not both.
    pub async fn instructors(
        &self,
        university: &str,
        program: &str,
    ) -> Result<Vec<Instructor>, TimetableError> {
        let key = RosterKey::new(university, program);
        if let Some(cached) = self.roster_cache.get(&key) {
            debug!(roster = %key, "Returning cached instructor roster");
            return Ok(cached);
        }

        let mut url = self.endpoint(&["schedule", "teachers"])?;
        {
            let mut query = url.query_pairs_mut();
            if !university.is_empty() {
                query.append_pair("university", university);
            }
            if !program.is_empty() {
                query.append_pair("program", program);
            }
        }

        let instructors: Vec<Instructor> = self.get_json(url).await?;
        self.roster_cache.insert(key, instructors.clone());
        Ok(instructors)
    }

    /// Drops any cached roster for a university and program.
    pub fn invalidate_roster(&self, university: &str, program: &str) {
        self.roster_cache
            .invalidate(&RosterKey::new(university, program));
    }

    /// Uploads a PDF for extraction and returns the raw event stream.
    ///
    /// The stream is lazy and finite; dropping it aborts the upload.
    pub async fn extract_pdf(
        &self,
        file_name: &str,
        pdf: Vec<u8>,
    ) -> Result<ByteStream, TimetableError> {
        let url = self.endpoint(&["extract-pdf"])?;
        let correlation_id = generate_correlation_id();
        info!(
            correlation_id = %correlation_id,
            file = %file_name,
            bytes = pdf.len(),
            "Uploading PDF for extraction"
        );

        let part = Part::bytes(pdf)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")?;
        let form = Form::new().part(PDF_FIELD, part);

        let response = self
            .streaming_client
            .post(url)
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response, &correlation_id).await?;

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()).map_err(TimetableError::from))
            .boxed())
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, TimetableError> {
        let correlation_id = generate_correlation_id();
        let start = Instant::now();
        debug!(correlation_id = %correlation_id, url = %url, "GET");

        let response = self.client.get(url).send().await?;
        let result = read_json(response, &correlation_id).await;
        debug!(
            correlation_id = %correlation_id,
            ok = result.is_ok(),
            duration_ms = start.elapsed().as_millis() as u64,
            "GET finished"
        );
        result
    }

    pub(crate) async fn delete_url(&self, url: Url) -> Result<String, TimetableError> {
        let correlation_id = generate_correlation_id();
        info!(correlation_id = %correlation_id, url = %url, "DELETE");

        let response = self.client.delete(url).send().await?;
        let body: MessageResponse = read_json(response, &correlation_id).await?;
        Ok(body.message)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }
}

/// Turns a non-success status into [`TimetableError::UnexpectedResponse`],
/// using the body's `message` field when it has one.
pub(crate) async fn check_status(
    response: Response,
    correlation_id: &str,
) -> Result<Response, TimetableError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<MessageResponse>(&text)
        .map(|m| m.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or(text);

    if status == StatusCode::NOT_FOUND {
        warn!(correlation_id = %correlation_id, "Resource not found");
    } else {
        error!(
            correlation_id = %correlation_id,
            status = status.as_u16(),
            message = %message,
            "Request failed"
        );
    }

    Err(TimetableError::UnexpectedResponse {
        status: status.as_u16(),
        message,
    })
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    correlation_id: &str,
) -> Result<T, TimetableError> {
    let response = check_status(response, correlation_id).await?;
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| TimetableError::UnexpectedResponse {
        status: StatusCode::OK.as_u16(),
        message: format!("malformed response body: {}", e),
    })
}

/// Generates a short correlation ID for request tracing.
pub(crate) fn generate_correlation_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp & 0xFFFFFFFF, random)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(ApiConfig::with_base_url(base).unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = client("http://localhost:4000/api/");
        assert_eq!(
            c.endpoint(&["schedule", "ids"]).unwrap().as_str(),
            "http://localhost:4000/api/schedule/ids"
        );

        let c = client("http://localhost:4000/api");
        assert_eq!(
            c.endpoint(&["extract-pdf"]).unwrap().as_str(),
            "http://localhost:4000/api/extract-pdf"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let c = client("http://localhost:4000/api/");
        assert_eq!(
            c.endpoint(&["schedule", "find", "BWU-BCA 3/A"])
                .unwrap()
                .as_str(),
            "http://localhost:4000/api/schedule/find/BWU-BCA%203%2FA"
        );
    }

    #[test]
    fn test_correlation_ids_differ() {
        assert_ne!(generate_correlation_id(), generate_correlation_id());
    }
}

//! Holiday endpoints, treated as plain CRUD.

use super::client::{generate_correlation_id, read_json, ApiClient};
use super::types::MessageResponse;
use crate::error::TimetableError;
use crate::holiday::{expand_dates, Holiday, NewHoliday};
use chrono::NaiveDate;
use futures::future::try_join_all;
use tracing::info;

impl ApiClient {
    /// Fetches every stored holiday date.
    pub async fn holidays(&self) -> Result<Vec<Holiday>, TimetableError> {
        let url = self.endpoint(&["holiday", "all"])?;
        self.get_json(url).await
    }

    /// Stores one holiday entry per day from `start` for `day_count` days.
    ///
    /// Entries are posted concurrently; the first failure is returned.
    pub async fn add_holidays(
        &self,
        name: &str,
        start: NaiveDate,
        day_count: u32,
    ) -> Result<usize, TimetableError> {
        let url = self.endpoint(&["holiday", "add"])?;
        let entries: Vec<NewHoliday> = expand_dates(start, day_count)
            .into_iter()
            .map(|date| NewHoliday {
                name: name.to_string(),
                date,
            })
            .collect();

        let correlation_id = generate_correlation_id();
        info!(
            correlation_id = %correlation_id,
            name = %name,
            days = entries.len(),
            "Adding holidays"
        );

        try_join_all(entries.iter().map(|entry| {
            let request = self.http().post(url.clone()).json(entry);
            let correlation_id = correlation_id.clone();
            async move {
                let response = request.send().await?;
                read_json::<MessageResponse>(response, &correlation_id).await
            }
        }))
        .await?;

        Ok(entries.len())
    }

    /// Deletes one holiday entry. Returns the server's message.
    pub async fn delete_holiday(&self, id: &str) -> Result<String, TimetableError> {
        let url = self.endpoint(&["holiday", "delete", id])?;
        self.delete_url(url).await
    }
}

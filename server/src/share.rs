use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hopewell_storage::models::event::EventRow;
use log::debug;
use serde::Serialize;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("request error: {0:?}")]
    Http(#[from] reqwest::Error),

    #[error("{failed} of {total} share webhooks failed")]
    Partial { failed: usize, total: usize },
}

/// Summary posted to social channels when an event is published.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SharedEvent {
    pub event_id: String,
    pub title: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub image_url: Option<String>,
}

impl From<&EventRow> for SharedEvent {
    fn from(row: &EventRow) -> Self {
        Self {
            event_id: row.event_id.to_string(),
            title: row.title.clone(),
            location: row.location.clone(),
            start_time: row.start_time,
            image_url: row.image_url.clone(),
        }
    }
}

#[async_trait]
pub trait EventSharer: Send + Sync {
    async fn share_event(&self, event: SharedEvent) -> Result<(), Error>;
}

/// Posts shared events as JSON to each configured webhook.
pub struct WebhookSharer {
    http: reqwest::Client,
    webhook_urls: Vec<String>,
}

impl WebhookSharer {
    pub fn new(webhook_urls: Vec<String>, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, webhook_urls })
    }
}

#[async_trait]
impl EventSharer for WebhookSharer {
    async fn share_event(&self, event: SharedEvent) -> Result<(), Error> {
        let mut failed = 0;
        for url in &self.webhook_urls {
            let result = self
                .http
                .post(url)
                .json(&event)
                .send()
                .await
                .and_then(|response| response.error_for_status());
            match result {
                Ok(_) => debug!("Shared event {} to {}", event.event_id, url),
                Err(e) => {
                    debug!("Sharing event {} to {} failed: {:?}", event.event_id, url, e);
                    failed += 1;
                }
            }
        }
        if failed > 0 {
            return Err(Error::Partial {
                failed,
                total: self.webhook_urls.len(),
            });
        }
        Ok(())
    }
}

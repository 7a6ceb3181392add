use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hopewell_status::Status;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub create_time: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListEventsRequest {
    pub page_size: Option<i64>,
    pub page_token: Option<String>,
    #[serde(default)]
    pub upcoming_only: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListEventsResponse {
    pub events: Vec<Event>,
    pub next_page_token: String,
    pub total_count: i64,
}

#[async_trait]
pub trait EventService: Send + Sync + 'static {
    async fn create_event(&self, request: CreateEventRequest) -> Result<Event, Status>;

    async fn list_events(&self, request: ListEventsRequest) -> Result<ListEventsResponse, Status>;
}

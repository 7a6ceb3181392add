use crate::page_token::PageTokenable;
use chrono::{serde::ts_nanoseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Clone, Debug, FromRow, PartialEq)]
pub struct EventRow {
    pub event_id: Uuid,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewEventRow {
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub image_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct EventPageToken {
    #[serde(with = "ts_nanoseconds")]
    pub start_time: DateTime<Utc>,
    pub event_id: Uuid,
}

impl PageTokenable<EventPageToken> for EventRow {
    fn page_token(&self) -> EventPageToken {
        EventPageToken {
            start_time: self.start_time,
            event_id: self.event_id,
        }
    }
}

use crate::{
    models::event::*,
    postgres::store::{PgOnDemandStore, PgTransactionalStore},
    Error,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn add_event(&self, new_row: NewEventRow) -> Result<EventRow, Error>;

    /// Ordered by start time. When `starting_after` is set only events starting
    /// at or after that instant are returned.
    async fn list_events(
        &self,
        page_size: i64,
        page_token: Option<EventPageToken>,
        starting_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<EventRow>, Error>;

    async fn count_events(&self, starting_after: Option<DateTime<Utc>>) -> Result<i64, Error>;

    async fn list_and_count_events(
        &self,
        page_size: i64,
        page_token: Option<EventPageToken>,
        starting_after: Option<DateTime<Utc>>,
    ) -> Result<(Vec<EventRow>, i64), Error> {
        let list_fut = self.list_events(page_size, page_token, starting_after);
        let count_fut = self.count_events(starting_after);
        futures::try_join!(list_fut, count_fut)
    }
}

#[async_trait]
impl EventStore for PgOnDemandStore {
    async fn add_event(&self, new_row: NewEventRow) -> Result<EventRow, Error> {
        add_event(&*self.pool, new_row).await
    }

    async fn list_events(
        &self,
        page_size: i64,
        page_token: Option<EventPageToken>,
        starting_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<EventRow>, Error> {
        list_events(&*self.pool, page_size, page_token, starting_after).await
    }

    async fn count_events(&self, starting_after: Option<DateTime<Utc>>) -> Result<i64, Error> {
        count_events(&*self.pool, starting_after).await
    }
}

#[async_trait]
impl EventStore for PgTransactionalStore {
    async fn add_event(&self, new_row: NewEventRow) -> Result<EventRow, Error> {
        let mut lock = self.txn.lock().await;
        add_event(&mut **lock, new_row).await
    }

    async fn list_events(
        &self,
        page_size: i64,
        page_token: Option<EventPageToken>,
        starting_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<EventRow>, Error> {
        let mut lock = self.txn.lock().await;
        list_events(&mut **lock, page_size, page_token, starting_after).await
    }

    async fn count_events(&self, starting_after: Option<DateTime<Utc>>) -> Result<i64, Error> {
        let mut lock = self.txn.lock().await;
        count_events(&mut **lock, starting_after).await
    }
}

async fn add_event<'a, E>(executor: E, new_row: NewEventRow) -> Result<EventRow, Error>
where
    E: PgExecutor<'a>,
{
    Ok(sqlx::query_as(
        r#"
        INSERT INTO events (
            create_time,
            update_time,
            title,
            description,
            location,
            start_time,
            image_url
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *"#,
    )
    .bind(new_row.create_time)
    .bind(new_row.update_time)
    .bind(new_row.title)
    .bind(new_row.description)
    .bind(new_row.location)
    .bind(new_row.start_time)
    .bind(new_row.image_url)
    .fetch_one(executor)
    .await?)
}

async fn list_events<'a, E>(
    executor: E,
    page_size: i64,
    page_token: Option<EventPageToken>,
    starting_after: Option<DateTime<Utc>>,
) -> Result<Vec<EventRow>, Error>
where
    E: PgExecutor<'a>,
{
    let (token_time, token_id) = match page_token {
        Some(token) => (Some(token.start_time), Some(token.event_id)),
        None => (None, None),
    };
    Ok(sqlx::query_as(
        "SELECT * \
        FROM events \
        WHERE ($1::timestamptz IS NULL OR start_time >= $1) \
        AND ($2::timestamptz IS NULL OR (start_time, event_id) >= ($2, $3::uuid)) \
        ORDER BY start_time ASC, event_id ASC \
        LIMIT $4",
    )
    .bind(starting_after)
    .bind(token_time)
    .bind(token_id)
    .bind(page_size)
    .fetch_all(executor)
    .await?)
}

async fn count_events<'a, E>(executor: E, starting_after: Option<DateTime<Utc>>) -> Result<i64, Error>
where
    E: PgExecutor<'a>,
{
    Ok(sqlx::query_scalar(
        "SELECT COUNT(*) \
        FROM events \
        WHERE ($1::timestamptz IS NULL OR start_time >= $1)",
    )
    .bind(starting_after)
    .fetch_one(executor)
    .await?)
}

use crate::{
    api::event::*,
    convert::into::IntoApi,
    share::{EventSharer, SharedEvent},
    side_effect::SideEffects,
    validation::page_size,
};
use async_trait::async_trait;
use chrono::Utc;
use hopewell_status::{invalid_argument, well_known::required_field, Status};
use hopewell_storage::{
    database::{
        client::DatabaseClient,
        store::{OnDemandStore, TransactionalStore},
    },
    models::event::{EventPageToken, NewEventRow},
    page_token::{PageToken, PageTokenable},
    stores::event::EventStore,
};
use log::info;
use std::{cmp::min, marker::PhantomData, sync::Arc};


const DEFAULT_PAGE_SIZE: i64 = 25;

pub struct EventServiceImpl<Client, Store, TStore> {
    database: Arc<Client>,
    sharer: Arc<dyn EventSharer>,
    side_effects: SideEffects,
    _marker: PhantomData<fn() -> (Store, TStore)>,
}

impl<Client, Store, TStore> EventServiceImpl<Client, Store, TStore> {
    pub fn new(
        database: Arc<Client>,
        sharer: Arc<dyn EventSharer>,
        side_effects: SideEffects,
    ) -> Self {
        Self {
            database,
            sharer,
            side_effects,
            _marker: PhantomData,
        }
    }
}

fn optional_field(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl<Client, Store, TStore> EventService for EventServiceImpl<Client, Store, TStore>
where
    Client: DatabaseClient<Store, TStore> + 'static,
    Store: EventStore + OnDemandStore + 'static,
    TStore: EventStore + TransactionalStore + 'static,
{
    async fn create_event(&self, request: CreateEventRequest) -> Result<Event, Status> {
        let title = required_field("title", &request.title)?;
        let location = required_field("location", &request.location)?;
        let now = Utc::now();

        let txn = self.database.begin().await?;
        let row = txn
            .add_event(NewEventRow {
                create_time: now,
                update_time: now,
                title,
                description: request.description.trim().to_string(),
                location,
                start_time: request.start_time,
                image_url: optional_field(request.image_url),
            })
            .await?;
        txn.commit().await?;
        info!("Created event {} starting {}", row.event_id, row.start_time);

        // Sharing starts only once the event is committed.
        let sharer = self.sharer.clone();
        let shared = SharedEvent::from(&row);
        self.side_effects.dispatch("share_event", async move {
            sharer.share_event(shared).await.map_err(anyhow::Error::from)
        });

        row.into_api()
    }

    async fn list_events(&self, request: ListEventsRequest) -> Result<ListEventsResponse, Status> {
        let page_size = page_size(request.page_size, DEFAULT_PAGE_SIZE);
        let page_token =
            EventPageToken::deserialize_page_token(request.page_token.as_deref().unwrap_or(""))
                .map_err(|e| invalid_argument!("'page_token' is invalid: {:?}", e))?;
        let starting_after = request.upcoming_only.then(Utc::now);

        let (rows_plus_one, total_count) = self
            .database
            .on_demand()
            .list_and_count_events(page_size + 1, page_token, starting_after)
            .await?;

        let (page_rows, next_page_rows) =
            rows_plus_one.split_at(min(rows_plus_one.len(), page_size as usize));

        let mut events = Vec::new();
        for row in page_rows {
            events.push(row.clone().into_api()?);
        }

        let next_page_token = next_page_rows
            .first()
            .map(|next_row| next_row.page_token().serialize_page_token())
            .unwrap_or(Ok("".to_string()))?;

        Ok(ListEventsResponse {
            events,
            next_page_token,
            total_count,
        })
    }
}

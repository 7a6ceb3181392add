use crate::{api::event::Event, convert::from::ApiFrom};
use hopewell_status::Status;
use hopewell_storage::models::event::EventRow;

impl ApiFrom<EventRow> for Event {
    fn api_from(row: EventRow) -> Result<Self, Status> {
        Ok(Event {
            id: row.event_id.to_string(),
            create_time: row.create_time,
            title: row.title,
            description: row.description,
            location: row.location,
            start_time: row.start_time,
            image_url: row.image_url,
        })
    }
}

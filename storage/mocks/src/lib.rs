use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hopewell_storage::{
    database::{
        client::DatabaseClient,
        store::{OnDemandStore, TransactionalStore},
    },
    models::{donation::*, donation_order::*, event::*},
    stores::{donation::DonationStore, donation_order::DonationOrderStore, event::EventStore},
    Error,
};
use mockall::mock;

mock! {
  pub DatabaseClient {}

  #[async_trait]
  impl DatabaseClient<MockStore, MockStore> for DatabaseClient {
      fn on_demand(&self) -> MockStore;

      async fn begin(&self) -> Result<MockStore, Error>;
  }
}

mock! {
  pub Store {}

  #[async_trait]
  impl DonationStore for Store {
      async fn insert_donation_if_absent(
          &self,
          new_row: NewDonationRow,
      ) -> Result<InsertedDonation, Error>;

      async fn find_donation_by_id(&self, donation_id: String)
          -> Result<Option<DonationRow>, Error>;

      async fn list_donations(
          &self,
          page_size: i64,
          page_token: Option<DonationPageToken>,
          status: Option<DonationStatus>,
      ) -> Result<Vec<DonationRow>, Error>;

      async fn count_donations(&self, status: Option<DonationStatus>) -> Result<i64, Error>;

      async fn list_donations_between(
          &self,
          start: DateTime<Utc>,
          end: DateTime<Utc>,
          status: DonationStatus,
      ) -> Result<Vec<DonationRow>, Error>;
  }

  #[async_trait]
  impl DonationOrderStore for Store {
      async fn add_donation_order(
          &self,
          new_row: NewDonationOrderRow,
      ) -> Result<DonationOrderRow, Error>;

      async fn find_donation_order_by_id(
          &self,
          order_id: String,
      ) -> Result<Option<DonationOrderRow>, Error>;
  }

  #[async_trait]
  impl EventStore for Store {
      async fn add_event(&self, new_row: NewEventRow) -> Result<EventRow, Error>;

      async fn list_events(
          &self,
          page_size: i64,
          page_token: Option<EventPageToken>,
          starting_after: Option<DateTime<Utc>>,
      ) -> Result<Vec<EventRow>, Error>;

      async fn count_events(&self, starting_after: Option<DateTime<Utc>>) -> Result<i64, Error>;
  }

  impl OnDemandStore for Store {}

  #[async_trait]
  impl TransactionalStore for Store {
      async fn commit(self) -> Result<(), Error>;

      async fn rollback(self) -> Result<(), Error>;
  }
}

use crate::{
    models::donation::*,
    postgres::store::{PgOnDemandStore, PgTransactionalStore},
    Error,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

#[async_trait]
pub trait DonationStore: Send + Sync {
    /// Inserts the donation unless a donation with the same id already exists,
    /// in which case the existing row is returned untouched.
    async fn insert_donation_if_absent(
        &self,
        new_row: NewDonationRow,
    ) -> Result<InsertedDonation, Error>;

    async fn find_donation_by_id(&self, donation_id: String)
        -> Result<Option<DonationRow>, Error>;

    /// Newest first.
    async fn list_donations(
        &self,
        page_size: i64,
        page_token: Option<DonationPageToken>,
        status: Option<DonationStatus>,
    ) -> Result<Vec<DonationRow>, Error>;

    async fn count_donations(&self, status: Option<DonationStatus>) -> Result<i64, Error>;

    async fn list_and_count_donations(
        &self,
        page_size: i64,
        page_token: Option<DonationPageToken>,
        status: Option<DonationStatus>,
    ) -> Result<(Vec<DonationRow>, i64), Error> {
        let list_fut = self.list_donations(page_size, page_token, status);
        let count_fut = self.count_donations(status);
        futures::try_join!(list_fut, count_fut)
    }

    /// Donations with the given status created in `[start, end)`, oldest first.
    async fn list_donations_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: DonationStatus,
    ) -> Result<Vec<DonationRow>, Error>;
}

#[async_trait]
impl DonationStore for PgOnDemandStore {
    async fn insert_donation_if_absent(
        &self,
        new_row: NewDonationRow,
    ) -> Result<InsertedDonation, Error> {
        let donation_id = new_row.donation_id.clone();
        let inserted = insert_donation(&*self.pool, new_row).await?;
        match inserted {
            Some(row) => Ok(InsertedDonation::Inserted(row)),
            None => existing_donation(&*self.pool, donation_id).await,
        }
    }

    async fn find_donation_by_id(
        &self,
        donation_id: String,
    ) -> Result<Option<DonationRow>, Error> {
        find_donation_by_id(&*self.pool, donation_id).await
    }

    async fn list_donations(
        &self,
        page_size: i64,
        page_token: Option<DonationPageToken>,
        status: Option<DonationStatus>,
    ) -> Result<Vec<DonationRow>, Error> {
        list_donations(&*self.pool, page_size, page_token, status).await
    }

    async fn count_donations(&self, status: Option<DonationStatus>) -> Result<i64, Error> {
        count_donations(&*self.pool, status).await
    }

    async fn list_donations_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: DonationStatus,
    ) -> Result<Vec<DonationRow>, Error> {
        list_donations_between(&*self.pool, start, end, status).await
    }
}

#[async_trait]
impl DonationStore for PgTransactionalStore {
    async fn insert_donation_if_absent(
        &self,
        new_row: NewDonationRow,
    ) -> Result<InsertedDonation, Error> {
        let donation_id = new_row.donation_id.clone();
        let mut lock = self.txn.lock().await;
        let inserted = insert_donation(&mut **lock, new_row).await?;
        match inserted {
            Some(row) => Ok(InsertedDonation::Inserted(row)),
            None => existing_donation(&mut **lock, donation_id).await,
        }
    }

    async fn find_donation_by_id(
        &self,
        donation_id: String,
    ) -> Result<Option<DonationRow>, Error> {
        let mut lock = self.txn.lock().await;
        find_donation_by_id(&mut **lock, donation_id).await
    }

    async fn list_donations(
        &self,
        page_size: i64,
        page_token: Option<DonationPageToken>,
        status: Option<DonationStatus>,
    ) -> Result<Vec<DonationRow>, Error> {
        let mut lock = self.txn.lock().await;
        list_donations(&mut **lock, page_size, page_token, status).await
    }

    async fn count_donations(&self, status: Option<DonationStatus>) -> Result<i64, Error> {
        let mut lock = self.txn.lock().await;
        count_donations(&mut **lock, status).await
    }

    async fn list_donations_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: DonationStatus,
    ) -> Result<Vec<DonationRow>, Error> {
        let mut lock = self.txn.lock().await;
        list_donations_between(&mut **lock, start, end, status).await
    }
}

// Returns None when a row with the same donation_id already exists.
async fn insert_donation<'a, E>(
    executor: E,
    new_row: NewDonationRow,
) -> Result<Option<DonationRow>, Error>
where
    E: PgExecutor<'a>,
{
    Ok(sqlx::query_as(
        r#"
        INSERT INTO donations (
            donation_id,
            create_time,
            order_id,
            donor_name,
            donor_email,
            amount_minor,
            currency,
            status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (donation_id) DO NOTHING
        RETURNING *"#,
    )
    .bind(new_row.donation_id)
    .bind(new_row.create_time)
    .bind(new_row.order_id)
    .bind(new_row.donor_name)
    .bind(new_row.donor_email)
    .bind(new_row.amount_minor)
    .bind(new_row.currency)
    .bind(new_row.status)
    .fetch_optional(executor)
    .await?)
}

// Runs as its own statement so that a row committed by a concurrent insert is visible.
async fn existing_donation<'a, E>(executor: E, donation_id: String) -> Result<InsertedDonation, Error>
where
    E: PgExecutor<'a>,
{
    let existing = find_donation_by_id(executor, donation_id.clone())
        .await?
        .ok_or_else(|| {
            anyhow::anyhow!("donation {} conflicted on insert but was not found", donation_id)
        })?;
    Ok(InsertedDonation::AlreadyExists(existing))
}

async fn find_donation_by_id<'a, E>(
    executor: E,
    donation_id: String,
) -> Result<Option<DonationRow>, Error>
where
    E: PgExecutor<'a>,
{
    Ok(sqlx::query_as(
        "SELECT * \
        FROM donations \
        WHERE donation_id = $1",
    )
    .bind(donation_id)
    .fetch_optional(executor)
    .await?)
}

async fn list_donations<'a, E>(
    executor: E,
    page_size: i64,
    page_token: Option<DonationPageToken>,
    status: Option<DonationStatus>,
) -> Result<Vec<DonationRow>, Error>
where
    E: PgExecutor<'a>,
{
    let (token_time, token_id) = match page_token {
        Some(token) => (Some(token.create_time), Some(token.donation_id)),
        None => (None, None),
    };
    Ok(sqlx::query_as(
        "SELECT * \
        FROM donations \
        WHERE ($1::donation_status IS NULL OR status = $1) \
        AND ($2::timestamptz IS NULL OR (create_time, donation_id) <= ($2, $3::text)) \
        ORDER BY create_time DESC, donation_id DESC \
        LIMIT $4",
    )
    .bind(status)
    .bind(token_time)
    .bind(token_id)
    .bind(page_size)
    .fetch_all(executor)
    .await?)
}

async fn count_donations<'a, E>(executor: E, status: Option<DonationStatus>) -> Result<i64, Error>
where
    E: PgExecutor<'a>,
{
    Ok(sqlx::query_scalar(
        "SELECT COUNT(*) \
        FROM donations \
        WHERE ($1::donation_status IS NULL OR status = $1)",
    )
    .bind(status)
    .fetch_one(executor)
    .await?)
}

async fn list_donations_between<'a, E>(
    executor: E,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    status: DonationStatus,
) -> Result<Vec<DonationRow>, Error>
where
    E: PgExecutor<'a>,
{
    Ok(sqlx::query_as(
        "SELECT * \
        FROM donations \
        WHERE status = $1 AND create_time >= $2 AND create_time < $3 \
        ORDER BY create_time ASC",
    )
    .bind(status)
    .bind(start)
    .bind(end)
    .fetch_all(executor)
    .await?)
}

use crate::{
    models::donation_order::*,
    postgres::store::{PgOnDemandStore, PgTransactionalStore},
    Error,
};
use async_trait::async_trait;
use sqlx::PgExecutor;

#[async_trait]
pub trait DonationOrderStore: Send + Sync {
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
impl DonationOrderStore for PgOnDemandStore {
    async fn add_donation_order(
        &self,
        new_row: NewDonationOrderRow,
    ) -> Result<DonationOrderRow, Error> {
        add_donation_order(&*self.pool, new_row).await
    }

    async fn find_donation_order_by_id(
        &self,
        order_id: String,
    ) -> Result<Option<DonationOrderRow>, Error> {
        find_donation_order_by_id(&*self.pool, order_id).await
    }
}

#[async_trait]
impl DonationOrderStore for PgTransactionalStore {
    async fn add_donation_order(
        &self,
        new_row: NewDonationOrderRow,
    ) -> Result<DonationOrderRow, Error> {
        let mut lock = self.txn.lock().await;
        add_donation_order(&mut **lock, new_row).await
    }

    async fn find_donation_order_by_id(
        &self,
        order_id: String,
    ) -> Result<Option<DonationOrderRow>, Error> {
        let mut lock = self.txn.lock().await;
        find_donation_order_by_id(&mut **lock, order_id).await
    }
}

async fn add_donation_order<'a, E>(
    executor: E,
    new_row: NewDonationOrderRow,
) -> Result<DonationOrderRow, Error>
where
    E: PgExecutor<'a>,
{
    Ok(sqlx::query_as(
        r#"
        INSERT INTO donation_orders (
            order_id,
            create_time,
            receipt,
            amount_minor,
            currency
        )
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *"#,
    )
    .bind(new_row.order_id)
    .bind(new_row.create_time)
    .bind(new_row.receipt)
    .bind(new_row.amount_minor)
    .bind(new_row.currency)
    .fetch_one(executor)
    .await?)
}

async fn find_donation_order_by_id<'a, E>(
    executor: E,
    order_id: String,
) -> Result<Option<DonationOrderRow>, Error>
where
    E: PgExecutor<'a>,
{
    Ok(sqlx::query_as(
        "SELECT * \
        FROM donation_orders \
        WHERE order_id = $1",
    )
    .bind(order_id)
    .fetch_optional(executor)
    .await?)
}

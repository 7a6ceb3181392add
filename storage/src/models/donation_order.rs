use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Order created with the payment gateway for one checkout attempt.
#[derive(Clone, Debug, FromRow, PartialEq)]
pub struct DonationOrderRow {
    pub order_id: String,
    pub create_time: DateTime<Utc>,
    pub receipt: String,
    pub amount_minor: i64,
    pub currency: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewDonationOrderRow {
    pub order_id: String,
    pub create_time: DateTime<Utc>,
    pub receipt: String,
    pub amount_minor: i64,
    pub currency: String,
}

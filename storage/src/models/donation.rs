use crate::page_token::PageTokenable;
use chrono::{serde::ts_nanoseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "donation_status")]
pub enum DonationStatus {
    Completed,
    Pending,
    Failed,
}

/// A settled donation. `donation_id` is the payment gateway's payment id.
#[derive(Clone, Debug, FromRow, PartialEq)]
pub struct DonationRow {
    pub donation_id: String,
    pub create_time: DateTime<Utc>,
    pub order_id: String,
    pub donor_name: String,
    pub donor_email: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: DonationStatus,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewDonationRow {
    pub donation_id: String,
    pub create_time: DateTime<Utc>,
    pub order_id: String,
    pub donor_name: String,
    pub donor_email: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: DonationStatus,
}

/// Outcome of an idempotent insert keyed on the payment id.
#[derive(Clone, Debug, PartialEq)]
pub enum InsertedDonation {
    Inserted(DonationRow),
    AlreadyExists(DonationRow),
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct DonationPageToken {
    #[serde(with = "ts_nanoseconds")]
    pub create_time: DateTime<Utc>,
    pub donation_id: String,
}

impl PageTokenable<DonationPageToken> for DonationRow {
    fn page_token(&self) -> DonationPageToken {
        DonationPageToken {
            create_time: self.create_time,
            donation_id: self.donation_id.clone(),
        }
    }
}

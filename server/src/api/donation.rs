use crate::gateway;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hopewell_status::Status;
use hopewell_storage::Error as StorageError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Major currency units, e.g. rupees.
    pub amount: f64,
}

/// Everything the checkout widget needs to take the payment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DonationOrder {
    pub order_id: String,
    pub amount_minor_units: i64,
    pub currency: String,
    pub receipt: String,
    pub key_id: String,
}

/// Payload handed back by the checkout widget once the donor has paid.
#[derive(Clone, Debug, Deserialize)]
pub struct SettleDonationRequest {
    #[serde(alias = "razorpay_order_id")]
    pub order_id: String,
    #[serde(alias = "razorpay_payment_id")]
    pub payment_id: String,
    #[serde(alias = "razorpay_signature")]
    pub signature: String,
    pub donor_name: String,
    pub donor_email: String,
    /// Amount the checkout displayed, in major units. The stored order amount
    /// is what gets recorded.
    #[serde(default)]
    pub amount: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DonationStatus {
    Completed,
    Pending,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: String,
    pub order_id: String,
    pub donor_name: String,
    pub donor_email: String,
    pub amount: f64,
    pub currency: String,
    pub date: DateTime<Utc>,
    pub status: DonationStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettleDonationResponse {
    pub donation: Donation,
    /// True when this payment had already been recorded by an earlier callback.
    pub already_settled: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListDonationsRequest {
    pub page_size: Option<i64>,
    pub page_token: Option<String>,
    pub status: Option<DonationStatus>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListDonationsResponse {
    pub donations: Vec<Donation>,
    pub next_page_token: String,
    pub total_count: i64,
}

#[derive(thiserror::Error, Debug)]
pub enum DonationError {
    #[error("invalid donation: {0}")]
    Validation(String),

    #[error("payment gateway error: {0}")]
    Gateway(#[from] gateway::Error),

    #[error("signature mismatch for order {order_id}")]
    SignatureMismatch { order_id: String },

    /// The payment was captured but the ledger write failed.
    #[error("payment {payment_id} captured but not recorded: {source}")]
    SettlementRecording {
        payment_id: String,
        source: StorageError,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Status(#[from] Status),
}

impl From<DonationError> for Status {
    fn from(error: DonationError) -> Self {
        match error {
            DonationError::Validation(message) => {
                Status::invalid_argument(message).with_reason("VALIDATION_FAILED")
            }
            DonationError::Gateway(_) => Status::unavailable(
                "the payment gateway could not create an order, please try again",
            )
            .with_reason("GATEWAY_ERROR"),
            DonationError::SignatureMismatch { .. } => {
                Status::permission_denied("payment signature verification failed")
                    .with_reason("SIGNATURE_MISMATCH")
            }
            DonationError::SettlementRecording { payment_id, .. } => Status::internal(format!(
                "your payment {} succeeded but could not be recorded. Please do not pay \
                again; contact support with this payment reference",
                payment_id
            ))
            .with_reason("SETTLEMENT_RECORDING_FAILED"),
            DonationError::Storage(e) => e.into(),
            DonationError::Status(status) => status,
        }
    }
}

#[async_trait]
pub trait DonationService: Send + Sync + 'static {
    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<DonationOrder, DonationError>;

    /// Verifies the gateway signature and records the donation.
    async fn settle_donation(
        &self,
        request: SettleDonationRequest,
    ) -> Result<SettleDonationResponse, DonationError>;

    async fn get_donation(&self, donation_id: String) -> Result<Donation, Status>;

    async fn list_donations(
        &self,
        request: ListDonationsRequest,
    ) -> Result<ListDonationsResponse, Status>;
}

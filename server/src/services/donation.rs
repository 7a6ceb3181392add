use crate::{
    api::donation::*,
    convert::{from::FromApi, into::IntoApi},
    gateway::{NewGatewayOrder, PaymentGateway},
    money::Money,
    signature::SignatureVerifier,
    validation::{page_size, validate_email, validate_name},
};
use async_trait::async_trait;
use chrono::Utc;
use hopewell_status::{invalid_argument, not_found, well_known::required_field, Status};
use hopewell_storage::{
    database::{
        client::DatabaseClient,
        store::{OnDemandStore, TransactionalStore},
    },
    models::{
        donation::{
            DonationPageToken, DonationStatus as StoreDonationStatus, InsertedDonation,
            NewDonationRow,
        },
        donation_order::NewDonationOrderRow,
    },
    page_token::{PageToken, PageTokenable},
    stores::{donation::DonationStore, donation_order::DonationOrderStore},
    Error as StorageError,
};
use iso_currency::Currency;
use log::{error, info, warn};
use std::{cmp::min, marker::PhantomData, sync::Arc, time::Duration};
use uuid::Uuid;


const DEFAULT_PAGE_SIZE: i64 = 25;
const DEFAULT_SETTLEMENT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct DonationServiceImpl<Client, Store, TStore> {
    database: Arc<Client>,
    gateway: Arc<dyn PaymentGateway>,
    verifier: SignatureVerifier,
    currency: Currency,
    settlement_timeout: Duration,
    _marker: PhantomData<fn() -> (Store, TStore)>,
}

impl<Client, Store, TStore> DonationServiceImpl<Client, Store, TStore> {
    pub fn new(
        database: Arc<Client>,
        gateway: Arc<dyn PaymentGateway>,
        verifier: SignatureVerifier,
        currency: Currency,
    ) -> Self {
        Self {
            database,
            gateway,
            verifier,
            currency,
            settlement_timeout: DEFAULT_SETTLEMENT_TIMEOUT,
            _marker: PhantomData,
        }
    }

    /// Upper bound on recording a verified payment. Exceeding it is reported
    /// as a recording failure, never as a generic timeout.
    pub fn with_settlement_timeout(mut self, settlement_timeout: Duration) -> Self {
        self.settlement_timeout = settlement_timeout;
        self
    }
}

/// A settlement callback that passed input validation. Not yet verified.
struct Callback {
    order_id: String,
    payment_id: String,
    signature: String,
    donor_name: String,
    donor_email: String,
    /// What the checkout claims was paid, in major units. Informational only.
    reported_amount: Option<f64>,
}

fn validate_callback(request: SettleDonationRequest) -> Result<Callback, DonationError> {
    let invalid = |status: Status| DonationError::Validation(status.message().to_string());
    Ok(Callback {
        order_id: required_field("order_id", &request.order_id).map_err(invalid)?,
        payment_id: required_field("payment_id", &request.payment_id).map_err(invalid)?,
        signature: required_field("signature", &request.signature).map_err(invalid)?,
        donor_name: validate_name("donor_name", &request.donor_name).map_err(invalid)?,
        donor_email: validate_email("donor_email", &request.donor_email).map_err(invalid)?,
        reported_amount: request.amount,
    })
}

fn new_receipt() -> String {
    format!("rcpt_{}", Uuid::new_v4().simple())
}

impl<Client, Store, TStore> DonationServiceImpl<Client, Store, TStore>
where
    Client: DatabaseClient<Store, TStore> + 'static,
    Store: DonationStore + DonationOrderStore + OnDemandStore + 'static,
    TStore: DonationStore + DonationOrderStore + TransactionalStore + 'static,
{
    // Writes the donation for a callback whose signature has been verified.
    async fn record_settlement(&self, callback: &Callback) -> Result<InsertedDonation, StorageError> {
        let txn = self.database.begin().await?;

        // The stored order, not the client, decides how much was paid.
        let order = txn
            .find_donation_order_by_id(callback.order_id.clone())
            .await?
            .ok_or_else(|| {
                anyhow::anyhow!("donation order {} is not known locally", callback.order_id)
            })?;
        let reported = callback
            .reported_amount
            .map(|amount| Money::from_major(self.currency, amount));
        match reported {
            Some(Ok(reported)) if reported.minor_units == order.amount_minor => {}
            Some(Ok(reported)) => warn!(
                "Payment {} reported {} minor units but order {} is for {}; recording the order amount",
                callback.payment_id, reported.minor_units, order.order_id, order.amount_minor
            ),
            Some(Err(e)) => warn!(
                "Payment {} reported an unusable amount for order {} ({}); recording the order amount",
                callback.payment_id, order.order_id, e
            ),
            None => {}
        }

        let inserted = txn
            .insert_donation_if_absent(NewDonationRow {
                donation_id: callback.payment_id.clone(),
                create_time: Utc::now(),
                order_id: order.order_id,
                donor_name: callback.donor_name.clone(),
                donor_email: callback.donor_email.clone(),
                amount_minor: order.amount_minor,
                currency: order.currency,
                status: StoreDonationStatus::Completed,
            })
            .await?;
        txn.commit().await?;

        Ok(inserted)
    }
}

#[async_trait]
impl<Client, Store, TStore> DonationService for DonationServiceImpl<Client, Store, TStore>
where
    Client: DatabaseClient<Store, TStore> + 'static,
    Store: DonationStore + DonationOrderStore + OnDemandStore + 'static,
    TStore: DonationStore + DonationOrderStore + TransactionalStore + 'static,
{
    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<DonationOrder, DonationError> {
        let amount = Money::from_major(self.currency, request.amount)
            .map_err(|e| DonationError::Validation(format!("'amount' is invalid: {}", e)))?;

        let receipt = new_receipt();
        let order = self
            .gateway
            .create_order(NewGatewayOrder {
                amount: amount.minor_units,
                currency: amount.currency_code().to_string(),
                receipt: receipt.clone(),
            })
            .await
            .map_err(|e| {
                warn!("Gateway rejected order for receipt {}: {:?}", receipt, e);
                e
            })?;

        let row = self
            .database
            .on_demand()
            .add_donation_order(NewDonationOrderRow {
                order_id: order.id,
                create_time: Utc::now(),
                receipt,
                amount_minor: order.amount,
                currency: order.currency,
            })
            .await?;
        info!(
            "Created donation order {} for {} minor units {}",
            row.order_id, row.amount_minor, row.currency
        );

        Ok(DonationOrder {
            order_id: row.order_id,
            amount_minor_units: row.amount_minor,
            currency: row.currency,
            receipt: row.receipt,
            key_id: self.gateway.key_id(),
        })
    }

    async fn settle_donation(
        &self,
        request: SettleDonationRequest,
    ) -> Result<SettleDonationResponse, DonationError> {
        let callback = validate_callback(request)?;

        if !self.verifier.verify(
            &callback.order_id,
            &callback.payment_id,
            &callback.signature,
        ) {
            warn!(
                "Rejected settlement for order {} payment {}: signature mismatch",
                callback.order_id, callback.payment_id
            );
            return Err(DonationError::SignatureMismatch {
                order_id: callback.order_id,
            });
        }

        let recording = self.record_settlement(&callback);
        let recorded = tokio::time::timeout(self.settlement_timeout, recording)
            .await
            .unwrap_or_else(|_| {
                Err(StorageError::Other(anyhow::anyhow!(
                    "recording did not finish within {:?}",
                    self.settlement_timeout
                )))
            });
        let inserted = recorded.map_err(|source| {
            error!(
                "Payment {} for order {} was captured but recording failed, needs reconciliation: {:?}",
                callback.payment_id, callback.order_id, source
            );
            DonationError::SettlementRecording {
                payment_id: callback.payment_id.clone(),
                source,
            }
        })?;

        let (row, already_settled) = match inserted {
            InsertedDonation::Inserted(row) => {
                info!("Recorded donation {} for order {}", row.donation_id, row.order_id);
                (row, false)
            }
            InsertedDonation::AlreadyExists(row) => {
                info!("Donation {} was already settled", row.donation_id);
                (row, true)
            }
        };

        Ok(SettleDonationResponse {
            donation: row.into_api()?,
            already_settled,
        })
    }

    async fn get_donation(&self, donation_id: String) -> Result<Donation, Status> {
        let donation_id = required_field("donation_id", &donation_id)?;

        let row = self
            .database
            .on_demand()
            .find_donation_by_id(donation_id.clone())
            .await?
            .ok_or_else(|| not_found!("donation {} not found", donation_id))?;

        row.into_api()
    }

    async fn list_donations(
        &self,
        request: ListDonationsRequest,
    ) -> Result<ListDonationsResponse, Status> {
        let page_size = page_size(request.page_size, DEFAULT_PAGE_SIZE);
        let page_token =
            DonationPageToken::deserialize_page_token(request.page_token.as_deref().unwrap_or(""))
                .map_err(|e| invalid_argument!("'page_token' is invalid: {:?}", e))?;
        let status = request
            .status
            .map(|status| StoreDonationStatus::from_api_field(status, "status"))
            .transpose()?;

        let (rows_plus_one, total_count) = self
            .database
            .on_demand()
            .list_and_count_donations(page_size + 1, page_token, status)
            .await?;

        let (page_rows, next_page_rows) =
            rows_plus_one.split_at(min(rows_plus_one.len(), page_size as usize));

        let mut donations = Vec::new();
        for row in page_rows {
            donations.push(row.clone().into_api()?);
        }

        // Next page token or empty string.
        let next_page_token = next_page_rows
            .first()
            .map(|next_row| next_row.page_token().serialize_page_token())
            .unwrap_or(Ok("".to_string()))?;

        Ok(ListDonationsResponse {
            donations,
            next_page_token,
            total_count,
        })
    }
}

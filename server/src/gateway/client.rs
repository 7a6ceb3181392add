use crate::gateway::{Error, GatewayOrder, NewGatewayOrder, PaymentGateway};
use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

pub struct GatewayCredentials {
    key_id: String,
    key_secret: String,
}

impl GatewayCredentials {
    pub fn new(key_id: String, key_secret: String) -> Self {
        Self { key_id, key_secret }
    }
}

/// REST client for a Razorpay-compatible orders API.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    credentials: GatewayCredentials,
}

impl GatewayClient {
    pub fn new(
        base_url: &str,
        credentials: GatewayCredentials,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn orders_url(&self) -> String {
        format!("{}/v1/orders", self.base_url)
    }
}

#[async_trait]
impl PaymentGateway for GatewayClient {
    fn key_id(&self) -> String {
        self.credentials.key_id.clone()
    }

    async fn create_order(&self, order: NewGatewayOrder) -> Result<GatewayOrder, Error> {
        debug!("Creating gateway order for receipt {}", order.receipt);
        let response = self
            .http
            .post(self.orders_url())
            .basic_auth(&self.credentials.key_id, Some(&self.credentials.key_secret))
            .json(&order)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        let created = decode_order_response(status, &body)?;
        check_order_matches(&order, &created)?;
        Ok(created)
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

fn decode_order_response(status: StatusCode, body: &[u8]) -> Result<GatewayOrder, Error> {
    if status.is_success() {
        return Ok(serde_json::from_slice(body)?);
    }
    let detail = serde_json::from_slice::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error)
        .unwrap_or_else(|_| ErrorDetail {
            code: "UNKNOWN".to_string(),
            description: String::from_utf8_lossy(body).into_owned(),
        });
    Err(Error::ClientError {
        status,
        code: detail.code,
        description: detail.description,
    })
}

fn check_order_matches(requested: &NewGatewayOrder, created: &GatewayOrder) -> Result<(), Error> {
    if created.amount != requested.amount
        || !created.currency.eq_ignore_ascii_case(&requested.currency)
    {
        return Err(Error::OrderMismatch {
            order_id: created.id.clone(),
            requested: requested.amount,
            requested_currency: requested.currency.clone(),
            returned: created.amount,
            returned_currency: created.currency.clone(),
        });
    }
    Ok(())
}

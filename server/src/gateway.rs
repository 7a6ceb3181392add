use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod client;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("request error: {0:?}")]
    Http(#[from] reqwest::Error),

    #[error("json deserialization error: {0:?}")]
    Json(#[from] serde_json::Error),

    #[error("gateway client error: status={status}, code={code}, description={description}")]
    ClientError {
        status: reqwest::StatusCode,
        code: String,
        description: String,
    },

    #[error("gateway returned order {order_id} for {returned} {returned_currency}, requested {requested} {requested_currency}")]
    OrderMismatch {
        order_id: String,
        requested: i64,
        requested_currency: String,
        returned: i64,
        returned_currency: String,
    },
}

/// Order creation request, amount in minor units.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewGatewayOrder {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Payment provider that issues orders for the hosted checkout.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Public key id handed to the checkout widget.
    fn key_id(&self) -> String;

    async fn create_order(&self, order: NewGatewayOrder) -> Result<GatewayOrder, Error>;
}

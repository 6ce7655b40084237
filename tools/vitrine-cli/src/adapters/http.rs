//! Storefront backend over HTTP.
//!
//! - `GET  {base}/companies/{id}/delivery` returns the delivery settings in
//!   either schema.
//! - `POST {base}/companies/{id}/orders` creates an order and answers with
//!   its server-assigned id.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use vitrine_commerce::checkout::{OrderReceipt, OrderRequest};
use vitrine_commerce::ports::{DeliveryConfigSource, OrderGateway};
use vitrine_commerce::{CompanyId, NetworkError, OrderId};

/// HTTP client for the storefront API.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    /// `timeout` bounds every request; order placement has its own, usually
    /// longer, limit applied by the checkout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .user_agent(concat!("vitrine/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NetworkError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn company_url(&self, company_id: &CompanyId, path: &str) -> String {
        format!("{}/companies/{}/{}", self.base_url, company_id, path)
    }

    fn transport_error(&self, e: reqwest::Error) -> NetworkError {
        if e.is_timeout() {
            NetworkError::Timeout(self.timeout)
        } else {
            NetworkError::Transport(e.to_string())
        }
    }
}

async fn ensure_success(res: Response) -> Result<Response, NetworkError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let text = res.text().await.unwrap_or_else(|_| "unknown".to_string());
    Err(NetworkError::Rejected {
        status: status.as_u16(),
        message: rejection_message(&text),
    })
}

/// Pull a readable message out of an error body.
fn rejection_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error", "mensagem"]
                .iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl DeliveryConfigSource for HttpBackend {
    async fn fetch_delivery_config(&self, company_id: &CompanyId) -> Result<Value, NetworkError> {
        let url = self.company_url(company_id, "delivery");
        debug!(%url, "fetching delivery config");
        let res = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        ensure_success(res)
            .await?
            .json::<Value>()
            .await
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()))
    }
}

/// Body of a successful order creation.
#[derive(Debug, Deserialize)]
struct CreatedOrder {
    /// Some backends send numeric ids.
    id: Value,
    #[serde(default, alias = "createdAt")]
    created_at: Option<DateTime<Utc>>,
}

impl CreatedOrder {
    fn into_receipt(self) -> Result<OrderReceipt, NetworkError> {
        let id = match self.id {
            Value::String(s) if !s.trim().is_empty() => s,
            Value::Number(n) => n.to_string(),
            other => {
                return Err(NetworkError::InvalidResponse(format!("unusable order id: {other}")))
            }
        };
        // the order exists server-side at this point
        let created_at = self.created_at.unwrap_or_else(|| {
            warn!(order_id = %id, "order response has no created_at, using local time");
            Utc::now()
        });
        Ok(OrderReceipt {
            id: OrderId::new(id),
            created_at,
        })
    }
}

#[async_trait]
impl OrderGateway for HttpBackend {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt, NetworkError> {
        let url = self.company_url(&request.company_id, "orders");
        debug!(%url, "creating order");
        // no per-request timeout here; the checkout bounds the whole round trip
        let res = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        ensure_success(res)
            .await?
            .json::<CreatedOrder>()
            .await
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()))?
            .into_receipt()
    }
}

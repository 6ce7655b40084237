//! External collaborators of the checkout.
//!
//! The core never talks to the network or to disk itself; it goes through
//! these traits. The CLI provides HTTP and file implementations, tests use
//! the in-memory ones from [`memory`].

pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::checkout::{OrderReceipt, OrderRequest, PersonalInfo};
use crate::delivery::{DeliveryConfig, NormalizedDeliveryConfig};
use crate::error::{NetworkError, StoreError};
use crate::ids::CompanyId;

pub use memory::{InMemoryDeliveryConfigs, InMemoryOrderGateway, InMemoryPersonalInfoStore};

/// Source of a company's raw delivery settings document.
#[async_trait]
pub trait DeliveryConfigSource: Send + Sync {
    /// Fetch the settings exactly as the backend stores them; either schema.
    async fn fetch_delivery_config(&self, company_id: &CompanyId) -> Result<Value, NetworkError>;
}

/// Order-creation endpoint.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Create the order. Called at most once per submission, never retried.
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt, NetworkError>;
}

/// Saved customer details, keyed to the local session.
#[async_trait]
pub trait PersonalInfoStore: Send + Sync {
    async fn get(&self) -> Result<Option<PersonalInfo>, StoreError>;

    async fn save(&self, info: &PersonalInfo) -> Result<(), StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}

/// Fetch and normalize a company's delivery settings.
///
/// Fetch failures are returned; an unrecognized document degrades to
/// [`NormalizedDeliveryConfig::disabled`].
pub async fn load_delivery_config<S: DeliveryConfigSource + ?Sized>(
    source: &S,
    company_id: &CompanyId,
) -> Result<NormalizedDeliveryConfig, NetworkError> {
    let raw = source.fetch_delivery_config(company_id).await?;
    let config = DeliveryConfig::normalize_value(&raw);
    debug!(
        company_id = %company_id,
        enabled = config.delivery_enabled,
        fee = %config.fee,
        minimum = %config.minimum_order,
        "delivery config loaded"
    );
    Ok(config)
}

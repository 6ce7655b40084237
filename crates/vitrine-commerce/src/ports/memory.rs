//! In-memory collaborators for tests and dry runs.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::checkout::{OrderReceipt, OrderRequest, PersonalInfo};
use crate::error::{NetworkError, StoreError};
use crate::ids::{CompanyId, OrderId};
use crate::ports::{DeliveryConfigSource, OrderGateway, PersonalInfoStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Delivery documents keyed by company.
#[derive(Debug, Default)]
pub struct InMemoryDeliveryConfigs {
    configs: HashMap<CompanyId, Value>,
}

impl InMemoryDeliveryConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, company_id: impl Into<CompanyId>, document: Value) -> Self {
        self.configs.insert(company_id.into(), document);
        self
    }
}

#[async_trait]
impl DeliveryConfigSource for InMemoryDeliveryConfigs {
    async fn fetch_delivery_config(&self, company_id: &CompanyId) -> Result<Value, NetworkError> {
        self.configs
            .get(company_id)
            .cloned()
            .ok_or_else(|| NetworkError::Rejected {
                status: 404,
                message: format!("company {company_id} not found"),
            })
    }
}

/// Order gateway that accepts everything and records what it was sent.
///
/// Ids are assigned sequentially as `ord-1`, `ord-2`, ... An optional delay
/// simulates the round trip; queued failures are returned, one per call,
/// before any order is accepted again.
#[derive(Debug, Default)]
pub struct InMemoryOrderGateway {
    delay: Option<Duration>,
    requests: Mutex<Vec<OrderRequest>>,
    failures: Mutex<VecDeque<NetworkError>>,
    next_id: AtomicU64,
}

impl InMemoryOrderGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: NetworkError) {
        lock(&self.failures).push_back(error);
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<OrderRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl OrderGateway for InMemoryOrderGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt, NetworkError> {
        lock(&self.requests).push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = lock(&self.failures).pop_front() {
            return Err(error);
        }
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(OrderReceipt {
            id: OrderId::new(format!("ord-{n}")),
            created_at: Utc::now(),
        })
    }
}

/// Personal info kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryPersonalInfoStore {
    info: Mutex<Option<PersonalInfo>>,
}

impl InMemoryPersonalInfoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonalInfoStore for InMemoryPersonalInfoStore {
    async fn get(&self) -> Result<Option<PersonalInfo>, StoreError> {
        Ok(lock(&self.info).clone())
    }

    async fn save(&self, info: &PersonalInfo) -> Result<(), StoreError> {
        *lock(&self.info) = Some(info.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *lock(&self.info) = None;
        Ok(())
    }
}

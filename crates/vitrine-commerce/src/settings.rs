//! Tunables for carts and order submission.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per cart entry unless configured otherwise.
pub const DEFAULT_MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// Default timeout for the order-creation round trip.
pub const DEFAULT_ORDER_TIMEOUT: Duration = Duration::from_secs(15);

/// Checkout settings.
///
/// Deserializes from `order_timeout_secs` and `max_quantity_per_item`; both
/// are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    #[serde(
        rename = "order_timeout_secs",
        with = "duration_secs",
        default = "default_order_timeout"
    )]
    pub order_timeout: Duration,

    #[serde(default = "default_max_quantity")]
    pub max_quantity_per_item: i64,
}

fn default_order_timeout() -> Duration {
    DEFAULT_ORDER_TIMEOUT
}

fn default_max_quantity() -> i64 {
    DEFAULT_MAX_QUANTITY_PER_ITEM
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            order_timeout: DEFAULT_ORDER_TIMEOUT,
            max_quantity_per_item: DEFAULT_MAX_QUANTITY_PER_ITEM,
        }
    }
}

impl CheckoutSettings {
    pub fn with_order_timeout(mut self, timeout: Duration) -> Self {
        self.order_timeout = timeout;
        self
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

//! Delivery eligibility rules over a normalized config.

use serde::{Deserialize, Serialize};

use crate::delivery::NormalizedDeliveryConfig;
use crate::error::BusinessRuleViolation;
use crate::money::Money;

/// Whether `subtotal` satisfies the store's minimum order.
///
/// A zero minimum means the store has none.
pub fn is_minimum_reached(subtotal: Money, config: &NormalizedDeliveryConfig) -> bool {
    config.minimum_order.is_zero() || subtotal >= config.minimum_order
}

/// How much is still missing to reach the minimum order; never negative.
pub fn remaining_to_minimum(subtotal: Money, config: &NormalizedDeliveryConfig) -> Money {
    config
        .minimum_order
        .checked_sub(subtotal)
        .filter(Money::is_positive)
        .unwrap_or_default()
}

pub fn has_neighborhood_restriction(config: &NormalizedDeliveryConfig) -> bool {
    config.restricted_neighborhoods.is_some()
}

/// Neighborhoods the store delivers to; empty when unrestricted.
pub fn neighborhood_list(config: &NormalizedDeliveryConfig) -> &[String] {
    config.restricted_neighborhoods.as_deref().unwrap_or_default()
}

/// Whether the store delivers to `neighborhood`. Comparison ignores case and
/// surrounding whitespace. Always true when delivery is unrestricted.
pub fn serves_neighborhood(config: &NormalizedDeliveryConfig, neighborhood: &str) -> bool {
    match &config.restricted_neighborhoods {
        None => true,
        Some(list) => {
            let wanted = neighborhood.trim().to_lowercase();
            list.iter().any(|n| n.trim().to_lowercase() == wanted)
        }
    }
}

/// Delivery figures for a subtotal, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryQuote {
    pub subtotal: Money,
    /// Fee charged; zero for pickup.
    pub fee: Money,
    pub total: Money,
    pub minimum_order: Money,
    pub minimum_reached: bool,
    pub remaining_to_minimum: Money,
    pub is_delivery: bool,
}

impl DeliveryQuote {
    pub fn compute(subtotal: Money, config: &NormalizedDeliveryConfig, is_delivery: bool) -> Self {
        let fee = if is_delivery { config.fee } else { Money::zero() };
        Self {
            subtotal,
            fee,
            total: subtotal + fee,
            minimum_order: config.minimum_order,
            minimum_reached: is_minimum_reached(subtotal, config),
            remaining_to_minimum: remaining_to_minimum(subtotal, config),
            is_delivery,
        }
    }

    /// The rule that blocks this quote from being ordered, if any.
    ///
    /// Only delivery orders are held to the minimum.
    pub fn violation(&self) -> Option<BusinessRuleViolation> {
        if self.subtotal.is_zero() {
            return Some(BusinessRuleViolation::NothingToCharge);
        }
        if self.is_delivery && !self.minimum_reached {
            return Some(BusinessRuleViolation::MinimumNotReached {
                minimum: self.minimum_order,
                remaining: self.remaining_to_minimum,
            });
        }
        None
    }
}

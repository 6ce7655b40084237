//! Delivery module.
//!
//! Store delivery settings arrive in one of two schemas. [`DeliveryConfig`]
//! recognizes both and normalizes them into [`NormalizedDeliveryConfig`];
//! the eligibility rules only ever see the normalized form.

mod config;
mod eligibility;

pub use config::{DeliveryConfig, DeliverySettings, NormalizedDeliveryConfig};
pub use eligibility::{
    has_neighborhood_restriction, is_minimum_reached, neighborhood_list, remaining_to_minimum,
    serves_neighborhood, DeliveryQuote,
};

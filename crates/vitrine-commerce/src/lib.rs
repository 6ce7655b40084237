//! Cart, delivery and checkout logic for Vitrine storefronts.
//!
//! This crate holds the client-side commerce core of a multi-tenant
//! storefront:
//!
//! - **Cart**: entries keyed by product and variation, merged on re-add
//! - **Delivery**: legacy and modern delivery settings normalized into one
//!   shape, minimum order and neighborhood rules
//! - **Checkout**: four-step flow with per-step validity, order placement
//!   guarded against double submission
//! - **Ports**: traits for the delivery settings source, the order endpoint
//!   and the saved customer profile
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vitrine_commerce::prelude::*;
//!
//! let mut cart = Cart::new("padaria-do-ze");
//! cart.add_item(CartCandidate::product("p1", "Pão de queijo", Money::from_cents(1000), 3))?;
//!
//! let delivery = load_delivery_config(&source, cart.company_id()).await?;
//! let session = CheckoutSession::open(cart, delivery, Arc::new(gateway), CheckoutSettings::default());
//! session.prefill(profile);
//! session.with_flow(|flow| {
//!     flow.go_next()?;
//!     flow.go_next()?;
//!     flow.set_payment_method(PaymentMethod::Pix)
//! });
//!
//! if let SubmitOutcome::Placed(order) = session.submit().await {
//!     println!("Order {} placed: {}", order.id, order.total);
//! }
//! ```

pub mod error;
pub mod ids;
pub mod money;
pub mod settings;

pub mod cart;
pub mod checkout;
pub mod delivery;
pub mod ports;

pub use error::{
    BusinessRuleViolation, CartError, ConfigParseError, NetworkError, OrderError, RequiredField,
    StepBlocker, StoreError, ValidationError,
};
pub use ids::*;
pub use money::Money;
pub use settings::CheckoutSettings;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{
        BusinessRuleViolation, CartError, NetworkError, OrderError, RequiredField, StepBlocker,
        StoreError, ValidationError,
    };
    pub use crate::ids::*;
    pub use crate::money::Money;
    pub use crate::settings::CheckoutSettings;

    // Cart
    pub use crate::cart::{is_same_product, Cart, CartCandidate, CartItem, ProductIdentity};

    // Delivery
    pub use crate::delivery::{
        is_minimum_reached, remaining_to_minimum, serves_neighborhood, DeliveryConfig,
        DeliveryQuote, NormalizedDeliveryConfig,
    };

    // Checkout
    pub use crate::checkout::{
        CheckoutFlow, CheckoutSession, CheckoutStep, Order, OrderRequest, PaymentMethod,
        PersonalInfo, SessionSignal, SubmitOutcome,
    };

    // Ports
    pub use crate::ports::{
        load_delivery_config, DeliveryConfigSource, OrderGateway, PersonalInfoStore,
    };
}

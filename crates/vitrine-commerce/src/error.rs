//! Commerce error types.
//!
//! Every error here is a recoverable state of the checkout flow: validation
//! and business-rule failures block navigation, network failures leave the
//! flow on the payment step ready for a manual retry, and config parse
//! failures degrade to "no delivery".

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::checkout::CheckoutStep;
use crate::money::Money;

/// Errors raised by cart mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Quantity must be positive when adding.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds the per-item cap.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Unit price must not be negative.
    #[error("Invalid unit price: {0}")]
    InvalidPrice(Money),

    /// Arithmetic overflow in a money or quantity calculation.
    #[error("Arithmetic overflow in cart calculation")]
    Overflow,
}

/// A field the customer must fill in before moving on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Name,
    Phone,
    Address,
    Number,
    Neighborhood,
    PaymentMethod,
}

impl RequiredField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::Name => "name",
            RequiredField::Phone => "phone",
            RequiredField::Address => "address",
            RequiredField::Number => "number",
            RequiredField::Neighborhood => "neighborhood",
            RequiredField::PaymentMethod => "payment method",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Required fields of a step are missing or blank.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing required fields: {}", join_fields(.missing))]
pub struct ValidationError {
    pub missing: Vec<RequiredField>,
}

impl ValidationError {
    pub fn new(missing: Vec<RequiredField>) -> Self {
        Self { missing }
    }

    pub fn is_missing(&self, field: RequiredField) -> bool {
        self.missing.contains(&field)
    }
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(RequiredField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A store rule prevents the customer from continuing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusinessRuleViolation {
    /// Nothing to check out.
    #[error("Cart is empty")]
    EmptyCart,

    /// The quoted subtotal is zero.
    #[error("Nothing to charge: the subtotal is zero")]
    NothingToCharge,

    /// Delivery selected but the subtotal is below the store's minimum.
    #[error("Minimum order for delivery is {minimum}; add {remaining} more")]
    MinimumNotReached { minimum: Money, remaining: Money },

    /// Delivery selected for a store that does not deliver.
    #[error("This store does not offer delivery")]
    DeliveryUnavailable,
}

/// Why the checkout flow refused to move forward or to submit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepBlocker {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    BusinessRule(#[from] BusinessRuleViolation),

    /// Already on the last step.
    #[error("No step after {0}")]
    FinalStep(CheckoutStep),

    /// Submission must start from the payment step.
    #[error("Orders are submitted from the payment step, not from {0}")]
    NotAtPayment(CheckoutStep),

    /// An order request is in flight.
    #[error("An order submission is already in progress")]
    SubmissionPending,

    /// The order has been placed; the flow is terminal.
    #[error("Checkout already completed")]
    Completed,
}

/// The order-creation round trip failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Order request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with an error.
    #[error("Server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend answered with something we cannot read.
    #[error("Malformed response: {0}")]
    InvalidResponse(String),
}

/// Errors returned by the order submission workflow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Preconditions for placing the order do not hold.
    #[error("Order cannot be placed: {0}")]
    Blocked(#[from] StepBlocker),
}

impl OrderError {
    /// Whether the customer may simply try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OrderError::Network(_))
    }
}

/// A delivery configuration document that matches neither known schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized delivery configuration: {0}")]
pub struct ConfigParseError(pub String);

/// Personal info persistence failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

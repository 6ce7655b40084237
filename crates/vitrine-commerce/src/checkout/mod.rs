//! Checkout module.
//!
//! Contains the step state machine, customer details, order payloads and the
//! asynchronous submission.

mod customer;
mod flow;
mod order;
mod session;
mod step;
mod submission;

pub use customer::{PaymentMethod, PersonalInfo};
pub use flow::CheckoutFlow;
pub use order::{Customer, DeliveryAddress, Order, OrderLine, OrderReceipt, OrderRequest};
pub use session::{CheckoutSession, SessionSignal, SubmitOutcome};
pub use step::CheckoutStep;
pub use submission::place_order;

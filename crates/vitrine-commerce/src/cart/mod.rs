//! Shopping cart module.
//!
//! Contains the cart aggregate, its items and the identity rule that decides
//! when two purchases collapse into one entry.

mod cart;
mod identity;

pub use cart::{Cart, CartCandidate, CartItem};
pub use identity::{is_same_product, ProductIdentity};

//! Cart aggregate and cart items.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cart::{is_same_product, ProductIdentity};
use crate::error::CartError;
use crate::ids::{CartItemId, CompanyId, ProductId, VariationId};
use crate::money::Money;
use crate::settings::DEFAULT_MAX_QUANTITY_PER_ITEM;

/// Something the customer wants to put in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartCandidate {
    pub product_id: ProductId,
    /// Whether the product was chosen through one of its variations.
    #[serde(default)]
    pub has_variation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<VariationId>,
    /// Product name (denormalized for display).
    pub name: String,
    /// Variation label (e.g., "Grande").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_name: Option<String>,
    pub unit_price: Money,
    pub quantity: i64,
}

impl CartCandidate {
    /// A product sold without variations.
    pub fn product(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            has_variation: false,
            variation_id: None,
            name: name.into(),
            variation_name: None,
            unit_price,
            quantity,
        }
    }

    /// One variation of a product.
    pub fn variation(
        product_id: impl Into<ProductId>,
        variation_id: impl Into<VariationId>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            has_variation: true,
            variation_id: Some(variation_id.into()),
            name: name.into(),
            variation_name: None,
            unit_price,
            quantity,
        }
    }

    /// Set the variation label shown next to the name.
    pub fn with_variation_name(mut self, label: impl Into<String>) -> Self {
        self.variation_name = Some(label.into());
        self
    }
}

impl ProductIdentity for CartCandidate {
    fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    fn has_variation(&self) -> bool {
        self.has_variation
    }

    fn variation_id(&self) -> Option<&VariationId> {
        self.variation_id.as_ref()
    }
}

/// An entry in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Generated at insertion; stable for the life of the entry.
    pub id: CartItemId,
    pub product_id: ProductId,
    pub has_variation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<VariationId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_name: Option<String>,
    pub unit_price: Money,
    pub quantity: i64,
}

impl CartItem {
    fn from_candidate(candidate: CartCandidate) -> Self {
        Self {
            id: CartItemId::generate(),
            product_id: candidate.product_id,
            has_variation: candidate.has_variation,
            variation_id: candidate.variation_id,
            name: candidate.name,
            variation_name: candidate.variation_name,
            unit_price: candidate.unit_price,
            quantity: candidate.quantity,
        }
    }

    /// `unit_price * quantity`.
    pub fn line_total(&self) -> Money {
        self.unit_price
            .checked_mul(self.quantity)
            .unwrap_or(Money::from_cents(i64::MAX))
    }

    /// Name with the variation label, e.g. "Pizza (Grande)".
    pub fn display_name(&self) -> String {
        match &self.variation_name {
            Some(label) => format!("{} ({})", self.name, label),
            None => self.name.clone(),
        }
    }
}

impl ProductIdentity for CartItem {
    fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    fn has_variation(&self) -> bool {
        self.has_variation
    }

    fn variation_id(&self) -> Option<&VariationId> {
        self.variation_id.as_ref()
    }
}

/// The customer's cart for one store.
///
/// Items are kept in insertion order. Every mutation keeps two invariants:
/// no two entries are the same purchasable unit, and the subtotal fits in an
/// `i64` of cents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    company_id: CompanyId,
    items: Vec<CartItem>,
    max_quantity_per_item: i64,
}

impl Cart {
    /// Create an empty cart for a store.
    pub fn new(company_id: impl Into<CompanyId>) -> Self {
        Self {
            company_id: company_id.into(),
            items: Vec::new(),
            max_quantity_per_item: DEFAULT_MAX_QUANTITY_PER_ITEM,
        }
    }

    /// Override the per-item quantity cap.
    pub fn with_max_quantity_per_item(mut self, max: i64) -> Self {
        self.max_quantity_per_item = max.max(1);
        self
    }

    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    /// Add a candidate, merging it into an existing entry for the same unit.
    ///
    /// Returns the id of the entry that now holds the candidate. A merge keeps
    /// the existing entry's id, name and unit price.
    pub fn add_item(&mut self, candidate: CartCandidate) -> Result<CartItemId, CartError> {
        if candidate.quantity <= 0 {
            return Err(CartError::InvalidQuantity(candidate.quantity));
        }
        if candidate.unit_price.is_negative() {
            return Err(CartError::InvalidPrice(candidate.unit_price));
        }

        let subtotal = self.subtotal();
        let max = self.max_quantity_per_item;

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| is_same_product(&**item, &candidate))
        {
            let new_quantity = existing
                .quantity
                .checked_add(candidate.quantity)
                .ok_or(CartError::Overflow)?;
            if new_quantity > max {
                return Err(CartError::QuantityExceedsLimit(new_quantity, max));
            }
            let added = existing
                .unit_price
                .checked_mul(candidate.quantity)
                .ok_or(CartError::Overflow)?;
            subtotal.checked_add(added).ok_or(CartError::Overflow)?;

            existing.quantity = new_quantity;
            debug!(item_id = %existing.id, quantity = new_quantity, "merged cart item");
            return Ok(existing.id.clone());
        }

        if candidate.quantity > max {
            return Err(CartError::QuantityExceedsLimit(candidate.quantity, max));
        }
        let line = candidate
            .unit_price
            .checked_mul(candidate.quantity)
            .ok_or(CartError::Overflow)?;
        subtotal.checked_add(line).ok_or(CartError::Overflow)?;

        let item = CartItem::from_candidate(candidate);
        let id = item.id.clone();
        debug!(item_id = %id, product_id = %item.product_id, quantity = item.quantity, "added cart item");
        self.items.push(item);
        Ok(id)
    }

    /// Remove an entry. Returns whether anything was removed.
    pub fn remove_item(&mut self, item_id: &CartItemId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| &i.id != item_id);
        let removed = self.items.len() < len_before;
        if removed {
            debug!(item_id = %item_id, "removed cart item");
        }
        removed
    }

    /// Set an entry's quantity; zero or less removes it.
    ///
    /// Returns whether an entry with that id existed.
    pub fn set_quantity(&mut self, item_id: &CartItemId, quantity: i64) -> Result<bool, CartError> {
        if quantity <= 0 {
            return Ok(self.remove_item(item_id));
        }
        if quantity > self.max_quantity_per_item {
            return Err(CartError::QuantityExceedsLimit(
                quantity,
                self.max_quantity_per_item,
            ));
        }

        let others = Money::try_sum(
            self.items
                .iter()
                .filter(|i| &i.id != item_id)
                .map(CartItem::line_total),
        )
        .ok_or(CartError::Overflow)?;

        let Some(item) = self.items.iter_mut().find(|i| &i.id == item_id) else {
            return Ok(false);
        };
        let line = item
            .unit_price
            .checked_mul(quantity)
            .ok_or(CartError::Overflow)?;
        others.checked_add(line).ok_or(CartError::Overflow)?;

        item.quantity = quantity;
        debug!(item_id = %item_id, quantity, "updated cart item quantity");
        Ok(true)
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.items.clear();
        debug!(company_id = %self.company_id, "cleared cart");
    }

    /// Sum of `unit_price * quantity` over all entries.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Number of distinct entries.
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get_item(&self, item_id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.id == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pizza(qty: i64) -> CartCandidate {
        CartCandidate::product("p1", "Pizza", Money::from_cents(1000), qty)
    }

    #[test]
    fn test_cart_creation() {
        let cart = Cart::new("padaria");
        assert!(cart.is_empty());
        assert_eq!(cart.company_id().as_str(), "padaria");
        assert_eq!(cart.subtotal(), Money::zero());
    }

    #[test]
    fn test_add_same_product_merges() {
        let mut cart = Cart::new("padaria");
        let first = cart.add_item(pizza(1)).unwrap();
        let second = cart.add_item(pizza(2)).unwrap();

        assert_eq!(first, second);
        assert_eq!(cart.unique_item_count(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal().cents(), 3000);
    }

    #[test]
    fn test_variation_and_plain_purchase_stay_separate() {
        let mut cart = Cart::new("padaria");
        cart.add_item(pizza(1)).unwrap();
        cart.add_item(CartCandidate::variation(
            "p1",
            "grande",
            "Pizza",
            Money::from_cents(1500),
            1,
        ))
        .unwrap();
        cart.add_item(CartCandidate::variation(
            "p1",
            "media",
            "Pizza",
            Money::from_cents(1200),
            1,
        ))
        .unwrap();

        assert_eq!(cart.unique_item_count(), 3);
        assert_eq!(cart.subtotal().cents(), 3700);
    }

    #[test]
    fn test_merge_keeps_first_price() {
        let mut cart = Cart::new("padaria");
        cart.add_item(pizza(1)).unwrap();
        cart.add_item(CartCandidate::product("p1", "Pizza", Money::from_cents(9999), 1))
            .unwrap();
        assert_eq!(cart.items()[0].unit_price.cents(), 1000);
        assert_eq!(cart.subtotal().cents(), 2000);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = Cart::new("padaria");
        cart.add_item(CartCandidate::product("b", "B", Money::from_cents(1), 1))
            .unwrap();
        cart.add_item(CartCandidate::product("a", "A", Money::from_cents(1), 1))
            .unwrap();
        cart.add_item(CartCandidate::product("b", "B", Money::from_cents(1), 1))
            .unwrap();
        let names: Vec<&str> = cart.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new("padaria");
        let id = cart.add_item(pizza(1)).unwrap();
        assert!(cart.remove_item(&id));
        assert!(cart.is_empty());
        // absent id is not an error
        assert!(!cart.remove_item(&id));
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::new("padaria");
        let id = cart.add_item(pizza(1)).unwrap();

        assert!(cart.set_quantity(&id, 5).unwrap());
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.get_item(&id).unwrap().quantity, 5);

        assert!(cart.set_quantity(&id, 0).unwrap());
        assert!(cart.is_empty());

        assert!(!cart.set_quantity(&CartItemId::new("missing"), 3).unwrap());
    }

    #[test]
    fn test_negative_quantity_removes() {
        let mut cart = Cart::new("padaria");
        let id = cart.add_item(pizza(2)).unwrap();
        assert!(cart.set_quantity(&id, -1).unwrap());
        assert!(cart.get_item(&id).is_none());
    }

    #[test]
    fn test_invalid_quantity_on_add() {
        let mut cart = Cart::new("padaria");
        assert_eq!(cart.add_item(pizza(0)), Err(CartError::InvalidQuantity(0)));
        assert_eq!(cart.add_item(pizza(-2)), Err(CartError::InvalidQuantity(-2)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut cart = Cart::new("padaria");
        let refund = CartCandidate::product("p9", "Refund", Money::from_cents(-5000), 1);
        assert_eq!(
            cart.add_item(refund),
            Err(CartError::InvalidPrice(Money::from_cents(-5000)))
        );
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::zero());

        let free = CartCandidate::product("p8", "Sample", Money::zero(), 1);
        assert!(cart.add_item(free).is_ok());
    }

    #[test]
    fn test_quantity_limit() {
        let mut cart = Cart::new("padaria").with_max_quantity_per_item(5);
        assert_eq!(
            cart.add_item(pizza(6)),
            Err(CartError::QuantityExceedsLimit(6, 5))
        );
        cart.add_item(pizza(4)).unwrap();
        assert_eq!(
            cart.add_item(pizza(2)),
            Err(CartError::QuantityExceedsLimit(6, 5))
        );
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_overflow_rejected() {
        let mut cart = Cart::new("padaria");
        let huge = CartCandidate::product("x", "X", Money::from_cents(i64::MAX / 2), 1);
        cart.add_item(huge.clone()).unwrap();
        let other = CartCandidate::product("y", "Y", Money::from_cents(i64::MAX / 2 + 10), 1);
        assert_eq!(cart.add_item(other), Err(CartError::Overflow));
        assert_eq!(cart.unique_item_count(), 1);
    }

    #[test]
    fn test_display_name() {
        let mut cart = Cart::new("padaria");
        let id = cart
            .add_item(
                CartCandidate::variation("p1", "g", "Pizza", Money::from_cents(1), 1)
                    .with_variation_name("Grande"),
            )
            .unwrap();
        assert_eq!(cart.get_item(&id).unwrap().display_name(), "Pizza (Grande)");
    }
}

//! Order payloads and placed orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartItem};
use crate::checkout::{PaymentMethod, PersonalInfo};
use crate::delivery::DeliveryQuote;
use crate::ids::{CompanyId, OrderId, ProductId, VariationId};
use crate::money::{decimal_comma, Money};

/// One line of the order-creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<VariationId>,
    pub name: String,
    pub quantity: i64,
    #[serde(with = "decimal_comma")]
    pub unit_price: Money,
    #[serde(with = "decimal_comma")]
    pub total: Money,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            variation_id: item.variation_id.clone(),
            name: item.display_name(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total: item.line_total(),
        }
    }
}

/// Where a delivery order goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub address: String,
    pub number: String,
    pub neighborhood: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl From<&PersonalInfo> for DeliveryAddress {
    fn from(info: &PersonalInfo) -> Self {
        Self {
            address: info.address.trim().to_string(),
            number: info.number.trim().to_string(),
            neighborhood: info.neighborhood.trim().to_string(),
            complement: info.complement.clone(),
            reference: info.reference.clone(),
        }
    }
}

/// Customer contact sent with the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
}

/// Immutable order-creation payload, built once per submission.
///
/// Monetary fields are sent as decimal-comma strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub company_id: CompanyId,
    #[serde(rename = "items")]
    pub lines: Vec<OrderLine>,
    #[serde(with = "decimal_comma")]
    pub subtotal: Money,
    #[serde(with = "decimal_comma")]
    pub delivery_fee: Money,
    #[serde(with = "decimal_comma")]
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub is_delivery: bool,
    pub customer: Customer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<DeliveryAddress>,
    /// Snapshot of the cart entries, kept for the placed order.
    #[serde(skip)]
    pub cart_items: Vec<CartItem>,
}

impl OrderRequest {
    pub fn build(
        cart: &Cart,
        quote: &DeliveryQuote,
        personal_info: &PersonalInfo,
        payment_method: PaymentMethod,
    ) -> Self {
        let delivery_address = quote
            .is_delivery
            .then(|| DeliveryAddress::from(personal_info));
        Self {
            company_id: cart.company_id().clone(),
            lines: cart.items().iter().map(OrderLine::from).collect(),
            subtotal: quote.subtotal,
            delivery_fee: quote.fee,
            total: quote.total,
            payment_method,
            is_delivery: quote.is_delivery,
            customer: Customer {
                name: personal_info.name.trim().to_string(),
                phone: personal_info.phone.trim().to_string(),
            },
            delivery_address,
            cart_items: cart.items().to_vec(),
        }
    }

    /// Total number of units ordered.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// What the backend answers when it accepts an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
}

/// A placed order. Never modified by the client afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Server-assigned.
    pub id: OrderId,
    pub company_id: CompanyId,
    pub items: Vec<CartItem>,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub is_delivery: bool,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn from_receipt(request: OrderRequest, receipt: OrderReceipt) -> Self {
        Self {
            id: receipt.id,
            company_id: request.company_id,
            items: request.cart_items,
            subtotal: request.subtotal,
            delivery_fee: request.delivery_fee,
            total: request.total,
            payment_method: request.payment_method,
            is_delivery: request.is_delivery,
            created_at: receipt.created_at,
        }
    }

    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartCandidate;
    use crate::delivery::NormalizedDeliveryConfig;

    fn cart() -> Cart {
        let mut cart = Cart::new("padaria");
        cart.add_item(CartCandidate::product("p1", "Pão", Money::from_cents(150), 4))
            .unwrap();
        cart.add_item(
            CartCandidate::variation("p2", "g", "Bolo", Money::from_cents(3000), 1)
                .with_variation_name("Grande"),
        )
        .unwrap();
        cart
    }

    fn info() -> PersonalInfo {
        PersonalInfo::new("Ana", " 1199 ", "Rua A", "10", "Centro")
    }

    #[test]
    fn test_delivery_request() {
        let cart = cart();
        let config = NormalizedDeliveryConfig::enabled(Money::from_cents(500), Money::zero());
        let quote = DeliveryQuote::compute(cart.subtotal(), &config, true);
        let request = OrderRequest::build(&cart, &quote, &info(), PaymentMethod::Pix);

        assert_eq!(request.subtotal.cents(), 3600);
        assert_eq!(request.delivery_fee.cents(), 500);
        assert_eq!(request.total.cents(), 4100);
        assert_eq!(request.item_count(), 5);
        assert_eq!(request.lines[1].name, "Bolo (Grande)");
        assert_eq!(request.customer.phone, "1199");
        assert_eq!(request.delivery_address.as_ref().unwrap().neighborhood, "Centro");
    }

    #[test]
    fn test_pickup_request_has_no_address_or_fee() {
        let cart = cart();
        let config = NormalizedDeliveryConfig::enabled(Money::from_cents(500), Money::zero());
        let quote = DeliveryQuote::compute(cart.subtotal(), &config, false);
        let request = OrderRequest::build(&cart, &quote, &info(), PaymentMethod::Pix);

        assert_eq!(request.delivery_fee, Money::zero());
        assert_eq!(request.total.cents(), 3600);
        assert!(request.delivery_address.is_none());
    }

    #[test]
    fn test_wire_format_uses_decimal_comma() {
        let cart = cart();
        let quote = DeliveryQuote::compute(cart.subtotal(), &NormalizedDeliveryConfig::disabled(), false);
        let request = OrderRequest::build(&cart, &quote, &info(), PaymentMethod::CreditCard);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["subtotal"], "36,00");
        assert_eq!(json["total"], "36,00");
        assert_eq!(json["items"][0]["unit_price"], "1,50");
        assert_eq!(json["items"][0]["total"], "6,00");
        assert_eq!(json["payment_method"]["type"], "credit_card");
        assert!(json.get("cart_items").is_none());
        assert!(json.get("delivery_address").is_none());
    }

    #[test]
    fn test_order_takes_server_id() {
        let cart = cart();
        let quote = DeliveryQuote::compute(cart.subtotal(), &NormalizedDeliveryConfig::disabled(), false);
        let request = OrderRequest::build(&cart, &quote, &info(), PaymentMethod::Pix);
        let receipt = OrderReceipt {
            id: OrderId::new("srv-42"),
            created_at: Utc::now(),
        };
        let order = Order::from_receipt(request, receipt.clone());

        assert_eq!(order.id.as_str(), "srv-42");
        assert_eq!(order.created_at, receipt.created_at);
        assert_eq!(order.items, cart.items());
        assert_eq!(order.item_count(), 5);
    }
}

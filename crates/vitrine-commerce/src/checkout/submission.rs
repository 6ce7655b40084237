//! The order-creation round trip.

use std::time::Duration;

use tracing::{info_span, warn, Instrument};

use crate::cart::Cart;
use crate::checkout::{CheckoutFlow, Order, OrderRequest};
use crate::error::{NetworkError, OrderError};
use crate::ports::OrderGateway;
use crate::settings::CheckoutSettings;

/// Send `request` to the gateway once and turn the receipt into an [`Order`].
///
/// Never retries. A round trip longer than `timeout` is reported as
/// [`NetworkError::Timeout`]. The order id always comes from the server; a
/// receipt without one is a malformed response.
pub async fn place_order<G: OrderGateway + ?Sized>(
    gateway: &G,
    request: OrderRequest,
    timeout: Duration,
) -> Result<Order, OrderError> {
    let span = info_span!(
        "place_order",
        company_id = %request.company_id,
        items = request.item_count(),
        total = %request.total,
        is_delivery = request.is_delivery,
    );

    async move {
        let receipt = match tokio::time::timeout(timeout, gateway.create_order(&request)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(?timeout, "order request timed out");
                return Err(NetworkError::Timeout(timeout).into());
            }
        };
        if receipt.id.as_str().trim().is_empty() {
            return Err(NetworkError::InvalidResponse("order id missing".to_string()).into());
        }
        Ok(Order::from_receipt(request, receipt))
    }
    .instrument(span)
    .await
}

impl CheckoutFlow {
    /// Place the order for `cart` through `gateway`.
    ///
    /// Precondition failures come back as [`OrderError::Blocked`] without
    /// touching the network; a call made while another is in flight is one of
    /// them. The outcome is also recorded on the flow. The cart is left as is;
    /// clearing it after success is up to the owner.
    pub async fn submit<G: OrderGateway + ?Sized>(
        &mut self,
        cart: &Cart,
        gateway: &G,
        settings: &CheckoutSettings,
    ) -> Result<Order, OrderError> {
        let request = self.begin_submission(cart).map_err(|blocker| {
            warn!(%blocker, "order submission blocked");
            OrderError::Blocked(blocker)
        })?;
        let result = place_order(gateway, request, settings.order_timeout).await;
        self.complete_submission(result.clone());
        result
    }
}

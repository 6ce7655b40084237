//! Shared handle over one open checkout.
//!
//! A [`CheckoutSession`] owns the cart and the checkout flow for as long as
//! the checkout screen is open. Clones share the same state, so a UI can hand
//! one to an event handler while another awaits the order round trip.
//!
//! After [`close`](CheckoutSession::close) the session is torn down: an order
//! result that arrives later is still awaited but dropped without touching any
//! state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::cart::Cart;
use crate::checkout::{place_order, CheckoutFlow, Order, PersonalInfo};
use crate::delivery::NormalizedDeliveryConfig;
use crate::error::{OrderError, StepBlocker};
use crate::ports::OrderGateway;
use crate::settings::CheckoutSettings;

/// What became of a call to [`CheckoutSession::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The server accepted the order; the cart has been cleared.
    Placed(Order),
    /// Preconditions failed or the round trip failed. The flow stays on the
    /// payment step.
    Failed(OrderError),
    /// Another submission was in flight, or the session is closed.
    Ignored,
    /// The session was closed before the result arrived.
    Discarded,
}

/// What the UI should do after a cart change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    Stay,
    /// The cart is empty; leave checkout.
    ReturnToStore,
}

#[derive(Debug)]
struct SessionState {
    cart: Cart,
    flow: CheckoutFlow,
    open: bool,
}

/// One open checkout.
#[derive(Debug)]
pub struct CheckoutSession<G: ?Sized> {
    state: Arc<Mutex<SessionState>>,
    gateway: Arc<G>,
    settings: CheckoutSettings,
}

impl<G: ?Sized> Clone for CheckoutSession<G> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            gateway: Arc::clone(&self.gateway),
            settings: self.settings.clone(),
        }
    }
}

impl<G: OrderGateway + ?Sized> CheckoutSession<G> {
    /// Enter checkout with `cart`.
    pub fn open(
        cart: Cart,
        delivery: NormalizedDeliveryConfig,
        gateway: Arc<G>,
        settings: CheckoutSettings,
    ) -> Self {
        let flow = CheckoutFlow::new(&cart, delivery);
        info!(
            company_id = %cart.company_id(),
            items = cart.item_count(),
            "checkout opened"
        );
        Self {
            state: Arc::new(Mutex::new(SessionState {
                cart,
                flow,
                open: true,
            })),
            gateway,
            settings,
        }
    }

    /// Prefill the personal info step, typically from the saved profile.
    pub fn prefill(&self, info: PersonalInfo) -> Option<Result<(), StepBlocker>> {
        self.with_flow(|flow| flow.set_personal_info(info))
    }

    /// Mutate the cart and revalidate the flow.
    ///
    /// Returns `None` when the session is closed or the flow is frozen by a
    /// submission. Otherwise tells the UI whether to stay in checkout.
    pub fn update_cart<R>(&self, f: impl FnOnce(&mut Cart) -> R) -> Option<(R, SessionSignal)> {
        let mut guard = self.lock();
        let state = &mut *guard;
        if !state.open || state.flow.is_submitting() || state.flow.is_complete() {
            return None;
        }
        let out = f(&mut state.cart);
        state.flow.refresh_cart(&state.cart);
        let signal = if state.cart.is_empty() {
            debug!("cart emptied during checkout");
            SessionSignal::ReturnToStore
        } else {
            SessionSignal::Stay
        };
        Some((out, signal))
    }

    /// Run `f` against the flow. `None` when the session is closed.
    pub fn with_flow<R>(&self, f: impl FnOnce(&mut CheckoutFlow) -> R) -> Option<R> {
        let mut state = self.lock();
        if !state.open {
            return None;
        }
        Some(f(&mut state.flow))
    }

    /// Snapshot of the cart.
    pub fn cart(&self) -> Cart {
        self.lock().cart.clone()
    }

    /// Snapshot of the flow.
    pub fn flow(&self) -> CheckoutFlow {
        self.lock().flow.clone()
    }

    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    pub fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    /// Place the order.
    ///
    /// At most one request is in flight per session: a call made while one is
    /// pending returns [`SubmitOutcome::Ignored`] without contacting the
    /// gateway.
    pub async fn submit(&self) -> SubmitOutcome {
        let request = {
            let mut guard = self.lock();
            let state = &mut *guard;
            if !state.open {
                debug!("submit on closed checkout ignored");
                return SubmitOutcome::Ignored;
            }
            match state.flow.begin_submission(&state.cart) {
                Ok(request) => request,
                Err(StepBlocker::SubmissionPending) => {
                    warn!("duplicate order submission ignored");
                    return SubmitOutcome::Ignored;
                }
                Err(blocker) => {
                    warn!(%blocker, "order submission blocked");
                    return SubmitOutcome::Failed(blocker.into());
                }
            }
        };

        let result = place_order(&*self.gateway, request, self.settings.order_timeout).await;

        let mut guard = self.lock();
        let state = &mut *guard;
        if !state.open {
            match &result {
                Ok(order) => warn!(order_id = %order.id, "checkout closed; discarding placed order"),
                Err(err) => warn!(error = %err, "checkout closed; discarding failed submission"),
            }
            return SubmitOutcome::Discarded;
        }
        state.flow.complete_submission(result.clone());
        match result {
            Ok(order) => {
                state.cart.clear();
                SubmitOutcome::Placed(order)
            }
            Err(err) => SubmitOutcome::Failed(err),
        }
    }

    /// Leave checkout and hand the cart back to the store page.
    ///
    /// Idempotent. Any submission still in flight will be discarded.
    pub fn close(&self) -> Cart {
        let mut state = self.lock();
        if state.open {
            state.open = false;
            info!(in_flight = state.flow.is_submitting(), "checkout closed");
        }
        state.cart.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

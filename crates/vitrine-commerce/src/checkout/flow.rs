//! Checkout flow state machine.
//!
//! The flow walks `Summary → PersonalInfo → Payment → Confirmation`. Each
//! step has its own validity flag, recomputed only when that step's inputs
//! change:
//!
//! - Summary: the cart is not empty and, for delivery, the store minimum is
//!   reached. Inputs: the cart and the delivery/pickup choice.
//! - PersonalInfo: name, phone, address, number and neighborhood are filled.
//! - Payment: a payment method has been chosen.
//! - Confirmation: an order has been placed.
//!
//! Forward moves require the current step to be valid. Whenever a step
//! earlier than the current one becomes invalid, the flow falls back to it, so
//! the customer can never stand past an invalid step.
//!
//! While an order request is in flight the flow is frozen: navigation and
//! edits are refused until the submission completes. Once an order is placed
//! the flow is terminal.

use tracing::{debug, info};

use crate::cart::Cart;
use crate::checkout::{CheckoutStep, Order, OrderRequest, PaymentMethod, PersonalInfo};
use crate::delivery::{DeliveryQuote, NormalizedDeliveryConfig};
use crate::error::{
    BusinessRuleViolation, OrderError, RequiredField, StepBlocker, ValidationError,
};

/// Checkout state for one visit to the checkout screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    validity: [bool; CheckoutStep::COUNT],
    is_delivery: bool,
    delivery: NormalizedDeliveryConfig,
    cart_empty: bool,
    quote: DeliveryQuote,
    personal_info: Option<PersonalInfo>,
    payment_method: Option<PaymentMethod>,
    is_submitting: bool,
    last_error: Option<OrderError>,
    order: Option<Order>,
}

impl CheckoutFlow {
    /// Enter checkout with the current cart and the store's delivery rules.
    ///
    /// Delivery is preselected when the store offers it.
    pub fn new(cart: &Cart, delivery: NormalizedDeliveryConfig) -> Self {
        let is_delivery = delivery.delivery_enabled;
        let quote = DeliveryQuote::compute(cart.subtotal(), &delivery, is_delivery);
        let mut flow = Self {
            step: CheckoutStep::Summary,
            validity: [false; CheckoutStep::COUNT],
            is_delivery,
            delivery,
            cart_empty: cart.is_empty(),
            quote,
            personal_info: None,
            payment_method: None,
            is_submitting: false,
            last_error: None,
            order: None,
        };
        flow.recompute_summary();
        flow
    }

    /// Prefill personal info, e.g. from the saved profile.
    pub fn with_personal_info(mut self, info: PersonalInfo) -> Self {
        // incomplete profiles are kept; the step stays invalid
        let _ = self.store_personal_info(info);
        self
    }

    // --- inputs -----------------------------------------------------------

    /// Re-read the cart after it changed.
    ///
    /// Ignored while frozen; the cart cannot change under an in-flight order.
    pub fn refresh_cart(&mut self, cart: &Cart) {
        if self.frozen().is_some() {
            return;
        }
        self.cart_empty = cart.is_empty();
        self.quote = DeliveryQuote::compute(cart.subtotal(), &self.delivery, self.is_delivery);
        self.recompute_summary();
    }

    /// Choose delivery (`true`) or pickup (`false`).
    pub fn set_delivery(&mut self, is_delivery: bool) -> Result<(), StepBlocker> {
        if let Some(blocker) = self.frozen() {
            return Err(blocker);
        }
        if is_delivery && !self.delivery.delivery_enabled {
            return Err(BusinessRuleViolation::DeliveryUnavailable.into());
        }
        self.is_delivery = is_delivery;
        self.quote = DeliveryQuote::compute(self.quote.subtotal, &self.delivery, is_delivery);
        self.recompute_summary();
        Ok(())
    }

    /// Store the customer's details and revalidate the personal info step.
    ///
    /// The details are kept even when incomplete so the form can be
    /// resumed; the error lists what is missing.
    pub fn set_personal_info(&mut self, info: PersonalInfo) -> Result<(), StepBlocker> {
        if let Some(blocker) = self.frozen() {
            return Err(blocker);
        }
        self.store_personal_info(info)
    }

    fn store_personal_info(&mut self, info: PersonalInfo) -> Result<(), StepBlocker> {
        let result = info.validate();
        self.personal_info = Some(info);
        self.set_validity(CheckoutStep::PersonalInfo, result.is_ok());
        result.map_err(StepBlocker::from)
    }

    /// Choose how to pay. Any method makes the payment step valid.
    pub fn set_payment_method(&mut self, method: PaymentMethod) -> Result<(), StepBlocker> {
        if let Some(blocker) = self.frozen() {
            return Err(blocker);
        }
        debug!(method = method.as_str(), "payment method selected");
        self.payment_method = Some(method);
        self.set_validity(CheckoutStep::Payment, true);
        Ok(())
    }

    // --- navigation -------------------------------------------------------

    /// Move to the next step if the current one is valid.
    ///
    /// On refusal the flow is unchanged and the error says why.
    pub fn go_next(&mut self) -> Result<CheckoutStep, StepBlocker> {
        if let Some(blocker) = self.frozen() {
            return Err(blocker);
        }
        let next = match self.step {
            CheckoutStep::Payment => {
                // leaving payment means placing the order
                return Err(StepBlocker::FinalStep(self.step));
            }
            step => step.next().ok_or(StepBlocker::FinalStep(step))?,
        };
        if let Some(blocker) = self.step_blocker(self.step) {
            debug!(step = %self.step, %blocker, "forward navigation blocked");
            return Err(blocker);
        }
        self.step = next;
        info!(step = %next, "checkout step advanced");
        Ok(next)
    }

    /// Move back one step. Returns whether the flow moved.
    pub fn go_back(&mut self) -> bool {
        if self.frozen().is_some() {
            return false;
        }
        match self.step.previous() {
            Some(previous) => {
                self.step = previous;
                debug!(step = %previous, "checkout step back");
                true
            }
            None => false,
        }
    }

    /// Jump to an earlier (or the current) step. Skipping ahead is refused.
    pub fn go_to(&mut self, step: CheckoutStep) -> bool {
        if self.frozen().is_some() || step > self.step {
            return false;
        }
        self.step = step;
        true
    }

    // --- submission -------------------------------------------------------

    /// Start a submission: check preconditions, raise the in-flight guard and
    /// build the payload.
    ///
    /// A second call while the first is in flight gets
    /// [`StepBlocker::SubmissionPending`] and changes nothing.
    pub fn begin_submission(&mut self, cart: &Cart) -> Result<OrderRequest, StepBlocker> {
        if let Some(blocker) = self.frozen() {
            return Err(blocker);
        }
        self.refresh_cart(cart);

        if self.step != CheckoutStep::Payment {
            return Err(StepBlocker::NotAtPayment(self.step));
        }
        if let Some(blocker) = [
            CheckoutStep::Summary,
            CheckoutStep::PersonalInfo,
            CheckoutStep::Payment,
        ]
        .into_iter()
        .find_map(|step| self.step_blocker(step))
        {
            return Err(blocker);
        }

        let (Some(info), Some(method)) = (&self.personal_info, &self.payment_method) else {
            // validity flags guarantee both are set
            return Err(ValidationError::new(vec![RequiredField::PaymentMethod]).into());
        };
        let request = OrderRequest::build(cart, &self.quote, info, method.clone());

        self.is_submitting = true;
        self.last_error = None;
        info!(
            items = request.item_count(),
            total = %request.total,
            is_delivery = request.is_delivery,
            "order submission started"
        );
        Ok(request)
    }

    /// Record the outcome of the submission started by
    /// [`begin_submission`](Self::begin_submission).
    ///
    /// Success marks confirmation valid and moves there; failure leaves the
    /// flow on the payment step with the error kept for display.
    pub fn complete_submission(&mut self, result: Result<Order, OrderError>) {
        if !self.is_submitting {
            debug!("ignoring submission result with no submission in flight");
            return;
        }
        self.is_submitting = false;
        match result {
            Ok(order) => {
                info!(order_id = %order.id, "order placed");
                self.validity[CheckoutStep::Confirmation.index()] = true;
                self.step = CheckoutStep::Confirmation;
                self.order = Some(order);
            }
            Err(err) => {
                info!(error = %err, "order submission failed");
                self.last_error = Some(err);
            }
        }
    }

    // --- queries ----------------------------------------------------------

    pub fn current_step(&self) -> CheckoutStep {
        self.step
    }

    pub fn is_step_valid(&self, step: CheckoutStep) -> bool {
        self.validity[step.index()]
    }

    pub fn step_validity(&self) -> [bool; CheckoutStep::COUNT] {
        self.validity
    }

    /// Why the current step cannot be left forward, if anything.
    pub fn blocker(&self) -> Option<StepBlocker> {
        self.frozen().or_else(|| self.step_blocker(self.step))
    }

    /// Whether the order can be placed right now.
    pub fn can_finish(&self) -> bool {
        self.step == CheckoutStep::Payment
            && self.frozen().is_none()
            && self.validity[..=CheckoutStep::Payment.index()]
                .iter()
                .all(|v| *v)
    }

    pub fn is_delivery(&self) -> bool {
        self.is_delivery
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn is_complete(&self) -> bool {
        self.order.is_some()
    }

    pub fn quote(&self) -> &DeliveryQuote {
        &self.quote
    }

    pub fn delivery_config(&self) -> &NormalizedDeliveryConfig {
        &self.delivery
    }

    pub fn personal_info(&self) -> Option<&PersonalInfo> {
        self.personal_info.as_ref()
    }

    pub fn payment_method(&self) -> Option<&PaymentMethod> {
        self.payment_method.as_ref()
    }

    /// Error of the last failed submission, cleared when a new one starts.
    pub fn last_error(&self) -> Option<&OrderError> {
        self.last_error.as_ref()
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    // --- internals --------------------------------------------------------

    fn frozen(&self) -> Option<StepBlocker> {
        if self.order.is_some() {
            Some(StepBlocker::Completed)
        } else if self.is_submitting {
            Some(StepBlocker::SubmissionPending)
        } else {
            None
        }
    }

    fn step_blocker(&self, step: CheckoutStep) -> Option<StepBlocker> {
        if self.validity[step.index()] {
            return None;
        }
        let blocker = match step {
            CheckoutStep::Summary => self.summary_violation()?.into(),
            CheckoutStep::PersonalInfo => match &self.personal_info {
                Some(info) => info.validate().err()?.into(),
                None => ValidationError::new(vec![
                    RequiredField::Name,
                    RequiredField::Phone,
                    RequiredField::Address,
                    RequiredField::Number,
                    RequiredField::Neighborhood,
                ])
                .into(),
            },
            CheckoutStep::Payment => ValidationError::new(vec![RequiredField::PaymentMethod]).into(),
            CheckoutStep::Confirmation => StepBlocker::FinalStep(step),
        };
        Some(blocker)
    }

    fn summary_violation(&self) -> Option<BusinessRuleViolation> {
        if self.cart_empty {
            return Some(BusinessRuleViolation::EmptyCart);
        }
        if self.is_delivery && !self.quote.minimum_reached {
            return Some(BusinessRuleViolation::MinimumNotReached {
                minimum: self.quote.minimum_order,
                remaining: self.quote.remaining_to_minimum,
            });
        }
        None
    }

    fn recompute_summary(&mut self) {
        let valid = self.summary_violation().is_none();
        self.set_validity(CheckoutStep::Summary, valid);
    }

    fn set_validity(&mut self, step: CheckoutStep, valid: bool) {
        self.validity[step.index()] = valid;
        if !valid && self.step > step {
            debug!(from = %self.step, to = %step, "falling back to invalid step");
            self.step = step;
        }
    }
}

//! End-to-end checkout scenarios across cart, delivery and checkout.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use vitrine_commerce::ports::{
    InMemoryDeliveryConfigs, InMemoryOrderGateway, InMemoryPersonalInfoStore,
};
use vitrine_commerce::prelude::*;

fn pizza(quantity: i64) -> CartCandidate {
    CartCandidate::product("p1", "Pizza", Money::from_cents(1000), quantity)
}

fn ana() -> PersonalInfo {
    PersonalInfo::new("Ana", "11 99999-0000", "Rua das Flores", "10", "Centro")
}

#[test]
fn test_scenario_a_same_product_merges() {
    let mut cart = Cart::new("padaria");
    let first = cart.add_item(pizza(1)).unwrap();
    let second = cart.add_item(pizza(2)).unwrap();

    assert_eq!(first, second);
    assert_eq!(cart.unique_item_count(), 1);
    assert_eq!(cart.items()[0].quantity, 3);
    assert_eq!(cart.subtotal(), Money::from_cents(3000));
}

#[test]
fn test_variations_stay_separate() {
    let mut cart = Cart::new("padaria");
    cart.add_item(CartCandidate::variation("p1", "p", "Pizza", Money::from_cents(1000), 1))
        .unwrap();
    cart.add_item(CartCandidate::variation("p1", "g", "Pizza", Money::from_cents(1500), 1))
        .unwrap();
    cart.add_item(pizza(1)).unwrap();

    assert_eq!(cart.unique_item_count(), 3);
    assert_eq!(cart.subtotal(), Money::from_cents(3500));
}

#[test]
fn test_scenario_b_legacy_minimum_not_reached() {
    let config = DeliveryConfig::from_value(&json!({
        "delivery": { "pedido_minimo": "20,00", "taxa_entrega": "5,00" }
    }))
    .unwrap();
    assert!(config.is_legacy());
    let config = config.normalize();

    let subtotal = Money::from_cents(1500);
    assert!(!is_minimum_reached(subtotal, &config));
    assert_eq!(remaining_to_minimum(subtotal, &config), Money::from_cents(500));
}

#[test]
fn test_scenario_c_modern_minimum_reached() {
    let config = DeliveryConfig::from_value(&json!({ "pedido_minimo": "20,00" })).unwrap();
    assert!(!config.is_legacy());
    let config = config.normalize();

    let subtotal = Money::from_cents(2500);
    assert!(is_minimum_reached(subtotal, &config));
    assert_eq!(remaining_to_minimum(subtotal, &config), Money::zero());
}

#[test]
fn test_both_schemas_normalize_alike() {
    let fields = json!({
        "taxa_entrega": "7,50",
        "pedido_minimo": 30,
        "mostrar_info_delivery": "true",
        "especificar_bairros_atendidos": true,
        "bairros_atendidos": "Centro, Boa Vista"
    });
    let legacy = DeliveryConfig::normalize_value(&json!({ "delivery": fields.clone() }));
    let modern = DeliveryConfig::normalize_value(&fields);

    assert_eq!(legacy, modern);
    assert_eq!(modern.fee, Money::from_cents(750));
    assert_eq!(modern.minimum_order, Money::from_cents(3000));
    assert!(serves_neighborhood(&modern, "boa vista"));
    assert!(!serves_neighborhood(&modern, "Jardim"));
}

#[test]
fn test_scenario_d_empty_cart_blocks_summary() {
    let cart = Cart::new("padaria");
    let mut flow = CheckoutFlow::new(&cart, NormalizedDeliveryConfig::disabled());

    assert!(flow.go_next().is_err());
    assert_eq!(flow.current_step(), CheckoutStep::Summary);
    assert!(!flow.is_step_valid(CheckoutStep::Summary));
}

#[tokio::test(start_paused = true)]
async fn test_scenario_e_double_submit_issues_one_request() {
    let mut cart = Cart::new("padaria");
    cart.add_item(pizza(3)).unwrap();
    let gateway = Arc::new(InMemoryOrderGateway::new().with_delay(Duration::from_millis(300)));
    let session = CheckoutSession::open(
        cart,
        NormalizedDeliveryConfig::enabled(Money::from_cents(500), Money::from_cents(2000)),
        Arc::clone(&gateway),
        CheckoutSettings::default(),
    );
    session.prefill(ana()).unwrap().unwrap();
    session
        .with_flow(|flow| {
            flow.go_next()?;
            flow.go_next()?;
            flow.set_payment_method(PaymentMethod::Cash {
                change_for: Some(Money::from_cents(5000)),
            })
        })
        .unwrap()
        .unwrap();

    let (first, second) = tokio::join!(session.submit(), session.submit());

    assert_eq!(gateway.request_count(), 1);
    assert_eq!(second, SubmitOutcome::Ignored);
    let SubmitOutcome::Placed(order) = first else {
        panic!("expected the first submission to place the order");
    };
    assert_eq!(order.id.as_str(), "ord-1");
    assert_eq!(order.total, Money::from_cents(3500));

    let sent = &gateway.requests()[0];
    assert_eq!(sent.delivery_fee, Money::from_cents(500));
    assert_eq!(
        sent.delivery_address.as_ref().map(|a| a.neighborhood.as_str()),
        Some("Centro")
    );
}

#[test]
fn test_no_step_is_passed_while_invalid() {
    let config = NormalizedDeliveryConfig::enabled(Money::from_cents(500), Money::from_cents(2000));
    let mut cart = Cart::new("padaria");
    let item = cart.add_item(pizza(3)).unwrap();
    let mut flow = CheckoutFlow::new(&cart, config);

    let check = |flow: &CheckoutFlow| {
        for step in CheckoutStep::ALL {
            if flow.current_step() > step {
                assert!(flow.is_step_valid(step), "standing past invalid {step}");
            }
        }
    };

    flow.go_next().unwrap();
    check(&flow);
    flow.set_personal_info(ana()).unwrap();
    flow.go_next().unwrap();
    check(&flow);
    flow.set_payment_method(PaymentMethod::Pix).unwrap();
    check(&flow);

    // drop below the minimum while on payment
    cart.set_quantity(&item, 1).unwrap();
    flow.refresh_cart(&cart);
    check(&flow);
    assert_eq!(flow.current_step(), CheckoutStep::Summary);

    // switching to pickup makes summary valid again without moving forward
    flow.set_delivery(false).unwrap();
    check(&flow);
    assert_eq!(flow.current_step(), CheckoutStep::Summary);
    assert!(flow.is_step_valid(CheckoutStep::Payment));
}

#[tokio::test]
async fn test_profile_prefills_next_checkout() {
    let store = InMemoryPersonalInfoStore::new();
    store.save(&ana()).await.unwrap();

    let mut cart = Cart::new("padaria");
    cart.add_item(pizza(1)).unwrap();
    let profile = store.get().await.unwrap().unwrap();
    let mut flow =
        CheckoutFlow::new(&cart, NormalizedDeliveryConfig::disabled()).with_personal_info(profile);

    assert!(flow.is_step_valid(CheckoutStep::PersonalInfo));
    flow.go_next().unwrap();
    assert_eq!(flow.go_next(), Ok(CheckoutStep::Payment));
}

#[tokio::test]
async fn test_delivery_source_feeds_checkout() {
    let source = InMemoryDeliveryConfigs::new().with_config(
        "padaria",
        json!({ "delivery": { "mostrar_info_delivery": false } }),
    );
    let mut cart = Cart::new("padaria");
    cart.add_item(pizza(1)).unwrap();

    let config = load_delivery_config(&source, cart.company_id()).await.unwrap();
    let mut flow = CheckoutFlow::new(&cart, config);

    assert!(!flow.is_delivery());
    assert_eq!(
        flow.set_delivery(true),
        Err(StepBlocker::BusinessRule(BusinessRuleViolation::DeliveryUnavailable))
    );
}

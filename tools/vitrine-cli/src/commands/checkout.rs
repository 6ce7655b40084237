//! Run a checkout end to end from a scenario file.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context as _, Error, Result};
use dialoguer::Confirm;
use serde::Deserialize;
use serde_json::Value;
use vitrine_commerce::cart::{Cart, CartCandidate};
use vitrine_commerce::checkout::{
    CheckoutSession, Order, PaymentMethod, PersonalInfo, SubmitOutcome,
};
use vitrine_commerce::delivery::{serves_neighborhood, DeliveryConfig};
use vitrine_commerce::money::decimal_comma;
use vitrine_commerce::ports::{InMemoryOrderGateway, OrderGateway, PersonalInfoStore};
use vitrine_commerce::{CompanyId, Money, StepBlocker};

use super::{http_backend, load_config, CheckoutArgs};
use crate::adapters::JsonProfileStore;
use crate::commands::profile::print_profile;
use crate::context::Context;

/// A checkout described in a file.
///
/// ```toml
/// company_id = "padaria"
/// delivery = true
/// payment = { type = "cash", change_for = "50,00" }
///
/// [[items]]
/// product_id = "p1"
/// name = "Pão de queijo"
/// unit_price = "10,00"
/// quantity = 3
/// ```
#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default)]
    company_id: Option<String>,
    items: Vec<ScenarioItem>,
    /// Delivery (`true`) or pickup (`false`); the store default when absent.
    #[serde(default)]
    delivery: Option<bool>,
    #[serde(default)]
    payment: Option<PaymentMethod>,
    /// Customer details; the saved profile when absent.
    #[serde(default)]
    customer: Option<PersonalInfo>,
    /// Inline delivery settings document, in either schema.
    #[serde(default)]
    delivery_config: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ScenarioItem {
    product_id: String,
    #[serde(default)]
    variation_id: Option<String>,
    name: String,
    #[serde(default)]
    variation_name: Option<String>,
    #[serde(with = "decimal_comma")]
    unit_price: Money,
    #[serde(default = "default_quantity")]
    quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

impl ScenarioItem {
    fn candidate(&self) -> CartCandidate {
        let candidate = match &self.variation_id {
            Some(variation) => CartCandidate::variation(
                self.product_id.as_str(),
                variation.as_str(),
                self.name.as_str(),
                self.unit_price,
                self.quantity,
            ),
            None => CartCandidate::product(
                self.product_id.as_str(),
                self.name.as_str(),
                self.unit_price,
                self.quantity,
            ),
        };
        match &self.variation_name {
            Some(label) => candidate.with_variation_name(label.as_str()),
            None => candidate,
        }
    }
}

impl Scenario {
    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        Self::parse(&content, path.extension().is_some_and(|e| e == "json"))
            .with_context(|| format!("Failed to parse scenario: {}", path.display()))
    }

    fn parse(content: &str, json: bool) -> Result<Self> {
        if json {
            Ok(serde_json::from_str(content)?)
        } else {
            Ok(toml::from_str(content)?)
        }
    }

    fn build_cart(&self, company_id: CompanyId, max_quantity: i64) -> Result<Cart> {
        let mut cart = Cart::new(company_id).with_max_quantity_per_item(max_quantity);
        for item in &self.items {
            cart.add_item(item.candidate())
                .with_context(|| format!("Cannot add '{}' to the cart", item.name))?;
        }
        Ok(cart)
    }
}

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let scenario = Scenario::load(&ctx.resolve_path(&args.scenario))?;

    let company_id = match args.company.as_deref().or(scenario.company_id.as_deref()) {
        Some(id) => CompanyId::new(id),
        None => ctx.company_id(None)?,
    };
    let cart = scenario.build_cart(company_id.clone(), ctx.config.checkout.max_quantity_per_item)?;
    if cart.is_empty() {
        bail!("The scenario has no items");
    }

    let delivery = match &scenario.delivery_config {
        Some(document) => DeliveryConfig::normalize_value(document),
        None => load_config(ctx, &company_id).await?,
    };

    let payment = match args.payment.as_deref() {
        Some(name) => PaymentMethod::from_name(name)
            .ok_or_else(|| anyhow!("Unknown payment method '{}'", name))?,
        None => scenario
            .payment
            .clone()
            .context("No payment method; pass --payment or set `payment` in the scenario")?,
    };

    let profile_store = JsonProfileStore::new(ctx.profile_path());
    let customer = match &scenario.customer {
        Some(customer) => customer.clone(),
        None => profile_store
            .get()
            .await
            .context("Failed to read profile")?
            .context("No customer in the scenario and no saved profile")?,
    };

    let gateway: Arc<dyn OrderGateway> = if args.dry_run {
        ctx.output.info("Dry run: the order goes to an in-memory backend");
        Arc::new(InMemoryOrderGateway::new())
    } else {
        Arc::new(http_backend(ctx)?)
    };

    let session =
        CheckoutSession::open(cart, delivery.clone(), gateway, ctx.config.checkout.clone());
    walk_to_payment(&session, &scenario, customer.clone(), payment, ctx)?;

    let flow = session.flow();
    if flow.is_delivery() && !serves_neighborhood(&delivery, &customer.neighborhood) {
        ctx.output.warn(&format!(
            "The store may not deliver to {}",
            customer.neighborhood.trim()
        ));
    }

    print_summary(&session.cart(), &session, ctx);

    if !args.yes && !args.dry_run && !ctx.output.is_json() {
        ctx.output.info("");
        let confirmed = Confirm::new()
            .with_prompt("Place this order?")
            .default(true)
            .interact()?;

        if !confirmed {
            session.close();
            ctx.output.warn("Checkout cancelled");
            return Ok(());
        }
    }

    let spinner = ctx.output.spinner("Placing order...");
    let outcome = session.submit().await;
    spinner.finish_and_clear();

    match outcome {
        SubmitOutcome::Placed(order) => {
            report_order(&order, args.dry_run, ctx);
            if args.save_profile {
                profile_store
                    .save(&customer)
                    .await
                    .context("Order placed but the profile could not be saved")?;
                ctx.output.debug("Profile saved");
            }
            Ok(())
        }
        SubmitOutcome::Failed(err) => {
            if err.is_retryable() {
                ctx.output.info("Nothing was charged; run the command again to retry.");
            }
            Err(Error::new(err).context("Order was not placed"))
        }
        SubmitOutcome::Ignored | SubmitOutcome::Discarded => {
            bail!("Order submission did not complete")
        }
    }
}

fn walk_to_payment(
    session: &CheckoutSession<dyn OrderGateway>,
    scenario: &Scenario,
    customer: PersonalInfo,
    payment: PaymentMethod,
    ctx: &Context,
) -> Result<()> {
    let result = session
        .with_flow(|flow| -> Result<(), StepBlocker> {
            if let Some(is_delivery) = scenario.delivery {
                flow.set_delivery(is_delivery)?;
            }
            flow.go_next()?;
            flow.set_personal_info(customer)?;
            flow.go_next()?;
            flow.set_payment_method(payment)
        })
        .context("Checkout was closed")?;

    let flow = session.flow();
    ctx.output.steps(flow.current_step(), &flow.step_validity());

    if let Err(blocker) = result {
        bail!(
            "Checkout stopped at {}: {}",
            flow.current_step().display_name(),
            blocker
        );
    }
    Ok(())
}

fn print_summary(cart: &Cart, session: &CheckoutSession<dyn OrderGateway>, ctx: &Context) {
    if ctx.output.is_json() {
        return;
    }
    let flow = session.flow();
    let quote = flow.quote();

    ctx.output.header(&format!("Order for {}", cart.company_id()));
    ctx.output.table_row(&["Qty", "Item", "Unit", "Total"], &[4, 32, 12, 12]);
    for item in cart.items() {
        ctx.output.table_row(
            &[
                &item.quantity.to_string(),
                &item.display_name(),
                &item.unit_price.to_string(),
                &item.line_total().to_string(),
            ],
            &[4, 32, 12, 12],
        );
    }
    ctx.output.info("");
    ctx.output.kv("Subtotal", &quote.subtotal.to_string());
    if quote.is_delivery {
        ctx.output.kv("Delivery fee", &quote.fee.to_string());
    } else {
        ctx.output.kv("Fulfillment", "pickup");
    }
    ctx.output.kv("Total", &quote.total.to_string());
    if let Some(method) = flow.payment_method() {
        ctx.output.kv("Payment", &method.to_string());
    }
    if let Some(info) = flow.personal_info() {
        print_profile(info, ctx);
    }
}

fn report_order(order: &Order, dry_run: bool, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "dry_run": dry_run, "order": order }));
        return;
    }
    ctx.output.success(&format!("Order {} placed", order.id));
    ctx.output.kv("Items", &order.item_count().to_string());
    ctx.output.kv("Total", &order.total.to_string());
    ctx.output.kv("Placed at", &order.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
}

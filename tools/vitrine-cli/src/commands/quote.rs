//! Delivery quote for a subtotal.

use anyhow::{bail, Result};
use serde::Serialize;
use vitrine_commerce::delivery::{serves_neighborhood, DeliveryConfig, DeliveryQuote};
use vitrine_commerce::{CompanyId, Money};

use super::{fetch_document, QuoteArgs};
use crate::context::Context;
use crate::output::yes_no;

#[derive(Serialize)]
struct QuoteReport {
    company_id: CompanyId,
    #[serde(flatten)]
    quote: DeliveryQuote,
    #[serde(skip_serializing_if = "Option::is_none")]
    serves_neighborhood: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocked_by: Option<String>,
}

/// Run the quote command.
pub async fn run(args: QuoteArgs, ctx: &Context) -> Result<()> {
    let Some(subtotal) = Money::parse(&args.subtotal).filter(|m| !m.is_negative()) else {
        bail!("Invalid subtotal '{}'; use a value like 25,00", args.subtotal);
    };

    let (company_id, document) = fetch_document(ctx, &args.source).await?;
    let config = DeliveryConfig::normalize_value(&document);

    let is_delivery = !args.pickup;
    if is_delivery && !config.delivery_enabled {
        ctx.output.warn("This store does not deliver; quoting for pickup");
    }
    let quote = DeliveryQuote::compute(subtotal, &config, is_delivery && config.delivery_enabled);
    let serves = args
        .neighborhood
        .as_deref()
        .filter(|_| quote.is_delivery)
        .map(|n| serves_neighborhood(&config, n));

    let report = QuoteReport {
        company_id,
        blocked_by: quote.violation().map(|v| v.to_string()),
        quote,
        serves_neighborhood: serves,
    };

    if ctx.output.is_json() {
        ctx.output.json(&report);
        return Ok(());
    }

    let quote = &report.quote;
    let mode = if quote.is_delivery { "delivery" } else { "pickup" };
    ctx.output.header(&format!("Quote for {} ({})", report.company_id, mode));
    ctx.output.kv("Subtotal", &quote.subtotal.to_string());
    if quote.is_delivery {
        ctx.output.kv("Delivery fee", &quote.fee.to_string());
    }
    ctx.output.kv("Total", &quote.total.to_string());
    if !quote.minimum_order.is_zero() {
        ctx.output.kv("Minimum order", &quote.minimum_order.to_string());
        ctx.output.kv("Minimum reached", &yes_no(quote.minimum_reached));
    }
    if let (Some(neighborhood), Some(serves)) = (&args.neighborhood, report.serves_neighborhood) {
        ctx.output.kv(&format!("Delivers to {}", neighborhood.trim()), &yes_no(serves));
    }

    match &report.blocked_by {
        Some(reason) => ctx.output.warn(reason),
        None => ctx.output.success("Ready to order"),
    }
    if report.serves_neighborhood == Some(false) {
        ctx.output.warn("The store may not deliver to that neighborhood");
    }

    Ok(())
}

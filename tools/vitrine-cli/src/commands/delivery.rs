//! Show a store's delivery settings.

use anyhow::Result;
use vitrine_commerce::delivery::{neighborhood_list, DeliveryConfig};

use super::{fetch_document, DeliveryArgs};
use crate::context::Context;
use crate::output::yes_no;

/// Run the delivery command.
pub async fn run(args: DeliveryArgs, ctx: &Context) -> Result<()> {
    let (company_id, document) = fetch_document(ctx, &args.source).await?;

    let schema = match DeliveryConfig::from_value(&document) {
        Ok(config) if config.is_legacy() => "legacy",
        Ok(_) => "modern",
        Err(e) => {
            ctx.output.warn(&format!("{}; treating delivery as disabled", e));
            "unrecognized"
        }
    };
    let config = DeliveryConfig::normalize_value(&document);

    if ctx.output.is_json() {
        let mut value = serde_json::json!({
            "company_id": company_id,
            "schema": schema,
            "config": config,
        });
        if args.raw {
            value["raw"] = document;
        }
        ctx.output.json(&value);
        return Ok(());
    }

    ctx.output.header(&format!("Delivery settings for {}", company_id));
    ctx.output.kv("Schema", schema);
    ctx.output.kv("Delivery", &yes_no(config.delivery_enabled));
    ctx.output.kv("Fee", &config.fee.to_string());
    if config.minimum_order.is_zero() {
        ctx.output.kv("Minimum order", "none");
    } else {
        ctx.output.kv("Minimum order", &config.minimum_order.to_string());
    }

    match &config.restricted_neighborhoods {
        None => ctx.output.kv("Neighborhoods", "all"),
        Some(_) => {
            ctx.output.kv("Neighborhoods", "");
            let list = neighborhood_list(&config);
            if list.is_empty() {
                ctx.output.list_item("(none listed)");
            }
            for name in list {
                ctx.output.list_item(name);
            }
        }
    }

    if args.raw {
        ctx.output.header("Raw document");
        println!("{}", serde_json::to_string_pretty(&document)?);
    }

    Ok(())
}

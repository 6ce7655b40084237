//! CLI command implementations.

pub mod checkout;
pub mod delivery;
pub mod profile;
pub mod quote;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use serde_json::Value;
use vitrine_commerce::delivery::NormalizedDeliveryConfig;
use vitrine_commerce::ports::{load_delivery_config, DeliveryConfigSource};
use vitrine_commerce::CompanyId;

use crate::adapters::HttpBackend;
use crate::context::Context;

/// Arguments for the quote command.
#[derive(Args)]
pub struct QuoteArgs {
    /// Cart subtotal, e.g. "25,00".
    pub subtotal: String,

    /// Quote for pickup instead of delivery.
    #[arg(long)]
    pub pickup: bool,

    /// Neighborhood to check against the store's delivery area.
    #[arg(short, long)]
    pub neighborhood: Option<String>,

    #[command(flatten)]
    pub source: DeliverySourceArgs,
}

/// Arguments for the delivery command.
#[derive(Args)]
pub struct DeliveryArgs {
    /// Also print the document as received.
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub source: DeliverySourceArgs,
}

/// Where delivery settings come from.
#[derive(Args)]
pub struct DeliverySourceArgs {
    /// Company id (default: store.company_id from config).
    #[arg(long)]
    pub company: Option<String>,

    /// Read the delivery document from a JSON file instead of the API.
    #[arg(long)]
    pub document: Option<String>,
}

/// Arguments for the profile command.
#[derive(Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Show the saved profile.
    Show,
    /// Save the profile. Missing fields are prompted for.
    Save(ProfileFields),
    /// Delete the saved profile.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Profile fields given on the command line.
#[derive(Args)]
pub struct ProfileFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// Street.
    #[arg(long)]
    pub address: Option<String>,
    /// House or building number.
    #[arg(long)]
    pub number: Option<String>,
    #[arg(long)]
    pub neighborhood: Option<String>,
    #[arg(long)]
    pub complement: Option<String>,
    /// Landmark for the courier.
    #[arg(long)]
    pub reference: Option<String>,
    /// Fail instead of prompting for missing fields.
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Scenario file (TOML or JSON) with items, payment and optional customer.
    #[arg(short, long)]
    pub scenario: String,

    /// Company id (overrides the scenario and config).
    #[arg(long)]
    pub company: Option<String>,

    /// Payment method: cash, pix, credit or debit (overrides the scenario).
    #[arg(short, long)]
    pub payment: Option<String>,

    /// Place the order against an in-memory backend.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,

    /// Save the customer details as the profile after a successful order.
    #[arg(long)]
    pub save_profile: bool,
}

/// Build the HTTP backend from config.
pub(crate) fn http_backend(ctx: &Context) -> Result<HttpBackend> {
    let timeout = std::time::Duration::from_secs(ctx.config.api.timeout_secs);
    HttpBackend::new(&ctx.config.api.base_url, timeout).context("Failed to create HTTP client")
}

/// Read a delivery document from a JSON file.
pub(crate) fn read_document(ctx: &Context, path: &str) -> Result<Value> {
    let path = ctx.resolve_path(path);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read delivery document: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse delivery document: {}", path.display()))
}

/// Raw delivery document for a company, from a file or the API.
pub(crate) async fn fetch_document(
    ctx: &Context,
    source: &DeliverySourceArgs,
) -> Result<(CompanyId, Value)> {
    if let Some(path) = &source.document {
        let company_id = ctx
            .company_id(source.company.as_deref())
            .unwrap_or_else(|_| CompanyId::new("local"));
        return Ok((company_id, read_document(ctx, path)?));
    }
    let company_id = ctx.company_id(source.company.as_deref())?;
    let backend = http_backend(ctx)?;
    let spinner = ctx.output.spinner("Fetching delivery settings...");
    let document = backend.fetch_delivery_config(&company_id).await;
    spinner.finish_and_clear();
    let document = document
        .with_context(|| format!("Failed to fetch delivery settings for {}", company_id))?;
    Ok((company_id, document))
}

/// Normalized delivery settings for a company from the API.
pub(crate) async fn load_config(
    ctx: &Context,
    company_id: &CompanyId,
) -> Result<NormalizedDeliveryConfig> {
    let backend = http_backend(ctx)?;
    let spinner = ctx.output.spinner("Fetching delivery settings...");
    let config = load_delivery_config(&backend, company_id).await;
    spinner.finish_and_clear();
    config.with_context(|| format!("Failed to fetch delivery settings for {}", company_id))
}

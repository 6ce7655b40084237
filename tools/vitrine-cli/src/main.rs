//! Vitrine CLI - Command line client for Vitrine storefronts.
//!
//! Commands:
//! - `vitrine quote` - Quote delivery for a subtotal
//! - `vitrine delivery` - Show a store's delivery settings
//! - `vitrine profile` - Manage the saved customer profile
//! - `vitrine checkout` - Run a checkout from a scenario file

mod adapters;
mod commands;
mod config;
mod context;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{CheckoutArgs, DeliveryArgs, ProfileArgs, QuoteArgs};

/// Vitrine CLI - Quote delivery and place orders with Vitrine storefronts
#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true, env = "VITRINE_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote delivery fee, total and minimum order for a subtotal
    Quote(QuoteArgs),

    /// Show a store's delivery settings
    Delivery(DeliveryArgs),

    /// Manage the saved customer profile
    Profile(ProfileArgs),

    /// Run a checkout from a scenario file
    Checkout(CheckoutArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(logging::LogFormat::from_json_flag(cli.json), cli.verbose);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    // Execute command
    let result = match cli.command {
        Commands::Quote(args) => commands::quote::run(args, &ctx).await,
        Commands::Delivery(args) => commands::delivery::run(args, &ctx).await,
        Commands::Profile(args) => commands::profile::run(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

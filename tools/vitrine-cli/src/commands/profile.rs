//! Saved customer profile.

use anyhow::{Context as _, Result};
use dialoguer::{Confirm, Input};
use vitrine_commerce::checkout::PersonalInfo;
use vitrine_commerce::ports::PersonalInfoStore;

use super::{ProfileArgs, ProfileCommand, ProfileFields};
use crate::adapters::JsonProfileStore;
use crate::context::Context;

/// Run the profile command.
pub async fn run(args: ProfileArgs, ctx: &Context) -> Result<()> {
    let store = JsonProfileStore::new(ctx.profile_path());
    match args.command {
        ProfileCommand::Show => show(&store, ctx).await,
        ProfileCommand::Save(fields) => save(fields, &store, ctx).await,
        ProfileCommand::Clear { yes } => clear(yes, &store, ctx).await,
    }
}

async fn show(store: &JsonProfileStore, ctx: &Context) -> Result<()> {
    let profile = store.get().await.context("Failed to read profile")?;

    if ctx.output.is_json() {
        ctx.output.json(&profile);
        return Ok(());
    }

    let Some(info) = profile else {
        ctx.output.info("No saved profile.");
        ctx.output.info("Run `vitrine profile save` to create one.");
        return Ok(());
    };
    print_profile(&info, ctx);
    ctx.output.debug(&format!("Stored at {}", store.path().display()));
    if let Err(e) = info.validate() {
        ctx.output.warn(&e.to_string());
    }
    Ok(())
}

pub(crate) fn print_profile(info: &PersonalInfo, ctx: &Context) {
    ctx.output.header("Profile");
    ctx.output.kv("Name", &info.name);
    ctx.output.kv("Phone", &info.phone);
    ctx.output.kv("Address", &info.one_line_address());
    if let Some(reference) = &info.reference {
        ctx.output.kv("Reference", reference);
    }
}

async fn save(fields: ProfileFields, store: &JsonProfileStore, ctx: &Context) -> Result<()> {
    // start from what is saved so single fields can be updated
    let current = store.get().await.ok().flatten().unwrap_or_default();
    let interactive = !fields.no_input && !ctx.output.is_json();

    let info = PersonalInfo {
        name: field(fields.name, &current.name, "Name", interactive)?,
        phone: field(fields.phone, &current.phone, "Phone", interactive)?,
        address: field(fields.address, &current.address, "Street", interactive)?,
        number: field(fields.number, &current.number, "Number", interactive)?,
        neighborhood: field(
            fields.neighborhood,
            &current.neighborhood,
            "Neighborhood",
            interactive,
        )?,
        complement: optional(fields.complement, current.complement),
        reference: optional(fields.reference, current.reference),
    };

    info.validate().context("Profile is incomplete")?;
    store.save(&info).await.context("Failed to save profile")?;

    if ctx.output.is_json() {
        ctx.output.json(&info);
    } else {
        ctx.output.success(&format!("Profile saved to {}", store.path().display()));
    }
    Ok(())
}

async fn clear(yes: bool, store: &JsonProfileStore, ctx: &Context) -> Result<()> {
    if !yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt("Delete the saved profile?")
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Cancelled");
            return Ok(());
        }
    }

    store.clear().await.context("Failed to delete profile")?;
    ctx.output.success("Profile deleted");
    Ok(())
}

fn field(arg: Option<String>, current: &str, prompt: &str, interactive: bool) -> Result<String> {
    if let Some(value) = arg {
        return Ok(value.trim().to_string());
    }
    if !interactive {
        return Ok(current.to_string());
    }
    let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
    if !current.is_empty() {
        input = input.default(current.to_string());
    }
    Ok(input.interact_text()?.trim().to_string())
}

fn optional(arg: Option<String>, current: Option<String>) -> Option<String> {
    arg.or(current)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

//! Configure the Nexus Mods API key.

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Password};

use salsa_core::nexus::mask_api_key;

use crate::context::AppContext;

#[derive(Args, Debug, Default)]
pub struct ConfigureNexusArgs {
    /// API key to store (prompts when omitted)
    #[arg(long)]
    pub api_key: Option<String>,
}

pub fn execute(ctx: &mut AppContext, args: ConfigureNexusArgs) -> Result<i32> {
    ctx.output.section("Configure Nexus Mods API Key");

    let current = if ctx.config.nexus.has_api_key() {
        mask_api_key(ctx.config.nexus.api_key.trim())
    } else {
        "Not configured".to_string()
    };
    ctx.output.key_value("Current:", &current);
    ctx.output.blank();

    let api_key = match args.api_key {
        Some(key) => key,
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Enter Nexus API key (leave empty to keep the current one)")
            .allow_empty_password(true)
            .interact()?,
    };

    let api_key = api_key.trim();
    if api_key.is_empty() {
        ctx.output.info("API key unchanged");
        return Ok(0);
    }

    ctx.save_api_key(api_key)?;
    log::info!("Nexus API key configured");

    ctx.output.success(&format!(
        "Nexus API key {} saved to {}",
        mask_api_key(api_key),
        ctx.config_path.display()
    ));

    if std::env::var("SALSA_NEXUS_API_KEY").is_ok_and(|v| !v.trim().is_empty()) {
        ctx.output
            .warning("SALSA_NEXUS_API_KEY is set and will override the saved key on next start");
    }

    Ok(0)
}

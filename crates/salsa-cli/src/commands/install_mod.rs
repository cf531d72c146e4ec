//! Install a mod from the manifest.

use anyhow::{bail, Context, Result};
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Select};

use salsa_core::installer::{InstallOptions, ModInstaller};
use salsa_core::manifest::ModDefinition;

use crate::context::AppContext;
use crate::progress::set_percent;

use super::create_shortcut;

#[derive(Args, Debug, Default)]
pub struct InstallModArgs {
    /// Manifest id of the mod to install (prompts when omitted)
    #[arg(long = "mod", value_name = "ID")]
    pub mod_id: Option<String>,

    /// Create a desktop shortcut to the mod launcher afterwards
    #[arg(long)]
    pub shortcut: bool,
}

pub async fn execute(ctx: &AppContext, args: InstallModArgs) -> Result<i32> {
    ctx.output.section("Install Mod");

    let operation = ctx.interrupts.begin();
    let cancel = operation.token();
    let manifest = ctx.load_manifest(cancel).await?;

    if manifest.mods.is_empty() {
        ctx.output.warning("No mods available in the manifest");
        return Ok(0);
    }

    let definition: &ModDefinition = match &args.mod_id {
        Some(id) => match manifest.find_mod(id) {
            Some(def) => def,
            None => bail!("Mod '{}' is not listed in the manifest", id),
        },
        None => {
            let labels: Vec<String> = manifest.mods.iter().map(|m| m.display_label()).collect();
            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Select mod to install")
                .items(&labels)
                .default(0)
                .interact_opt()
                .context("Failed to show selection prompt")?;

            match selection {
                Some(idx) => &manifest.mods[idx],
                None => return Ok(0),
            }
        }
    };

    let options =
        InstallOptions::new(ctx.config.paths.mods_path()).with_shortcut(args.shortcut);
    let install_dir = ModInstaller::get_install_directory(definition, &options);
    ctx.output.key_value("Mod:", &definition.name);
    ctx.output.key_value("Target:", &install_dir.display().to_string());
    ctx.output.blank();

    let nexus = ctx.nexus_client()?;
    let bar = ctx
        .progress
        .create_percent_bar(&format!("Installing {}...", definition.name));

    let phase_bar = bar.clone();
    let installer = ModInstaller::new(nexus, ctx.downloader())
        .with_phase_listener(move |phase| phase_bar.set_message(phase.label()));

    let name = definition.name.clone();
    let progress_bar = bar.clone();
    let on_progress = move |percent: f64| {
        set_percent(&progress_bar, percent);
        progress_bar.set_message(format!("Installing {}... {:.1}%", name, percent));
    };

    let result = installer
        .install(definition, &options, Some(&on_progress), cancel)
        .await;
    bar.finish_and_clear();

    for warning in result.warnings() {
        ctx.output.warning(warning);
    }

    if !result.is_success() {
        if cancel.is_cancelled() {
            ctx.output.failure("Installation cancelled");
        }
        for error in result.errors() {
            ctx.output.failure(error);
        }
        return Ok(1);
    }

    let installed = result.installed_path().unwrap_or(install_dir.as_path());
    ctx.output.success(&format!(
        "{} installed to {}",
        definition.name,
        installed.display()
    ));

    if options.create_shortcut {
        if definition.strategy.is_launcher_based() {
            ctx.output.blank();
            create_shortcut::create_for_mod(ctx, installed, &definition.name)?;
        } else {
            ctx.output
                .warning("Shortcuts are only created for mods that ship their own launcher");
        }
    }

    Ok(0)
}

//! Create a desktop shortcut to a mod launcher.

use std::path::Path;

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm};

use salsa_core::shortcut::{desktop_dir, find_launcher, platform_shortcuts};
use salsa_core::SalsaError;

use crate::context::AppContext;

pub fn execute(ctx: &AppContext) -> Result<i32> {
    ctx.output.section("Create Desktop Shortcut");

    let mod_dir = ctx
        .config
        .paths
        .mods_path()
        .join(&ctx.config.shortcut.mod_id);
    create_for_mod(ctx, &mod_dir, &ctx.config.shortcut.name)
}

/// Look for a launcher in `mod_dir` and put a shortcut to it on the desktop
pub fn create_for_mod(ctx: &AppContext, mod_dir: &Path, name: &str) -> Result<i32> {
    let Some(launcher) = find_launcher(mod_dir, &ctx.config.shortcut.launcher_candidates) else {
        ctx.output.failure(&format!("{} launcher not found", name));
        ctx.output.hint(&format!("Searched in: {}", mod_dir.display()));
        log::warn!("Launcher not found in {}", mod_dir.display());
        return Ok(1);
    };

    let desktop = desktop_dir().context("Could not determine the desktop directory")?;
    let service = platform_shortcuts();
    let shortcut_path = desktop.join(service.shortcut_file_name(name));

    if service.shortcut_exists(&shortcut_path) {
        let replace = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} already exists. Replace it?", shortcut_path.display()))
            .default(true)
            .interact()?;
        if !replace {
            return Ok(0);
        }
    }

    match service.create_shortcut(&launcher, &shortcut_path, launcher.parent(), None) {
        Ok(()) => {
            ctx.output
                .success(&format!("Shortcut created: {}", shortcut_path.display()));
            Ok(0)
        }
        Err(SalsaError::UnsupportedOperation(reason)) => {
            ctx.output
                .failure(&format!("Shortcut creation is not available: {}", reason));
            Ok(1)
        }
        Err(e) => Err(e).context("Failed to create shortcut"),
    }
}

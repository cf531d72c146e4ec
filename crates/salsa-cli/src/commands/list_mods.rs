//! List mods and tools from the remote manifest.

use anyhow::Result;

use crate::context::AppContext;

pub async fn execute(ctx: &AppContext) -> Result<i32> {
    let operation = ctx.interrupts.begin();
    let manifest = ctx.load_manifest(operation.token()).await?;

    ctx.output.section("Available Mods");
    if manifest.mods.is_empty() {
        ctx.output.hint("No mods listed in the manifest");
    } else {
        let widths = [24, 28, 16, 20];
        ctx.output.table_row(&["ID", "NAME", "LAUNCH", "NEXUS"], &widths);
        for def in &manifest.mods {
            let nexus = format!("{}/{}", def.nexus.game_domain, def.nexus.mod_id);
            ctx.output.table_row(
                &[
                    def.id.as_str(),
                    def.name.as_str(),
                    def.strategy.label(),
                    nexus.as_str(),
                ],
                &widths,
            );
            if !def.description.is_empty() {
                ctx.output.verbose(&format!("    {}", def.description));
            }
        }
    }

    ctx.output.blank();
    ctx.output.section("Tools");
    if manifest.tools.is_empty() {
        ctx.output.hint("No tools listed in the manifest");
    } else {
        for tool in &manifest.tools {
            ctx.output
                .list_item("-", &format!("{} {} ({})", tool.name, tool.version, tool.id));
            ctx.output.verbose(&format!("    {}", tool.url));
        }
    }

    ctx.output.blank();
    ctx.output.key_value(
        "Mods dir:",
        &ctx.config.paths.mods_path().display().to_string(),
    );

    Ok(0)
}

//! Verify the vanilla game installation.

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::context::AppContext;

#[derive(clap::Args, Debug, Default)]
pub struct VerifyGameArgs {
    /// Launch the game after a successful check without asking
    #[arg(long)]
    pub launch: bool,
}

pub fn execute(ctx: &AppContext, args: VerifyGameArgs) -> Result<i32> {
    let installer = ctx.game_installer();
    let game_dir = ctx.config.paths.game_path();
    ctx.output
        .section(&format!("Verify {} Installation", installer.game().name));

    if !installer.verify_game_installed(&game_dir) {
        ctx.output.failure(&format!(
            "{} not found at {}",
            installer.game().name,
            installer.executable_path(&game_dir).display()
        ));
        ctx.output
            .hint("Install the game first or set paths.game_directory in the config file");
        return Ok(1);
    }

    ctx.output.success(&format!(
        "{} found at {}",
        installer.game().name,
        game_dir.display()
    ));

    let launch = args.launch
        || Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Launch game to verify?")
            .default(false)
            .interact()?;

    if launch {
        match installer
            .launch_game(&game_dir)
            .context("Failed to launch game")?
        {
            Some(child) => {
                ctx.output
                    .info(&format!("Game started (pid {})", child.id()));
            }
            None => {
                ctx.output.failure("Game executable disappeared");
                return Ok(1);
            }
        }
    }

    Ok(0)
}

//! Install the base game through Steam or DepotDownloader.

use anyhow::{Context, Result};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Password, Select};
use tokio_util::sync::CancellationToken;

use salsa_core::game::{
    GameInstaller, OutputStream, SteamCredentials, ToolInstaller, DEPOT_DOWNLOADER_ID,
};

use crate::context::AppContext;
use crate::progress::set_percent;

const METHODS: [&str; 3] = [
    "Via Steam (recommended)",
    "Via DepotDownloader (automated)",
    "Skip (already installed)",
];

pub async fn execute(ctx: &AppContext) -> Result<i32> {
    let installer = ctx.game_installer();
    ctx.output
        .section(&format!("Install {}", installer.game().name));

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Choose installation method")
        .items(&METHODS)
        .default(0)
        .interact_opt()
        .context("Failed to show selection prompt")?;

    match selection {
        Some(0) => {
            show_steam_steps(ctx, &installer);
            Ok(0)
        }
        Some(1) => install_with_depot_downloader(ctx, &installer).await,
        _ => Ok(0),
    }
}

fn show_steam_steps(ctx: &AppContext, installer: &GameInstaller) {
    let game = installer.game();
    let game_path = ctx.config.paths.game_path();

    ctx.output.blank();
    ctx.output.list_item("1.", &format!("Open Steam and install {}", game.name));
    ctx.output.list_item(
        "2.",
        &format!(
            "Copy the game files to {} (or point paths.game_directory at the Steam folder)",
            game_path.display()
        ),
    );
    ctx.output
        .list_item("3.", "Return here and choose 'Verify Vanilla Installation'");
    ctx.output.blank();
    ctx.output.pause();
}

async fn install_with_depot_downloader(ctx: &AppContext, installer: &GameInstaller) -> Result<i32> {
    let operation = ctx.interrupts.begin();
    let cancel = operation.token();

    if !installer.depot_downloader_path().is_file() {
        ctx.output.info("DepotDownloader is not installed yet");
        install_depot_downloader(ctx, installer, cancel).await?;
    }

    ctx.output.blank();
    ctx.output
        .hint("Your credentials are passed to DepotDownloader and never stored.");

    let username: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Steam username")
        .interact_text()?;
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Steam password")
        .interact()?;
    let credentials = SteamCredentials { username, password };

    let install_dir = ctx.config.paths.game_path();
    ctx.output
        .key_value("Target:", &install_dir.display().to_string());
    ctx.output
        .hint("Steam Guard codes are requested by DepotDownloader below.");
    ctx.output.blank();

    let spinner = ctx
        .progress
        .create_spinner(&format!("Downloading {}...", installer.game().name));
    let printer = spinner.clone();
    let observer = move |stream: OutputStream, line: &str| {
        let line = match stream {
            OutputStream::Stdout => style(line).dim().to_string(),
            OutputStream::Stderr => style(line).yellow().to_string(),
        };
        printer.println(format!("  {}", line));
    };

    let result = installer
        .install(&credentials, &install_dir, Some(&observer), cancel)
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(()) => {
            ctx.output.success(&format!(
                "{} installed to {}",
                installer.game().name,
                install_dir.display()
            ));
            Ok(0)
        }
        Err(e) if e.is_cancelled() => {
            ctx.output.failure("Installation cancelled");
            Ok(1)
        }
        Err(e) => Err(e).context("Game installation failed"),
    }
}

async fn install_depot_downloader(
    ctx: &AppContext,
    installer: &GameInstaller,
    cancel: &CancellationToken,
) -> Result<()> {
    let manifest = ctx.load_manifest(cancel).await?;
    let tool = manifest.find_tool(DEPOT_DOWNLOADER_ID).with_context(|| {
        format!("The manifest does not list a '{}' tool", DEPOT_DOWNLOADER_ID)
    })?;

    let bar = ctx
        .progress
        .create_percent_bar(&format!("Downloading {} {}...", tool.name, tool.version));
    let progress_bar = bar.clone();
    let on_progress = move |percent: f64| set_percent(&progress_bar, percent);

    let tools = ToolInstaller::new(ctx.downloader());
    let tool_dir = tools
        .install_tool(tool, &installer.depot_downloader_dir(), Some(&on_progress), cancel)
        .await;
    bar.finish_and_clear();

    let tool_dir = tool_dir.with_context(|| format!("Failed to install {}", tool.name))?;
    ctx.output.success(&format!(
        "{} {} installed to {}",
        tool.name,
        tool.version,
        tool_dir.display()
    ));
    Ok(())
}

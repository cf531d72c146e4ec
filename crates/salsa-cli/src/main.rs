mod commands;
mod context;
mod interrupt;
mod menu;
mod output;
mod progress;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use commands::Commands;
use context::AppContext;
use output::Verbosity;

#[derive(Parser, Debug)]
#[command(name = "salsa")]
#[command(about = "Interactive installer for game mods hosted on Nexus Mods")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Hide progress bars
    #[arg(long, global = true)]
    no_progress: bool,
}

fn run() -> Result<i32> {
    let args = Args::parse();
    let verbosity = Verbosity::from_count(args.verbose);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(verbosity.log_filter()),
    )
    .format_timestamp(None)
    .init();

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| anyhow::anyhow!("Failed to create async runtime: {}", e))?;

    rt.block_on(async move {
        let mut ctx = AppContext::new(args.config.as_deref(), verbosity, !args.no_progress)?;

        match args.command.unwrap_or(Commands::Menu) {
            Commands::Menu => menu::run(&mut ctx).await,
            Commands::InstallGame => commands::install_game::execute(&ctx).await,
            Commands::VerifyGame(verify_args) => commands::verify_game::execute(&ctx, verify_args),
            Commands::ConfigureNexus(nexus_args) => {
                commands::configure_nexus::execute(&mut ctx, nexus_args)
            }
            Commands::InstallMod(install_args) => {
                commands::install_mod::execute(&ctx, install_args).await
            }
            Commands::ListMods => commands::list_mods::execute(&ctx).await,
            Commands::CreateShortcut => commands::create_shortcut::execute(&ctx),
        }
    })
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}

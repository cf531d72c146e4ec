pub mod configure_nexus;
pub mod create_shortcut;
pub mod install_game;
pub mod install_mod;
pub mod list_mods;
pub mod verify_game;

use clap::Subcommand;

use configure_nexus::ConfigureNexusArgs;
use install_mod::InstallModArgs;
use verify_game::VerifyGameArgs;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the interactive main menu (default)
    Menu,

    /// Install the base game via Steam or DepotDownloader
    InstallGame,

    /// Check that the vanilla game is installed
    VerifyGame(VerifyGameArgs),

    /// Store the Nexus Mods API key in the config file
    ConfigureNexus(ConfigureNexusArgs),

    /// Download and install a mod from the manifest
    InstallMod(InstallModArgs),

    /// List mods and tools from the manifest
    ListMods,

    /// Create a desktop shortcut to the mod launcher
    CreateShortcut,
}

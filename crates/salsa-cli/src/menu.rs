//! Interactive main menu.

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Select};

use crate::commands::{
    configure_nexus, create_shortcut, install_game, install_mod, list_mods, verify_game,
};
use crate::context::AppContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    InstallGame,
    VerifyGame,
    ConfigureNexus,
    InstallMod,
    ListMods,
    CreateShortcut,
    Quit,
}

impl MenuAction {
    const ALL: [MenuAction; 7] = [
        MenuAction::InstallGame,
        MenuAction::VerifyGame,
        MenuAction::ConfigureNexus,
        MenuAction::InstallMod,
        MenuAction::ListMods,
        MenuAction::CreateShortcut,
        MenuAction::Quit,
    ];

    fn label(&self, game_name: &str) -> String {
        match self {
            MenuAction::InstallGame => format!("Install {}", game_name),
            MenuAction::VerifyGame => "Verify Vanilla Installation".to_string(),
            MenuAction::ConfigureNexus => "Configure Nexus API Key".to_string(),
            MenuAction::InstallMod => "Install Mod".to_string(),
            MenuAction::ListMods => "List Mods".to_string(),
            MenuAction::CreateShortcut => "Create Desktop Shortcut".to_string(),
            MenuAction::Quit => "Quit".to_string(),
        }
    }
}

pub async fn run(ctx: &mut AppContext) -> Result<i32> {
    loop {
        ctx.output.blank();
        ctx.output.section("Salsa Mod Installer");

        let labels: Vec<String> = MenuAction::ALL
            .iter()
            .map(|action| action.label(&ctx.config.game.name))
            .collect();

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact_opt()
            .context("Failed to show menu")?;

        let action = match selection {
            Some(idx) => MenuAction::ALL[idx],
            None => MenuAction::Quit,
        };
        if action == MenuAction::Quit {
            return Ok(0);
        }

        let outcome = match action {
            MenuAction::InstallGame => install_game::execute(ctx).await,
            MenuAction::VerifyGame => verify_game::execute(ctx, Default::default()),
            MenuAction::ConfigureNexus => configure_nexus::execute(ctx, Default::default()),
            MenuAction::InstallMod => install_mod::execute(ctx, Default::default()).await,
            MenuAction::ListMods => list_mods::execute(ctx).await,
            MenuAction::CreateShortcut => create_shortcut::execute(ctx),
            MenuAction::Quit => Ok(0),
        };

        if let Err(e) = outcome {
            ctx.output.error(&e.to_string());
            for cause in e.chain().skip(1) {
                ctx.output.hint(&format!("Caused by: {}", cause));
            }
            log::debug!("Menu action {:?} failed: {:?}", action, e);
        }

        ctx.output.pause();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_labels() {
        let labels: Vec<String> = MenuAction::ALL
            .iter()
            .map(|action| action.label("Elden Ring"))
            .collect();
        assert_eq!(labels[0], "Install Elden Ring");
        assert_eq!(labels.last().map(String::as_str), Some("Quit"));
        assert_eq!(labels.len(), 7);
    }
}

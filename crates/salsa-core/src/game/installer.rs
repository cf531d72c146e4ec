use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Child;

use tokio_util::sync::CancellationToken;

use crate::config::GameSettings;
use crate::{Result, SalsaError};

use super::process::{run_process, OutputObserver};

pub const DEPOT_DOWNLOADER_ID: &str = "DepotDownloader";
const STEAM_APPID_FILE: &str = "steam_appid.txt";

/// Steam login used by DepotDownloader
#[derive(Clone)]
pub struct SteamCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for SteamCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SteamCredentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

/// Installs, verifies and launches the base game
pub struct GameInstaller {
    game: GameSettings,
    tools_dir: PathBuf,
}

impl GameInstaller {
    pub fn new(game: GameSettings, tools_dir: impl Into<PathBuf>) -> Self {
        Self {
            game,
            tools_dir: tools_dir.into(),
        }
    }

    pub fn game(&self) -> &GameSettings {
        &self.game
    }

    /// `<tools>/DepotDownloader`, whatever the manifest calls the tool
    pub fn depot_downloader_dir(&self) -> PathBuf {
        self.tools_dir.join(DEPOT_DOWNLOADER_ID)
    }

    /// `<tools>/DepotDownloader/DepotDownloader[.exe]`
    pub fn depot_downloader_path(&self) -> PathBuf {
        let binary = if cfg!(windows) {
            "DepotDownloader.exe"
        } else {
            "DepotDownloader"
        };
        self.depot_downloader_dir().join(binary)
    }

    pub fn depot_downloader_args(
        &self,
        credentials: &SteamCredentials,
        install_dir: &Path,
    ) -> Vec<String> {
        vec![
            "-app".to_string(),
            self.game.app_id.to_string(),
            "-username".to_string(),
            credentials.username.clone(),
            "-password".to_string(),
            credentials.password.clone(),
            "-os".to_string(),
            self.game.depot_os.clone(),
            "-no-mobile".to_string(),
            "-dir".to_string(),
            install_dir.to_string_lossy().into_owned(),
        ]
    }

    /// Download the game with DepotDownloader
    ///
    /// On success `steam_appid.txt` is written next to the game files.
    pub async fn install(
        &self,
        credentials: &SteamCredentials,
        install_dir: &Path,
        observer: Option<&OutputObserver>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let depot_downloader = self.depot_downloader_path();
        if !depot_downloader.is_file() {
            return Err(SalsaError::Process(format!(
                "DepotDownloader not found at {}",
                depot_downloader.display()
            )));
        }

        tokio::fs::create_dir_all(install_dir)
            .await
            .map_err(|e| SalsaError::filesystem(install_dir, e))?;

        log::info!(
            "Installing {} (app {}) to {} as {}",
            self.game.name,
            self.game.app_id,
            install_dir.display(),
            credentials.username
        );

        let args = self.depot_downloader_args(credentials, install_dir);
        run_process(&depot_downloader, &args, observer, cancel).await?;

        let appid_path = install_dir.join(STEAM_APPID_FILE);
        tokio::fs::write(&appid_path, self.game.app_id.to_string())
            .await
            .map_err(|e| SalsaError::filesystem(&appid_path, e))?;

        log::info!("{} installation complete", self.game.name);
        Ok(())
    }

    pub fn executable_path(&self, install_dir: &Path) -> PathBuf {
        install_dir.join(&self.game.executable)
    }

    /// Check that the game executable exists under `install_dir`
    pub fn verify_game_installed(&self, install_dir: &Path) -> bool {
        let executable = self.executable_path(install_dir);
        let exists = executable.is_file();
        log::info!(
            "{} verification: {} exists = {}",
            self.game.name,
            executable.display(),
            exists
        );
        exists
    }

    /// Start the game, or `None` when it is not installed
    pub fn launch_game(&self, install_dir: &Path) -> Result<Option<Child>> {
        let executable = self.executable_path(install_dir);
        if !executable.is_file() {
            log::error!("Cannot launch - game not found at: {}", executable.display());
            return Ok(None);
        }

        let working_dir = executable.parent().unwrap_or(install_dir);
        log::info!("Launching {}: {}", self.game.name, executable.display());

        let child = std::process::Command::new(&executable)
            .current_dir(working_dir)
            .spawn()
            .map_err(|e| {
                SalsaError::Process(format!("failed to launch {}: {}", executable.display(), e))
            })?;

        Ok(Some(child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn credentials() -> SteamCredentials {
        SteamCredentials {
            username: "tarnished".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn test_depot_downloader_args() {
        let installer = GameInstaller::new(GameSettings::default(), "/tools");
        let args = installer.depot_downloader_args(&credentials(), Path::new("/games/ELDENRING"));

        assert_eq!(
            args,
            vec![
                "-app",
                "1245620",
                "-username",
                "tarnished",
                "-password",
                "hunter2",
                "-os",
                "windows",
                "-no-mobile",
                "-dir",
                "/games/ELDENRING",
            ]
        );
    }

    #[test]
    fn test_depot_downloader_path() {
        let installer = GameInstaller::new(GameSettings::default(), "/tools");
        let path = installer.depot_downloader_path();
        assert_eq!(installer.depot_downloader_dir(), Path::new("/tools/DepotDownloader"));
        assert_eq!(path.parent(), Some(installer.depot_downloader_dir().as_path()));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let debug = format!("{:?}", credentials());
        assert!(debug.contains("tarnished"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_verify_and_launch_missing_game() {
        let temp_dir = TempDir::new().unwrap();
        let installer = GameInstaller::new(GameSettings::default(), temp_dir.path());

        assert!(!installer.verify_game_installed(temp_dir.path()));
        assert!(installer.launch_game(temp_dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_verify_installed_game() {
        let temp_dir = TempDir::new().unwrap();
        let installer = GameInstaller::new(GameSettings::default(), temp_dir.path());
        let executable = installer.executable_path(temp_dir.path());
        std::fs::create_dir_all(executable.parent().unwrap()).unwrap();
        std::fs::write(&executable, b"MZ").unwrap();

        assert!(installer.verify_game_installed(temp_dir.path()));
    }

    #[tokio::test]
    async fn test_install_without_depot_downloader() {
        let temp_dir = TempDir::new().unwrap();
        let installer = GameInstaller::new(GameSettings::default(), temp_dir.path().join("tools"));

        let err = installer
            .install(
                &credentials(),
                &temp_dir.path().join("game"),
                None,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SalsaError::Process(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_runs_tool_and_writes_appid() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let installer = GameInstaller::new(GameSettings::default(), temp_dir.path().join("tools"));

        let tool = installer.depot_downloader_path();
        std::fs::create_dir_all(tool.parent().unwrap()).unwrap();
        std::fs::write(&tool, "#!/bin/sh\necho \"Downloading depot\"\nexit 0\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let game_dir = temp_dir.path().join("game");
        installer
            .install(&credentials(), &game_dir, None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(game_dir.join("steam_appid.txt")).unwrap(),
            "1245620"
        );
    }
}

use std::path::Path;

use crate::{Result, SalsaError};

use super::ShortcutService;

/// freedesktop.org `.desktop` launchers
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopEntryShortcuts;

impl DesktopEntryShortcuts {
    /// Render the desktop entry contents
    pub fn render(
        name: &str,
        target: &Path,
        working_dir: Option<&Path>,
        arguments: Option<&str>,
    ) -> String {
        let mut exec = quote_exec_arg(&target.to_string_lossy());
        if let Some(args) = arguments.filter(|a| !a.trim().is_empty()) {
            exec.push(' ');
            exec.push_str(args.trim());
        }

        let mut entry = format!(
            "[Desktop Entry]\n\
             Type=Application\n\
             Name={}\n\
             Exec={}\n\
             Icon=applications-games\n\
             Terminal=false\n\
             Categories=Game;\n",
            name, exec
        );

        if let Some(dir) = working_dir {
            entry.push_str(&format!("Path={}\n", dir.to_string_lossy()));
        }

        entry
    }
}

impl ShortcutService for DesktopEntryShortcuts {
    fn create_shortcut(
        &self,
        target: &Path,
        shortcut_path: &Path,
        working_dir: Option<&Path>,
        arguments: Option<&str>,
    ) -> Result<()> {
        let name = shortcut_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Game".to_string());

        if let Some(parent) = shortcut_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SalsaError::filesystem(parent, e))?;
        }

        let contents = Self::render(&name, target, working_dir, arguments);
        std::fs::write(shortcut_path, contents)
            .map_err(|e| SalsaError::filesystem(shortcut_path, e))?;

        // Desktop environments refuse to launch entries that are not executable
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(shortcut_path, std::fs::Permissions::from_mode(0o755))
                .map_err(|e| SalsaError::filesystem(shortcut_path, e))?;
        }

        log::info!("Shortcut created at {}", shortcut_path.display());
        Ok(())
    }

    fn shortcut_file_name(&self, name: &str) -> String {
        format!("{}.desktop", name)
    }
}

/// Quote a value for the `Exec` key
fn quote_exec_arg(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_entry() {
        let entry = DesktopEntryShortcuts::render(
            "Elden Ring Reforged",
            Path::new("/games/Mods/err/Launch ELDEN RING Reforged.bat"),
            Some(Path::new("/games/Mods/err")),
            None,
        );

        assert!(entry.starts_with("[Desktop Entry]\n"));
        assert!(entry.contains("Name=Elden Ring Reforged\n"));
        assert!(entry.contains("Exec=\"/games/Mods/err/Launch ELDEN RING Reforged.bat\"\n"));
        assert!(entry.contains("Path=/games/Mods/err\n"));
    }

    #[test]
    fn test_quote_exec_arg() {
        assert_eq!(quote_exec_arg("/a b/c"), "\"/a b/c\"");
        assert_eq!(quote_exec_arg("/a$b"), "\"/a\\$b\"");
    }

    #[cfg(unix)]
    #[test]
    fn test_create_shortcut_writes_executable_entry() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let service = DesktopEntryShortcuts;
        let shortcut = temp_dir
            .path()
            .join("Desktop")
            .join(service.shortcut_file_name("Elden Ring Reforged"));

        assert!(!service.shortcut_exists(&shortcut));
        service
            .create_shortcut(Path::new("/opt/err/launch.bat"), &shortcut, None, Some("--fast"))
            .unwrap();

        assert!(service.shortcut_exists(&shortcut));
        let contents = std::fs::read_to_string(&shortcut).unwrap();
        assert!(contents.contains("Name=Elden Ring Reforged\n"));
        assert!(contents.contains("Exec=\"/opt/err/launch.bat\" --fast\n"));
        assert!(!contents.contains("Path="));

        let mode = std::fs::metadata(&shortcut).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}

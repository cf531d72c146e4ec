use serde::{Deserialize, Serialize};

/// Remote configuration snapshot: directory layout, mods and tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub directory: DirectoryConfig,
    pub mods: Vec<ModDefinition>,
    pub tools: Vec<ToolDefinition>,
}

impl Manifest {
    pub fn find_mod(&self, id: &str) -> Option<&ModDefinition> {
        self.mods.iter().find(|m| m.id.eq_ignore_ascii_case(id))
    }

    pub fn find_tool(&self, id: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.id.eq_ignore_ascii_case(id))
    }
}

/// directory.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DirectoryConfig {
    #[serde(alias = "installRoot")]
    pub install_root: String,

    #[serde(alias = "gameDirectory")]
    pub game_directory: String,

    #[serde(alias = "modsDirectory")]
    pub mods_directory: String,
}

/// One entry of mods.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModDefinition {
    #[serde(alias = "id")]
    pub id: String,

    #[serde(alias = "name")]
    pub name: String,

    #[serde(default, alias = "description")]
    pub description: String,

    #[serde(alias = "nexus")]
    pub nexus: NexusInfo,

    #[serde(alias = "strategy")]
    pub strategy: InstallStrategy,
}

impl ModDefinition {
    /// "Name - Description", or just the name when there is no description
    pub fn display_label(&self) -> String {
        if self.description.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.description)
        }
    }
}

/// Where a mod lives on Nexus Mods and which file to pick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NexusInfo {
    /// Game domain, e.g. "eldenring"
    #[serde(alias = "gameDomain")]
    pub game_domain: String,

    #[serde(alias = "modId")]
    pub mod_id: u64,

    /// "main", "latest", or anything else for the first listed file
    #[serde(alias = "filePattern")]
    pub file_pattern: String,
}

/// One entry of tools.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ToolDefinition {
    #[serde(alias = "id")]
    pub id: String,

    #[serde(alias = "name")]
    pub name: String,

    #[serde(alias = "url")]
    pub url: String,

    #[serde(alias = "version")]
    pub version: String,
}

/// How an installed mod gets launched
///
/// Accepts the tag name (any case) or its numeric index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StrategyRepr")]
pub enum InstallStrategy {
    /// The mod ships its own launcher
    ErrLauncher,
    /// Loaded through the Mod Engine 2 framework
    ModEngine2,
}

impl InstallStrategy {
    pub fn is_launcher_based(&self) -> bool {
        matches!(self, InstallStrategy::ErrLauncher)
    }

    pub fn label(&self) -> &'static str {
        match self {
            InstallStrategy::ErrLauncher => "mod launcher",
            InstallStrategy::ModEngine2 => "Mod Engine 2",
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrategyRepr {
    Name(String),
    Index(u64),
}

impl TryFrom<StrategyRepr> for InstallStrategy {
    type Error = String;

    fn try_from(repr: StrategyRepr) -> Result<Self, Self::Error> {
        match repr {
            StrategyRepr::Name(name) => match name.to_lowercase().as_str() {
                "errlauncher" => Ok(InstallStrategy::ErrLauncher),
                "modengine2" => Ok(InstallStrategy::ModEngine2),
                _ => Err(format!("unknown install strategy: {}", name)),
            },
            StrategyRepr::Index(0) => Ok(InstallStrategy::ErrLauncher),
            StrategyRepr::Index(1) => Ok(InstallStrategy::ModEngine2),
            StrategyRepr::Index(n) => Err(format!("unknown install strategy index: {}", n)),
        }
    }
}

use crate::error::{CliError, Result};
use molsel::core::models::structure::{CollisionPolicy, DEFAULT_COLLISION_DISTANCE};
use molsel::select::MacroRegistry;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// TOML configuration file:
///
/// ```toml
/// [append]
/// collision-distance = 1.5
///
/// [macros]
/// myligand = "resname LIG and noh"
/// ```
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    #[serde(default)]
    pub append: AppendConfig,
    #[serde(default)]
    pub macros: HashMap<String, String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct AppendConfig {
    pub collision_distance: Option<f64>,
}

impl FileConfig {
    /// Built-in macros plus the user macros from the `[macros]` table.
    pub fn macro_registry(&self) -> MacroRegistry {
        MacroRegistry::with_user(self.macros.clone())
    }

    pub fn collision_policy(&self) -> CollisionPolicy {
        CollisionPolicy {
            distance: self
                .append
                .collision_distance
                .unwrap_or(DEFAULT_COLLISION_DISTANCE),
        }
    }
}

pub fn load(path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let content = std::fs::read_to_string(path).map_err(|e| {
        CliError::Config(format!("cannot read '{}': {e}", path.display()))
    })?;
    let config: FileConfig = toml::from_str(&content).map_err(|e| {
        CliError::Config(format!("invalid config file '{}': {e}", path.display()))
    })?;
    if let Some(distance) = config.append.collision_distance {
        if !(distance >= 0.0) {
            return Err(CliError::Config(format!(
                "collision-distance must be non-negative, got {distance}"
            )));
        }
    }
    debug!(path = %path.display(), "loaded configuration file");
    Ok(config)
}

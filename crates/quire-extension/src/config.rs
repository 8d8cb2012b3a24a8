//! Loader configuration.
//!
//! Each kind has its own filename suffix and exported symbol names. Values
//! come from built-in defaults, optionally overridden by a TOML file and then
//! by environment variables:
//!
//! ```toml
//! [module]
//! suffix = "_module"
//!
//! [plugin]
//! suffix = "_plugin"
//! factory_symbol = "quire_plugin_create"
//! destroyer_symbol = "quire_plugin_destroy"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExtensionError, Result};
use crate::kind::{ExtensionKind, Module, Plugin};

/// Environment variable names.
pub mod env_vars {
    pub const MODULE_SUFFIX: &str = "QUIRE_MODULE_SUFFIX";
    pub const PLUGIN_SUFFIX: &str = "QUIRE_PLUGIN_SUFFIX";
}

/// Settings for one extension kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindConfig {
    /// Suffix every library file stem of this kind ends with.
    pub suffix: String,
    /// Exported factory symbol.
    pub factory_symbol: String,
    /// Exported destroyer symbol.
    pub destroyer_symbol: String,
}

impl KindConfig {
    /// Built-in defaults for kind `K`.
    pub fn defaults_for<K: ExtensionKind>() -> Self {
        Self {
            suffix: K::DEFAULT_SUFFIX.to_string(),
            factory_symbol: K::FACTORY_SYMBOL.to_string(),
            destroyer_symbol: K::DESTROYER_SYMBOL.to_string(),
        }
    }
}

/// Configuration of both extension kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionConfig {
    pub module: KindConfig,
    pub plugin: KindConfig,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            module: KindConfig::defaults_for::<Module>(),
            plugin: KindConfig::defaults_for::<Plugin>(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawKindConfig {
    suffix: Option<String>,
    factory_symbol: Option<String>,
    destroyer_symbol: Option<String>,
}

impl RawKindConfig {
    fn resolve<K: ExtensionKind>(self) -> KindConfig {
        let defaults = KindConfig::defaults_for::<K>();
        KindConfig {
            suffix: self.suffix.unwrap_or(defaults.suffix),
            factory_symbol: self.factory_symbol.unwrap_or(defaults.factory_symbol),
            destroyer_symbol: self.destroyer_symbol.unwrap_or(defaults.destroyer_symbol),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    module: RawKindConfig,
    plugin: RawKindConfig,
}

impl ExtensionConfig {
    /// Parse a TOML document. Missing keys fall back to the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        let config = Self {
            module: raw.module.resolve::<Module>(),
            plugin: raw.plugin.resolve::<Plugin>(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(suffix) = lookup(env_vars::MODULE_SUFFIX) {
            self.module.suffix = suffix;
        }
        if let Some(suffix) = lookup(env_vars::PLUGIN_SUFFIX) {
            self.plugin.suffix = suffix;
        }
        self.validate()
    }

    /// Check that the two kinds can never be confused with each other.
    pub fn validate(&self) -> Result<()> {
        for (kind, section) in [("module", &self.module), ("plugin", &self.plugin)] {
            if section.suffix.is_empty() {
                return Err(ExtensionError::Config(format!("{kind}.suffix is empty")));
            }
            if section.factory_symbol.is_empty() || section.destroyer_symbol.is_empty() {
                return Err(ExtensionError::Config(format!(
                    "{kind} symbols must not be empty"
                )));
            }
        }

        if self.module.suffix.ends_with(&self.plugin.suffix)
            || self.plugin.suffix.ends_with(&self.module.suffix)
        {
            return Err(ExtensionError::Config(format!(
                "module suffix '{}' and plugin suffix '{}' overlap",
                self.module.suffix, self.plugin.suffix
            )));
        }

        Ok(())
    }

    /// Suffixes of every kind, used to reject cross-loading.
    pub fn suffixes(&self) -> [&str; 2] {
        [self.module.suffix.as_str(), self.plugin.suffix.as_str()]
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ExtensionError::Config(e.to_string()))
    }
}

//! Extension kinds.
//!
//! Modules and plugins share the same load/unload mechanics and differ only in
//! their type tag, their file suffix and the names of their exported symbols.
//! [`ExtensionKind`] carries those differences so that the manager, the
//! aggregator and the loaders are written once.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::aggregator::ExtensionAggregator;
use crate::config::{ExtensionConfig, KindConfig};

/// Compile-time description of an extension kind.
pub trait ExtensionKind:
    Sized + Clone + fmt::Debug + PartialEq + Eq + Send + Sync + 'static
{
    /// Kind-specific type tag carried by every descriptor.
    type Type: Copy
        + Eq
        + Hash
        + fmt::Debug
        + fmt::Display
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Lowercase kind name used in logs and configuration.
    const NAME: &'static str;

    /// Default file stem suffix for libraries of this kind.
    const DEFAULT_SUFFIX: &'static str;

    /// Default exported factory symbol.
    const FACTORY_SYMBOL: &'static str;

    /// Default exported destroyer symbol.
    const DESTROYER_SYMBOL: &'static str;

    /// Select this kind's section of the configuration.
    fn config(config: &ExtensionConfig) -> &KindConfig;

    /// Process-wide aggregator for this kind.
    fn aggregator() -> Arc<ExtensionAggregator<Self>>;
}

/// Marker for module extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Module {}

/// Marker for plugin extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plugin {}

/// Type tag of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Index,
    Admin,
    System,
    Service,
    Default,
    Custom,
}

impl ModuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::Index => "index",
            ModuleType::Admin => "admin",
            ModuleType::System => "system",
            ModuleType::Service => "service",
            ModuleType::Default => "default",
            ModuleType::Custom => "custom",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type tag of a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginType {
    Index,
    Admin,
    Root,
    System,
    Cron,
    Core,
    Theme,
    Default,
    Custom,
}

impl PluginType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginType::Index => "index",
            PluginType::Admin => "admin",
            PluginType::Root => "root",
            PluginType::System => "system",
            PluginType::Cron => "cron",
            PluginType::Core => "core",
            PluginType::Theme => "theme",
            PluginType::Default => "default",
            PluginType::Custom => "custom",
        }
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static MODULE_AGGREGATOR: Lazy<Arc<ExtensionAggregator<Module>>> =
    Lazy::new(|| Arc::new(ExtensionAggregator::new()));

static PLUGIN_AGGREGATOR: Lazy<Arc<ExtensionAggregator<Plugin>>> =
    Lazy::new(|| Arc::new(ExtensionAggregator::new()));

impl ExtensionKind for Module {
    type Type = ModuleType;

    const NAME: &'static str = "module";
    const DEFAULT_SUFFIX: &'static str = "_module";
    const FACTORY_SYMBOL: &'static str = "quire_module_create";
    const DESTROYER_SYMBOL: &'static str = "quire_module_destroy";

    fn config(config: &ExtensionConfig) -> &KindConfig {
        &config.module
    }

    fn aggregator() -> Arc<ExtensionAggregator<Self>> {
        MODULE_AGGREGATOR.clone()
    }
}

impl ExtensionKind for Plugin {
    type Type = PluginType;

    const NAME: &'static str = "plugin";
    const DEFAULT_SUFFIX: &'static str = "_plugin";
    const FACTORY_SYMBOL: &'static str = "quire_plugin_create";
    const DESTROYER_SYMBOL: &'static str = "quire_plugin_destroy";

    fn config(config: &ExtensionConfig) -> &KindConfig {
        &config.plugin
    }

    fn aggregator() -> Arc<ExtensionAggregator<Self>> {
        PLUGIN_AGGREGATOR.clone()
    }
}

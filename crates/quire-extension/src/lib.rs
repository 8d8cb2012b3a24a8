//! Dynamic module and plugin loading for Quire.
//!
//! Extensions are native libraries (.so/.dylib/.dll) exporting a factory and
//! a destroyer symbol. Modules and plugins share the same mechanics and only
//! differ in their [`ExtensionKind`].
//!
//! ```text
//! ┌──────────────────────┐  load(name)   ┌──────────────────┐
//! │ ExtensionManager<K>  │──────────────▶│  DynamicLoader   │
//! │  name → (instance,   │◀──────────────│  (libloading)    │
//! │          library)    │  symbols      └──────────────────┘
//! └──────────┬───────────┘
//!            │ names / details / errors
//!            ▼
//! ┌──────────────────────┐
//! │ ExtensionAggregator  │
//! └──────────────────────┘
//! ```
//!
//! # Host side
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quire_extension::{ExtensionAggregator, ExtensionConfig, PluginManager};
//!
//! let config = ExtensionConfig::default();
//! let plugins = PluginManager::new(&config, Arc::new(ExtensionAggregator::new()));
//!
//! if let Some(search) = plugins.load("search") {
//!     search.run();
//!     plugins.unload(search);
//! }
//! ```
//!
//! # Extension side
//!
//! ```rust,ignore
//! use quire_extension::{export_plugin, Extension, ExtensionDescriptor, Plugin, PluginType};
//!
//! struct Search { descriptor: ExtensionDescriptor<Plugin> }
//!
//! impl Extension<Plugin> for Search {
//!     fn descriptor(&self) -> &ExtensionDescriptor<Plugin> { &self.descriptor }
//!     fn extension_type(&self) -> PluginType { PluginType::Default }
//!     fn run(&self) {}
//! }
//!
//! export_plugin!(|| Search { descriptor: ExtensionDescriptor::new("search") });
//! ```

pub mod aggregator;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod extension;
pub mod ffi;
pub mod kind;
pub mod loader;
pub mod manager;

pub use aggregator::ExtensionAggregator;
pub use config::{ExtensionConfig, KindConfig};
pub use descriptor::{ExtensionDescriptor, License};
pub use error::{ExtensionError, Result};
pub use extension::{DynExtension, Extension};
pub use kind::{ExtensionKind, Module, ModuleType, Plugin, PluginType};
pub use loader::{DynamicLoader, NativeLibrary, NativeLoader};
pub use manager::{
    ExtensionHandle, ExtensionManager, ExtensionRef, ModuleManager, PluginManager,
};

/// Aggregator of module metadata.
pub type ModuleAggregator = ExtensionAggregator<Module>;

/// Aggregator of plugin metadata.
pub type PluginAggregator = ExtensionAggregator<Plugin>;

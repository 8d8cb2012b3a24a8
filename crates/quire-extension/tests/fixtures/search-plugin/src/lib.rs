//! Minimal plugin used by the native loader tests.

use std::sync::atomic::{AtomicU64, Ordering};

use quire_extension::{export_plugin, Extension, ExtensionDescriptor, License, Plugin, PluginType};

static RUNS: AtomicU64 = AtomicU64::new(0);

pub struct SearchPlugin {
    descriptor: ExtensionDescriptor<Plugin>,
}

impl SearchPlugin {
    fn new() -> Self {
        let version = semver::Version::parse(env!("CARGO_PKG_VERSION"))
            .unwrap_or_else(|_| semver::Version::new(0, 0, 0));
        Self {
            descriptor: ExtensionDescriptor::new("search-plugin")
                .with_name("Search")
                .with_description("Full-text search over published posts")
                .with_compiled_date(env!("SEARCH_PLUGIN_COMPILED_AT"))
                .with_license(License::Free)
                .with_kind_type(PluginType::Default)
                .with_version(version)
                .with_author("Quire Team"),
        }
    }
}

impl Extension<Plugin> for SearchPlugin {
    fn descriptor(&self) -> &ExtensionDescriptor<Plugin> {
        &self.descriptor
    }

    fn extension_type(&self) -> PluginType {
        PluginType::Default
    }

    fn run(&self) {
        RUNS.fetch_add(1, Ordering::SeqCst);
    }
}

export_plugin!(SearchPlugin::new, || RUNS.store(0, Ordering::SeqCst));

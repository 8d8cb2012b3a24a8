//! Shared test doubles for extension manager tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::env::consts::{DLL_EXTENSION, DLL_PREFIX};
use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;

use quire_extension::ffi::{self, DestroyerFn, FactoryFn};
use quire_extension::{
    DynExtension, DynamicLoader, Extension, ExtensionAggregator, ExtensionDescriptor, ExtensionError,
    ExtensionManager, KindConfig, License, Plugin, PluginType, Result,
};

/// Open/close bookkeeping shared between a loader and the test that owns it.
#[derive(Debug, Default)]
pub struct Counters {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
}

impl Counters {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// A library known to the fake loader.
#[derive(Clone, Copy)]
pub struct FakeLibrary {
    pub factory: Option<FactoryFn>,
    pub destroyer: Option<DestroyerFn>,
}

impl FakeLibrary {
    pub fn new(factory: FactoryFn, destroyer: DestroyerFn) -> Self {
        Self {
            factory: Some(factory),
            destroyer: Some(destroyer),
        }
    }
}

/// Loader double serving in-process "libraries" and counting opens and closes.
#[derive(Default)]
pub struct CountingLoader {
    libraries: HashMap<String, FakeLibrary>,
    counters: Arc<Counters>,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_library(mut self, name: &str, library: FakeLibrary) -> Self {
        self.libraries.insert(name.to_string(), library);
        self
    }

    pub fn counters(&self) -> Arc<Counters> {
        self.counters.clone()
    }
}

impl DynamicLoader for CountingLoader {
    type Library = FakeLibrary;

    fn open(&self, name: &str) -> Result<FakeLibrary> {
        let library = self
            .libraries
            .get(name)
            .copied()
            .ok_or_else(|| ExtensionError::LibraryNotFound {
                name: name.to_string(),
                reason: "no such fake library".to_string(),
            })?;
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        Ok(library)
    }

    fn factory(&self, library: &FakeLibrary, symbol: &str) -> Result<FactoryFn> {
        library.factory.ok_or_else(|| ExtensionError::SymbolNotFound {
            symbol: symbol.to_string(),
            reason: "not exported".to_string(),
        })
    }

    fn destroyer(&self, library: &FakeLibrary, symbol: &str) -> Result<DestroyerFn> {
        library.destroyer.ok_or_else(|| ExtensionError::SymbolNotFound {
            symbol: symbol.to_string(),
            reason: "not exported".to_string(),
        })
    }

    fn close(&self, _library: FakeLibrary) -> Result<()> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Build a plugin manager over `loader` with a private aggregator.
pub fn plugin_manager(
    loader: CountingLoader,
) -> (ExtensionManager<Plugin, CountingLoader>, Arc<Counters>) {
    let counters = loader.counters();
    let manager = ExtensionManager::with_loader(
        loader,
        KindConfig::defaults_for::<Plugin>(),
        Arc::new(ExtensionAggregator::new()),
    );
    (manager, counters)
}

/// The search plugin used throughout the scenarios.
pub struct SearchPlugin {
    descriptor: ExtensionDescriptor<Plugin>,
    runs: AtomicUsize,
}

impl SearchPlugin {
    pub fn new() -> Self {
        Self {
            descriptor: search_descriptor(),
            runs: AtomicUsize::new(0),
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
        self.runs.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn search_descriptor() -> ExtensionDescriptor<Plugin> {
    ExtensionDescriptor::new("search-plugin")
        .with_name("Search")
        .with_description("Full-text search over published posts")
        .with_compiled_date("2024-05-01T12:00:00Z")
        .with_license(License::Free)
        .with_kind_type(PluginType::Default)
        .with_version(semver::Version::new(1, 4, 2))
        .with_author("Quire Team")
        .with_url("https://quire.example/plugins/search")
}

pub extern "C" fn search_create() -> *mut c_void {
    ffi::construct::<Plugin, _>(|| {
        let extension: DynExtension<Plugin> = Box::new(SearchPlugin::new());
        extension
    })
}

pub extern "C" fn null_create() -> *mut c_void {
    std::ptr::null_mut()
}

pub extern "C" fn panicking_create() -> *mut c_void {
    ffi::construct::<Plugin, _>(|| panic!("search index missing"))
}

pub extern "C" fn noop_destroy() {}

pub fn search_library() -> FakeLibrary {
    FakeLibrary::new(search_create as FactoryFn, noop_destroy as DestroyerFn)
}

/// Overrides the fixture build with a prebuilt library.
pub const SEARCH_PLUGIN_LIB_ENV: &str = "QUIRE_SEARCH_PLUGIN_LIB";

static SEARCH_PLUGIN_LIB: Lazy<PathBuf> = Lazy::new(|| {
    if let Ok(path) = std::env::var(SEARCH_PLUGIN_LIB_ENV) {
        return PathBuf::from(path);
    }

    let manifest =
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/search-plugin/Cargo.toml");
    let target_dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("search-plugin");
    let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());

    let status = Command::new(cargo)
        .args(["build", "--quiet", "--manifest-path"])
        .arg(&manifest)
        .arg("--target-dir")
        .arg(&target_dir)
        .status()
        .expect("failed to spawn cargo");
    assert!(
        status.success(),
        "building {} failed; set {} to a prebuilt library",
        manifest.display(),
        SEARCH_PLUGIN_LIB_ENV
    );

    target_dir
        .join("debug")
        .join(format!("{DLL_PREFIX}search_plugin.{DLL_EXTENSION}"))
});

/// Path of the search-plugin cdylib, built on first use.
pub fn search_plugin_library() -> String {
    SEARCH_PLUGIN_LIB.display().to_string()
}

//! Extension manager for loading and unloading dynamic extensions.
//!
//! The manager owns a registry mapping each load name to the live instance
//! and the native library it came from:
//! - `load` opens the library, resolves the factory and destroyer symbols,
//!   calls the factory and registers the result; it is idempotent per name
//!   and leaves nothing behind when any step fails.
//! - `unload` drops the instance, calls the destroyer, closes the library
//!   and forgets the name.
//!
//! Failures are routine (missing file, missing symbol) and are reported as an
//! absent result plus a log line, never as a panic.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{MappedRwLockReadGuard, Mutex, RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

use crate::aggregator::ExtensionAggregator;
use crate::config::{ExtensionConfig, KindConfig};
use crate::descriptor::ExtensionDescriptor;
use crate::error::{ExtensionError, Result};
use crate::extension::{DynExtension, Extension};
use crate::ffi;
use crate::kind::{ExtensionKind, Module, Plugin};
use crate::loader::{DynamicLoader, NativeLoader};

/// Shared slot holding an instance until it is unloaded.
type InstanceSlot<K> = RwLock<Option<DynExtension<K>>>;

/// Borrowed access to a loaded extension.
pub type ExtensionRef<'a, K> = MappedRwLockReadGuard<'a, dyn Extension<K> + 'static>;

/// Owned handle to a loaded extension, returned by [`ExtensionManager::load`].
///
/// The only way to destroy the instance is to give the handle back to
/// [`ExtensionManager::unload`], which consumes it. Loading the same name
/// twice yields two handles to one instance; once either is unloaded the
/// other reports the instance as gone instead of dangling.
///
/// Unloading waits for outstanding [`ExtensionRef`] borrows to end, so do not
/// hold one on the thread that unloads.
pub struct ExtensionHandle<K: ExtensionKind> {
    name: String,
    slot: Arc<InstanceSlot<K>>,
}

impl<K: ExtensionKind> ExtensionHandle<K> {
    /// Name the extension was loaded under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrow the extension, or `None` if it has been unloaded.
    pub fn extension(&self) -> Option<ExtensionRef<'_, K>> {
        RwLockReadGuard::try_map(self.slot.read(), |slot| slot.as_deref()).ok()
    }

    /// Whether the instance is still loaded.
    pub fn is_alive(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Call the extension's entry point. Returns `false` if it is gone.
    pub fn run(&self) -> bool {
        match self.extension() {
            Some(extension) => {
                extension.run();
                true
            }
            None => false,
        }
    }

    /// Whether both handles refer to the same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<K: ExtensionKind> fmt::Debug for ExtensionHandle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionHandle")
            .field("kind", &K::NAME)
            .field("name", &self.name)
            .field("alive", &self.is_alive())
            .finish()
    }
}

struct RegistryEntry<K: ExtensionKind, Lib> {
    instance: Arc<InstanceSlot<K>>,
    library: Lib,
    loaded_at: DateTime<Utc>,
}

struct ManagerState<K: ExtensionKind, Lib> {
    registry: HashMap<String, RegistryEntry<K, Lib>>,
    loaded: bool,
}

/// Loads and unloads extensions of kind `K`.
pub struct ExtensionManager<K: ExtensionKind, L: DynamicLoader = NativeLoader<K>> {
    loader: L,
    symbols: KindConfig,
    aggregator: Arc<ExtensionAggregator<K>>,
    state: Mutex<ManagerState<K, L::Library>>,
}

/// Manager for modules backed by the native loader.
pub type ModuleManager = ExtensionManager<Module>;

/// Manager for plugins backed by the native loader.
pub type PluginManager = ExtensionManager<Plugin>;

impl<K: ExtensionKind> ExtensionManager<K> {
    /// Create a manager using the platform loader.
    pub fn new(config: &ExtensionConfig, aggregator: Arc<ExtensionAggregator<K>>) -> Self {
        Self::with_loader(
            NativeLoader::new(config),
            K::config(config).clone(),
            aggregator,
        )
    }
}

impl<K: ExtensionKind, L: DynamicLoader> ExtensionManager<K, L> {
    /// Create a manager with a custom loader.
    pub fn with_loader(
        loader: L,
        symbols: KindConfig,
        aggregator: Arc<ExtensionAggregator<K>>,
    ) -> Self {
        Self {
            loader,
            symbols,
            aggregator,
            state: Mutex::new(ManagerState {
                registry: HashMap::new(),
                loaded: false,
            }),
        }
    }

    /// Aggregator this manager reports into.
    pub fn aggregator(&self) -> &Arc<ExtensionAggregator<K>> {
        &self.aggregator
    }

    /// Load the extension named `name`, or return the already-loaded instance.
    ///
    /// Returns `None` if the library, either symbol or the instance could not
    /// be obtained; the failure is logged and recorded in the aggregator.
    pub fn load(&self, name: &str) -> Option<ExtensionHandle<K>> {
        match self.try_load(name) {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(kind = K::NAME, name, error = %e, "Failed to load extension");
                None
            }
        }
    }

    /// Like [`load`](Self::load) but reports why loading failed.
    pub fn try_load(&self, name: &str) -> Result<ExtensionHandle<K>> {
        let mut state = self.state.lock();

        if let Some(entry) = state.registry.get(name) {
            debug!(kind = K::NAME, name, "Extension already loaded");
            let handle = ExtensionHandle {
                name: name.to_string(),
                slot: entry.instance.clone(),
            };
            state.loaded = true;
            return Ok(handle);
        }

        let (library, extension) = match self.instantiate(name) {
            Ok(loaded) => loaded,
            Err(e) => {
                state.loaded = false;
                drop(state);
                self.aggregator.set_error(format!("{}: {}", name, e));
                return Err(e);
            }
        };

        let slot = Arc::new(RwLock::new(Some(extension)));
        state.registry.insert(
            name.to_string(),
            RegistryEntry {
                instance: slot.clone(),
                library,
                loaded_at: Utc::now(),
            },
        );
        state.loaded = true;

        // Snapshots reach the aggregator in registry order.
        self.aggregator.add_name(name);
        self.aggregator.add_detail(Self::snapshot(&state));
        drop(state);

        info!(kind = K::NAME, name, "Extension loaded");

        Ok(ExtensionHandle {
            name: name.to_string(),
            slot,
        })
    }

    /// Open the library and build one instance; closes the library on failure.
    fn instantiate(&self, name: &str) -> Result<(L::Library, DynExtension<K>)> {
        let library = self.loader.open(name)?;

        let factory = match self.loader.factory(&library, &self.symbols.factory_symbol) {
            Ok(factory) => factory,
            Err(e) => {
                self.release(name, library);
                return Err(e);
            }
        };
        if let Err(e) = self.loader.destroyer(&library, &self.symbols.destroyer_symbol) {
            self.release(name, library);
            return Err(e);
        }
        debug!(kind = K::NAME, name, "Resolved extension symbols");

        // SAFETY: the factory symbol returns null or a pointer from `ffi::into_raw`.
        let extension = unsafe { ffi::from_raw::<K>(factory()) };
        match extension {
            Some(extension) => Ok((library, extension)),
            None => {
                self.release(name, library);
                Err(ExtensionError::FactoryReturnedNull {
                    name: name.to_string(),
                })
            }
        }
    }

    fn release(&self, name: &str, library: L::Library) {
        if let Err(e) = self.loader.close(library) {
            warn!(kind = K::NAME, name, error = %e, "Failed to close library");
        }
    }

    /// Unload the extension behind `handle`.
    ///
    /// The handle is consumed whether or not the manager was tracking it. An
    /// untracked handle is logged as a warning and touches nothing.
    pub fn unload(&self, handle: ExtensionHandle<K>) {
        if let Err(e) = self.try_unload(handle) {
            warn!(kind = K::NAME, error = %e, "Ignoring unload request");
        }
    }

    /// Unload the handle in `slot`, leaving `None` behind. Empty slots are a no-op.
    pub fn unload_in_place(&self, slot: &mut Option<ExtensionHandle<K>>) {
        if let Some(handle) = slot.take() {
            self.unload(handle);
        }
    }

    /// Like [`unload`](Self::unload) but reports an untracked handle as an error.
    pub fn try_unload(&self, handle: ExtensionHandle<K>) -> Result<()> {
        let ExtensionHandle { name, slot } = handle;

        let entry = {
            let mut state = self.state.lock();
            // A stale alias from an earlier load of the same name must not
            // take down the instance that replaced it.
            let tracked = state
                .registry
                .get(&name)
                .map(|entry| Arc::ptr_eq(&entry.instance, &slot))
                .unwrap_or(false);
            if tracked {
                state.registry.remove(&name)
            } else {
                None
            }
        };
        drop(slot);

        let Some(entry) = entry else {
            return Err(ExtensionError::UntrackedExtension { name });
        };

        self.teardown(&name, entry);
        info!(kind = K::NAME, name = %name, "Extension unloaded");
        Ok(())
    }

    fn teardown(&self, name: &str, entry: RegistryEntry<K, L::Library>) {
        let RegistryEntry {
            instance, library, ..
        } = entry;

        // The instance's drop glue lives in the library, so it goes first.
        drop(instance.write().take());

        match self.loader.destroyer(&library, &self.symbols.destroyer_symbol) {
            // SAFETY: the destroyer was resolved with the `DestroyerFn` signature.
            Ok(destroyer) => unsafe { destroyer() },
            Err(e) => warn!(kind = K::NAME, name, error = %e, "Destroyer not callable"),
        }

        self.release(name, library);
    }

    /// Outcome of the last load: `true` after a success, `false` after a failure.
    pub fn is_loaded(&self) -> bool {
        self.state.lock().loaded
    }

    /// Whether `name` is currently loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.state.lock().registry.contains_key(name)
    }

    /// Names of all loaded extensions, sorted.
    pub fn loaded_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.lock().registry.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.state.lock().registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().registry.is_empty()
    }

    /// Descriptor of the extension loaded under `name`.
    pub fn descriptor(&self, name: &str) -> Option<ExtensionDescriptor<K>> {
        let state = self.state.lock();
        let entry = state.registry.get(name)?;
        let slot = entry.instance.read();
        slot.as_ref().map(|extension| extension.descriptor().clone())
    }

    /// Descriptors of all loaded extensions, ordered by name.
    pub fn descriptors(&self) -> Vec<ExtensionDescriptor<K>> {
        Self::snapshot(&self.state.lock())
    }

    /// When the extension under `name` was loaded.
    pub fn loaded_at(&self, name: &str) -> Option<DateTime<Utc>> {
        self.state.lock().registry.get(name).map(|entry| entry.loaded_at)
    }

    fn snapshot(state: &ManagerState<K, L::Library>) -> Vec<ExtensionDescriptor<K>> {
        let mut entries: Vec<_> = state.registry.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
            .into_iter()
            .filter_map(|(_, entry)| {
                entry
                    .instance
                    .read()
                    .as_ref()
                    .map(|extension| extension.descriptor().clone())
            })
            .collect()
    }
}

impl<K: ExtensionKind, L: DynamicLoader> Drop for ExtensionManager<K, L> {
    fn drop(&mut self) {
        let entries: Vec<_> = self.state.get_mut().registry.drain().collect();
        for (name, entry) in entries {
            debug!(kind = K::NAME, name = %name, "Unloading extension on manager drop");
            self.teardown(&name, entry);
        }
    }
}

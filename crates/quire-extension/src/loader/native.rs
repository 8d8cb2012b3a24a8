//! Native loader for .so/.dylib/.dll files.

use std::env::consts::{DLL_EXTENSION, DLL_PREFIX};
use std::marker::PhantomData;
use std::path::Path;

use libloading::{Library, Symbol};

use super::DynamicLoader;
use crate::config::ExtensionConfig;
use crate::error::{ExtensionError, Result};
use crate::ffi::{DestroyerFn, FactoryFn};
use crate::kind::ExtensionKind;

/// Loader backed by the platform's `dlopen`/`LoadLibrary`.
///
/// A logical name such as `search` becomes `libsearch_plugin.so` (for the
/// plugin kind on Linux) and is handed to the platform loader as a bare file
/// name, so the platform's own search rules apply. A name that already looks
/// like a path is opened as-is, after checking that its file stem carries
/// this kind's suffix.
pub struct NativeLoader<K: ExtensionKind> {
    suffix: String,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ExtensionKind> NativeLoader<K> {
    /// Create a loader using the suffix configured for `K`.
    pub fn new(config: &ExtensionConfig) -> Self {
        Self {
            suffix: K::config(config).suffix.clone(),
            _kind: PhantomData,
        }
    }

    /// Platform file name for a logical extension name.
    pub fn file_name(&self, name: &str) -> String {
        format!("{}{}{}.{}", DLL_PREFIX, name, self.suffix, DLL_EXTENSION)
    }

    /// Resolve `name` into what is passed to the platform loader.
    pub fn resolve(&self, name: &str) -> Result<String> {
        if !is_explicit_path(name) {
            return Ok(self.file_name(name));
        }

        let stem = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        if stem.ends_with(&self.suffix) {
            Ok(name.to_string())
        } else {
            Err(ExtensionError::WrongKind {
                name: name.to_string(),
                expected: K::NAME,
            })
        }
    }
}

/// An open native library and the file it was opened from.
pub struct NativeLibrary {
    file: String,
    library: Library,
}

impl NativeLibrary {
    /// File name or path handed to the platform loader.
    pub fn file(&self) -> &str {
        &self.file
    }
}

fn close_failed(file: &str, reason: impl std::fmt::Display) -> ExtensionError {
    ExtensionError::CloseFailed {
        name: file.to_string(),
        reason: reason.to_string(),
    }
}

/// Whether `name` names a file rather than a logical extension.
fn is_explicit_path(name: &str) -> bool {
    name.contains('/')
        || name.contains(std::path::MAIN_SEPARATOR)
        || Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| ext == DLL_EXTENSION)
            .unwrap_or(false)
}

impl<K: ExtensionKind> DynamicLoader for NativeLoader<K> {
    type Library = NativeLibrary;

    fn open(&self, name: &str) -> Result<NativeLibrary> {
        let file = self.resolve(name)?;
        tracing::debug!(kind = K::NAME, name, file = %file, "Opening library");

        // SAFETY: running a library's initialisers is the whole point of
        // loading an extension; extensions execute with full host privileges.
        let library =
            unsafe { Library::new(&file) }.map_err(|e| ExtensionError::LibraryNotFound {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        Ok(NativeLibrary { file, library })
    }

    fn factory(&self, library: &NativeLibrary, symbol: &str) -> Result<FactoryFn> {
        // SAFETY: the symbol is required to have the `FactoryFn` signature.
        let sym: Symbol<FactoryFn> =
            unsafe { library.library.get(symbol.as_bytes()) }.map_err(|e| {
                ExtensionError::SymbolNotFound {
                    symbol: symbol.to_string(),
                    reason: e.to_string(),
                }
            })?;
        Ok(*sym)
    }

    fn destroyer(&self, library: &NativeLibrary, symbol: &str) -> Result<DestroyerFn> {
        // SAFETY: the symbol is required to have the `DestroyerFn` signature.
        let sym: Symbol<DestroyerFn> =
            unsafe { library.library.get(symbol.as_bytes()) }.map_err(|e| {
                ExtensionError::SymbolNotFound {
                    symbol: symbol.to_string(),
                    reason: e.to_string(),
                }
            })?;
        Ok(*sym)
    }

    fn close(&self, library: NativeLibrary) -> Result<()> {
        let NativeLibrary { file, library } = library;
        library.close().map_err(|e| close_failed(&file, e))
    }
}

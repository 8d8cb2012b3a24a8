//! Platform dynamic loaders.
//!
//! [`ExtensionManager`](crate::ExtensionManager) never talks to the operating
//! system directly; it goes through a [`DynamicLoader`], which opens a library
//! by name, resolves the two exported symbols and closes the library again.

pub mod native;

pub use native::{NativeLibrary, NativeLoader};

use crate::error::Result;
use crate::ffi::{DestroyerFn, FactoryFn};

/// Opens native libraries and resolves extension symbols.
pub trait DynamicLoader: Send + Sync {
    /// Opaque handle of an opened library.
    type Library: Send + Sync;

    /// Open the library identified by `name`.
    fn open(&self, name: &str) -> Result<Self::Library>;

    /// Resolve the factory symbol.
    fn factory(&self, library: &Self::Library, symbol: &str) -> Result<FactoryFn>;

    /// Resolve the destroyer symbol.
    fn destroyer(&self, library: &Self::Library, symbol: &str) -> Result<DestroyerFn>;

    /// Release the library.
    fn close(&self, library: Self::Library) -> Result<()>;
}

//! FFI conventions shared by the host and extension libraries.
//!
//! An extension library exports two symbols:
//! - a factory `extern "C" fn() -> *mut c_void` returning a new instance, and
//! - a destroyer `extern "C" fn()` releasing library-wide resources before the
//!   library is closed.
//!
//! The instance pointer is a thin pointer to a heap-allocated
//! `Box<dyn Extension<K>>` (a double box), produced by [`into_raw`] and taken
//! back by [`from_raw`]. Host and extension must both use the system allocator.
//!
//! Use [`export_module!`](crate::export_module) or
//! [`export_plugin!`](crate::export_plugin) instead of writing the symbols by hand.

use std::any::Any;
use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};

use crate::extension::DynExtension;
use crate::kind::ExtensionKind;

/// Signature of the exported factory symbol.
pub type FactoryFn = unsafe extern "C" fn() -> *mut c_void;

/// Signature of the exported destroyer symbol.
pub type DestroyerFn = unsafe extern "C" fn();

/// Leak an extension into the raw pointer handed across the ABI.
pub fn into_raw<K: ExtensionKind>(extension: DynExtension<K>) -> *mut c_void {
    Box::into_raw(Box::new(extension)) as *mut c_void
}

/// Take back ownership of a pointer produced by [`into_raw`].
///
/// Returns `None` for a null pointer.
///
/// # Safety
/// `raw` must be null or come from [`into_raw`] with the same kind `K`, and
/// must not have been taken back already.
pub unsafe fn from_raw<K: ExtensionKind>(raw: *mut c_void) -> Option<DynExtension<K>> {
    if raw.is_null() {
        return None;
    }
    // SAFETY: guaranteed by the caller.
    let outer = unsafe { Box::from_raw(raw as *mut DynExtension<K>) };
    Some(*outer)
}

/// Run an extension constructor for a factory symbol.
///
/// A panicking constructor yields null instead of unwinding into the host.
pub fn construct<K, F>(ctor: F) -> *mut c_void
where
    K: ExtensionKind,
    F: FnOnce() -> DynExtension<K>,
{
    match panic::catch_unwind(AssertUnwindSafe(ctor)) {
        Ok(extension) => into_raw(extension),
        Err(payload) => {
            tracing::warn!(
                kind = K::NAME,
                panic = panic_message(&*payload),
                "Extension constructor panicked"
            );
            std::ptr::null_mut()
        }
    }
}

/// Run an extension cleanup hook for a destroyer symbol.
///
/// A panicking hook is logged and swallowed.
pub fn destroy<F: FnOnce()>(cleanup: F) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(cleanup)) {
        tracing::warn!(
            panic = panic_message(&*payload),
            "Extension destroyer panicked"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __export_extension {
    ($kind:ty, $create:ident, $destroy:ident, $ctor:expr, $cleanup:expr) => {
        #[no_mangle]
        pub extern "C" fn $create() -> *mut ::std::ffi::c_void {
            $crate::ffi::construct::<$kind, _>(|| {
                let extension: ::std::boxed::Box<dyn $crate::Extension<$kind>> =
                    ::std::boxed::Box::new(($ctor)());
                extension
            })
        }

        #[no_mangle]
        pub extern "C" fn $destroy() {
            $crate::ffi::destroy($cleanup)
        }
    };
}

/// Export the factory and destroyer symbols of a module library.
///
/// ```rust,ignore
/// quire_extension::export_module!(PagesModule::new);
/// quire_extension::export_module!(PagesModule::new, || CACHE.clear());
/// ```
#[macro_export]
macro_rules! export_module {
    ($ctor:expr) => {
        $crate::export_module!($ctor, || {});
    };
    ($ctor:expr, $cleanup:expr) => {
        $crate::__export_extension!(
            $crate::Module,
            quire_module_create,
            quire_module_destroy,
            $ctor,
            $cleanup
        );
    };
}

/// Export the factory and destroyer symbols of a plugin library.
///
/// ```rust,ignore
/// quire_extension::export_plugin!(SearchPlugin::new);
/// ```
#[macro_export]
macro_rules! export_plugin {
    ($ctor:expr) => {
        $crate::export_plugin!($ctor, || {});
    };
    ($ctor:expr, $cleanup:expr) => {
        $crate::__export_extension!(
            $crate::Plugin,
            quire_plugin_create,
            quire_plugin_destroy,
            $ctor,
            $cleanup
        );
    };
}

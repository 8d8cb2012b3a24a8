//! The capability surface every loaded extension implements.

use crate::descriptor::{ExtensionDescriptor, License};
use crate::kind::ExtensionKind;

/// A loaded module or plugin.
///
/// Accessors never fail: a field the extension did not populate is `None`.
/// `run` is the single entry point the host calls after a successful load;
/// failures inside it are the extension's own business to report.
pub trait Extension<K: ExtensionKind>: Send + Sync {
    /// Descriptor owned by this instance.
    fn descriptor(&self) -> &ExtensionDescriptor<K>;

    /// Type tag of this extension.
    fn extension_type(&self) -> K::Type;

    /// Entry point invoked by the host.
    fn run(&self);

    fn code_name(&self) -> Option<&str> {
        self.descriptor().code_name()
    }

    fn name(&self) -> Option<&str> {
        self.descriptor().name()
    }

    fn description(&self) -> Option<&str> {
        self.descriptor().description()
    }

    fn compiled_date(&self) -> Option<&str> {
        self.descriptor().compiled_date()
    }

    fn license(&self) -> Option<License> {
        self.descriptor().license()
    }

    fn kind_type(&self) -> Option<K::Type> {
        self.descriptor().kind_type()
    }

    fn version(&self) -> Option<&semver::Version> {
        self.descriptor().version()
    }

    fn author(&self) -> Option<&str> {
        self.descriptor().author()
    }

    fn url(&self) -> Option<&str> {
        self.descriptor().url()
    }
}

/// Boxed extension as produced by a factory symbol.
pub type DynExtension<K> = Box<dyn Extension<K>>;

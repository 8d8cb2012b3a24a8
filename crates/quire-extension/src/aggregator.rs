//! Per-kind collector of extension names, descriptors and errors.
//!
//! Hosts read the aggregator to report what has been loaded. It is fed by
//! [`ExtensionManager`](crate::ExtensionManager) and never forgets anything:
//! unloading an extension does not remove its name or its descriptor.
//!
//! Note the asymmetry between the mutators: [`add_name`](ExtensionAggregator::add_name)
//! and [`set_error`](ExtensionAggregator::set_error) append, while
//! [`add_detail`](ExtensionAggregator::add_detail) replaces the whole detail list.

use parking_lot::Mutex;

use crate::descriptor::ExtensionDescriptor;
use crate::kind::ExtensionKind;

struct AggregatorState<K: ExtensionKind> {
    names: Vec<String>,
    details: Vec<ExtensionDescriptor<K>>,
    errors: Vec<String>,
}

/// Collector of extension metadata for one kind.
pub struct ExtensionAggregator<K: ExtensionKind> {
    state: Mutex<AggregatorState<K>>,
}

impl<K: ExtensionKind> ExtensionAggregator<K> {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AggregatorState {
                names: Vec::new(),
                details: Vec::new(),
                errors: Vec::new(),
            }),
        }
    }

    /// The process-wide aggregator of kind `K`.
    pub fn instance() -> std::sync::Arc<Self> {
        K::aggregator()
    }

    /// Replace the detail list.
    pub fn add_detail(&self, details: Vec<ExtensionDescriptor<K>>) {
        self.state.lock().details = details;
    }

    /// Append a name.
    pub fn add_name(&self, name: impl Into<String>) {
        self.state.lock().names.push(name.into());
    }

    /// Append an error message.
    pub fn set_error(&self, message: impl Into<String>) {
        self.state.lock().errors.push(message.into());
    }

    pub fn detail(&self) -> Vec<ExtensionDescriptor<K>> {
        self.state.lock().details.clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.state.lock().names.clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.state.lock().errors.clone()
    }
}

impl<K: ExtensionKind> Default for ExtensionAggregator<K> {
    fn default() -> Self {
        Self::new()
    }
}

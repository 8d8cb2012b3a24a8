//! Extension descriptor.
//!
//! A descriptor is built by the extension while it constructs itself and is
//! immutable afterwards: the `with_*` builders consume the value, and the
//! [`Extension`](crate::Extension) trait only ever hands out `&ExtensionDescriptor`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kind::ExtensionKind;

/// Distribution license of an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum License {
    Free,
    Commercial,
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            License::Free => f.write_str("free"),
            License::Commercial => f.write_str("commercial"),
        }
    }
}

/// Metadata describing one extension instance.
///
/// Every field is optional; an extension that never populates a field reports
/// it as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ExtensionDescriptor<K: ExtensionKind> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compiled_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    license: Option<License>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind_type: Option<K::Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<semver::Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl<K: ExtensionKind> ExtensionDescriptor<K> {
    /// Create a descriptor with only the code name populated.
    pub fn new(code_name: impl Into<String>) -> Self {
        Self::empty().with_code_name(code_name)
    }

    /// Create a descriptor with every field absent.
    pub fn empty() -> Self {
        Self {
            code_name: None,
            name: None,
            description: None,
            compiled_date: None,
            license: None,
            kind_type: None,
            version: None,
            author: None,
            url: None,
        }
    }

    pub fn with_code_name(mut self, code_name: impl Into<String>) -> Self {
        self.code_name = Some(code_name.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the build timestamp of the extension binary.
    pub fn with_compiled_date(mut self, compiled_date: impl Into<String>) -> Self {
        self.compiled_date = Some(compiled_date.into());
        self
    }

    pub fn with_license(mut self, license: License) -> Self {
        self.license = Some(license);
        self
    }

    pub fn with_kind_type(mut self, kind_type: K::Type) -> Self {
        self.kind_type = Some(kind_type);
        self
    }

    pub fn with_version(mut self, version: semver::Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn code_name(&self) -> Option<&str> {
        self.code_name.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn compiled_date(&self) -> Option<&str> {
        self.compiled_date.as_deref()
    }

    pub fn license(&self) -> Option<License> {
        self.license
    }

    pub fn kind_type(&self) -> Option<K::Type> {
        self.kind_type
    }

    pub fn version(&self) -> Option<&semver::Version> {
        self.version.as_ref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

impl<K: ExtensionKind> Default for ExtensionDescriptor<K> {
    fn default() -> Self {
        Self::empty()
    }
}

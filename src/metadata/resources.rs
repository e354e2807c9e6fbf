//! Manifest resources.
//!
//! Resource compilers name the `.resources` blob of a class after the class itself
//! (`MyApp.MainForm.resources`, and `MyApp.MainForm+Nested.resources` for nested types),
//! which is the only link between a resource and its owner.

use crate::metadata::typesystem::TypeName;

/// Suffix of resources generated for a class
pub const RESOURCE_SUFFIX: &str = ".resources";

/// An embedded manifest resource
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    /// Resource name
    pub name: String,
    /// True for `Public`, false for `Private` resources
    pub public: bool,
    /// Resource contents
    pub data: Vec<u8>,
}

impl Resource {
    /// Creates a public resource
    #[must_use]
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Resource {
            name: name.into(),
            public: true,
            data,
        }
    }

    /// Full name of the class owning this resource, if the name follows the
    /// `<TypeFullName>.resources` convention
    #[must_use]
    pub fn owner_name(&self) -> Option<TypeName> {
        let stem = self.name.strip_suffix(RESOURCE_SUFFIX)?;
        if stem.is_empty() {
            return None;
        }

        stem.replace('+', "/").parse().ok()
    }
}

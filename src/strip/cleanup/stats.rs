//! Statistics tracking for cleanup operations.
//!
//! Provides [`CleanupStats`] to track what was removed during cleanup,
//! useful for reporting and debugging.

use std::fmt;

use crate::metadata::typesystem::TypeDef;

/// Statistics from a cleanup operation.
///
/// Tracks the number of items removed in each category, providing
/// visibility into what the cleanup process accomplished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupStats {
    /// Number of types (TypeDef) removed.
    pub types_removed: usize,
    /// Number of methods (MethodDef) removed with their types.
    pub methods_removed: usize,
    /// Number of fields removed with their types.
    pub fields_removed: usize,
    /// Number of properties removed with their types.
    pub properties_removed: usize,
    /// Number of events removed with their types.
    pub events_removed: usize,
    /// Number of custom attributes removed with their owners.
    pub attributes_removed: usize,
    /// Number of manifest resources removed.
    pub resources_removed: usize,
    /// Number of AssemblyRef entries removed.
    pub references_removed: usize,
    /// Number of TypeRef entries removed (orphaned).
    pub typerefs_removed: usize,
    /// Number of MemberRef entries removed (orphaned).
    pub memberrefs_removed: usize,
    /// Number of TypeSpec entries removed (orphaned).
    pub typespecs_removed: usize,
    /// Number of MethodSpec entries removed (orphaned).
    pub methodspecs_removed: usize,
    /// Number of types whose visibility was lowered.
    pub types_demoted: usize,
}

impl CleanupStats {
    /// Creates a new empty stats instance.
    ///
    /// All counters are initialized to zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a removed type together with everything it owned.
    pub fn record_type(&mut self, def: &TypeDef) {
        self.types_removed += 1;
        self.methods_removed += def.methods.len();
        self.fields_removed += def.fields.len();
        self.properties_removed += def.properties.len();
        self.events_removed += def.events.len();

        self.attributes_removed += def.custom_attributes.len()
            + def
                .generic_params
                .iter()
                .map(|param| param.custom_attributes.len())
                .sum::<usize>()
            + def
                .fields
                .iter()
                .map(|field| field.custom_attributes.len())
                .sum::<usize>()
            + def
                .methods
                .iter()
                .map(|method| {
                    method.custom_attributes.len()
                        + method
                            .params
                            .iter()
                            .map(|param| param.custom_attributes.len())
                            .sum::<usize>()
                })
                .sum::<usize>()
            + def
                .properties
                .iter()
                .map(|property| property.custom_attributes.len())
                .sum::<usize>()
            + def
                .events
                .iter()
                .map(|event| event.custom_attributes.len())
                .sum::<usize>();
    }

    /// Returns the total number of metadata entries removed.
    ///
    /// This includes types with their members and attributes, resources,
    /// assembly references and all orphaned reference rows.
    #[must_use]
    pub fn total_removed(&self) -> usize {
        self.primary_removed()
            + self.members_removed()
            + self.attributes_removed
            + self.orphans_removed()
    }

    /// Returns true if anything was removed or demoted.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.total_removed() > 0 || self.types_demoted > 0
    }

    /// Returns the count of primary items removed (types, resources, references).
    ///
    /// Primary items are the entries a cleanup phase deletes explicitly, as opposed
    /// to members and orphaned rows that go away as a consequence.
    #[must_use]
    pub fn primary_removed(&self) -> usize {
        self.types_removed + self.resources_removed + self.references_removed
    }

    /// Returns the count of members removed together with their types.
    #[must_use]
    pub fn members_removed(&self) -> usize {
        self.methods_removed + self.fields_removed + self.properties_removed + self.events_removed
    }

    /// Returns the count of orphaned reference rows removed.
    ///
    /// Orphaned rows pointed into an assembly reference that was pruned.
    #[must_use]
    pub fn orphans_removed(&self) -> usize {
        self.typerefs_removed
            + self.memberrefs_removed
            + self.typespecs_removed
            + self.methodspecs_removed
    }

    /// Merges stats from another cleanup operation into this one.
    ///
    /// All counters from `other` are added to the corresponding counters
    /// in `self`. This is useful when combining stats from multiple phases.
    pub fn merge(&mut self, other: &CleanupStats) {
        self.types_removed += other.types_removed;
        self.methods_removed += other.methods_removed;
        self.fields_removed += other.fields_removed;
        self.properties_removed += other.properties_removed;
        self.events_removed += other.events_removed;
        self.attributes_removed += other.attributes_removed;
        self.resources_removed += other.resources_removed;
        self.references_removed += other.references_removed;
        self.typerefs_removed += other.typerefs_removed;
        self.memberrefs_removed += other.memberrefs_removed;
        self.typespecs_removed += other.typespecs_removed;
        self.methodspecs_removed += other.methodspecs_removed;
        self.types_demoted += other.types_demoted;
    }
}

impl fmt::Display for CleanupStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_changes() {
            return write!(f, "No changes");
        }

        let mut parts = Vec::new();

        if self.types_removed > 0 {
            parts.push(format!("{} types", self.types_removed));
        }
        let members = self.members_removed();
        if members > 0 {
            parts.push(format!("{members} members"));
        }
        if self.attributes_removed > 0 {
            parts.push(format!("{} attributes", self.attributes_removed));
        }
        if self.resources_removed > 0 {
            parts.push(format!("{} resources", self.resources_removed));
        }
        if self.references_removed > 0 {
            parts.push(format!("{} references", self.references_removed));
        }

        let orphans = self.orphans_removed();
        if orphans > 0 {
            parts.push(format!("{orphans} orphaned entries"));
        }

        if self.types_demoted > 0 {
            if parts.is_empty() {
                return write!(f, "Demoted: {} types", self.types_demoted);
            }
            return write!(
                f,
                "Removed: {}; demoted: {} types",
                parts.join(", "),
                self.types_demoted
            );
        }

        write!(f, "Removed: {}", parts.join(", "))
    }
}

//! Results of the mark phase: the used set and its complement.

use std::collections::{btree_map, BTreeMap, BTreeSet};

use crate::{
    metadata::{store::MetadataStore, token::Token, typesystem::TypeName},
    strip::ScanStats,
};

/// A type visited by the scan.
///
/// Nodes of the primary module are `foreign == false` and are the only removal candidates.
/// Foreign nodes live in resolved dependencies and are tracked for liveness only.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeNode {
    /// Name of the module defining the type
    pub module: String,
    /// `TypeDef` token inside that module
    pub token: Token,
    /// True if the type is defined outside the primary module
    pub foreign: bool,
}

/// Every type transitively reachable from the roots of one scan.
///
/// Closed under all edge kinds and under enclosing-type containment.
#[derive(Clone, Debug, Default)]
pub struct UsedSet {
    module: String,
    local: BTreeSet<Token>,
    foreign: BTreeSet<TypeNode>,
    stats: ScanStats,
}

impl UsedSet {
    pub(crate) fn new(
        module: String,
        local: BTreeSet<Token>,
        foreign: BTreeSet<TypeNode>,
        stats: ScanStats,
    ) -> Self {
        UsedSet {
            module,
            local,
            foreign,
            stats,
        }
    }

    /// Name of the primary module the set was computed for
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Returns true if a type of the primary module is used
    #[must_use]
    pub fn contains_local(&self, token: Token) -> bool {
        self.local.contains(&token)
    }

    /// Returns true if the node is used
    #[must_use]
    pub fn contains(&self, node: &TypeNode) -> bool {
        if node.foreign {
            self.foreign.contains(node)
        } else {
            node.module == self.module && self.local.contains(&node.token)
        }
    }

    /// Used types of the primary module, in token order
    pub fn local_tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.local.iter().copied()
    }

    /// Used types of dependency modules
    pub fn foreign_nodes(&self) -> impl Iterator<Item = &TypeNode> {
        self.foreign.iter()
    }

    /// All used nodes, local ones first
    pub fn iter(&self) -> impl Iterator<Item = TypeNode> + '_ {
        self.local
            .iter()
            .map(|token| TypeNode {
                module: self.module.clone(),
                token: *token,
                foreign: false,
            })
            .chain(self.foreign.iter().cloned())
    }

    /// Number of used types of the primary module
    #[must_use]
    pub fn local_len(&self) -> usize {
        self.local.len()
    }

    /// Number of used nodes, local and foreign
    #[must_use]
    pub fn len(&self) -> usize {
        self.local.len() + self.foreign.len()
    }

    /// Returns true if nothing was reached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.foreign.is_empty()
    }

    /// Full names of the used types of the primary module
    #[must_use]
    pub fn local_names(&self, store: &dyn MetadataStore) -> Vec<TypeName> {
        self.local
            .iter()
            .filter_map(|token| store.type_name(*token))
            .collect()
    }

    /// Statistics of the scan that produced this set
    #[must_use]
    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }
}

/// Types of the primary module that the scan did not reach.
///
/// Names are captured at classification time, so they remain available after the types
/// themselves have been removed (resource cleanup matches on them).
#[derive(Clone, Debug, Default)]
pub struct UnusedSet {
    types: BTreeMap<Token, TypeName>,
    names: BTreeSet<TypeName>,
}

impl UnusedSet {
    pub(crate) fn insert(&mut self, token: Token, name: TypeName) {
        self.names.insert(name.clone());
        self.types.insert(token, name);
    }

    /// Returns true if the type is unused
    #[must_use]
    pub fn contains(&self, token: Token) -> bool {
        self.types.contains_key(&token)
    }

    /// Returns true if a type with this full name is unused
    #[must_use]
    pub fn contains_name(&self, name: &TypeName) -> bool {
        self.names.contains(name)
    }

    /// Name captured for an unused type
    #[must_use]
    pub fn name(&self, token: Token) -> Option<&TypeName> {
        self.types.get(&token)
    }

    /// Unused types with their names, in token order
    pub fn iter(&self) -> btree_map::Iter<'_, Token, TypeName> {
        self.types.iter()
    }

    /// Unused type tokens, in token order
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.types.keys().copied()
    }

    /// Unused type names, sorted
    pub fn names(&self) -> impl Iterator<Item = &TypeName> {
        self.names.iter()
    }

    /// Number of unused types
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if every type is used
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

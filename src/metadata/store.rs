//! The metadata store interface.
//!
//! The stripper does not care how a module was parsed. It operates on anything that can
//! answer lookups by token and apply the handful of mutations the cleanup operations need.
//! [`ModuleDefinition`](crate::metadata::module::ModuleDefinition) is the in-memory
//! implementation shipped with this crate; binary readers plug in by implementing
//! [`MetadataStore`] themselves.
//!
//! Dependency modules are shared between the resolver cache and concurrent scans as
//! [`ModuleHandle`]s, so the trait requires `Send + Sync`.

use std::sync::Arc;

use crate::{
    metadata::{
        customattributes::CustomAttribute,
        references::{AssemblyRef, MemberRef, MethodSpec, ResolutionScope, TypeRef, CORE_LIBRARY_NAMES},
        resources::Resource,
        signatures::TypeSignature,
        token::Token,
        typesystem::{TypeDef, TypeName, TypeVisibility},
    },
    Result,
};

/// A shared, read-only handle to a loaded module
pub type ModuleHandle = Arc<dyn MetadataStore>;

/// Upper bound for nesting chains (types inside types, type references inside type
/// references). Longer chains only occur in damaged metadata with cycles.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Rows that were removed together with an assembly reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReferenceRemoval {
    /// Type references scoped to the removed assembly
    pub type_refs: usize,
    /// Type specifications built on removed type references
    pub type_specs: usize,
    /// Member references whose parent was removed
    pub member_refs: usize,
    /// Method instantiations whose generic method was removed
    pub method_specs: usize,
}

impl ReferenceRemoval {
    /// Total number of cascaded rows
    #[must_use]
    pub fn total(&self) -> usize {
        self.type_refs + self.type_specs + self.member_refs + self.method_specs
    }
}

/// Read and mutation access to the metadata of one module.
///
/// Lookups return `None` for tokens the store does not know; callers decide whether that is
/// malformed metadata or an expected miss. The provided methods derive names and scopes
/// from the required lookups and can be overridden when the store keeps an index.
pub trait MetadataStore: Send + Sync {
    /// Simple name of the assembly this module belongs to
    fn name(&self) -> &str;

    /// All `TypeDef` tokens, in ascending order
    fn type_tokens(&self) -> Vec<Token>;

    /// Looks up a type definition
    fn type_def(&self, token: Token) -> Option<&TypeDef>;

    /// Looks up a type reference
    fn type_ref(&self, token: Token) -> Option<&TypeRef>;

    /// Looks up a type specification
    fn type_spec(&self, token: Token) -> Option<&TypeSignature>;

    /// Looks up a member reference
    fn member_ref(&self, token: Token) -> Option<&MemberRef>;

    /// Looks up a generic method instantiation
    fn method_spec(&self, token: Token) -> Option<&MethodSpec>;

    /// Looks up an assembly reference
    fn assembly_ref(&self, token: Token) -> Option<&AssemblyRef>;

    /// All `AssemblyRef` tokens, in ascending order
    fn assembly_ref_tokens(&self) -> Vec<Token>;

    /// Embedded manifest resources
    fn resources(&self) -> &[Resource];

    /// Custom attributes applied to the assembly and the module
    fn module_attributes(&self) -> &[CustomAttribute];

    /// The `TypeDef` declaring a field, method, property or event
    fn declaring_type(&self, member: Token) -> Option<Token>;

    /// Removes a type together with every type nested inside it.
    ///
    /// # Returns
    /// The removed definitions, the requested type first.
    ///
    /// # Errors
    /// Returns [`crate::Error::TokenNotFound`] if the type does not exist.
    fn remove_type(&mut self, token: Token) -> Result<Vec<TypeDef>>;

    /// Removes a manifest resource by name
    fn remove_resource(&mut self, name: &str) -> Option<Resource>;

    /// Removes an assembly reference and the rows that only exist to point into it.
    ///
    /// # Errors
    /// Returns [`crate::Error::TokenNotFound`] if the reference does not exist.
    fn remove_assembly_ref(&mut self, token: Token) -> Result<ReferenceRemoval>;

    /// Replaces the visibility bits of a type
    ///
    /// # Errors
    /// Returns [`crate::Error::TokenNotFound`] if the type does not exist.
    fn set_visibility(&mut self, token: Token, visibility: TypeVisibility) -> Result<()>;

    /// Full name of a type definition, including its enclosing types
    fn type_name(&self, token: Token) -> Option<TypeName> {
        let mut current = self.type_def(token)?;
        let mut names = vec![current.name.clone()];

        while let Some(outer) = current.enclosing {
            if names.len() > MAX_NESTING_DEPTH {
                return None;
            }
            current = self.type_def(outer)?;
            names.push(current.name.clone());
        }

        names.reverse();
        Some(TypeName::from_parts(current.namespace.clone(), names))
    }

    /// Finds a type definition by its full name
    fn find_type(&self, name: &TypeName) -> Option<Token> {
        self.type_tokens()
            .into_iter()
            .find(|token| self.type_name(*token).as_ref() == Some(name))
    }

    /// Full name of a type reference, including the enclosing type references
    fn type_ref_name(&self, token: Token) -> Option<TypeName> {
        let mut current = self.type_ref(token)?;
        let mut names = vec![current.name.clone()];

        while let ResolutionScope::TypeRef(outer) = current.scope {
            if names.len() > MAX_NESTING_DEPTH {
                return None;
            }
            current = self.type_ref(outer)?;
            names.push(current.name.clone());
        }

        names.reverse();
        Some(TypeName::from_parts(current.namespace.clone(), names))
    }

    /// Scope of the outermost type reference in a nesting chain; never
    /// [`ResolutionScope::TypeRef`]
    fn type_ref_root_scope(&self, token: Token) -> Option<ResolutionScope> {
        let mut current = self.type_ref(token)?;
        for _ in 0..=MAX_NESTING_DEPTH {
            match current.scope {
                ResolutionScope::TypeRef(outer) => current = self.type_ref(outer)?,
                scope => return Some(scope),
            }
        }
        None
    }

    /// Finds an assembly reference by simple name (case-insensitive)
    fn assembly_ref_by_name(&self, name: &str) -> Option<Token> {
        self.assembly_ref_tokens().into_iter().find(|token| {
            self.assembly_ref(*token)
                .is_some_and(|reference| reference.name.eq_ignore_ascii_case(name))
        })
    }

    /// The reference to the core library, preferring `mscorlib` over the newer facades
    fn core_reference(&self) -> Option<Token> {
        CORE_LIBRARY_NAMES
            .iter()
            .find_map(|core| self.assembly_ref_by_name(core))
    }
}

//! Type definitions and their attributes.
//!
//! A [`TypeDef`] is one row of the `TypeDef` table together with everything that hangs off
//! it: fields, methods, properties, events, generic parameters, custom attributes and the
//! nesting relationship. The flags follow ECMA-335 II.23.1.15.

mod name;

pub use name::{SerializedTypeName, TypeName};

use bitflags::bitflags;

use crate::metadata::{
    customattributes::CustomAttribute,
    members::{Event, Field, GenericParam, Method, Property},
    token::Token,
};

bitflags! {
    /// Flags of a `TypeDef` row (ECMA-335 II.23.1.15).
    ///
    /// The low three bits hold the [`TypeVisibility`]; use [`TypeAttributes::visibility`]
    /// rather than testing them individually.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct TypeAttributes: u32 {
        /// Mask for the visibility bits
        const VISIBILITY_MASK = 0x0000_0007;
        /// Class uses sequential layout
        const SEQUENTIAL_LAYOUT = 0x0000_0008;
        /// Class uses explicit layout
        const EXPLICIT_LAYOUT = 0x0000_0010;
        /// Type is an interface
        const INTERFACE = 0x0000_0020;
        /// Class is abstract
        const ABSTRACT = 0x0000_0080;
        /// Class cannot be extended
        const SEALED = 0x0000_0100;
        /// Name has special meaning to tools
        const SPECIAL_NAME = 0x0000_0400;
        /// Class is imported
        const IMPORT = 0x0000_1000;
        /// Class is serializable
        const SERIALIZABLE = 0x0000_2000;
        /// Runtime checks the name encoding
        const RT_SPECIAL_NAME = 0x0000_0800;
        /// Class has security associated with it
        const HAS_SECURITY = 0x0004_0000;
        /// Type initializer may run before the first static field access
        const BEFORE_FIELD_INIT = 0x0010_0000;
    }
}

impl TypeAttributes {
    /// Extracts the visibility from the flags
    #[must_use]
    pub fn visibility(self) -> TypeVisibility {
        TypeVisibility::from_bits(self.bits())
    }

    /// Returns a copy of the flags with the visibility bits replaced
    #[must_use]
    pub fn with_visibility(self, visibility: TypeVisibility) -> Self {
        TypeAttributes::from_bits_retain(
            (self.bits() & !Self::VISIBILITY_MASK.bits()) | visibility as u32,
        )
    }
}

/// Visibility of a type (ECMA-335 II.23.1.15, `VisibilityMask`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum TypeVisibility {
    /// Top-level type visible only inside its assembly
    NotPublic = 0,
    /// Top-level type visible to other assemblies
    Public = 1,
    /// Nested type visible wherever its enclosing type is
    NestedPublic = 2,
    /// Nested type visible only to its enclosing type
    NestedPrivate = 3,
    /// Nested type visible to the enclosing type and its subclasses
    NestedFamily = 4,
    /// Nested type visible inside the assembly
    NestedAssembly = 5,
    /// Nested type visible to subclasses inside the assembly
    NestedFamAndAssem = 6,
    /// Nested type visible to subclasses or inside the assembly
    NestedFamOrAssem = 7,
}

impl TypeVisibility {
    /// Decodes the visibility from raw type flags; only the low three bits are considered
    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0x7 {
            0 => TypeVisibility::NotPublic,
            1 => TypeVisibility::Public,
            2 => TypeVisibility::NestedPublic,
            3 => TypeVisibility::NestedPrivate,
            4 => TypeVisibility::NestedFamily,
            5 => TypeVisibility::NestedAssembly,
            6 => TypeVisibility::NestedFamAndAssem,
            _ => TypeVisibility::NestedFamOrAssem,
        }
    }

    /// Returns true for the two publicly visible variants
    #[must_use]
    pub fn is_public(self) -> bool {
        matches!(self, TypeVisibility::Public | TypeVisibility::NestedPublic)
    }

    /// Returns true for the nested variants
    #[must_use]
    pub fn is_nested(self) -> bool {
        !matches!(self, TypeVisibility::NotPublic | TypeVisibility::Public)
    }

    /// The assembly-internal counterpart of a public visibility.
    ///
    /// `Public` becomes `NotPublic`, `NestedPublic` becomes `NestedAssembly`. All other
    /// visibilities are returned unchanged.
    #[must_use]
    pub fn demoted(self) -> Self {
        match self {
            TypeVisibility::Public => TypeVisibility::NotPublic,
            TypeVisibility::NestedPublic => TypeVisibility::NestedAssembly,
            other => other,
        }
    }
}

/// A type defined in a module
#[derive(Clone, Debug, Default)]
pub struct TypeDef {
    /// `TypeDef` token of this type
    pub token: Token,
    /// Namespace, empty for nested types and types in the global namespace
    pub namespace: String,
    /// Simple name
    pub name: String,
    /// Type attributes, including the visibility
    pub flags: TypeAttributes,
    /// Base type (`TypeDef`, `TypeRef` or `TypeSpec`), `None` for interfaces and `System.Object`
    pub extends: Option<Token>,
    /// Implemented interfaces (`TypeDef`, `TypeRef` or `TypeSpec`)
    pub interfaces: Vec<Token>,
    /// Generic parameters, with their constraints
    pub generic_params: Vec<GenericParam>,
    /// Field definitions
    pub fields: Vec<Field>,
    /// Method definitions
    pub methods: Vec<Method>,
    /// Property definitions
    pub properties: Vec<Property>,
    /// Event definitions
    pub events: Vec<Event>,
    /// Custom attributes applied to the type
    pub custom_attributes: Vec<CustomAttribute>,
    /// Enclosing type, for nested types
    pub enclosing: Option<Token>,
    /// Directly nested types
    pub nested_types: Vec<Token>,
}

impl TypeDef {
    /// Current visibility of the type
    #[must_use]
    pub fn visibility(&self) -> TypeVisibility {
        self.flags.visibility()
    }

    /// Replaces the visibility bits, leaving all other flags untouched
    pub fn set_visibility(&mut self, visibility: TypeVisibility) {
        self.flags = self.flags.with_visibility(visibility);
    }

    /// Returns true if the type is visible outside its assembly (`Public` or `NestedPublic`)
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.visibility().is_public()
    }

    /// Returns true if the type is nested inside another type
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.enclosing.is_some()
    }

    /// Returns true if the type is an interface
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flags.contains(TypeAttributes::INTERFACE)
    }

    /// Number of members (fields, methods, properties and events) declared by this type
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.fields.len() + self.methods.len() + self.properties.len() + self.events.len()
    }
}

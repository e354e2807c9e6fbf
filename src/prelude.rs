//! # ilstrip Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the ilstrip library. Import this module to get quick access to the types needed
//! to build a module, configure the stripper and run the pipeline.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all ilstrip operations
pub use crate::Error;

/// The result type used throughout ilstrip
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// High-level stripping pipeline
pub use crate::strip::Stripper;

/// Individual phases of the pipeline
pub use crate::strip::{
    classify, demote_visibility, prune_unused_references, remove_unused_classes,
    remove_unused_resources, scan, CleanupStats, Edge, EdgeKind, EdgeTarget, ScanStats,
    TypeNode, UnusedSet, UsedSet,
};

// ================================================================================================
// Metadata Model
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::{TableId, Token};

/// The store interface and its in-memory implementation
pub use crate::metadata::{
    builder::{ModuleBuilder, TypeBuilder},
    module::ModuleDefinition,
    store::{MetadataStore, ModuleHandle},
};

/// Types, names and visibility
pub use crate::metadata::typesystem::{TypeAttributes, TypeDef, TypeName, TypeVisibility};

/// Members
pub use crate::metadata::members::{Event, Field, GenericParam, Method, Param, Property};

/// Signatures
pub use crate::metadata::signatures::{MethodSignature, TypeSignature};

/// Method bodies
pub use crate::metadata::method::{
    ExceptionHandler, ExceptionHandlerKind, Instruction, MethodBody, Operand,
};

/// Custom attributes
pub use crate::metadata::customattributes::{
    CustomAttribute, CustomAttributeArgument, CustomAttributeNamedArgument,
};

/// References to other assemblies and their members
pub use crate::metadata::references::{
    AssemblyRef, AssemblyVersion, MemberRef, MemberRefSignature, MethodSpec, ResolutionScope,
    TypeRef,
};

/// Embedded resources
pub use crate::metadata::resources::Resource;

// ================================================================================================
// Resolution
// ================================================================================================

/// Assembly resolution strategies
pub use crate::resolver::{
    AssemblyResolver, CachingResolver, DirectoryResolver, ModuleLoader, StaticResolver,
};

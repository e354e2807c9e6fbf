//! In-memory model of a CIL module.
//!
//! The stripper never touches the binary module format. It operates on the object model in
//! this module, reached through the [`store::MetadataStore`] trait: types with their members,
//! signatures and method bodies, custom attributes, embedded resources, and the reference
//! tables (`TypeRef`, `MemberRef`, `TypeSpec`, `MethodSpec`, `AssemblyRef`) that point into
//! other assemblies.
//!
//! # Key Components
//!
//! - [`token::Token`] - Table-tagged row identifiers, as used by the metadata tables
//! - [`typesystem::TypeDef`] - A type defined in the module
//! - [`typesystem::TypeName`] - Compound type names (`Namespace.Outer/Inner`)
//! - [`store::MetadataStore`] - The interface every pipeline phase is written against
//! - [`module::ModuleDefinition`] - The in-memory store implementation
//! - [`builder::ModuleBuilder`] - Assigns tokens and populates a [`module::ModuleDefinition`]

pub mod builder;
pub mod customattributes;
pub mod members;
pub mod method;
pub mod module;
pub mod references;
pub mod resources;
pub mod signatures;
pub mod store;
pub mod token;
pub mod typesystem;

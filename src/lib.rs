// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # ilstrip
//!
//! A dead-code stripper ("linker pass") for compiled .NET assemblies.
//!
//! Given a module and a set of entry-point types, `ilstrip` computes every type that is
//! transitively reachable from those entry points and removes everything else: unused
//! types, the embedded resources owned by them, and assembly references that no surviving
//! code mentions anymore. Surviving public types can afterwards be demoted to internal
//! visibility to lock down the remaining API surface.
//!
//! ## Features
//!
//! - **Mark phase** - worklist-based reachability over every edge kind found in CIL
//!   metadata: inheritance, interfaces, signatures, method bodies, custom attributes,
//!   generic constraints and nesting
//! - **Sweep phase** - removal of unused types, resources and assembly references, with
//!   consistency checks before anything is mutated
//! - **Visibility rewriting** - demote public types except an exclusion set
//! - **Cross-assembly resolution** - a thread-safe caching resolver with configurable
//!   alternate search paths
//!
//! ## Quick Start
//!
//! ```rust
//! use ilstrip::prelude::*;
//!
//! let mut builder = ModuleBuilder::new("Sample");
//! let mscorlib = builder.assembly_ref("mscorlib", AssemblyVersion::new(4, 0, 0, 0));
//! let object = builder.type_ref(mscorlib, "System", "Object");
//!
//! let helper = builder.add_type(TypeBuilder::new("Sample", "Helper").public().extends(object))?;
//! builder.add_type(
//!     TypeBuilder::new("Sample", "Program")
//!         .public()
//!         .extends(object)
//!         .field(Field::new("helper", TypeSignature::Class(helper))),
//! )?;
//! builder.add_type(TypeBuilder::new("Sample", "Unused").public().extends(object))?;
//!
//! let mut stripper = Stripper::new(builder.build());
//! stripper.add_entry_point("Sample.Program");
//!
//! stripper.scan_used_classes()?;
//! stripper.scan_unused_classes()?;
//! let stats = stripper.cleanup_unused_classes()?;
//!
//! assert_eq!(stats.types_removed, 1);
//! assert!(stripper.module().find_type(&"Sample.Helper".parse()?).is_some());
//! assert!(stripper.module().find_type(&"Sample.Unused".parse()?).is_none());
//! # Ok::<(), ilstrip::Error>(())
//! ```
//!
//! ## Pipeline Ordering
//!
//! Class removal has to run before reference pruning, otherwise pruning still sees the
//! references made by types that are about to be removed. Resource removal is independent
//! of both. [`Stripper::run_all`](strip::Stripper::run_all) executes the phases in the
//! order that yields maximal reduction.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// ```rust
/// use ilstrip::prelude::*;
///
/// let module = ModuleBuilder::new("Sample").build();
/// let stripper = Stripper::new(module);
/// assert!(stripper.entry_points().is_empty());
/// ```
pub mod prelude;

/// In-memory model of a CIL module and the store interface the stripper operates on.
///
/// # Key Components
///
/// - [`metadata::store::MetadataStore`] - The object-safe interface to a parsed module
/// - [`metadata::module::ModuleDefinition`] - The in-memory store implementation
/// - [`metadata::builder::ModuleBuilder`] - Populates a [`metadata::module::ModuleDefinition`]
/// - [`metadata::typesystem`] - Type definitions, compound type names and visibility
/// - [`metadata::signatures`] - Type and method signatures
/// - [`metadata::method`] - Method bodies, instructions and exception handlers
pub mod metadata;

/// Resolution of assembly references to loaded modules.
///
/// See [`resolver::CachingResolver`] for the caching resolver with alternate search
/// paths, and [`resolver::AssemblyResolver`] for the strategy interface.
pub mod resolver;

/// Reachability analysis, classification, cleanup and visibility rewriting.
///
/// See [`strip::Stripper`] for the high-level pipeline.
pub mod strip;

/// `ilstrip` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `ilstrip` Error type
///
/// The main error type for all operations in this crate. See [`Error`] for the
/// error taxonomy.
pub use error::Error;

/// High-level stripping pipeline.
///
/// See [`strip::Stripper`] for the full documentation.
pub use strip::Stripper;

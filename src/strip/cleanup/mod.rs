//! The sweep phase.
//!
//! Three independent operations remove what the mark phase did not reach:
//!
//! - [`remove_unused_classes`] deletes unused types, with their members, attributes and
//!   nested types
//! - [`remove_unused_resources`] deletes `.resources` blobs named after unused types
//! - [`prune_unused_references`] deletes assembly references no surviving type mentions,
//!   with every row that only pointed into them
//!
//! Each returns a [`CleanupStats`]. Resource removal depends only on the unused set. Reference
//! pruning observes the module as it is when called, so it reaches its full effect only
//! after class removal.
//!
//! # What Gets Cleaned Up
//!
//! When a **type** is removed:
//! - All its methods, fields, properties and events
//! - Generic parameters and their constraints
//! - Custom attributes applied to the type or any of its members
//! - All types nested inside it
//! - Its entry in the enclosing type's nested list
//!
//! When an **assembly reference** is removed:
//! - Type references scoped to it, directly or through an enclosing type reference
//! - Type specifications built from those type references
//! - Member references declared on them
//! - Method instantiations of those member references

mod classes;
mod references;
mod resources;
mod stats;

pub use classes::remove_unused_classes;
pub use references::{mentioned_references, prune_unused_references};
pub use resources::remove_unused_resources;
pub use stats::CleanupStats;

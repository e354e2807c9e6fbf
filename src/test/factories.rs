//! Factory functions for framework modules used as resolved dependencies.

use std::sync::Arc;

use crate::metadata::{
    builder::{ModuleBuilder, TypeBuilder},
    store::ModuleHandle,
};

/// A minimal `mscorlib` with a short exception hierarchy.
///
/// Defines `System.Object`, `System.ValueType`, `System.Attribute`, `System.Exception` and
/// `System.ArgumentException`; every type but `Object` derives from a type of the same
/// module.
pub fn core_library() -> ModuleHandle {
    let mut builder = ModuleBuilder::new("mscorlib");
    let object = builder.add_type(TypeBuilder::new("System", "Object").public()).unwrap();
    builder
        .add_type(
            TypeBuilder::new("System", "ValueType")
                .public()
                .extends(object),
        )
        .unwrap();
    builder
        .add_type(
            TypeBuilder::new("System", "Attribute")
                .public()
                .extends(object),
        )
        .unwrap();
    let exception = builder
        .add_type(
            TypeBuilder::new("System", "Exception")
                .public()
                .extends(object),
        )
        .unwrap();
    builder
        .add_type(
            TypeBuilder::new("System", "ArgumentException")
                .public()
                .extends(exception),
        )
        .unwrap();
    Arc::new(builder.build())
}

//! Outgoing edges of a type.
//!
//! Everything a type definition mentions is reduced to a list of [`Edge`]s pointing at other
//! types. Member tokens are mapped to their declaring type, type specifications are
//! flattened into the types they are built from, and serialized type names from attribute
//! blobs become [`EdgeTarget::Named`] targets that the scanner resolves by name.
//!
//! Targets are `TypeDef` or `TypeRef` tokens of the store the edges were collected from.

use std::collections::HashSet;

use strum::{Display, EnumCount, EnumIter};

use crate::{
    metadata::{
        customattributes::CustomAttribute,
        members::GenericParam,
        method::MethodBody,
        signatures::{MethodSignature, TypeSignature},
        store::MetadataStore,
        token::{TableId, Token},
        typesystem::{SerializedTypeName, TypeDef, TypeName},
    },
    Error, Result,
};

/// Kinds of type-to-type dependencies
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount, Display,
)]
pub enum EdgeKind {
    /// `extends` clause
    BaseType,
    /// Implemented interface
    Interface,
    /// Type of a field
    FieldType,
    /// Type of a property or indexer parameter
    PropertyType,
    /// Delegate type of an event
    EventType,
    /// Return or parameter type of a method, or an explicitly implemented interface method
    MethodSignature,
    /// Token operand, local variable or caught exception inside a method body
    MethodBodyOperand,
    /// Attribute constructor or a type named in attribute arguments
    AttributeType,
    /// Constraint of a generic parameter
    GenericConstraint,
    /// Nested type to its enclosing type
    NestedContainment,
}

/// Where an edge points
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeTarget {
    /// A `TypeDef` or `TypeRef` token of the store the edge was collected from
    Token(Token),
    /// A type known only by its serialized name
    Named {
        /// Simple name of the qualifying assembly, `None` for the current module or the
        /// core library
        assembly: Option<String>,
        /// Full type name
        name: TypeName,
    },
}

/// A typed dependency of one type on another
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Why the dependency exists
    pub kind: EdgeKind,
    /// The type depended upon
    pub target: EdgeTarget,
}

/// Enumerates every outgoing edge of a type, of every kind.
///
/// Each distinct `(kind, target)` pair is reported once, in order of first appearance.
///
/// # Errors
/// Returns [`Error::TokenNotFound`] if the type does not exist, or [`Error::Malformed`] if it
/// mentions a row the store does not contain.
pub fn outgoing_edges(store: &dyn MetadataStore, token: Token) -> Result<Vec<Edge>> {
    let def = store.type_def(token).ok_or(Error::TokenNotFound(token))?;
    let mut collector = EdgeCollector::new(store);

    collector.hierarchy(def)?;
    for interface in &def.interfaces {
        collector.type_token(EdgeKind::Interface, *interface)?;
    }
    collector.generic_params(&def.generic_params)?;
    collector.attributes(&def.custom_attributes)?;

    for field in &def.fields {
        collector.signature(EdgeKind::FieldType, &field.signature)?;
        collector.attributes(&field.custom_attributes)?;
    }

    for property in &def.properties {
        collector.method_signature(EdgeKind::PropertyType, &property.signature)?;
        collector.attributes(&property.custom_attributes)?;
    }

    for event in &def.events {
        collector.type_token(EdgeKind::EventType, event.event_type)?;
        collector.attributes(&event.custom_attributes)?;
    }

    for method in &def.methods {
        collector.method_signature(EdgeKind::MethodSignature, &method.signature)?;
        for declaration in &method.overrides {
            collector.member_token(EdgeKind::MethodSignature, *declaration)?;
        }
        collector.generic_params(&method.generic_params)?;
        collector.attributes(&method.custom_attributes)?;
        for param in &method.params {
            collector.attributes(&param.custom_attributes)?;
        }
        if let Some(body) = &method.body {
            collector.body(body)?;
        }
    }

    Ok(collector.edges)
}

/// Enumerates the base type and enclosing type of a type.
///
/// This is the part of the graph followed inside dependency modules.
///
/// # Errors
/// Returns [`Error::TokenNotFound`] if the type does not exist, or [`Error::Malformed`] if its
/// base type is a row the store does not contain.
pub fn hierarchy_edges(store: &dyn MetadataStore, token: Token) -> Result<Vec<Edge>> {
    let def = store.type_def(token).ok_or(Error::TokenNotFound(token))?;
    let mut collector = EdgeCollector::new(store);
    collector.hierarchy(def)?;
    Ok(collector.edges)
}

/// Enumerates the edges contributed by a list of attributes, e.g. the assembly-level
/// attributes of a module.
///
/// # Errors
/// Returns [`Error::Malformed`] if an attribute constructor or a serialized type name
/// cannot be decoded.
pub fn attribute_edges(
    store: &dyn MetadataStore,
    attributes: &[CustomAttribute],
) -> Result<Vec<Edge>> {
    let mut collector = EdgeCollector::new(store);
    collector.attributes(attributes)?;
    Ok(collector.edges)
}

struct EdgeCollector<'a> {
    store: &'a dyn MetadataStore,
    edges: Vec<Edge>,
    seen: HashSet<(EdgeKind, EdgeTarget)>,
    expanded_specs: HashSet<(EdgeKind, Token)>,
}

impl<'a> EdgeCollector<'a> {
    fn new(store: &'a dyn MetadataStore) -> Self {
        EdgeCollector {
            store,
            edges: Vec::new(),
            seen: HashSet::new(),
            expanded_specs: HashSet::new(),
        }
    }

    fn push(&mut self, kind: EdgeKind, target: EdgeTarget) {
        if self.seen.insert((kind, target.clone())) {
            self.edges.push(Edge { kind, target });
        }
    }

    fn hierarchy(&mut self, def: &TypeDef) -> Result<()> {
        if let Some(base) = def.extends {
            self.type_token(EdgeKind::BaseType, base)?;
        }
        if let Some(outer) = def.enclosing {
            self.push(EdgeKind::NestedContainment, EdgeTarget::Token(outer));
        }
        Ok(())
    }

    /// A `TypeDefOrRefOrSpec` token
    fn type_token(&mut self, kind: EdgeKind, token: Token) -> Result<()> {
        if token.is_null() {
            return Ok(());
        }

        match token.table_id() {
            Some(TableId::TypeDef | TableId::TypeRef) => {
                self.push(kind, EdgeTarget::Token(token));
                Ok(())
            }
            Some(TableId::TypeSpec) => {
                if !self.expanded_specs.insert((kind, token)) {
                    return Ok(());
                }
                let store = self.store;
                let signature = store
                    .type_spec(token)
                    .ok_or_else(|| malformed_error!("TypeSpec {} does not exist", token))?;
                self.signature(kind, signature)
            }
            _ => Err(malformed_error!("Token {} does not address a type", token)),
        }
    }

    fn signature(&mut self, kind: EdgeKind, signature: &TypeSignature) -> Result<()> {
        let mut tokens = Vec::new();
        signature.type_tokens(&mut tokens);
        for token in tokens {
            self.type_token(kind, token)?;
        }
        Ok(())
    }

    fn method_signature(&mut self, kind: EdgeKind, signature: &MethodSignature) -> Result<()> {
        let mut tokens = Vec::new();
        signature.type_tokens(&mut tokens);
        for token in tokens {
            self.type_token(kind, token)?;
        }
        Ok(())
    }

    /// Any token that can appear as an instruction operand or attribute constructor
    fn member_token(&mut self, kind: EdgeKind, token: Token) -> Result<()> {
        match token.table_id() {
            Some(TableId::TypeDef | TableId::TypeRef | TableId::TypeSpec) => {
                self.type_token(kind, token)
            }
            Some(TableId::Field | TableId::MethodDef | TableId::Property | TableId::Event) => {
                let owner = self.store.declaring_type(token).ok_or_else(|| {
                    malformed_error!("Member {} has no declaring type", token)
                })?;
                self.push(kind, EdgeTarget::Token(owner));
                Ok(())
            }
            Some(TableId::MemberRef) => {
                let store = self.store;
                let member = store
                    .member_ref(token)
                    .ok_or_else(|| malformed_error!("MemberRef {} does not exist", token))?;
                if !member.parent.is_table(TableId::ModuleRef) {
                    self.member_token(kind, member.parent)?;
                }

                let mut tokens = Vec::new();
                member.signature.type_tokens(&mut tokens);
                for token in tokens {
                    self.type_token(kind, token)?;
                }
                Ok(())
            }
            Some(TableId::MethodSpec) => {
                let store = self.store;
                let spec = store
                    .method_spec(token)
                    .ok_or_else(|| malformed_error!("MethodSpec {} does not exist", token))?;
                self.member_token(kind, spec.method)?;
                for argument in &spec.instantiation {
                    self.signature(kind, argument)?;
                }
                Ok(())
            }
            // StandAloneSig (calli), ModuleRef and string tokens carry no type dependency
            _ => Ok(()),
        }
    }

    fn generic_params(&mut self, params: &[GenericParam]) -> Result<()> {
        for param in params {
            for constraint in &param.constraints {
                self.type_token(EdgeKind::GenericConstraint, *constraint)?;
            }
            self.attributes(&param.custom_attributes)?;
        }
        Ok(())
    }

    fn body(&mut self, body: &MethodBody) -> Result<()> {
        for local in &body.locals {
            self.signature(EdgeKind::MethodBodyOperand, local)?;
        }
        for token in body.operand_tokens() {
            self.member_token(EdgeKind::MethodBodyOperand, token)?;
        }
        for handler in &body.exception_handlers {
            if let Some(catch_type) = handler.catch_type {
                self.type_token(EdgeKind::MethodBodyOperand, catch_type)?;
            }
        }
        Ok(())
    }

    fn attributes(&mut self, attributes: &[CustomAttribute]) -> Result<()> {
        for attribute in attributes {
            self.member_token(EdgeKind::AttributeType, attribute.constructor)?;
            for name in attribute.type_names() {
                let parsed = SerializedTypeName::parse(name)?;
                self.named(&parsed);
            }
        }
        Ok(())
    }

    fn named(&mut self, name: &SerializedTypeName) {
        self.push(
            EdgeKind::AttributeType,
            EdgeTarget::Named {
                assembly: name.assembly.clone(),
                name: name.name.clone(),
            },
        );
        for argument in &name.generic_args {
            self.named(argument);
        }
    }
}

//! Construction of [`ModuleDefinition`]s.
//!
//! [`ModuleBuilder`] hands out tokens in table order, the same way a compiler emits rows:
//! the first type added after `<Module>` gets `TypeDef` row 2, the first method of any type
//! gets `MethodDef` row 1, and so on. Types are described with [`TypeBuilder`] and
//! committed with [`ModuleBuilder::add_type`] or [`ModuleBuilder::add_nested_type`].
//!
//! Members that reference types added later (a method body creating an instance of a type
//! declared further down) can be appended afterwards with [`ModuleBuilder::add_method`].
//!
//! # Examples
//!
//! ```rust
//! use ilstrip::prelude::*;
//!
//! let mut builder = ModuleBuilder::new("Sample");
//! let mscorlib = builder.assembly_ref("mscorlib", AssemblyVersion::new(4, 0, 0, 0));
//! let object = builder.type_ref(mscorlib, "System", "Object");
//!
//! let outer = builder.add_type(TypeBuilder::new("Sample", "Outer").public().extends(object))?;
//! let inner = builder.add_nested_type(outer, TypeBuilder::nested("Inner").extends(object))?;
//!
//! let module = builder.build();
//! assert_eq!(module.type_name(inner).unwrap().to_string(), "Sample.Outer/Inner");
//! # Ok::<(), ilstrip::Error>(())
//! ```

use std::collections::HashMap;

use crate::{
    metadata::{
        customattributes::CustomAttribute,
        members::{Event, Field, GenericParam, Method, Property},
        module::ModuleDefinition,
        references::{
            AssemblyRef, AssemblyVersion, MemberRef, MemberRefSignature, MethodSpec,
            ResolutionScope, TypeRef,
        },
        resources::Resource,
        signatures::TypeSignature,
        store::MetadataStore,
        token::{TableId, Token},
        typesystem::{TypeAttributes, TypeDef, TypeName, TypeVisibility},
    },
    Error, Result,
};

/// Name of the pseudo type holding global fields and methods
pub const MODULE_TYPE_NAME: &str = "<Module>";

/// Description of a type that has not been added to a module yet
#[derive(Clone, Debug)]
pub struct TypeBuilder {
    namespace: String,
    name: String,
    flags: TypeAttributes,
    extends: Option<Token>,
    interfaces: Vec<Token>,
    generic_params: Vec<GenericParam>,
    fields: Vec<Field>,
    methods: Vec<Method>,
    properties: Vec<Property>,
    events: Vec<Event>,
    custom_attributes: Vec<CustomAttribute>,
}

impl TypeBuilder {
    /// Starts a top-level, assembly-internal class
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeBuilder {
            namespace: namespace.into(),
            name: name.into(),
            flags: TypeAttributes::BEFORE_FIELD_INIT,
            extends: None,
            interfaces: Vec::new(),
            generic_params: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
            custom_attributes: Vec::new(),
        }
    }

    /// Starts a nested type; nested types carry no namespace of their own
    #[must_use]
    pub fn nested(name: impl Into<String>) -> Self {
        TypeBuilder::new("", name).visibility(TypeVisibility::NestedPrivate)
    }

    /// Sets the visibility
    #[must_use]
    pub fn visibility(mut self, visibility: TypeVisibility) -> Self {
        self.flags = self.flags.with_visibility(visibility);
        self
    }

    /// Makes a top-level type `Public`
    #[must_use]
    pub fn public(self) -> Self {
        self.visibility(TypeVisibility::Public)
    }

    /// Makes a nested type `NestedPublic`
    #[must_use]
    pub fn nested_public(self) -> Self {
        self.visibility(TypeVisibility::NestedPublic)
    }

    /// Adds type attributes; visibility bits in `flags` are ignored
    #[must_use]
    pub fn flags(mut self, flags: TypeAttributes) -> Self {
        self.flags |= flags.difference(TypeAttributes::VISIBILITY_MASK);
        self
    }

    /// Marks the type as an abstract interface without base type
    #[must_use]
    pub fn interface(mut self) -> Self {
        self.flags |= TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT;
        self.flags.remove(TypeAttributes::BEFORE_FIELD_INIT);
        self.extends = None;
        self
    }

    /// Sets the base type
    #[must_use]
    pub fn extends(mut self, base: Token) -> Self {
        self.extends = Some(base);
        self
    }

    /// Adds an implemented interface
    #[must_use]
    pub fn implements(mut self, interface: Token) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Adds a generic parameter
    #[must_use]
    pub fn generic_param(mut self, param: GenericParam) -> Self {
        self.generic_params.push(param);
        self
    }

    /// Adds a field
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a method
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Adds a property
    #[must_use]
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Adds an event
    #[must_use]
    pub fn event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    /// Applies a custom attribute to the type
    #[must_use]
    pub fn attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }
}

/// Incrementally assembles a [`ModuleDefinition`]
#[derive(Debug)]
pub struct ModuleBuilder {
    module: ModuleDefinition,
    rows: HashMap<TableId, u32>,
}

impl ModuleBuilder {
    /// Creates a builder for the assembly `name`, with the `<Module>` type at `TypeDef` row 1
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let mut builder = ModuleBuilder {
            module: ModuleDefinition::new(name),
            rows: HashMap::new(),
        };

        let token = builder.next_token(TableId::TypeDef);
        builder.module.insert_type(TypeDef {
            token,
            name: MODULE_TYPE_NAME.to_string(),
            flags: TypeAttributes::empty(),
            ..TypeDef::default()
        });
        builder
    }

    fn next_token(&mut self, table: TableId) -> Token {
        let row = self.rows.entry(table).or_insert(0);
        *row += 1;
        Token::from_parts(table, *row)
    }

    /// Adds an assembly reference
    pub fn add_assembly_ref(&mut self, mut reference: AssemblyRef) -> Token {
        let token = self.next_token(TableId::AssemblyRef);
        reference.token = token;
        self.module.assembly_refs.insert(token, reference);
        token
    }

    /// Adds a reference to an unsigned, culture-neutral assembly
    pub fn assembly_ref(&mut self, name: &str, version: AssemblyVersion) -> Token {
        self.add_assembly_ref(AssemblyRef::named(name, version))
    }

    /// Adds a type reference with an explicit resolution scope
    pub fn type_ref_in(
        &mut self,
        scope: ResolutionScope,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Token {
        let token = self.next_token(TableId::TypeRef);
        self.module.type_refs.insert(
            token,
            TypeRef {
                token,
                scope,
                namespace: namespace.into(),
                name: name.into(),
            },
        );
        token
    }

    /// Adds a reference to a top-level type of another assembly
    pub fn type_ref(
        &mut self,
        assembly: Token,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Token {
        self.type_ref_in(ResolutionScope::AssemblyRef(assembly), namespace, name)
    }

    /// Adds a reference to a type nested inside another referenced type
    pub fn nested_type_ref(&mut self, outer: Token, name: impl Into<String>) -> Token {
        self.type_ref_in(ResolutionScope::TypeRef(outer), "", name)
    }

    /// Adds a type specification (generic instance, array, pointer, ...)
    pub fn type_spec(&mut self, signature: TypeSignature) -> Token {
        let token = self.next_token(TableId::TypeSpec);
        self.module.type_specs.insert(token, signature);
        token
    }

    /// Adds a member reference
    pub fn member_ref(
        &mut self,
        parent: Token,
        name: impl Into<String>,
        signature: MemberRefSignature,
    ) -> Token {
        let token = self.next_token(TableId::MemberRef);
        self.module.member_refs.insert(
            token,
            MemberRef {
                token,
                parent,
                name: name.into(),
                signature,
            },
        );
        token
    }

    /// Adds an instantiation of a generic method
    pub fn method_spec(&mut self, method: Token, instantiation: Vec<TypeSignature>) -> Token {
        let token = self.next_token(TableId::MethodSpec);
        self.module.method_specs.insert(
            token,
            MethodSpec {
                token,
                method,
                instantiation,
            },
        );
        token
    }

    /// Adds a top-level type and returns its token
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if a type with the same full name exists.
    pub fn add_type(&mut self, builder: TypeBuilder) -> Result<Token> {
        self.ensure_unique(TypeName::new(builder.namespace.clone(), builder.name.clone()))?;

        let def = self.materialize(builder, None);
        let token = def.token;
        self.module.insert_type(def);
        Ok(token)
    }

    /// Adds a type nested inside `outer`.
    ///
    /// Top-level visibilities are mapped to their nested counterparts (`Public` to
    /// `NestedPublic`, `NotPublic` to `NestedPrivate`) and the namespace is cleared.
    ///
    /// # Errors
    /// Returns [`Error::TokenNotFound`] if `outer` has not been added, or
    /// [`Error::Malformed`] if `outer` already has a nested type of that name.
    pub fn add_nested_type(&mut self, outer: Token, mut builder: TypeBuilder) -> Result<Token> {
        let outer_name = self
            .module
            .type_name(outer)
            .ok_or(Error::TokenNotFound(outer))?;
        self.ensure_unique(outer_name.nested(builder.name.clone()))?;

        builder.namespace.clear();
        builder = match builder.flags.visibility() {
            TypeVisibility::Public => builder.nested_public(),
            TypeVisibility::NotPublic => builder.visibility(TypeVisibility::NestedPrivate),
            _ => builder,
        };

        let def = self.materialize(builder, Some(outer));
        let token = def.token;
        self.module.insert_type(def);
        Ok(token)
    }

    fn ensure_unique(&self, name: TypeName) -> Result<()> {
        match self.module.find_type(&name) {
            Some(existing) => Err(malformed_error!(
                "Type '{}' already exists in '{}' as {}",
                name,
                self.module.name(),
                existing
            )),
            None => Ok(()),
        }
    }

    fn materialize(&mut self, builder: TypeBuilder, enclosing: Option<Token>) -> TypeDef {
        let token = self.next_token(TableId::TypeDef);

        let fields = builder
            .fields
            .into_iter()
            .map(|mut field| {
                field.token = self.next_token(TableId::Field);
                field
            })
            .collect();
        let methods = builder
            .methods
            .into_iter()
            .map(|mut method| {
                method.token = self.next_token(TableId::MethodDef);
                method
            })
            .collect();
        let properties = builder
            .properties
            .into_iter()
            .map(|mut property| {
                property.token = self.next_token(TableId::Property);
                property
            })
            .collect();
        let events = builder
            .events
            .into_iter()
            .map(|mut event| {
                event.token = self.next_token(TableId::Event);
                event
            })
            .collect();

        TypeDef {
            token,
            namespace: builder.namespace,
            name: builder.name,
            flags: builder.flags,
            extends: builder.extends,
            interfaces: builder.interfaces,
            generic_params: builder.generic_params,
            fields,
            methods,
            properties,
            events,
            custom_attributes: builder.custom_attributes,
            enclosing,
            nested_types: Vec::new(),
        }
    }

    /// Appends a method to an existing type and returns the method token
    ///
    /// # Errors
    /// Returns [`Error::TokenNotFound`] if the type has not been added.
    pub fn add_method(&mut self, owner: Token, mut method: Method) -> Result<Token> {
        if self.module.type_def(owner).is_none() {
            return Err(Error::TokenNotFound(owner));
        }

        let token = self.next_token(TableId::MethodDef);
        method.token = token;
        if let Some(def) = self.module.type_def_mut(owner) {
            def.methods.push(method);
        }
        self.module.register_member(token, owner);
        Ok(token)
    }

    /// Appends a field to an existing type and returns the field token
    ///
    /// # Errors
    /// Returns [`Error::TokenNotFound`] if the type has not been added.
    pub fn add_field(&mut self, owner: Token, mut field: Field) -> Result<Token> {
        if self.module.type_def(owner).is_none() {
            return Err(Error::TokenNotFound(owner));
        }

        let token = self.next_token(TableId::Field);
        field.token = token;
        if let Some(def) = self.module.type_def_mut(owner) {
            def.fields.push(field);
        }
        self.module.register_member(token, owner);
        Ok(token)
    }

    /// Applies a custom attribute to an existing type
    ///
    /// # Errors
    /// Returns [`Error::TokenNotFound`] if the type has not been added.
    pub fn add_type_attribute(&mut self, owner: Token, attribute: CustomAttribute) -> Result<()> {
        let def = self
            .module
            .type_def_mut(owner)
            .ok_or(Error::TokenNotFound(owner))?;
        def.custom_attributes.push(attribute);
        Ok(())
    }

    /// Token of the first method called `name` declared by `owner`
    #[must_use]
    pub fn method_token(&self, owner: Token, name: &str) -> Option<Token> {
        self.module
            .type_def(owner)?
            .methods
            .iter()
            .find(|method| method.name == name)
            .map(|method| method.token)
    }

    /// Adds an embedded resource
    pub fn add_resource(&mut self, resource: Resource) {
        self.module.resources.push(resource);
    }

    /// Applies a custom attribute to the assembly
    pub fn add_attribute(&mut self, attribute: CustomAttribute) {
        self.module.attributes.push(attribute);
    }

    /// Finishes the module
    #[must_use]
    pub fn build(self) -> ModuleDefinition {
        self.module
    }
}

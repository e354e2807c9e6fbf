//! Members of a type: fields, methods, properties, events and generic parameters.

use crate::metadata::{
    customattributes::CustomAttribute,
    method::MethodBody,
    signatures::{MethodSignature, TypeSignature},
    token::Token,
};

/// A field definition
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// `Field` token, assigned when the declaring type is added to a module
    pub token: Token,
    /// Field name
    pub name: String,
    /// Field attributes (ECMA-335 II.23.1.5)
    pub flags: u16,
    /// Field type
    pub signature: TypeSignature,
    /// Custom attributes applied to the field
    pub custom_attributes: Vec<CustomAttribute>,
}

impl Field {
    /// Creates a private instance field
    #[must_use]
    pub fn new(name: impl Into<String>, signature: TypeSignature) -> Self {
        Field {
            token: Token(0),
            name: name.into(),
            flags: 0x0001,
            signature,
            custom_attributes: Vec::new(),
        }
    }

    /// Applies a custom attribute
    #[must_use]
    pub fn attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }
}

/// A method parameter with metadata of its own
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Sequence number, 0 is the return value
    pub sequence: u16,
    /// Custom attributes applied to the parameter
    pub custom_attributes: Vec<CustomAttribute>,
}

/// A generic parameter of a type or method
#[derive(Debug, Clone, PartialEq)]
pub struct GenericParam {
    /// Index of the parameter
    pub number: u16,
    /// Parameter name
    pub name: String,
    /// Constraint types (`TypeDef`, `TypeRef` or `TypeSpec`)
    pub constraints: Vec<Token>,
    /// Custom attributes applied to the parameter
    pub custom_attributes: Vec<CustomAttribute>,
}

impl GenericParam {
    /// Creates an unconstrained generic parameter
    #[must_use]
    pub fn new(number: u16, name: impl Into<String>) -> Self {
        GenericParam {
            number,
            name: name.into(),
            constraints: Vec::new(),
            custom_attributes: Vec::new(),
        }
    }

    /// Adds a constraint
    #[must_use]
    pub fn constraint(mut self, constraint: Token) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// A method definition
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    /// `MethodDef` token, assigned when the declaring type is added to a module
    pub token: Token,
    /// Method name
    pub name: String,
    /// Method attributes (ECMA-335 II.23.1.10)
    pub flags: u16,
    /// Method signature
    pub signature: MethodSignature,
    /// Parameters that carry names or attributes
    pub params: Vec<Param>,
    /// Generic parameters of a generic method
    pub generic_params: Vec<GenericParam>,
    /// IL body, `None` for abstract, extern and runtime-implemented methods
    pub body: Option<MethodBody>,
    /// Interface methods this method explicitly implements (`MethodImpl` declarations)
    pub overrides: Vec<Token>,
    /// Custom attributes applied to the method
    pub custom_attributes: Vec<CustomAttribute>,
}

impl Method {
    /// Creates a public method without body
    #[must_use]
    pub fn new(name: impl Into<String>, signature: MethodSignature) -> Self {
        Method {
            token: Token(0),
            name: name.into(),
            flags: 0x0006,
            signature,
            params: Vec::new(),
            generic_params: Vec::new(),
            body: None,
            overrides: Vec::new(),
            custom_attributes: Vec::new(),
        }
    }

    /// Creates a public instance constructor with the given parameter types
    #[must_use]
    pub fn constructor(params: Vec<TypeSignature>) -> Self {
        let mut method = Method::new(
            ".ctor",
            MethodSignature::instance(TypeSignature::Void, params),
        );
        method.flags |= 0x1800;
        method
    }

    /// Attaches an IL body
    #[must_use]
    pub fn body(mut self, body: MethodBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a named parameter
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Adds a generic parameter
    #[must_use]
    pub fn generic_param(mut self, param: GenericParam) -> Self {
        self.generic_params.push(param);
        self
    }

    /// Declares an explicit interface implementation
    #[must_use]
    pub fn overrides(mut self, declaration: Token) -> Self {
        self.overrides.push(declaration);
        self
    }

    /// Applies a custom attribute
    #[must_use]
    pub fn attribute(mut self, attribute: CustomAttribute) -> Self {
        self.custom_attributes.push(attribute);
        self
    }
}

/// A property definition
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// `Property` token, assigned when the declaring type is added to a module
    pub token: Token,
    /// Property name
    pub name: String,
    /// Property signature (return type is the property type, params are indexer params)
    pub signature: MethodSignature,
    /// Custom attributes applied to the property
    pub custom_attributes: Vec<CustomAttribute>,
}

impl Property {
    /// Creates a property of the given type
    #[must_use]
    pub fn new(name: impl Into<String>, property_type: TypeSignature) -> Self {
        Property {
            token: Token(0),
            name: name.into(),
            signature: MethodSignature::instance(property_type, Vec::new()),
            custom_attributes: Vec::new(),
        }
    }
}

/// An event definition
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// `Event` token, assigned when the declaring type is added to a module
    pub token: Token,
    /// Event name
    pub name: String,
    /// Delegate type of the event (`TypeDef`, `TypeRef` or `TypeSpec`)
    pub event_type: Token,
    /// Custom attributes applied to the event
    pub custom_attributes: Vec<CustomAttribute>,
}

impl Event {
    /// Creates an event with the given delegate type
    #[must_use]
    pub fn new(name: impl Into<String>, event_type: Token) -> Self {
        Event {
            token: Token(0),
            name: name.into(),
            event_type,
            custom_attributes: Vec::new(),
        }
    }
}

//! Type and method signatures.
//!
//! Signatures are kept in their decoded form (ECMA-335 II.23.2). Every type that a
//! signature mentions is addressed by a `TypeDef`, `TypeRef` or `TypeSpec` token, which is
//! what the reachability scan follows.

use crate::metadata::token::Token;

/// Represents a parsed type in various signatures
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TypeSignature {
    /// void
    #[default]
    Void,
    /// bool
    Boolean,
    /// char
    Char,
    /// signed 8bit integer
    I1,
    /// unsigned 8bit integer
    U1,
    /// signed 16bit integer
    I2,
    /// unsigned 16bit integer
    U2,
    /// signed 32bit integer
    I4,
    /// unsigned 32bit integer
    U4,
    /// signed 64bit integer
    I8,
    /// unsigned 64bit integer
    U8,
    /// 32bit floating-point
    R4,
    /// 64bit floating-point
    R8,
    /// signed integer, sized to executing platform
    I,
    /// unsigned integer, sized to executing platform
    U,
    /// System.String
    String,
    /// System.Object
    Object,
    /// Type is referenced during runtime
    TypedByRef,
    /// CIL Class
    // TypeDefOrRefOrSpecEncoded
    Class(Token),
    /// CIL value-type
    // TypeDefOrRefOrSpecEncoded
    ValueType(Token),
    /// Generic type and its arguments
    GenericInst(Box<TypeSignature>, Vec<TypeSignature>),
    /// Generic type parameter, by index
    GenericParamType(u32),
    /// Generic method parameter, by index
    GenericParamMethod(u32),
    /// Single dimension, zero based array
    SzArray(Box<TypeSignature>),
    /// Multi-dimensional array with its rank
    Array(Box<TypeSignature>, u32),
    /// Unmanaged pointer
    Ptr(Box<TypeSignature>),
    /// Type by reference
    ByRef(Box<TypeSignature>),
    /// Pinned local
    Pinned(Box<TypeSignature>),
    /// Function pointer
    FnPtr(Box<MethodSignature>),
    /// Required modifier (`modreq`) applied to a type
    ModifiedRequired(Token, Box<TypeSignature>),
    /// Optional modifier (`modopt`) applied to a type
    ModifiedOptional(Token, Box<TypeSignature>),
}

impl TypeSignature {
    /// Collects every type token mentioned by this signature, in order of appearance
    pub fn type_tokens(&self, out: &mut Vec<Token>) {
        match self {
            TypeSignature::Class(token) | TypeSignature::ValueType(token) => out.push(*token),
            TypeSignature::GenericInst(generic, args) => {
                generic.type_tokens(out);
                for arg in args {
                    arg.type_tokens(out);
                }
            }
            TypeSignature::SzArray(inner)
            | TypeSignature::Array(inner, _)
            | TypeSignature::Ptr(inner)
            | TypeSignature::ByRef(inner)
            | TypeSignature::Pinned(inner) => inner.type_tokens(out),
            TypeSignature::FnPtr(method) => method.type_tokens(out),
            TypeSignature::ModifiedRequired(modifier, inner)
            | TypeSignature::ModifiedOptional(modifier, inner) => {
                out.push(*modifier);
                inner.type_tokens(out);
            }
            _ => {}
        }
    }
}

/// A method, property or function pointer signature
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodSignature {
    /// Instance method (`this` is passed implicitly)
    pub has_this: bool,
    /// Number of generic parameters of a generic method
    pub generic_param_count: u32,
    /// Return type
    pub return_type: TypeSignature,
    /// Parameter types
    pub params: Vec<TypeSignature>,
}

impl MethodSignature {
    /// Creates a static method signature
    #[must_use]
    pub fn new(return_type: TypeSignature, params: Vec<TypeSignature>) -> Self {
        MethodSignature {
            has_this: false,
            generic_param_count: 0,
            return_type,
            params,
        }
    }

    /// Creates an instance method signature
    #[must_use]
    pub fn instance(return_type: TypeSignature, params: Vec<TypeSignature>) -> Self {
        MethodSignature {
            has_this: true,
            ..Self::new(return_type, params)
        }
    }

    /// Collects every type token mentioned by the return type and the parameters
    pub fn type_tokens(&self, out: &mut Vec<Token>) {
        self.return_type.type_tokens(out);
        for param in &self.params {
            param.type_tokens(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_signature_tokens() {
        let list = Token(0x01000005);
        let item = Token(0x02000003);
        let modifier = Token(0x01000009);

        let signature = TypeSignature::SzArray(Box::new(TypeSignature::GenericInst(
            Box::new(TypeSignature::Class(list)),
            vec![
                TypeSignature::I4,
                TypeSignature::ModifiedOptional(
                    modifier,
                    Box::new(TypeSignature::ValueType(item)),
                ),
            ],
        )));

        let mut tokens = Vec::new();
        signature.type_tokens(&mut tokens);
        assert_eq!(tokens, vec![list, modifier, item]);
    }

    #[test]
    fn test_method_signature_tokens() {
        let ret = Token(0x02000002);
        let param = Token(0x02000004);
        let signature = MethodSignature::instance(
            TypeSignature::Class(ret),
            vec![
                TypeSignature::String,
                TypeSignature::ByRef(Box::new(TypeSignature::Class(param))),
            ],
        );

        let mut tokens = Vec::new();
        signature.type_tokens(&mut tokens);
        assert_eq!(tokens, vec![ret, param]);
        assert!(signature.has_this);
    }
}

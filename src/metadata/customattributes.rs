//! Custom attribute applications.
//!
//! An attribute instance is identified by its constructor (a `MethodDef` or `MemberRef`),
//! followed by the decoded fixed and named arguments. `typeof(...)` arguments and enum
//! values carry serialized type names rather than tokens, so they are resolved by name
//! during the scan.

use crate::metadata::token::Token;

/// A decoded custom attribute argument value
#[derive(Debug, Clone, PartialEq)]
pub enum CustomAttributeArgument {
    /// Boolean value
    Bool(bool),
    /// Character value (16-bit Unicode)
    Char(char),
    /// Signed 8-bit integer
    I1(i8),
    /// Unsigned 8-bit integer
    U1(u8),
    /// Signed 16-bit integer
    I2(i16),
    /// Unsigned 16-bit integer
    U2(u16),
    /// Signed 32-bit integer
    I4(i32),
    /// Unsigned 32-bit integer
    U4(u32),
    /// Signed 64-bit integer
    I8(i64),
    /// Unsigned 64-bit integer
    U8(u64),
    /// 32-bit floating point
    R4(f32),
    /// 64-bit floating point
    R8(f64),
    /// UTF-8 string, `None` for a null string
    String(Option<String>),
    /// Type reference, as serialized type name; `None` for a null `typeof`
    Type(Option<String>),
    /// Array of arguments
    Array(Vec<CustomAttributeArgument>),
    /// Enum value (serialized enum type name + underlying value)
    Enum(String, Box<CustomAttributeArgument>),
    /// Boxed value of an `object` typed parameter
    Boxed(Box<CustomAttributeArgument>),
}

impl CustomAttributeArgument {
    /// Collects every serialized type name referenced by this argument
    pub fn type_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            CustomAttributeArgument::Type(Some(name)) => out.push(name),
            CustomAttributeArgument::Type(None) => {}
            CustomAttributeArgument::Enum(name, value) => {
                out.push(name);
                value.type_names(out);
            }
            CustomAttributeArgument::Array(values) => {
                for value in values {
                    value.type_names(out);
                }
            }
            CustomAttributeArgument::Boxed(value) => value.type_names(out),
            _ => {}
        }
    }
}

/// A named (field or property) argument
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAttributeNamedArgument {
    /// True for a field, false for a property
    pub is_field: bool,
    /// Field or property name
    pub name: String,
    /// Assigned value
    pub value: CustomAttributeArgument,
}

/// An applied custom attribute
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAttribute {
    /// Attribute constructor (`MethodDef` or `MemberRef`)
    pub constructor: Token,
    /// Positional constructor arguments
    pub fixed_args: Vec<CustomAttributeArgument>,
    /// Named field and property arguments
    pub named_args: Vec<CustomAttributeNamedArgument>,
}

impl CustomAttribute {
    /// Creates an attribute application without arguments
    #[must_use]
    pub fn new(constructor: Token) -> Self {
        CustomAttribute {
            constructor,
            fixed_args: Vec::new(),
            named_args: Vec::new(),
        }
    }

    /// Adds a positional argument
    #[must_use]
    pub fn with_arg(mut self, value: CustomAttributeArgument) -> Self {
        self.fixed_args.push(value);
        self
    }

    /// Adds a named field or property argument
    #[must_use]
    pub fn with_named_arg(
        mut self,
        is_field: bool,
        name: impl Into<String>,
        value: CustomAttributeArgument,
    ) -> Self {
        self.named_args.push(CustomAttributeNamedArgument {
            is_field,
            name: name.into(),
            value,
        });
        self
    }

    /// All serialized type names referenced by the arguments of this attribute
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for arg in &self.fixed_args {
            arg.type_names(&mut names);
        }
        for arg in &self.named_args {
            arg.value.type_names(&mut names);
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names_cover_all_argument_shapes() {
        let attribute = CustomAttribute::new(Token(0x0A000001))
            .with_arg(CustomAttributeArgument::Type(Some("Ns.A".to_string())))
            .with_arg(CustomAttributeArgument::Array(vec![
                CustomAttributeArgument::Type(Some("Ns.B".to_string())),
                CustomAttributeArgument::I4(3),
            ]))
            .with_named_arg(
                false,
                "Kind",
                CustomAttributeArgument::Enum(
                    "Ns.Kind, Other".to_string(),
                    Box::new(CustomAttributeArgument::I4(1)),
                ),
            )
            .with_named_arg(
                true,
                "Boxed",
                CustomAttributeArgument::Boxed(Box::new(CustomAttributeArgument::Type(Some(
                    "Ns.C".to_string(),
                )))),
            );

        assert_eq!(
            attribute.type_names(),
            vec!["Ns.A", "Ns.B", "Ns.Kind, Other", "Ns.C"]
        );
    }

    #[test]
    fn test_no_type_names() {
        let attribute = CustomAttribute::new(Token(0x06000001))
            .with_arg(CustomAttributeArgument::String(Some("text".to_string())))
            .with_arg(CustomAttributeArgument::Bool(true))
            .with_arg(CustomAttributeArgument::Type(None))
            .with_named_arg(
                false,
                "Fallback",
                CustomAttributeArgument::Array(vec![CustomAttributeArgument::Type(None)]),
            );
        assert!(attribute.type_names().is_empty());
    }
}

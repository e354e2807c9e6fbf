//! References to other assemblies and the types and members they define.

use std::fmt;

use crate::metadata::{
    signatures::{MethodSignature, TypeSignature},
    token::Token,
};

/// Simple names of the assemblies that host `System.Object`.
///
/// The reference to the core library is never pruned: signatures of primitive types
/// (`int32`, `string`, `object`, ...) refer to it implicitly without any token.
pub const CORE_LIBRARY_NAMES: [&str; 4] = [
    "mscorlib",
    "System.Private.CoreLib",
    "System.Runtime",
    "netstandard",
];

/// A four-part assembly version
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssemblyVersion {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
    /// Build number
    pub build: u16,
    /// Revision number
    pub revision: u16,
}

impl AssemblyVersion {
    /// Creates a version from its four parts
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        AssemblyVersion {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// A row of the `AssemblyRef` table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyRef {
    /// `AssemblyRef` token
    pub token: Token,
    /// Simple name of the referenced assembly
    pub name: String,
    /// Requested version
    pub version: AssemblyVersion,
    /// Culture, `None` for the invariant culture
    pub culture: Option<String>,
    /// Public key token, `None` for unsigned assemblies
    pub public_key_token: Option<[u8; 8]>,
}

impl AssemblyRef {
    /// Creates a reference to an unsigned, culture-neutral assembly
    #[must_use]
    pub fn named(name: impl Into<String>, version: AssemblyVersion) -> Self {
        AssemblyRef {
            token: Token(0),
            name: name.into(),
            version,
            culture: None,
            public_key_token: None,
        }
    }

    /// Display name in the form `Name, Version=a.b.c.d, Culture=neutral, PublicKeyToken=null`.
    ///
    /// This is the key the resolver caches modules under.
    #[must_use]
    pub fn full_name(&self) -> String {
        let culture = self.culture.as_deref().unwrap_or("neutral");
        let key_token = match &self.public_key_token {
            Some(bytes) => bytes.iter().map(|b| format!("{b:02x}")).collect::<String>(),
            None => "null".to_string(),
        };

        format!(
            "{}, Version={}, Culture={}, PublicKeyToken={}",
            self.name, self.version, culture, key_token
        )
    }
}

/// Where a [`TypeRef`] is defined
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolutionScope {
    /// The current module
    Module,
    /// Another assembly
    AssemblyRef(Token),
    /// The enclosing type of a nested type reference (a `TypeRef` token)
    TypeRef(Token),
}

/// A row of the `TypeRef` table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRef {
    /// `TypeRef` token
    pub token: Token,
    /// Resolution scope
    pub scope: ResolutionScope,
    /// Namespace, empty for nested references
    pub namespace: String,
    /// Simple name
    pub name: String,
}

/// The signature of a [`MemberRef`]
#[derive(Clone, Debug, PartialEq)]
pub enum MemberRefSignature {
    /// Method reference
    Method(MethodSignature),
    /// Field reference
    Field(TypeSignature),
}

impl MemberRefSignature {
    /// Collects every type token mentioned by the signature
    pub fn type_tokens(&self, out: &mut Vec<Token>) {
        match self {
            MemberRefSignature::Method(method) => method.type_tokens(out),
            MemberRefSignature::Field(field) => field.type_tokens(out),
        }
    }
}

/// A row of the `MemberRef` table: a field or method of a type outside the `TypeDef`
/// table or of a constructed generic type
#[derive(Clone, Debug, PartialEq)]
pub struct MemberRef {
    /// `MemberRef` token
    pub token: Token,
    /// Declaring type (`TypeDef`, `TypeRef` or `TypeSpec`) or `MethodDef` for vararg call sites
    pub parent: Token,
    /// Member name
    pub name: String,
    /// Member signature
    pub signature: MemberRefSignature,
}

/// A row of the `MethodSpec` table: an instantiated generic method
#[derive(Clone, Debug, PartialEq)]
pub struct MethodSpec {
    /// `MethodSpec` token
    pub token: Token,
    /// Generic method (`MethodDef` or `MemberRef`)
    pub method: Token,
    /// Generic arguments
    pub instantiation: Vec<TypeSignature>,
}

//! Compound type names.
//!
//! Types are identified by their namespace-qualified name, extended with the names of the
//! enclosing types for nested types. The textual form uses `/` between nesting levels, as
//! ILDasm and Mono.Cecil print them:
//!
//! ```text
//! MyApp.Forms.MainForm
//! MyApp.Forms.MainForm/Designer
//! MyApp.Forms.MainForm/Designer/Cache
//! ```
//!
//! Custom attribute blobs store `typeof(...)` arguments and enum types as *serialized* type
//! names instead (`+` between nesting levels, optional generic arguments and an optional
//! assembly qualifier). [`SerializedTypeName`] parses that form.

use std::{fmt, str::FromStr};

use crate::{Error, Result};

/// A namespace-qualified, possibly nested, type name.
///
/// The name is kept in canonical form: the namespace is everything before the last `.` of
/// the outermost name. `TypeName::from_parts("A", ["B.C"])` and `"A.B.C".parse()` therefore
/// compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName {
    namespace: String,
    names: Vec<String>,
}

impl TypeName {
    /// Creates the name of a top-level type.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::from_parts(namespace, vec![name.into()])
    }

    /// Creates a name from a namespace and the chain of names from the outermost to the
    /// innermost type.
    ///
    /// # Arguments
    ///
    /// * `namespace` - Namespace of the outermost type (may be empty)
    /// * `names` - Names from the outermost to the innermost type; must not be empty
    #[must_use]
    pub fn from_parts(namespace: impl Into<String>, mut names: Vec<String>) -> Self {
        let namespace = namespace.into();
        if names.is_empty() {
            names.push(String::new());
        }

        let outer = if namespace.is_empty() {
            names[0].clone()
        } else {
            format!("{}.{}", namespace, names[0])
        };

        let (namespace, outer_name) = split_namespace(&outer);
        names[0] = outer_name.to_string();

        TypeName {
            namespace: namespace.to_string(),
            names,
        }
    }

    /// Returns the name of a type nested directly inside this one
    #[must_use]
    pub fn nested(&self, name: impl Into<String>) -> Self {
        let mut names = self.names.clone();
        names.push(name.into());
        TypeName {
            namespace: self.namespace.clone(),
            names,
        }
    }

    /// Returns the name of the enclosing type, `None` for top-level types
    #[must_use]
    pub fn enclosing(&self) -> Option<Self> {
        if self.names.len() < 2 {
            return None;
        }

        Some(TypeName {
            namespace: self.namespace.clone(),
            names: self.names[..self.names.len() - 1].to_vec(),
        })
    }

    /// Namespace of the outermost type
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Simple name of the innermost type
    #[must_use]
    pub fn name(&self) -> &str {
        self.names.last().map_or("", String::as_str)
    }

    /// Names from the outermost to the innermost type
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns true if the name denotes a nested type
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.names.len() > 1
    }

    /// Number of enclosing types
    #[must_use]
    pub fn depth(&self) -> usize {
        self.names.len() - 1
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.namespace.is_empty() {
            write!(f, "{}.", self.namespace)?;
        }
        write!(f, "{}", self.names.join("/"))
    }
}

impl FromStr for TypeName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut segments = s.split('/');
        let outer = segments.next().unwrap_or_default();
        if outer.is_empty() {
            return Err(Error::Configuration(format!("Invalid type name '{s}'")));
        }

        let (namespace, name) = split_namespace(outer);
        let mut names = vec![name.to_string()];
        for segment in segments {
            if segment.is_empty() {
                return Err(Error::Configuration(format!(
                    "Invalid type name '{s}' - empty nested type name"
                )));
            }
            names.push(segment.to_string());
        }

        Ok(TypeName {
            namespace: namespace.to_string(),
            names,
        })
    }
}

fn split_namespace(full: &str) -> (&str, &str) {
    match full.rfind('.') {
        Some(index) if index > 0 && index + 1 < full.len() => (&full[..index], &full[index + 1..]),
        _ => ("", full),
    }
}

/// A type name as serialized into custom attribute blobs.
///
/// Format (ECMA-335 II.23.3): `Namespace.Outer+Inner[[Arg, Assembly],[Arg]][], Assembly,
/// Version=..., Culture=..., PublicKeyToken=...`. Array, pointer and by-ref suffixes are
/// accepted and dropped, since the element type is what the type depends on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SerializedTypeName {
    /// The (possibly nested) type name
    pub name: TypeName,
    /// Simple name of the assembly qualifier, `None` if the name is not assembly-qualified
    pub assembly: Option<String>,
    /// Generic arguments of a constructed generic type
    pub generic_args: Vec<SerializedTypeName>,
}

impl SerializedTypeName {
    /// Parses a serialized type name.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if brackets are unbalanced or a name is empty.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        let (type_part, assembly) = match find_top_level(input, ',')? {
            Some(index) => {
                let qualifier = input[index + 1..].split(',').next().unwrap_or_default().trim();
                let assembly = (!qualifier.is_empty()).then(|| qualifier.to_string());
                (input[..index].trim(), assembly)
            }
            None => (input, None),
        };

        let name_end = type_part
            .find(['[', '*', '&'])
            .unwrap_or(type_part.len());
        let name_text = type_part[..name_end].trim();
        if name_text.is_empty() {
            return Err(malformed_error!("Empty serialized type name '{}'", input));
        }

        let name = name_text
            .replace('+', "/")
            .parse::<TypeName>()
            .map_err(|_| malformed_error!("Invalid serialized type name '{}'", input))?;

        let mut generic_args = Vec::new();
        let suffix = &type_part[name_end..];
        if is_generic_argument_list(suffix) {
            let close = matching_bracket(suffix)?;
            for argument in split_top_level(&suffix[1..close])? {
                let argument = argument.trim();
                let argument = argument
                    .strip_prefix('[')
                    .and_then(|inner| inner.strip_suffix(']'))
                    .unwrap_or(argument);
                generic_args.push(SerializedTypeName::parse(argument)?);
            }
        }

        Ok(SerializedTypeName {
            name,
            assembly,
            generic_args,
        })
    }
}

fn is_generic_argument_list(suffix: &str) -> bool {
    let mut chars = suffix.chars();
    chars.next() == Some('[') && !matches!(chars.next(), Some(']' | ',' | '*') | None)
}

fn find_top_level(input: &str, needle: char) -> Result<Option<usize>> {
    let mut depth = 0usize;
    for (index, c) in input.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed_error!("Unbalanced brackets in '{}'", input))?;
            }
            c if c == needle && depth == 0 => return Ok(Some(index)),
            _ => {}
        }
    }

    if depth != 0 {
        return Err(malformed_error!("Unbalanced brackets in '{}'", input));
    }
    Ok(None)
}

fn matching_bracket(input: &str) -> Result<usize> {
    let mut depth = 0usize;
    for (index, c) in input.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(index);
                }
            }
            _ => {}
        }
    }
    Err(malformed_error!("Unbalanced brackets in '{}'", input))
}

fn split_top_level(input: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut rest = input;
    while let Some(index) = find_top_level(rest, ',')? {
        parts.push(&rest[..index]);
        rest = &rest[index + 1..];
    }
    parts.push(rest);
    Ok(parts)
}

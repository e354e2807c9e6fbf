//! In-memory [`MetadataStore`] implementation.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    metadata::{
        customattributes::CustomAttribute,
        references::{AssemblyRef, MemberRef, MethodSpec, ResolutionScope, TypeRef},
        resources::Resource,
        signatures::TypeSignature,
        store::{MetadataStore, ReferenceRemoval},
        token::Token,
        typesystem::{TypeDef, TypeName, TypeVisibility},
    },
    Error, Result,
};

/// A module held entirely in memory.
///
/// Rows live in ordered maps keyed by token, so iteration order is token order and removals
/// never renumber surviving rows. Construct it through
/// [`ModuleBuilder`](crate::metadata::builder::ModuleBuilder).
#[derive(Clone, Debug, Default)]
pub struct ModuleDefinition {
    pub(crate) name: String,
    pub(crate) types: BTreeMap<Token, TypeDef>,
    pub(crate) type_refs: BTreeMap<Token, TypeRef>,
    pub(crate) type_specs: BTreeMap<Token, TypeSignature>,
    pub(crate) member_refs: BTreeMap<Token, MemberRef>,
    pub(crate) method_specs: BTreeMap<Token, MethodSpec>,
    pub(crate) assembly_refs: BTreeMap<Token, AssemblyRef>,
    pub(crate) resources: Vec<Resource>,
    pub(crate) attributes: Vec<CustomAttribute>,
    /// Member token to declaring `TypeDef`
    pub(crate) member_owners: HashMap<Token, Token>,
    /// Full type name to `TypeDef`
    pub(crate) names: HashMap<TypeName, Token>,
}

impl ModuleDefinition {
    /// Creates an empty module
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        ModuleDefinition {
            name: name.into(),
            ..ModuleDefinition::default()
        }
    }

    /// Iterates over all type definitions in token order
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// Number of type definitions, including `<Module>`
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Iterates over all assembly references in token order
    pub fn assembly_refs(&self) -> impl Iterator<Item = &AssemblyRef> {
        self.assembly_refs.values()
    }

    /// Iterates over all type references in token order
    pub fn type_refs(&self) -> impl Iterator<Item = &TypeRef> {
        self.type_refs.values()
    }

    /// Number of member references
    #[must_use]
    pub fn member_ref_count(&self) -> usize {
        self.member_refs.len()
    }

    /// Mutable access to a type definition.
    ///
    /// Changing the name, namespace or nesting of the type through this reference leaves
    /// the name index stale; use it for members and attributes only.
    pub fn type_def_mut(&mut self, token: Token) -> Option<&mut TypeDef> {
        self.types.get_mut(&token)
    }

    /// Inserts a fully linked type definition and indexes its name and members.
    ///
    /// The enclosing type, if any, has to be present already.
    pub(crate) fn insert_type(&mut self, def: TypeDef) {
        let token = def.token;
        if let Some(enclosing) = def.enclosing.and_then(|outer| self.types.get_mut(&outer)) {
            if !enclosing.nested_types.contains(&token) {
                enclosing.nested_types.push(token);
            }
        }

        for member in member_tokens(&def) {
            self.member_owners.insert(member, token);
        }
        self.types.insert(token, def);

        if let Some(name) = self.type_name(token) {
            self.names.insert(name, token);
        }
    }

    /// Registers a member that was appended to an existing type
    pub(crate) fn register_member(&mut self, member: Token, owner: Token) {
        self.member_owners.insert(member, owner);
    }

    fn remove_single_type(&mut self, token: Token) -> Option<TypeDef> {
        let name = self.type_name(token);
        let def = self.types.remove(&token)?;

        if let Some(name) = name {
            self.names.remove(&name);
        }
        for member in member_tokens(&def) {
            self.member_owners.remove(&member);
        }
        if let Some(outer) = def.enclosing {
            if let Some(enclosing) = self.types.get_mut(&outer) {
                enclosing.nested_types.retain(|nested| *nested != token);
            }
        }
        Some(def)
    }
}

fn member_tokens(def: &TypeDef) -> impl Iterator<Item = Token> + '_ {
    def.fields
        .iter()
        .map(|field| field.token)
        .chain(def.methods.iter().map(|method| method.token))
        .chain(def.properties.iter().map(|property| property.token))
        .chain(def.events.iter().map(|event| event.token))
}

impl MetadataStore for ModuleDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_tokens(&self) -> Vec<Token> {
        self.types.keys().copied().collect()
    }

    fn type_def(&self, token: Token) -> Option<&TypeDef> {
        self.types.get(&token)
    }

    fn type_ref(&self, token: Token) -> Option<&TypeRef> {
        self.type_refs.get(&token)
    }

    fn type_spec(&self, token: Token) -> Option<&TypeSignature> {
        self.type_specs.get(&token)
    }

    fn member_ref(&self, token: Token) -> Option<&MemberRef> {
        self.member_refs.get(&token)
    }

    fn method_spec(&self, token: Token) -> Option<&MethodSpec> {
        self.method_specs.get(&token)
    }

    fn assembly_ref(&self, token: Token) -> Option<&AssemblyRef> {
        self.assembly_refs.get(&token)
    }

    fn assembly_ref_tokens(&self) -> Vec<Token> {
        self.assembly_refs.keys().copied().collect()
    }

    fn resources(&self) -> &[Resource] {
        &self.resources
    }

    fn module_attributes(&self) -> &[CustomAttribute] {
        &self.attributes
    }

    fn declaring_type(&self, member: Token) -> Option<Token> {
        self.member_owners.get(&member).copied()
    }

    fn find_type(&self, name: &TypeName) -> Option<Token> {
        self.names.get(name).copied()
    }

    fn remove_type(&mut self, token: Token) -> Result<Vec<TypeDef>> {
        if !self.types.contains_key(&token) {
            return Err(Error::TokenNotFound(token));
        }

        // Innermost types first, so every removal still sees its enclosing chain
        let mut order = Vec::new();
        let mut pending = vec![token];
        while let Some(current) = pending.pop() {
            order.push(current);
            if let Some(def) = self.types.get(&current) {
                pending.extend(def.nested_types.iter().copied());
            }
        }

        let mut removed: Vec<TypeDef> = order
            .into_iter()
            .rev()
            .filter_map(|current| self.remove_single_type(current))
            .collect();
        removed.reverse();
        Ok(removed)
    }

    fn remove_resource(&mut self, name: &str) -> Option<Resource> {
        let index = self.resources.iter().position(|resource| resource.name == name)?;
        Some(self.resources.remove(index))
    }

    fn remove_assembly_ref(&mut self, token: Token) -> Result<ReferenceRemoval> {
        if self.assembly_refs.remove(&token).is_none() {
            return Err(Error::TokenNotFound(token));
        }

        let mut removal = ReferenceRemoval::default();

        let dead_type_refs: BTreeSet<Token> = self
            .type_refs
            .keys()
            .copied()
            .filter(|type_ref| {
                self.type_ref_root_scope(*type_ref) == Some(ResolutionScope::AssemblyRef(token))
            })
            .collect();
        for type_ref in &dead_type_refs {
            self.type_refs.remove(type_ref);
        }
        removal.type_refs = dead_type_refs.len();

        let mentions_dead = |signature: &TypeSignature| {
            let mut tokens = Vec::new();
            signature.type_tokens(&mut tokens);
            tokens.iter().any(|t| dead_type_refs.contains(t))
        };
        let dead_type_specs: BTreeSet<Token> = self
            .type_specs
            .iter()
            .filter(|(_, signature)| mentions_dead(signature))
            .map(|(spec, _)| *spec)
            .collect();
        for spec in &dead_type_specs {
            self.type_specs.remove(spec);
        }
        removal.type_specs = dead_type_specs.len();

        let dead_member_refs: BTreeSet<Token> = self
            .member_refs
            .values()
            .filter(|member| {
                dead_type_refs.contains(&member.parent) || dead_type_specs.contains(&member.parent)
            })
            .map(|member| member.token)
            .collect();
        for member in &dead_member_refs {
            self.member_refs.remove(member);
        }
        removal.member_refs = dead_member_refs.len();

        let before = self.method_specs.len();
        self.method_specs
            .retain(|_, spec| !dead_member_refs.contains(&spec.method));
        removal.method_specs = before - self.method_specs.len();

        Ok(removal)
    }

    fn set_visibility(&mut self, token: Token, visibility: TypeVisibility) -> Result<()> {
        let def = self
            .types
            .get_mut(&token)
            .ok_or(Error::TokenNotFound(token))?;
        def.set_visibility(visibility);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        builder::{ModuleBuilder, TypeBuilder},
        members::Field,
        references::{AssemblyVersion, MemberRefSignature},
        signatures::MethodSignature,
    };

    #[test]
    fn test_remove_type_cascades_to_nested_types() {
        let mut builder = ModuleBuilder::new("Sample");
        let outer = builder
            .add_type(
                TypeBuilder::new("Sample", "Outer").field(Field::new("value", TypeSignature::I4)),
            )
            .unwrap();
        let inner = builder
            .add_nested_type(outer, TypeBuilder::nested("Inner"))
            .unwrap();
        let innermost = builder
            .add_nested_type(inner, TypeBuilder::nested("Innermost"))
            .unwrap();
        let mut module = builder.build();

        let removed = module.remove_type(outer).unwrap();
        let tokens: Vec<Token> = removed.iter().map(|def| def.token).collect();
        assert_eq!(tokens, vec![outer, inner, innermost]);

        assert!(module.type_def(inner).is_none());
        assert!(module.declaring_type(Token(0x04000001)).is_none());
        assert!(module
            .find_type(&"Sample.Outer/Inner".parse().unwrap())
            .is_none());
        assert_eq!(module.type_count(), 1);
    }

    #[test]
    fn test_remove_nested_type_unlinks_enclosing() {
        let mut builder = ModuleBuilder::new("Sample");
        let outer = builder.add_type(TypeBuilder::new("Sample", "Outer")).unwrap();
        let inner = builder
            .add_nested_type(outer, TypeBuilder::nested("Inner"))
            .unwrap();
        let mut module = builder.build();

        module.remove_type(inner).unwrap();
        assert!(module.type_def(outer).unwrap().nested_types.is_empty());
        assert!(matches!(
            module.remove_type(inner),
            Err(Error::TokenNotFound(_))
        ));
    }

    #[test]
    fn test_remove_assembly_ref_cascades() {
        let mut builder = ModuleBuilder::new("Sample");
        let mscorlib = builder.assembly_ref("mscorlib", AssemblyVersion::new(4, 0, 0, 0));
        let drawing = builder.assembly_ref("System.Drawing", AssemblyVersion::new(4, 0, 0, 0));
        let object = builder.type_ref(mscorlib, "System", "Object");
        let image = builder.type_ref(drawing, "System.Drawing", "Image");
        let nested = builder.nested_type_ref(image, "Frame");
        let list = builder.type_ref(mscorlib, "System.Collections.Generic", "List`1");
        let spec = builder.type_spec(TypeSignature::GenericInst(
            Box::new(TypeSignature::Class(list)),
            vec![TypeSignature::Class(image)],
        ));
        let ctor = builder.member_ref(
            spec,
            ".ctor",
            MemberRefSignature::Method(MethodSignature::instance(TypeSignature::Void, vec![])),
        );
        builder.member_ref(
            object,
            ".ctor",
            MemberRefSignature::Method(MethodSignature::instance(TypeSignature::Void, vec![])),
        );
        builder.method_spec(ctor, vec![TypeSignature::Class(nested)]);
        let mut module = builder.build();

        let removal = module.remove_assembly_ref(drawing).unwrap();
        assert_eq!(
            removal,
            ReferenceRemoval {
                type_refs: 2,
                type_specs: 1,
                member_refs: 1,
                method_specs: 1,
            }
        );
        assert_eq!(removal.total(), 5);
        assert!(module.type_ref(object).is_some());
        assert!(module.type_ref(list).is_some());
        assert_eq!(module.member_ref_count(), 1);
        assert_eq!(module.assembly_ref_tokens(), vec![mscorlib]);
    }

    #[test]
    fn test_set_visibility() {
        let mut builder = ModuleBuilder::new("Sample");
        let token = builder.add_type(TypeBuilder::new("Sample", "Api").public()).unwrap();
        let mut module = builder.build();

        module
            .set_visibility(token, TypeVisibility::NotPublic)
            .unwrap();
        assert_eq!(
            module.type_def(token).unwrap().visibility(),
            TypeVisibility::NotPublic
        );
        assert!(module
            .set_visibility(Token(0x02000099), TypeVisibility::Public)
            .is_err());
    }

    #[test]
    fn test_core_reference_prefers_mscorlib() {
        let mut builder = ModuleBuilder::new("Sample");
        builder.assembly_ref("System.Runtime", AssemblyVersion::new(8, 0, 0, 0));
        let mscorlib = builder.assembly_ref("mscorlib", AssemblyVersion::new(4, 0, 0, 0));
        let module = builder.build();

        assert_eq!(module.core_reference(), Some(mscorlib));
        assert_eq!(module.assembly_ref_by_name("MSCORLIB"), Some(mscorlib));
    }
}

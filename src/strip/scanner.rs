//! The mark phase: reachability from the entry points.
//!
//! A breadth-first worklist traversal over [`outgoing_edges`]. Nodes are marked when popped,
//! so each type is expanded at most once and cycles terminate.
//!
//! Roots are the entry points, the `<Module>` type and every type mentioned by the
//! assembly-level attributes. Type references are resolved to the defining module: back
//! to the primary module for references naming it, otherwise through the
//! [`AssemblyResolver`]. Types of dependency modules are recorded as foreign nodes and only
//! their base-type and enclosing chains are followed.

use std::{
    collections::{BTreeSet, HashMap, VecDeque},
    fmt,
};

use log::{debug, info};
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    metadata::{
        builder::MODULE_TYPE_NAME,
        references::{AssemblyRef, AssemblyVersion, ResolutionScope},
        store::{MetadataStore, ModuleHandle},
        token::{TableId, Token},
        typesystem::TypeName,
    },
    resolver::AssemblyResolver,
    strip::{
        edges::{attribute_edges, hierarchy_edges, outgoing_edges, EdgeKind, EdgeTarget},
        nodes::{TypeNode, UsedSet},
    },
    Error, Result,
};

/// Statistics of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Number of roots the traversal was seeded with
    pub roots: usize,
    /// Number of distinct nodes expanded, local and foreign
    pub nodes_visited: usize,
    /// Number of foreign nodes expanded
    pub foreign_nodes: usize,
    /// Number of dependency modules obtained from the resolver
    pub modules_resolved: usize,
    /// Edges into dependencies that were not followed because no resolver is configured
    pub unresolved_edges: usize,
    edges: [usize; EdgeKind::COUNT],
}

impl ScanStats {
    fn record(&mut self, kind: EdgeKind) {
        self.edges[kind as usize] += 1;
    }

    /// Number of edges of the given kind that were traversed
    #[must_use]
    pub fn edges(&self, kind: EdgeKind) -> usize {
        self.edges[kind as usize]
    }

    /// Number of edges traversed, of all kinds
    #[must_use]
    pub fn total_edges(&self) -> usize {
        self.edges.iter().sum()
    }
}

impl fmt::Display for ScanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} roots, {} nodes ({} foreign), {} edges",
            self.roots,
            self.nodes_visited,
            self.foreign_nodes,
            self.total_edges()
        )?;

        let per_kind: Vec<String> = EdgeKind::iter()
            .filter(|kind| self.edges(*kind) > 0)
            .map(|kind| format!("{kind}: {}", self.edges(kind)))
            .collect();
        if !per_kind.is_empty() {
            write!(f, " [{}]", per_kind.join(", "))?;
        }
        Ok(())
    }
}

/// Computes the set of types reachable from the entry points.
///
/// # Arguments
/// * `module` - The primary module
/// * `entry_points` - Full type names (`Namespace.Outer/Inner`) of the roots
/// * `resolver` - Resolver for dependency modules; without one, edges into dependencies
///   are counted in [`ScanStats::unresolved_edges`] and not followed
///
/// # Errors
/// - [`Error::Configuration`] if entry points name no type of the module; all such names are
///   reported together and nothing is traversed
/// - [`Error::Resolution`] if the resolver cannot provide a dependency
/// - [`Error::TypeNotFound`] if a dependency does not define a referenced type
/// - [`Error::Malformed`] if the module contains dangling tokens
pub fn scan<I, S>(
    module: &dyn MetadataStore,
    entry_points: I,
    resolver: Option<&dyn AssemblyResolver>,
) -> Result<UsedSet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let roots = resolve_type_names(module, entry_points, "entry point")?;

    let mut scanner = Scanner::new(module, resolver);
    for token in roots {
        scanner.seed(token);
    }
    if let Some(module_type) = module.find_type(&TypeName::new("", MODULE_TYPE_NAME)) {
        scanner.seed(module_type);
    }
    for edge in attribute_edges(module, module.module_attributes())? {
        scanner.stats.record(edge.kind);
        scanner.push_target(&None, edge.target)?;
    }

    scanner.run()
}

/// Maps full type names to tokens of the store, reporting every unknown name at once.
pub(crate) fn resolve_type_names<I, S>(
    store: &dyn MetadataStore,
    names: I,
    role: &str,
) -> Result<Vec<Token>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tokens = Vec::new();
    let mut missing = Vec::new();

    for name in names {
        let name = name.as_ref();
        match name
            .parse::<TypeName>()
            .ok()
            .and_then(|parsed| store.find_type(&parsed))
        {
            Some(token) => tokens.push(token),
            None => missing.push(format!("'{name}'")),
        }
    }

    if !missing.is_empty() {
        return Err(Error::Configuration(format!(
            "Unresolvable {role} names in module '{}': {}",
            store.name(),
            missing.join(", ")
        )));
    }
    Ok(tokens)
}

/// `None` is the primary module
type Location = Option<ModuleHandle>;

struct Scanner<'a> {
    primary: &'a dyn MetadataStore,
    resolver: Option<&'a dyn AssemblyResolver>,
    /// Dependency modules resolved during this scan, by lowercase simple name
    modules: HashMap<String, ModuleHandle>,
    worklist: VecDeque<(Location, Token)>,
    local: BTreeSet<Token>,
    foreign: BTreeSet<TypeNode>,
    stats: ScanStats,
}

impl<'a> Scanner<'a> {
    fn new(primary: &'a dyn MetadataStore, resolver: Option<&'a dyn AssemblyResolver>) -> Self {
        Scanner {
            primary,
            resolver,
            modules: HashMap::new(),
            worklist: VecDeque::new(),
            local: BTreeSet::new(),
            foreign: BTreeSet::new(),
            stats: ScanStats::default(),
        }
    }

    fn seed(&mut self, token: Token) {
        self.stats.roots += 1;
        self.worklist.push_back((None, token));
    }

    fn run(mut self) -> Result<UsedSet> {
        while let Some((location, token)) = self.worklist.pop_front() {
            let edges = match &location {
                None => {
                    if !self.local.insert(token) {
                        continue;
                    }
                    outgoing_edges(self.primary, token)?
                }
                Some(module) => {
                    let node = TypeNode {
                        module: module.name().to_string(),
                        token,
                        foreign: true,
                    };
                    if !self.foreign.insert(node) {
                        continue;
                    }
                    self.stats.foreign_nodes += 1;
                    hierarchy_edges(module.as_ref(), token)?
                }
            };

            self.stats.nodes_visited += 1;
            for edge in edges {
                self.stats.record(edge.kind);
                self.push_target(&location, edge.target)?;
            }
        }

        info!(
            "Scan of '{}' reached {} of {} types: {}",
            self.primary.name(),
            self.local.len(),
            self.primary.type_tokens().len(),
            self.stats
        );

        Ok(UsedSet::new(
            self.primary.name().to_string(),
            self.local,
            self.foreign,
            self.stats,
        ))
    }

    fn push_target(&mut self, origin: &Location, target: EdgeTarget) -> Result<()> {
        let resolved = match target {
            EdgeTarget::Token(token) if token.is_table(TableId::TypeDef) => {
                Some((origin.clone(), token))
            }
            EdgeTarget::Token(token) => self.resolve_type_ref(origin, token)?,
            EdgeTarget::Named { assembly, name } => {
                self.resolve_named(origin, assembly.as_deref(), &name)?
            }
        };

        if let Some(next) = resolved {
            self.worklist.push_back(next);
        }
        Ok(())
    }

    fn store<'s>(&self, location: &'s Location) -> &'s dyn MetadataStore
    where
        'a: 's,
    {
        match location {
            Some(module) => module.as_ref(),
            None => self.primary,
        }
    }

    fn resolve_type_ref(
        &mut self,
        origin: &Location,
        token: Token,
    ) -> Result<Option<(Location, Token)>> {
        let store = self.store(origin);
        let name = store
            .type_ref_name(token)
            .ok_or_else(|| malformed_error!("TypeRef {} in '{}' is broken", token, store.name()))?;

        let reference = match store.type_ref_root_scope(token) {
            Some(ResolutionScope::Module) => None,
            Some(ResolutionScope::AssemblyRef(assembly)) => {
                Some(store.assembly_ref(assembly).cloned().ok_or_else(|| {
                    malformed_error!("AssemblyRef {} in '{}' does not exist", assembly, store.name())
                })?)
            }
            _ => {
                return Err(malformed_error!(
                    "TypeRef {} in '{}' has no resolution scope",
                    token,
                    store.name()
                ))
            }
        };

        let location = match reference {
            None => origin.clone(),
            Some(reference) => match self.module_for(&reference)? {
                Some(location) => location,
                None => return Ok(None),
            },
        };

        let found = self.find_in(&location, &name)?;
        Ok(Some((location, found)))
    }

    fn resolve_named(
        &mut self,
        origin: &Location,
        assembly: Option<&str>,
        name: &TypeName,
    ) -> Result<Option<(Location, Token)>> {
        let store = self.store(origin);

        let reference = match assembly {
            Some(assembly) if assembly.eq_ignore_ascii_case(store.name()) => None,
            Some(assembly) => Some(match store.assembly_ref_by_name(assembly) {
                Some(token) => store
                    .assembly_ref(token)
                    .cloned()
                    .ok_or_else(|| malformed_error!("AssemblyRef {} does not exist", token))?,
                None => AssemblyRef::named(assembly, AssemblyVersion::default()),
            }),
            None => {
                if store.find_type(name).is_some() {
                    None
                } else {
                    // Unqualified names outside the module live in the core library
                    let Some(core) = store.core_reference() else {
                        if self.resolver.is_none() {
                            debug!(
                                "No resolver configured, not following '{name}' out of '{}'",
                                store.name()
                            );
                            self.stats.unresolved_edges += 1;
                            return Ok(None);
                        }
                        return Err(Error::TypeNotFound(format!("{name} in {}", store.name())));
                    };
                    Some(
                        store
                            .assembly_ref(core)
                            .cloned()
                            .ok_or_else(|| malformed_error!("AssemblyRef {} does not exist", core))?,
                    )
                }
            }
        };

        let location = match reference {
            None => origin.clone(),
            Some(reference) => match self.module_for(&reference)? {
                Some(location) => location,
                None => return Ok(None),
            },
        };

        let found = self.find_in(&location, name)?;
        Ok(Some((location, found)))
    }

    /// The module defining `reference`; `Ok(None)` if it cannot be resolved because no
    /// resolver is configured
    fn module_for(&mut self, reference: &AssemblyRef) -> Result<Option<Location>> {
        if reference.name.eq_ignore_ascii_case(self.primary.name()) {
            return Ok(Some(None));
        }

        let key = reference.name.to_ascii_lowercase();
        if let Some(module) = self.modules.get(&key) {
            return Ok(Some(Some(module.clone())));
        }

        let Some(resolver) = self.resolver else {
            debug!(
                "No resolver configured, not following edge into '{}'",
                reference.name
            );
            self.stats.unresolved_edges += 1;
            return Ok(None);
        };

        let module = resolver.resolve(reference)?;
        self.stats.modules_resolved += 1;
        self.modules.insert(key, module.clone());
        Ok(Some(Some(module)))
    }

    fn find_in(&self, location: &Location, name: &TypeName) -> Result<Token> {
        let store = self.store(location);
        store
            .find_type(name)
            .ok_or_else(|| Error::TypeNotFound(format!("{name} in {}", store.name())))
    }
}

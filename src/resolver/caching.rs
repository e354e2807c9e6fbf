//! Caching resolver with alternate search paths.
//!
//! Resolution order for a reference:
//!
//! 1. The cache, keyed by the reference's full name
//! 2. The alternate search paths, in configuration order (`<Name>.dll`, then `<Name>.exe`);
//!    a hit is loaded and cached
//! 3. The default strategy
//!
//! Failures in step 2 are logged and swallowed, so a broken file in an alternate directory
//! never hides a dependency the default strategy can find. Only a failure of the default
//! strategy is reported to the caller.
//!
//! The cache is owned by the resolver instance. It is safe for concurrent lookups and
//! inserts; when two threads load the same dependency at once, the first insert wins and
//! both callers receive the same handle.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::DashMap;
use log::debug;
use rayon::prelude::*;

use crate::{
    metadata::{references::AssemblyRef, store::ModuleHandle},
    resolver::{check_identity, probe, validate_directory, AssemblyResolver, ModuleLoader},
    Error, Result,
};

/// Builder for [`CachingResolver`].
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
/// use ilstrip::prelude::*;
///
/// fn load(path: &Path) -> ilstrip::Result<ModuleHandle> {
///     // parse the file with the binary reader of your choice
///     # unimplemented!()
/// }
///
/// let resolver = CachingResolver::builder(StaticResolver::new(), load)
///     .with_search_path("/opt/app/bin")?
///     .with_search_path("/opt/app/plugins")?
///     .build();
/// # Ok::<(), ilstrip::Error>(())
/// ```
pub struct CachingResolverBuilder {
    default: Arc<dyn AssemblyResolver>,
    loader: Arc<dyn ModuleLoader>,
    search_paths: Vec<PathBuf>,
}

impl CachingResolverBuilder {
    /// Appends an alternate search path.
    ///
    /// Paths are searched in the order they were added, before the default strategy.
    ///
    /// # Arguments
    /// * `path` - Directory containing dependency files
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if the path does not exist or is not a directory.
    pub fn with_search_path<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.search_paths.push(validate_directory(path.as_ref())?);
        Ok(self)
    }

    /// Finishes the configuration
    #[must_use]
    pub fn build(self) -> CachingResolver {
        CachingResolver {
            default: self.default,
            loader: self.loader,
            search_paths: self.search_paths,
            cache: DashMap::new(),
        }
    }
}

/// A resolver that caches modules found in alternate search paths and otherwise delegates
/// to a default strategy.
pub struct CachingResolver {
    default: Arc<dyn AssemblyResolver>,
    loader: Arc<dyn ModuleLoader>,
    search_paths: Vec<PathBuf>,
    cache: DashMap<String, ModuleHandle>,
}

impl CachingResolver {
    /// Starts configuring a resolver.
    ///
    /// # Arguments
    /// * `default` - Strategy used when the cache and the search paths have no answer
    /// * `loader` - Loads modules found in the search paths
    #[must_use]
    pub fn builder(
        default: impl AssemblyResolver + 'static,
        loader: impl ModuleLoader + 'static,
    ) -> CachingResolverBuilder {
        CachingResolverBuilder {
            default: Arc::new(default),
            loader: Arc::new(loader),
            search_paths: Vec::new(),
        }
    }

    /// Creates a resolver without alternate search paths
    #[must_use]
    pub fn new(
        default: impl AssemblyResolver + 'static,
        loader: impl ModuleLoader + 'static,
    ) -> Self {
        Self::builder(default, loader).build()
    }

    /// The alternate search paths, in search order
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Number of cached modules
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Returns true if a module is cached under the given full name
    #[must_use]
    pub fn is_cached(&self, full_name: &str) -> bool {
        self.cache.contains_key(full_name)
    }

    /// Drops all cached modules
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Resolves a batch of references in parallel.
    ///
    /// Results are returned in input order; each entry fails or succeeds independently.
    pub fn resolve_all(&self, references: &[AssemblyRef]) -> Vec<Result<ModuleHandle>> {
        references
            .par_iter()
            .map(|reference| self.resolve(reference))
            .collect()
    }

    fn resolve_alternate(&self, reference: &AssemblyRef) -> Result<Option<ModuleHandle>> {
        let Some(path) = probe(&self.search_paths, &reference.name) else {
            return Ok(None);
        };

        debug!(
            "Loading '{}' from alternate path {}",
            reference.name,
            path.display()
        );
        let module = self.loader.load(&path)?;
        check_identity(reference, &module)?;
        Ok(Some(module))
    }
}

impl AssemblyResolver for CachingResolver {
    fn resolve(&self, reference: &AssemblyRef) -> Result<ModuleHandle> {
        let key = reference.full_name();

        if let Some(hit) = self.cache.get(&key) {
            debug!("Resolver cache hit for '{key}'");
            return Ok(hit.value().clone());
        }

        match self.resolve_alternate(reference) {
            Ok(Some(module)) => {
                let cached = self.cache.entry(key).or_insert(module);
                return Ok(cached.value().clone());
            }
            Ok(None) => debug!("'{key}' not found in alternate search paths"),
            Err(error) => {
                debug!("Alternate lookup for '{key}' failed, using default strategy: {error}");
            }
        }

        self.default.resolve(reference).map_err(|error| match error {
            Error::Resolution { .. } => error,
            other => Error::Resolution {
                name: key,
                message: other.to_string(),
            },
        })
    }
}

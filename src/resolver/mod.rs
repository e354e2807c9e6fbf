//! Resolution of assembly references to loaded modules.
//!
//! When the scan reaches a type reference scoped to another assembly, it needs that
//! assembly's metadata to continue along the base-type chain. Locating and parsing
//! dependency modules is the host's business; this module defines the seams:
//!
//! - [`AssemblyResolver`] - maps an [`AssemblyRef`] to a loaded module (the "default
//!   strategy")
//! - [`ModuleLoader`] - turns a file on disk into a loaded module
//!
//! and provides three strategies built on them:
//!
//! - [`StaticResolver`] - a fixed set of modules already loaded by the host
//! - [`DirectoryResolver`] - probes directories for `<Name>.dll` / `<Name>.exe`
//! - [`CachingResolver`] - wraps a default strategy with a concurrent cache and an ordered
//!   list of alternate search paths

mod caching;

pub use caching::{CachingResolver, CachingResolverBuilder};

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    metadata::{references::AssemblyRef, store::ModuleHandle},
    Error, Result,
};

/// File extensions probed for a dependency, in order
pub const PROBE_EXTENSIONS: [&str; 2] = ["dll", "exe"];

/// Resolves assembly references to loaded modules.
pub trait AssemblyResolver: Send + Sync {
    /// Returns the module defining the referenced assembly.
    ///
    /// # Errors
    /// Returns [`Error::Resolution`] if the assembly cannot be located or loaded.
    fn resolve(&self, reference: &AssemblyRef) -> Result<ModuleHandle>;
}

impl<T: AssemblyResolver + ?Sized> AssemblyResolver for Arc<T> {
    fn resolve(&self, reference: &AssemblyRef) -> Result<ModuleHandle> {
        (**self).resolve(reference)
    }
}

/// Loads a module from a file.
///
/// Binary parsing lives outside this crate; hosts implement this trait (or pass a closure)
/// with the reader of their choice.
pub trait ModuleLoader: Send + Sync {
    /// Loads the module stored at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    fn load(&self, path: &Path) -> Result<ModuleHandle>;
}

impl<F> ModuleLoader for F
where
    F: Fn(&Path) -> Result<ModuleHandle> + Send + Sync,
{
    fn load(&self, path: &Path) -> Result<ModuleHandle> {
        self(path)
    }
}

/// Finds the first `<name>.dll` or `<name>.exe` in the given directories.
///
/// Directories are searched in order; within a directory `.dll` wins over `.exe`.
#[must_use]
pub fn probe(directories: &[PathBuf], name: &str) -> Option<PathBuf> {
    directories.iter().find_map(|directory| {
        PROBE_EXTENSIONS
            .iter()
            .map(|extension| directory.join(format!("{name}.{extension}")))
            .find(|candidate| candidate.is_file())
    })
}

pub(crate) fn validate_directory(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(Error::Configuration(format!(
            "Search path does not exist or is not a directory: {}",
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

pub(crate) fn check_identity(reference: &AssemblyRef, module: &ModuleHandle) -> Result<()> {
    if module.name().eq_ignore_ascii_case(&reference.name) {
        Ok(())
    } else {
        Err(Error::Resolution {
            name: reference.full_name(),
            message: format!("loaded module is named '{}'", module.name()),
        })
    }
}

/// Resolves against a fixed set of already loaded modules, matched by simple name.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use ilstrip::prelude::*;
///
/// let mscorlib = Arc::new(ModuleBuilder::new("mscorlib").build());
/// let resolver = StaticResolver::new().with_module(mscorlib);
///
/// let reference = AssemblyRef::named("mscorlib", AssemblyVersion::new(4, 0, 0, 0));
/// assert_eq!(resolver.resolve(&reference)?.name(), "mscorlib");
/// # Ok::<(), ilstrip::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct StaticResolver {
    modules: HashMap<String, ModuleHandle>,
}

impl StaticResolver {
    /// Creates an empty resolver
    #[must_use]
    pub fn new() -> Self {
        StaticResolver::default()
    }

    /// Registers a module under its own name
    #[must_use]
    pub fn with_module(mut self, module: ModuleHandle) -> Self {
        self.add_module(module);
        self
    }

    /// Registers a module under its own name, replacing any module of the same name
    pub fn add_module(&mut self, module: ModuleHandle) {
        self.modules
            .insert(module.name().to_ascii_lowercase(), module);
    }

    /// Number of registered modules
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if no module is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl AssemblyResolver for StaticResolver {
    fn resolve(&self, reference: &AssemblyRef) -> Result<ModuleHandle> {
        self.modules
            .get(&reference.name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| Error::Resolution {
                name: reference.full_name(),
                message: "no module registered under this name".to_string(),
            })
    }
}

/// Probes an ordered list of directories for the dependency file.
pub struct DirectoryResolver {
    directories: Vec<PathBuf>,
    loader: Arc<dyn ModuleLoader>,
}

impl DirectoryResolver {
    /// Creates a resolver without directories
    #[must_use]
    pub fn new(loader: impl ModuleLoader + 'static) -> Self {
        DirectoryResolver {
            directories: Vec::new(),
            loader: Arc::new(loader),
        }
    }

    /// Appends a directory to probe.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if the path is not an existing directory.
    pub fn with_directory<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.directories.push(validate_directory(path.as_ref())?);
        Ok(self)
    }

    /// The probed directories, in order
    #[must_use]
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }
}

impl AssemblyResolver for DirectoryResolver {
    fn resolve(&self, reference: &AssemblyRef) -> Result<ModuleHandle> {
        let path = probe(&self.directories, &reference.name).ok_or_else(|| Error::Resolution {
            name: reference.full_name(),
            message: format!("not found in {} directories", self.directories.len()),
        })?;

        let module = self.loader.load(&path)?;
        check_identity(reference, &module)?;
        Ok(module)
    }
}

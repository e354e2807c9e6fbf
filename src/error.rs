use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The variants are grouped by who has to act on them: configuration errors are caller
/// mistakes, resolution errors point at a missing dependency, and malformed / invariant
/// errors indicate that the module graph (or this library) is inconsistent.
///
/// # Error Categories
///
/// ## Caller Errors
/// - [`Error::Configuration`] - Unresolvable entry point or exclusion, bad search path,
///   phases invoked out of order
///
/// ## Dependency Errors
/// - [`Error::Resolution`] - A dependency module could not be located by any strategy
/// - [`Error::TypeNotFound`] - A located dependency does not define the referenced type
///
/// ## Consistency Errors
/// - [`Error::Malformed`] - A token in the module points to a row that does not exist
/// - [`Error::TokenNotFound`] - A token was passed that the store does not know
/// - [`Error::InvariantViolation`] - A removal would disconnect a surviving type
///
/// ## I/O
/// - [`Error::FileError`] - Filesystem errors while probing for dependency files
///
/// # Examples
///
/// ```rust
/// use ilstrip::{prelude::*, Error};
///
/// let module = ModuleBuilder::new("Sample").build();
/// let mut stripper = Stripper::new(module);
/// stripper.add_entry_point("Sample.DoesNotExist");
///
/// match stripper.scan_used_classes() {
///     Err(Error::Configuration(message)) => println!("fix your input: {message}"),
///     Err(Error::Resolution { name, .. }) => println!("missing dependency: {name}"),
///     Err(e) => println!("other error: {e}"),
///     Ok(_) => println!("scanned"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The caller supplied configuration that cannot be satisfied.
    ///
    /// Raised for entry points or exclusions that name no type in the module, search
    /// paths that are not directories, and phases invoked before the phase they depend on
    /// (e.g. classifying before scanning). The caller has to correct the input.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A dependency module could not be resolved by any strategy.
    ///
    /// Neither the resolver cache, the alternate search paths, nor the default
    /// resolution strategy produced a module. This aborts the running scan, since
    /// continuing would treat every type referencing the dependency as a dead end.
    ///
    /// # Fields
    ///
    /// * `name` - Full name of the dependency that failed to resolve
    /// * `message` - Reason reported by the last strategy that was tried
    #[error("Failed to resolve dependency '{name}': {message}")]
    Resolution {
        /// Full name of the dependency
        name: String,
        /// Reason reported by the resolution strategy
        message: String,
    },

    /// A resolved dependency does not define the type it was expected to define.
    ///
    /// The associated value is the fully qualified type name, optionally suffixed
    /// with the module that was searched.
    #[error("Failed to find type - {0}")]
    TypeNotFound(String),

    /// The token is not known to the metadata store.
    #[error("Failed to find token in module - {0}")]
    TokenNotFound(Token),

    /// The module graph is damaged.
    ///
    /// A token stored in the module points to a row that does not exist, or a
    /// serialized type name could not be parsed. The error includes the source
    /// location where the malformation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An internal consistency check failed.
    ///
    /// Raised before any mutation when a cleanup operation would leave a surviving
    /// type pointing at a removed one. This indicates a stale classification or a
    /// defect, never a condition to recover from.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while probing search directories
    /// or loading dependency modules from disk.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}

//! Unified error types.

use std::path::PathBuf;

use thiserror::Error;

/// The error type returned by tsu-mvc's fallible startup operations.
///
/// Request-level failures (a missing view, a template that fails to
/// execute) are expressed as HTTP [`Response`](crate::Response) values, not
/// as `Error`s. This type surfaces the failures that stop a service from
/// starting: reading the view tree, compiling templates, binding a port.
#[derive(Debug, Error)]
pub enum Error {
    /// A directory or template file under the view root could not be read.
    #[error("view io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// The template file pattern is not a valid glob.
    #[error("invalid template pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A template failed to compile while building the view registry.
    #[error("template error in {path}: {source}")]
    Template { path: PathBuf, source: minijinja::Error },

    /// [`Views::setup`](crate::Views::setup) was called more than once.
    #[error("views cannot have more than one root directory")]
    AlreadyInitialized,

    /// The socket address passed to [`Server::bind`](crate::Server::bind) did not parse.
    #[error("invalid socket address `{0}`")]
    Addr(String),

    /// Binding or accepting on the listener failed.
    #[error("io: {0}")]
    Listen(#[from] std::io::Error),
}

/// Why a single render call produced no output.
///
/// Both variants end the request with `500 Internal Server Error`; the
/// message is what the client sees.
#[derive(Debug, Error)]
pub enum RenderError {
    /// [`Views::setup`](crate::Views::setup) has not completed yet.
    #[error("The views have not been set up.")]
    NotInitialized,

    /// No directory on the lookup chain has a compiled template set.
    #[error("The templates for {} were not found.", .path.display())]
    NotFound { path: PathBuf },

    /// The entry-point template failed while executing.
    #[error("{0}")]
    Execution(#[from] minijinja::Error),
}

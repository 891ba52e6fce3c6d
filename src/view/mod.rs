//! Views: nested template directories addressed by controller and action.
//!
//! Lay templates out so the directory path names the view:
//!
//! ```text
//! views/base.html               layout shared by everything below
//! views/home/index/content.html the `index` action of `home`
//! ```
//!
//! Call [`Views::setup`] once at startup, then render through a
//! [`Controller`](crate::Controller). Rendering `home/index` executes the
//! `base.html` template of the most specific directory that has one
//! compiled: `views/home/index`, else `views/home`, else `views`.

mod context;
mod helpers;
mod registry;

use std::path::Path;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::error;

use crate::error::{Error, RenderError};
use crate::response::Response;
use crate::status::Status;

use registry::Registry;

pub use context::{ViewBag, ViewContext};

/// How the view tree is read.
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub(crate) pattern: String,
    pub(crate) base: String,
}

impl ViewOptions {
    /// Glob a file name must match to be loaded as a template. `*.html` by default.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Template executed to render a view. `base.html` by default.
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self { pattern: "*.html".to_owned(), base: "base.html".to_owned() }
    }
}

/// The compiled view tree of one application.
///
/// Share it behind an `Arc`. It is written exactly once by [`setup`](Self::setup)
/// and only read afterwards, so renders never contend.
pub struct Views {
    options: ViewOptions,
    claimed: AtomicBool,
    registry: OnceLock<Registry>,
}

impl Views {
    pub fn new() -> Self {
        Self::with_options(ViewOptions::default())
    }

    pub fn with_options(options: ViewOptions) -> Self {
        Self { options, claimed: AtomicBool::new(false), registry: OnceLock::new() }
    }

    /// Walks `root` and compiles a template set for every view directory.
    ///
    /// Only the first call does any work. Every later call returns
    /// [`Error::AlreadyInitialized`] without touching the views, including
    /// after a first call that failed.
    pub fn setup(&self, root: impl AsRef<Path>) -> Result<(), Error> {
        if self.claimed.swap(true, Ordering::AcqRel) {
            return Err(Error::AlreadyInitialized);
        }

        let registry = Registry::build(root.as_ref(), &self.options)?;
        self.registry.set(registry).map_err(|_| Error::AlreadyInitialized)
    }

    /// The root passed to [`setup`](Self::setup), once it has succeeded.
    pub fn root(&self) -> Option<&Path> {
        self.registry.get().map(Registry::root)
    }

    /// Every directory with a compiled template set, sorted.
    pub fn directories(&self) -> Vec<&Path> {
        let mut dirs: Vec<&Path> = self.registry.get().into_iter().flat_map(Registry::dirs).collect();
        dirs.sort();
        dirs
    }

    /// Resolves and executes the view named by `ctx`.
    pub fn render_to_string(&self, ctx: &ViewContext) -> Result<String, RenderError> {
        let registry = self.registry.get().ok_or(RenderError::NotInitialized)?;
        let set = registry.resolve(&ctx.controller, &ctx.name)?;
        Ok(set.execute(ctx)?)
    }

    /// Like [`render_to_string`](Self::render_to_string), but answers with an
    /// HTML response, or `500` carrying the failure message.
    pub fn render(&self, ctx: &ViewContext) -> Response {
        match self.render_to_string(ctx) {
            Ok(html) => Response::html(html),
            Err(e) => {
                error!(controller = %ctx.controller, view = %ctx.name, "render failed: {e}");
                Response::error(Status::InternalServerError, &e.to_string())
            }
        }
    }
}

impl Default for Views {
    fn default() -> Self { Self::new() }
}

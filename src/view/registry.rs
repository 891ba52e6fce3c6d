//! Directory walk that turns a view tree into compiled template sets.
//!
//! Every directory is a view. A view is made of the template files in its
//! own directory plus every template file in its ancestors up to the root,
//! where a file in a deeper directory shadows an ancestor's file of the same
//! name:
//!
//! ```text
//! views/
//!   base.html              ← shared by every view unless shadowed
//!   home/
//!     base.html            ← shadows views/base.html for home/**
//!     index/content.html   → views/home/index = {home/base.html, index/content.html}
//!   admin/
//!     index/content.html   → views/admin/index = {base.html, index/content.html}
//! ```
//!
//! A directory with no template files anywhere on its path from the root
//! gets no entry.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use minijinja::Environment;
use tracing::{debug, info};

use crate::error::{Error, RenderError};
use crate::view::{ViewContext, ViewOptions, helpers};

/// Template file name → the file that defines it for one directory.
type NameTable = BTreeMap<String, PathBuf>;

/// The templates of one view directory, compiled together.
pub(crate) struct TemplateSet {
    env: Environment<'static>,
    base: String,
}

impl TemplateSet {
    fn compile(names: &NameTable, base: &str) -> Result<Self, Error> {
        let mut env = Environment::new();
        helpers::register(&mut env);

        for (name, path) in names {
            let source = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
            env.add_template_owned(name.clone(), source)
                .map_err(|source| Error::Template { path: path.clone(), source })?;
        }

        Ok(Self { env, base: base.to_owned() })
    }

    /// Executes the entry-point template with `ctx` as its data.
    pub(crate) fn execute(&self, ctx: &ViewContext) -> Result<String, minijinja::Error> {
        self.env.get_template(&self.base)?.render(ctx.to_value())
    }
}

/// Directory path → compiled [`TemplateSet`]. Immutable once built.
pub(crate) struct Registry {
    root: PathBuf,
    sets: HashMap<PathBuf, TemplateSet>,
}

impl Registry {
    pub(crate) fn build(root: &Path, options: &ViewOptions) -> Result<Self, Error> {
        let pattern = Pattern::new(&options.pattern)?;
        let mut registry = Self { root: root.to_path_buf(), sets: HashMap::new() };

        registry.walk(root, &NameTable::new(), &pattern, &options.base)?;

        info!(root = %root.display(), views = registry.sets.len(), "views compiled");
        Ok(registry)
    }

    fn walk(
        &mut self,
        dir: &Path,
        inherited: &NameTable,
        pattern: &Pattern,
        base: &str,
    ) -> Result<(), Error> {
        let mut names = inherited.clone();
        let mut subdirs = Vec::new();

        for entry in fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
            let entry = entry.map_err(|e| io_err(dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;

            if file_type.is_dir() {
                subdirs.push(path);
                continue;
            }

            // Non-UTF-8 names cannot be referenced from a template anyway.
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if pattern.matches(&name) {
                names.insert(name, path);
            }
        }

        // Children inherit this directory's table, own files included.
        for subdir in subdirs {
            self.walk(&subdir, &names, pattern, base)?;
        }

        if !names.is_empty() {
            debug!(dir = %dir.display(), templates = names.len(), "view registered");
            self.sets.insert(dir.to_path_buf(), TemplateSet::compile(&names, base)?);
        }

        Ok(())
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn get(&self, dir: &Path) -> Option<&TemplateSet> {
        self.sets.get(dir)
    }

    pub(crate) fn dirs(&self) -> impl Iterator<Item = &Path> {
        self.sets.keys().map(PathBuf::as_path)
    }

    /// Finds the set for a controller's view, most specific directory first:
    /// `root/controller/view`, then `root/controller`, then `root`.
    pub(crate) fn resolve(&self, controller: &str, view: &str) -> Result<&TemplateSet, RenderError> {
        let controller_dir = self.root.join(controller);
        let view_dir = controller_dir.join(view);

        [view_dir.as_path(), controller_dir.as_path(), self.root.as_path()]
            .into_iter()
            .find_map(|dir| self.get(dir))
            .ok_or_else(|| RenderError::NotFound { path: self.root.clone() })
    }
}

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> Error {
    Error::Io { path: path.into(), source }
}

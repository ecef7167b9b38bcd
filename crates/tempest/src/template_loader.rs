// File: src/template_loader.rs
// Purpose: Loads template files by logical name and caches them for the process lifetime

use crate::template::Template;
use anyhow::{bail, Context, Result};
use dashmap::DashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Read-through cache of template sources
///
/// `"users/show"` resolves to `<root>/users/show.<extension>`. Each file is
/// read at most once; callers receive their own `Template` copy, which shares
/// the already scanned token list until it is bound.
#[derive(Debug, Clone)]
pub struct TemplateCache {
    root: PathBuf,
    extension: String,
    templates: Arc<DashMap<PathBuf, Template>>,
}

impl TemplateCache {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
            templates: Arc::new(DashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load a template, reading the file only on the first request for it
    pub fn load(&self, name: &str) -> Result<Template> {
        let path = self.resolve(name)?;

        let entry = self
            .templates
            .entry(path.clone())
            .or_try_insert_with(|| {
                debug!(template = name, path = %path.display(), "loading template");
                fs::read_to_string(&path)
                    .map(Template::new)
                    .with_context(|| format!("Failed to read template: {:?}", path))
            })?;

        Ok(entry.value().clone())
    }

    /// Whether a template exists, without caching a miss
    pub fn contains(&self, name: &str) -> bool {
        match self.resolve(name) {
            Ok(path) => self.templates.contains_key(&path) || path.is_file(),
            Err(_) => false,
        }
    }

    /// Recursively read every template under the root into the cache
    pub fn preload(&self) -> Result<usize> {
        let root = self.root.clone();
        if !root.exists() {
            return Ok(0);
        }

        let mut loaded = 0;
        self.preload_directory(&root, &mut loaded)?;
        debug!(count = loaded, root = %root.display(), "preloaded templates");
        Ok(loaded)
    }

    fn preload_directory(&self, dir: &Path, loaded: &mut usize) -> Result<()> {
        for entry in fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))? {
            let path = entry?.path();

            if path.is_dir() {
                self.preload_directory(&path, loaded)?;
            } else if path.extension().and_then(|s| s.to_str()) == Some(self.extension.as_str()) {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read template: {:?}", path))?;
                self.templates.insert(path, Template::new(content));
                *loaded += 1;
            }
        }

        Ok(())
    }

    /// Logical names of every cached template, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .templates
            .iter()
            .filter_map(|entry| {
                let relative = entry.key().strip_prefix(&self.root).ok()?;
                Some(relative.with_extension("").to_string_lossy().replace('\\', "/"))
            })
            .collect();
        names.sort();
        names
    }

    /// Drop every cached entry so the next load reads from disk
    pub fn clear(&self) {
        self.templates.clear();
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Convert a logical name to a file path under the root
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let name = name.trim_matches('/');
        if name.is_empty() {
            bail!("Template name is empty");
        }

        let relative = Path::new(name);
        let escapes_root = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes_root {
            bail!("Template name '{}' must stay inside the template root", name);
        }

        Ok(self.root.join(format!("{}.{}", name, self.extension)))
    }
}

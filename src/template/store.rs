//! Template storage
//!
//! A builder reads and writes its template through a [`TemplateStore`]. The default
//! [`OwnedStore`] simply owns the tree; other stores can keep the tree elsewhere (behind a
//! shared handle, with change tracking, ...) without the builder knowing.

use super::leaf::Template;
use super::tree::Tree;

/// Where a builder keeps its current template
pub trait TemplateStore {
    fn current(&self) -> &Template;

    fn current_mut(&mut self) -> &mut Template;

    /// Swap in a whole new template, returning the previous one
    fn replace(&mut self, template: Template) -> Template {
        std::mem::replace(self.current_mut(), template)
    }
}

/// A store that owns its template
#[derive(Debug, Clone)]
pub struct OwnedStore {
    template: Template,
}

impl OwnedStore {
    pub fn new(template: Template) -> Self {
        Self { template }
    }
}

impl Default for OwnedStore {
    fn default() -> Self {
        Self::new(Tree::object())
    }
}

impl TemplateStore for OwnedStore {
    fn current(&self) -> &Template {
        &self.template
    }

    fn current_mut(&mut self) -> &mut Template {
        &mut self.template
    }
}

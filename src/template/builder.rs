//! The template builder
//!
//! A [`Builder`] owns one template and is the only way to change it. Templates are composed
//! by inheritance and merging:
//!
//! ```rust,ignore
//! use tidal::{Builder, Options, Template};
//!
//! let mut base = Builder::new();
//! base.add_at("device.id", "sensor-1")?;
//!
//! // `child` starts from a deep copy of `base`; later changes to either are isolated.
//! let mut child = Builder::inherit_with(&base, Options::new().namespace("readings"));
//! child.add(Template::from_entries([
//!     ("celsius", Template::iter(|| vec![20.5, 21.0, 21.5])),
//! ]))?;
//!
//! for snapshot in child.build() {
//!     println!("{}", serde_json::to_string(&snapshot)?);
//! }
//! ```
//!
//! The builder's namespace is a dot path below the root. It is created when the builder is
//! constructed and every `add`/`add_at` lands inside it. Inherited content stays where the
//! parent put it.
//!
//! `build` never looks at the namespace: it sees the whole template, optionally reshaped by a
//! [`Selector`].

use super::compile::{Compiler, SnapshotCompiler};
use super::error::Error;
use super::leaf::Template;
use super::path::{self, expand, place};
use super::select::{shape, Selector};
use super::sequence::{Limit, Snapshots};
use super::store::{OwnedStore, TemplateStore};
use super::tree::Tree;
use std::fmt;
use std::rc::Rc;

/// Construction options for a [`Builder`]
#[derive(Default)]
pub struct Options {
    namespace: Option<String>,
    limit: Option<Limit>,
    compiler: Option<Rc<dyn Compiler>>,
    store: Option<Box<dyn TemplateStore>>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dot path that every `add` of the builder is placed under
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Default snapshot count for sequences built by this builder
    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Replace the snapshot compiler
    pub fn compiler(mut self, compiler: impl Compiler + 'static) -> Self {
        self.compiler = Some(Rc::new(compiler));
        self
    }

    /// Keep the template in a custom store
    pub fn store(mut self, store: impl TemplateStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("namespace", &self.namespace)
            .field("limit", &self.limit)
            .field("custom_compiler", &self.compiler.is_some())
            .field("custom_store", &self.store.is_some())
            .finish()
    }
}

/// Owns a template and turns it into snapshot sequences
pub struct Builder {
    store: Box<dyn TemplateStore>,
    namespace: Option<String>,
    limit: Option<Limit>,
    compiler: Rc<dyn Compiler>,
}

impl Builder {
    /// An empty builder
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// An empty builder configured by `options`
    pub fn with_options(options: Options) -> Self {
        Self::assemble(None, options)
    }

    /// A builder starting from a deep copy of `parent`'s template
    pub fn inherit(parent: &Builder) -> Self {
        Self::inherit_with(parent, Options::default())
    }

    /// A builder starting from a deep copy of `parent`'s template, configured by `options`
    pub fn inherit_with(parent: &Builder, options: Options) -> Self {
        Self::assemble(Some(parent.template().clone()), options)
    }

    fn assemble(inherited: Option<Template>, options: Options) -> Self {
        let mut store = options
            .store
            .unwrap_or_else(|| Box::new(OwnedStore::default()) as Box<dyn TemplateStore>);
        if let Some(template) = inherited {
            store.replace(template);
        }
        let namespace = options.namespace.filter(|ns| !ns.is_empty());
        if let Some(ns) = &namespace {
            expand(store.current_mut(), ns, Tree::object());
        }
        tracing::debug!(namespace = ?namespace, limit = ?options.limit, "created builder");
        Self {
            store,
            namespace,
            limit: options.limit,
            compiler: options
                .compiler
                .unwrap_or_else(|| Rc::new(SnapshotCompiler) as Rc<dyn Compiler>),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn limit(&self) -> Option<Limit> {
        self.limit
    }

    /// The whole template, including inherited content
    pub fn template(&self) -> &Template {
        self.store.current()
    }

    /// The node `add` calls are placed under
    fn current_mut(&mut self) -> &mut Template {
        let root = self.store.current_mut();
        match &self.namespace {
            Some(ns) => expand(root, ns, Tree::object()),
            None => {
                path::ensure_object(root);
                root
            }
        }
    }

    /// Merge the top-level entries of an object into the namespace root.
    ///
    /// Each entry follows the placement rule of [`add_at`](Self::add_at) with its key used
    /// literally (dots in keys are not expanded). Anything other than an object is rejected.
    pub fn add(&mut self, object: impl Into<Template>) -> Result<&mut Self, Error> {
        let entries = match object.into() {
            Tree::Object(entries) => entries,
            other => return Err(Error::illegal_argument(format!("add({})", other))),
        };
        tracing::debug!(namespace = ?self.namespace, keys = entries.len(), "add");
        let current = path::ensure_object(self.current_mut());
        for (key, value) in entries {
            place(current, &key, value);
        }
        Ok(self)
    }

    /// Place `value` at a dot path below the namespace root.
    ///
    /// Objects merge into an existing object at that path; every other kind replaces it.
    pub fn add_at(&mut self, path: &str, value: impl Into<Template>) -> Result<&mut Self, Error> {
        let value = value.into();
        if !path::is_valid(path) {
            return Err(Error::illegal_argument(format!(
                "add_at({:?}, {}): expected a dot path with non-empty steps",
                path, value
            )));
        }
        tracing::debug!(namespace = ?self.namespace, path, "add_at");
        expand(self.current_mut(), path, value);
        Ok(self)
    }

    /// A sequence over the whole template
    pub fn build(&self) -> Snapshots {
        self.sequence(self.template().clone(), None)
    }

    /// A sequence over the part of the template picked by `selector`
    pub fn build_with(&self, selector: impl Into<Selector>) -> Result<Snapshots, Error> {
        let (template, limit) = shape(self.template(), &selector.into())?;
        Ok(self.sequence(template, limit))
    }

    fn sequence(&self, template: Template, limit: Option<Limit>) -> Snapshots {
        let limit = limit.or(self.limit);
        tracing::debug!(limit = ?limit, "build");
        Snapshots::new(template, limit, Rc::clone(&self.compiler))
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("template", self.template())
            .field("namespace", &self.namespace)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::value::Value;
    use serde_json::json;
    use std::cell::RefCell;

    fn first(builder: &Builder) -> serde_json::Value {
        builder.build().next().map(|s| s.to_json()).unwrap()
    }

    #[test]
    fn test_new_builder_is_empty_object() {
        assert_eq!(first(&Builder::new()), json!({}));
    }

    #[test]
    fn test_add_at_expands_path() {
        let mut builder = Builder::new();
        builder.add_at("a.b.c", json!({"e": "f"})).unwrap();
        assert_eq!(first(&builder), json!({"a": {"b": {"c": {"e": "f"}}}}));
    }

    #[test]
    fn test_add_rejects_non_objects() {
        let mut builder = Builder::new();
        let err = builder.add(1).unwrap_err();
        assert_eq!(err, Error::illegal_argument("add(1)"));
        let err = builder.add(vec![1, 2]).unwrap_err();
        assert_eq!(err.to_string(), "illegal argument: add([1, 2])");
    }

    #[test]
    fn test_add_at_rejects_bad_paths() {
        let mut builder = Builder::new();
        assert!(matches!(
            builder.add_at("", 1),
            Err(Error::IllegalArgument { .. })
        ));
        let err = builder.add_at("a..b", 1).unwrap_err();
        assert!(err.to_string().contains(r#"add_at("a..b", 1)"#));
        assert!(builder.template().keys().is_empty());
    }

    #[test]
    fn test_add_keys_are_literal() {
        let mut builder = Builder::new();
        builder.add(json!({"a.b": 1})).unwrap();
        assert_eq!(first(&builder), json!({"a.b": 1}));
    }

    #[test]
    fn test_chaining() {
        let mut builder = Builder::new();
        builder
            .add(json!({"a": 1}))
            .unwrap()
            .add_at("b", 2)
            .unwrap();
        assert_eq!(first(&builder), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_namespace_exists_from_construction() {
        let builder = Builder::with_options(Options::new().namespace("x.y"));
        assert_eq!(first(&builder), json!({"x": {"y": {}}}));
        assert_eq!(builder.namespace(), Some("x.y"));
    }

    #[test]
    fn test_inherit_does_not_take_namespace_or_limit() {
        let parent = Builder::with_options(Options::new().namespace("ns").limit(1usize));
        let child = Builder::inherit(&parent);
        assert_eq!(child.namespace(), None);
        assert_eq!(child.limit(), None);
        assert_eq!(first(&child), json!({"ns": {}}));
    }

    #[test]
    fn test_builder_limit_is_default_for_build() {
        let mut builder = Builder::with_options(Options::new().limit(2usize));
        builder.add(json!({"a": 1})).unwrap();
        assert_eq!(builder.build().count(), 2);
        let overridden = builder
            .build_with(crate::template::BuildOptions::new().limit(5usize))
            .unwrap();
        assert_eq!(overridden.count(), 5);
    }

    struct Doubling;

    impl Compiler for Doubling {
        fn compile(
            &self,
            tree: &mut Tree<crate::template::Live>,
            registry: &mut crate::template::Registry,
        ) -> Value {
            let once = SnapshotCompiler.compile(tree, registry);
            Tree::Array(vec![once.clone(), once])
        }
    }

    #[test]
    fn test_custom_compiler() {
        let mut builder = Builder::with_options(Options::new().compiler(Doubling));
        builder.add(json!({"a": 1})).unwrap();
        assert_eq!(first(&builder), json!([{"a": 1}, {"a": 1}]));
    }

    /// Records every template it is handed, for checking that the builder writes through it
    struct Journal {
        template: Template,
        replaced: Rc<RefCell<usize>>,
    }

    impl TemplateStore for Journal {
        fn current(&self) -> &Template {
            &self.template
        }

        fn current_mut(&mut self) -> &mut Template {
            &mut self.template
        }

        fn replace(&mut self, template: Template) -> Template {
            *self.replaced.borrow_mut() += 1;
            std::mem::replace(&mut self.template, template)
        }
    }

    #[test]
    fn test_custom_store() {
        let mut parent = Builder::new();
        parent.add(json!({"inherited": true})).unwrap();

        let replaced = Rc::new(RefCell::new(0));
        let store = Journal {
            template: Tree::object(),
            replaced: Rc::clone(&replaced),
        };
        let mut child = Builder::inherit_with(&parent, Options::new().store(store));
        child.add(json!({"own": 1})).unwrap();

        assert_eq!(*replaced.borrow(), 1);
        assert_eq!(first(&child), json!({"inherited": true, "own": 1}));
    }
}

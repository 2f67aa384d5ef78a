//! Output shaping for `build`
//!
//! A [`Selector`] picks which top-level keys (namespaces) of a template a sequence sees and
//! how they are arranged:
//!
//!     All                    the whole template, as is
//!     Namespace("ns")        exactly one key, its content moved to the root
//!     Options { .. }         a list of keys (all keys when empty), either kept under their
//!                            names (nest) or merged together at the root (later keys win)
//!
//! Every requested key is checked up front; unknown keys fail with
//! [`Error::UnknownNamespace`] before any sequence exists.

use super::error::Error;
use super::leaf::Template;
use super::sequence::Limit;
use super::tree::{Map, Tree};

/// Options for [`Builder::build_with`](super::Builder::build_with)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub namespaces: Vec<String>,
    pub nest: bool,
    pub limit: Option<Limit>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            namespaces: Vec::new(),
            nest: true,
            limit: None,
        }
    }
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select one more namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.push(namespace.into());
        self
    }

    /// Select several namespaces, in order
    pub fn namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces.extend(namespaces.into_iter().map(Into::into));
        self
    }

    pub fn nest(mut self, nest: bool) -> Self {
        self.nest = nest;
        self
    }

    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.limit = Some(limit.into());
        self
    }
}

/// What a `build` call sees of the template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selector {
    #[default]
    All,
    Namespace(String),
    Options(BuildOptions),
}

impl From<&str> for Selector {
    fn from(namespace: &str) -> Self {
        Selector::Namespace(namespace.to_string())
    }
}

impl From<String> for Selector {
    fn from(namespace: String) -> Self {
        Selector::Namespace(namespace)
    }
}

impl From<BuildOptions> for Selector {
    fn from(options: BuildOptions) -> Self {
        Selector::Options(options)
    }
}

/// Copy the part of `template` picked by `selector`, plus the limit the selector asks for
pub fn shape(template: &Template, selector: &Selector) -> Result<(Template, Option<Limit>), Error> {
    match selector {
        Selector::All => Ok((template.clone(), None)),
        Selector::Namespace(namespace) => {
            let node = select(template, std::slice::from_ref(namespace))?;
            Ok((node[0].clone(), None))
        }
        Selector::Options(options) => {
            let keys = if options.namespaces.is_empty() {
                template.keys()
            } else {
                options.namespaces.clone()
            };
            let nodes = select(template, &keys)?;
            let mut shaped = Map::new();
            for (key, node) in keys.iter().zip(nodes) {
                match node {
                    Tree::Object(entries) if !options.nest => {
                        for (inner_key, value) in entries {
                            shaped.insert(inner_key.clone(), value.clone());
                        }
                    }
                    _ => {
                        shaped.insert(key.clone(), node.clone());
                    }
                }
            }
            Ok((Tree::Object(shaped), options.limit))
        }
    }
}

fn select<'a>(template: &'a Template, keys: &[String]) -> Result<Vec<&'a Template>, Error> {
    let unknown: Vec<String> = keys
        .iter()
        .filter(|key| template.get(key).is_none())
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(Error::UnknownNamespace {
            unknown,
            known: template.keys(),
        });
    }
    Ok(keys.iter().filter_map(|key| template.get(key)).collect())
}

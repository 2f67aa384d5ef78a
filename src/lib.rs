//! # tidal
//!
//! Composable templates that resolve into lazy streams of JSON snapshots.
//!
//! A [`Builder`](template::Builder) owns a template tree whose leaves are static data,
//! zero-argument thunks, or generators. Building the template yields an iterator of fully
//! resolved [`Value`](template::Value) trees, one per pull, which makes it easy to script
//! evolving payloads (for example to mock a streaming data source) without writing loops.
//!
//! File Layout
//!
//! The engine is layered leaves-first:
//! src/template
//!   ├── tree        Generic Tree<L> and the walker every other stage is built on
//!   ├── value       Resolved data (Primitive leaves) and its serde glue
//!   ├── leaf        Template leaves: primitives, thunks, generators
//!   ├── path        Dot-path expansion and merge rules
//!   ├── lift        Generator instantiation, one registry per sequence
//!   ├── compile     One snapshot per pass over the lifted tree
//!   ├── store       Where a builder keeps its template
//!   ├── select      Namespace selection and nesting for build output
//!   ├── sequence    The lazy snapshot iterator and its limit policy
//!   ├── builder     The public composition API
//!   ├── directives  `$sequence`/`$range`/... leaves for template files
//!   └── loader      JSON/YAML template files
//!
//! For testing helpers, see the [testing module](template::testing).

pub mod template;

pub use template::{
    BuildOptions, Builder, Error, Generator, Leaf, Limit, Options, Primitive, Selector, Snapshots,
    Template, Thunk, Tree, Value,
};

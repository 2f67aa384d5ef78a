//! Template composition and snapshot production

pub mod builder;
pub mod compile;
pub mod directives;
pub mod error;
pub mod leaf;
pub mod lift;
pub mod loader;
pub mod path;
pub mod select;
pub mod sequence;
pub mod store;
pub mod testing;
pub mod tree;
pub mod value;

pub use builder::{Builder, Options};
pub use compile::{Compiler, SnapshotCompiler};
pub use error::Error;
pub use leaf::{Generator, Leaf, Resumable, Step, Template, Thunk};
pub use lift::{Live, Registry};
pub use select::{BuildOptions, Selector};
pub use sequence::{Limit, Snapshots};
pub use store::{OwnedStore, TemplateStore};
pub use tree::{Map, Tree};
pub use value::{Primitive, Value};

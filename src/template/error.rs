//! Errors raised while composing templates and setting up sequences
//!
//! Both variants are usage errors. They are reported before anything is mutated or any
//! sequence exists, and pulling from a sequence never produces them.

/// Template usage errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A call to `add`/`add_at` that matches neither supported form
    #[error("illegal argument: {call}")]
    IllegalArgument { call: String },

    /// `build_with` asked for top-level keys the template does not have
    #[error(
        "unknown namespace(s) [{}]; known namespaces: [{}]",
        .unknown.join(", "),
        .known.join(", ")
    )]
    UnknownNamespace {
        unknown: Vec<String>,
        known: Vec<String>,
    },
}

impl Error {
    pub(crate) fn illegal_argument(call: impl Into<String>) -> Self {
        Error::IllegalArgument { call: call.into() }
    }
}

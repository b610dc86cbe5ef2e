//! Expression evaluators used by hooks.
//!
//! Two flavours exist: the structural query works on a resource's YAML tree,
//! the projection query on its JSON form. Both receive the run-scoped
//! environment, exposed to expressions as `$ENV`.

pub mod error;
pub mod jaq;

use std::collections::BTreeMap;
use std::rc::Rc;

pub use error::QueryError;
pub use jaq::JaqEngine;

/// Run-scoped key/value context handed to every evaluation.
pub type Environment = BTreeMap<String, String>;

/// Evaluates expressions against a resource's structured-data tree.
pub trait StructuralQuery {
    fn evaluate(
        &self,
        expression: &str,
        data: &serde_yaml::Value,
        env: &Environment,
    ) -> Result<serde_yaml::Value, QueryError>;
}

/// Evaluates expressions against a resource's JSON projection.
pub trait ProjectionQuery {
    fn evaluate(
        &self,
        expression: &str,
        data: &serde_json::Value,
        env: &Environment,
    ) -> Result<serde_json::Value, QueryError>;

    /// Compiles an expression once so it can be run many times.
    fn precompile(&self, expression: &str) -> Result<Rc<dyn CompiledQuery>, QueryError>;
}

/// A precompiled projection expression.
pub trait CompiledQuery {
    fn run(
        &self,
        data: &serde_json::Value,
        env: &Environment,
    ) -> Result<serde_json::Value, QueryError>;
}

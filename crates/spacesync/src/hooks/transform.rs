//! Executable form of a hook chain.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_yaml::Value;

use super::config::Hook;
use super::error::{HookError, TransformError};
use super::patch::{apply_all, compile_fragment, MergeKind, PatchOp};
use crate::query::{CompiledQuery, Environment, ProjectionQuery, QueryError, StructuralQuery};

/// Upper bound on `yqWhile` loop iterations, whatever the condition yields.
pub const MAX_CONVERGENCE_ITERATIONS: usize = 10;

/// The structural part of one hook: merge fragments, then `yq` expressions.
#[derive(Debug, Clone)]
pub struct StructuralTransform {
    pub hook: String,
    pub origin: String,
    defaults: Vec<PatchOp>,
    overrides: Vec<PatchOp>,
    merges: Vec<PatchOp>,
    condition: Option<String>,
    expressions: Vec<String>,
}

impl StructuralTransform {
    pub fn compile(hook: &Hook) -> Result<Self, HookError> {
        let config = &hook.config;
        Ok(Self {
            hook: hook.name.clone(),
            origin: hook.origin.clone(),
            defaults: compile_fragment(&hook.name, &config.defaults, MergeKind::Defaults)?,
            overrides: compile_fragment(&hook.name, &config.overrides, MergeKind::Overrides)?,
            merges: compile_fragment(&hook.name, &config.merges, MergeKind::Merges)?,
            condition: (!config.yq_while.is_empty()).then(|| config.yq_while.clone()),
            expressions: config.yq.clone(),
        })
    }

    pub fn run(
        &self,
        mut data: Value,
        env: &Environment,
        engine: &dyn StructuralQuery,
    ) -> Result<Value, TransformError> {
        apply_all(&self.defaults, &mut data);
        apply_all(&self.overrides, &mut data);
        apply_all(&self.merges, &mut data);

        let Some(condition) = &self.condition else {
            return self.run_expressions(data, env, engine);
        };

        for iteration in 0..MAX_CONVERGENCE_ITERATIONS {
            if !condition_holds(condition, &data, env, engine) {
                log::debug!(
                    "Hook {} converged after {} iteration(s)",
                    self.hook,
                    iteration
                );
                return Ok(data);
            }
            data = self.run_expressions(data, env, engine)?;
        }

        log::debug!(
            "Hook {} stopped at the {} iteration limit",
            self.hook,
            MAX_CONVERGENCE_ITERATIONS
        );
        Ok(data)
    }

    fn run_expressions(
        &self,
        mut data: Value,
        env: &Environment,
        engine: &dyn StructuralQuery,
    ) -> Result<Value, TransformError> {
        for expression in &self.expressions {
            data = engine
                .evaluate(expression, &data, env)
                .map_err(|source| TransformError {
                    expression: expression.clone(),
                    source,
                })?;
        }
        Ok(data)
    }
}

/// Only a boolean `true` keeps the loop going; errors end it.
fn condition_holds(
    condition: &str,
    data: &Value,
    env: &Environment,
    engine: &dyn StructuralQuery,
) -> bool {
    match engine.evaluate(condition, data, env) {
        Ok(Value::Bool(holds)) => holds,
        Ok(_) => false,
        Err(e) => {
            log::debug!("yqWhile condition '{}' failed: {}", condition, e);
            false
        }
    }
}

/// One `jq` expression of a hook, optionally precompiled.
#[derive(Clone)]
pub struct ProjectionCommand {
    pub hook: String,
    pub origin: String,
    pub expression: String,
    program: Option<Rc<dyn CompiledQuery>>,
}

impl fmt::Debug for ProjectionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectionCommand")
            .field("hook", &self.hook)
            .field("expression", &self.expression)
            .field("precompiled", &self.program.is_some())
            .finish()
    }
}

impl ProjectionCommand {
    pub fn new(hook: &Hook, expression: impl Into<String>) -> Self {
        Self {
            hook: hook.name.clone(),
            origin: hook.origin.clone(),
            expression: expression.into(),
            program: None,
        }
    }

    pub fn with_program(mut self, program: Rc<dyn CompiledQuery>) -> Self {
        self.program = Some(program);
        self
    }

    pub fn is_precompiled(&self) -> bool {
        self.program.is_some()
    }

    pub fn run(
        &self,
        data: &serde_json::Value,
        env: &Environment,
        engine: &dyn ProjectionQuery,
    ) -> Result<serde_json::Value, QueryError> {
        match &self.program {
            Some(program) => program.run(data, env),
            None => engine.evaluate(&self.expression, data, env),
        }
    }
}

/// Run-owned cache of precompiled projection programs, keyed by hook name and
/// expression text.
#[derive(Default)]
pub struct ProgramCache {
    programs: HashMap<(String, String), Rc<dyn CompiledQuery>>,
}

impl ProgramCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(
        &mut self,
        hook: &str,
        expression: &str,
        engine: &dyn ProjectionQuery,
    ) -> Result<Rc<dyn CompiledQuery>, QueryError> {
        let key = (hook.to_string(), expression.to_string());
        if let Some(program) = self.programs.get(&key) {
            return Ok(Rc::clone(program));
        }

        let program = engine.precompile(expression)?;
        self.programs.insert(key, Rc::clone(&program));
        Ok(program)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

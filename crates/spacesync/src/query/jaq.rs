//! jq-dialect evaluator backed by the `jaq` crates.

use std::rc::Rc;

use jaq_interpret::{Ctx, Filter, FilterT, ParseCtx, RcIter, Val};

use super::{CompiledQuery, Environment, ProjectionQuery, QueryError, StructuralQuery};

/// Global variable through which expressions see the run environment.
const ENV_VARIABLE: &str = "ENV";

/// Evaluates jq expressions with the jaq standard library loaded.
///
/// The structural flavour runs the same dialect over YAML data by converting
/// the tree to JSON and back. Only the first output of an expression is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaqEngine;

impl JaqEngine {
    pub fn new() -> Self {
        Self
    }
}

impl StructuralQuery for JaqEngine {
    fn evaluate(
        &self,
        expression: &str,
        data: &serde_yaml::Value,
        env: &Environment,
    ) -> Result<serde_yaml::Value, QueryError> {
        let json =
            serde_json::to_value(data).map_err(|e| QueryError::Conversion(e.to_string()))?;
        let filter = compile(expression)?;
        let result = run_filter(&filter, json, env)?;
        serde_yaml::to_value(result).map_err(|e| QueryError::Conversion(e.to_string()))
    }
}

impl ProjectionQuery for JaqEngine {
    fn evaluate(
        &self,
        expression: &str,
        data: &serde_json::Value,
        env: &Environment,
    ) -> Result<serde_json::Value, QueryError> {
        let filter = compile(expression)?;
        run_filter(&filter, data.clone(), env)
    }

    fn precompile(&self, expression: &str) -> Result<Rc<dyn CompiledQuery>, QueryError> {
        Ok(Rc::new(JaqProgram {
            filter: compile(expression)?,
        }))
    }
}

struct JaqProgram {
    filter: Filter,
}

impl CompiledQuery for JaqProgram {
    fn run(
        &self,
        data: &serde_json::Value,
        env: &Environment,
    ) -> Result<serde_json::Value, QueryError> {
        run_filter(&self.filter, data.clone(), env)
    }
}

fn compile(expression: &str) -> Result<Filter, QueryError> {
    let mut defs = ParseCtx::new(vec![ENV_VARIABLE.to_string()]);
    defs.insert_natives(jaq_core::core());
    defs.insert_defs(jaq_std::std());

    let (main, errs) = jaq_parse::parse(expression, jaq_parse::main());
    if !errs.is_empty() {
        let message = errs
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(QueryError::Parse(message));
    }
    let main = main.ok_or_else(|| QueryError::Parse(format!("empty expression '{}'", expression)))?;

    let filter = defs.compile(main);
    if !defs.errs.is_empty() {
        let message = defs
            .errs
            .iter()
            .map(|(err, span)| match expression.get(span.clone()) {
                Some(reference) => format!("{} '{}'", err, reference),
                None => err.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        return Err(QueryError::Parse(message));
    }

    Ok(filter)
}

fn run_filter(
    filter: &Filter,
    data: serde_json::Value,
    env: &Environment,
) -> Result<serde_json::Value, QueryError> {
    let env_object: serde_json::Map<String, serde_json::Value> = env
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect();

    let inputs = RcIter::new(core::iter::empty());
    let ctx = Ctx::new([Val::from(serde_json::Value::Object(env_object))], &inputs);
    let first = filter.run((ctx, Val::from(data))).next();

    match first {
        Some(Ok(val)) => Ok(serde_json::Value::from(val)),
        Some(Err(e)) => Err(QueryError::Runtime(e.to_string())),
        None => Err(QueryError::NoOutput),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env_with(key: &str, value: &str) -> Environment {
        let mut env = Environment::new();
        env.insert(key.to_string(), value.to_string());
        env
    }

    #[test]
    fn test_projection_update() {
        let engine = JaqEngine::new();
        let data = json!({"title": "intro", "count": 1});

        let out = ProjectionQuery::evaluate(&engine, ".count += 1", &data, &Environment::new())
            .unwrap();
        assert_eq!(out, json!({"title": "intro", "count": 2}));
    }

    #[test]
    fn test_projection_uses_std_library() {
        let engine = JaqEngine::new();
        let data = json!({"tags": ["b", "a"]});

        let out = ProjectionQuery::evaluate(&engine, ".tags |= sort", &data, &Environment::new())
            .unwrap();
        assert_eq!(out, json!({"tags": ["a", "b"]}));
    }

    #[test]
    fn test_structural_roundtrips_yaml() {
        let engine = JaqEngine::new();
        let data: serde_yaml::Value = serde_yaml::from_str("kind: page\ntitle: Intro\n").unwrap();

        let out =
            StructuralQuery::evaluate(&engine, ".owner = \"docs\"", &data, &Environment::new())
                .unwrap();
        let expected: serde_yaml::Value =
            serde_yaml::from_str("kind: page\ntitle: Intro\nowner: docs\n").unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_structural_keeps_key_order() {
        let engine = JaqEngine::new();
        let data: serde_yaml::Value = serde_yaml::from_str("title: Intro\nkind: page\n").unwrap();

        let out =
            StructuralQuery::evaluate(&engine, ".owner = \"docs\"", &data, &Environment::new())
                .unwrap();
        assert_eq!(
            serde_yaml::to_string(&out).unwrap(),
            "title: Intro\nkind: page\nowner: docs\n"
        );
    }

    #[test]
    fn test_projection_keeps_key_order() {
        let engine = JaqEngine::new();
        let data: serde_json::Value =
            serde_json::from_str(r#"{"title":"Intro","kind":"page","count":1}"#).unwrap();

        let out = ProjectionQuery::evaluate(&engine, ".count += 1", &data, &Environment::new())
            .unwrap();
        assert_eq!(
            serde_json::to_string(&out).unwrap(),
            r#"{"title":"Intro","kind":"page","count":2}"#
        );
    }

    #[test]
    fn test_env_is_visible() {
        let engine = JaqEngine::new();
        let env = env_with("FILES", " - a.yml");

        let out = ProjectionQuery::evaluate(&engine, ".files = $ENV.FILES", &json!({}), &env)
            .unwrap();
        assert_eq!(out, json!({"files": " - a.yml"}));
    }

    #[test]
    fn test_parse_error() {
        let engine = JaqEngine::new();
        let result = ProjectionQuery::evaluate(&engine, ".a |= (", &json!({}), &Environment::new());
        assert!(matches!(result, Err(QueryError::Parse(_))));
    }

    #[test]
    fn test_undefined_filter_is_parse_error() {
        let engine = JaqEngine::new();
        let result = ProjectionQuery::evaluate(
            &engine,
            ".a = no_such_filter | .b = $missing",
            &json!({}),
            &Environment::new(),
        );
        match result {
            Err(QueryError::Parse(message)) => {
                assert!(message.contains("undefined filter"), "{}", message);
                assert!(message.contains("no_such_filter"), "{}", message);
                assert!(message.contains("undefined variable"), "{}", message);
                assert!(message.contains("missing"), "{}", message);
            }
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_runtime_error() {
        let engine = JaqEngine::new();
        let result = ProjectionQuery::evaluate(&engine, ".a + 1", &json!({"a": "text"}), &Environment::new());
        assert!(matches!(result, Err(QueryError::Runtime(_))));
    }

    #[test]
    fn test_empty_output() {
        let engine = JaqEngine::new();
        let result = ProjectionQuery::evaluate(&engine, "empty", &json!({}), &Environment::new());
        assert_eq!(result, Err(QueryError::NoOutput));
    }

    #[test]
    fn test_precompiled_program_is_reusable() {
        let engine = JaqEngine::new();
        let program = engine.precompile(".n *= 2").unwrap();

        let once = program.run(&json!({"n": 2}), &Environment::new()).unwrap();
        let twice = program.run(&once, &Environment::new()).unwrap();
        assert_eq!(twice, json!({"n": 8}));
    }
}

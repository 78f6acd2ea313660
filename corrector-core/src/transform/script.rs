//! Sandboxed expression evaluation for custom transforms.
//!
//! Scripts are evaluated in rhai's expression-only mode: no statements, no
//! loops, no function definitions, no imports. The transform input is bound
//! as `input`. Operation count, nesting depth and collection sizes are capped.

use rhai::{Dynamic, Engine, Scope};
use serde_json::Value as JsonValue;

const DEFAULT_MAX_OPERATIONS: u64 = 50_000;
const DEFAULT_MAX_EXPR_DEPTH: usize = 64;
const DEFAULT_MAX_STRING_SIZE: usize = 65_536;
const DEFAULT_MAX_ARRAY_SIZE: usize = 10_000;
const DEFAULT_MAX_MAP_SIZE: usize = 10_000;

/// Name the transform input is bound to inside scripts.
pub const INPUT_VAR: &str = "input";

#[derive(Debug, Clone)]
pub struct ScriptLimits {
    pub max_operations: u64,
    pub max_expr_depth: usize,
    pub max_string_size: usize,
    pub max_array_size: usize,
    pub max_map_size: usize,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self {
            max_operations: DEFAULT_MAX_OPERATIONS,
            max_expr_depth: DEFAULT_MAX_EXPR_DEPTH,
            max_string_size: DEFAULT_MAX_STRING_SIZE,
            max_array_size: DEFAULT_MAX_ARRAY_SIZE,
            max_map_size: DEFAULT_MAX_MAP_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("script does not compile: {0}")]
    Compile(String),
    #[error("script failed: {0}")]
    Runtime(String),
    #[error("script value conversion failed: {0}")]
    Conversion(String),
}

pub struct ScriptSandbox {
    engine: Engine,
}

impl Default for ScriptSandbox {
    fn default() -> Self {
        Self::new(ScriptLimits::default())
    }
}

impl ScriptSandbox {
    pub fn new(limits: ScriptLimits) -> Self {
        let mut engine = Engine::new();
        engine.set_max_operations(limits.max_operations);
        engine.set_max_expr_depths(limits.max_expr_depth, limits.max_expr_depth);
        engine.set_max_string_size(limits.max_string_size);
        engine.set_max_array_size(limits.max_array_size);
        engine.set_max_map_size(limits.max_map_size);
        engine.set_strict_variables(true);
        engine.disable_symbol("eval");

        engine.on_print(|msg| tracing::debug!(script_log = %msg, "custom transform print"));
        engine.on_debug(|msg, _src, _pos| {
            tracing::debug!(script_log = %msg, "custom transform debug")
        });

        Self { engine }
    }

    /// Syntax check only; `input` is declared so strict variables accept it.
    pub fn check(&self, script: &str) -> Result<(), ScriptError> {
        let mut scope = Scope::new();
        scope.push_dynamic(INPUT_VAR, Dynamic::UNIT);
        self.engine
            .compile_expression_with_scope(&scope, script)
            .map(|_| ())
            .map_err(|e| ScriptError::Compile(e.to_string()))
    }

    pub fn eval(&self, script: &str, input: &JsonValue) -> Result<JsonValue, ScriptError> {
        let bound = rhai::serde::to_dynamic(input)
            .map_err(|e| ScriptError::Conversion(e.to_string()))?;
        let mut scope = Scope::new();
        scope.push_dynamic(INPUT_VAR, bound);

        let ast = self
            .engine
            .compile_expression_with_scope(&scope, script)
            .map_err(|e| ScriptError::Compile(e.to_string()))?;
        let out: Dynamic = self
            .engine
            .eval_ast_with_scope(&mut scope, &ast)
            .map_err(|e| ScriptError::Runtime(e.to_string()))?;

        if out.is_unit() {
            return Ok(JsonValue::Null);
        }
        rhai::serde::from_dynamic::<JsonValue>(&out).map_err(|e| ScriptError::Conversion(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn evaluates_field_access_and_arithmetic() {
        let sb = ScriptSandbox::default();
        let out = sb.eval("input.price * input.qty", &json!({"price": 2, "qty": 3})).unwrap();
        assert_eq!(out, json!(6));
    }

    #[test]
    fn builds_objects() {
        let sb = ScriptSandbox::default();
        let out = sb
            .eval(r#"#{ name: input.first + " " + input.last }"#, &json!({"first": "Ada", "last": "Lovelace"}))
            .unwrap();
        assert_eq!(out, json!({"name": "Ada Lovelace"}));
    }

    #[test]
    fn rejects_statements() {
        let sb = ScriptSandbox::default();
        assert!(matches!(sb.check("let x = 1; x"), Err(ScriptError::Compile(_))));
        assert!(matches!(sb.check("while true {}"), Err(ScriptError::Compile(_))));
    }

    #[test]
    fn unknown_variables_fail() {
        let sb = ScriptSandbox::default();
        assert!(sb.eval("secret + 1", &json!({})).is_err());
    }

    #[test]
    fn runtime_errors_are_reported() {
        let sb = ScriptSandbox::default();
        let err = sb.eval("input.missing.deeper", &json!({})).unwrap_err();
        assert!(matches!(err, ScriptError::Runtime(_)));
    }
}

use serde_json::Value as JsonValue;

use crate::path::{self, is_truthy};
use crate::types::Condition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
}

/// A condition parsed into `path [op literal]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCondition {
    path: String,
    cmp: Option<(CmpOp, JsonValue)>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    #[error("condition must not be empty")]
    Empty,
    #[error("condition must start with a path expression: {0}")]
    MissingPath(String),
}

pub fn parse_condition(c: &Condition) -> Result<ParsedCondition, ConditionError> {
    match c {
        Condition::Match { path, equals } => {
            if path.trim().is_empty() {
                return Err(ConditionError::Empty);
            }
            Ok(ParsedCondition {
                path: path.trim().to_string(),
                cmp: equals.clone().map(|v| (CmpOp::Eq, v)),
            })
        }
        Condition::Expr(expr) => parse_expr(expr),
    }
}

fn parse_expr(expr: &str) -> Result<ParsedCondition, ConditionError> {
    let cond = expr.trim();
    if cond.is_empty() {
        return Err(ConditionError::Empty);
    }

    if let Some((at, op)) = find_operator(cond) {
        let lhs = cond[..at].trim();
        if lhs.is_empty() {
            return Err(ConditionError::MissingPath(cond.to_string()));
        }
        // `===` and `!==` leave a trailing `=` that parse_literal drops.
        return Ok(ParsedCondition {
            path: lhs.to_string(),
            cmp: Some((op, parse_literal(cond[at + 2..].trim()))),
        });
    }

    Ok(ParsedCondition {
        path: cond.to_string(),
        cmp: None,
    })
}

/// Byte offset of the first `==` or `!=` outside a quoted literal.
fn find_operator(cond: &str) -> Option<(usize, CmpOp)> {
    let mut quote: Option<char> = None;
    for (i, c) in cond.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if cond[i..].starts_with("!=") => return Some((i, CmpOp::Ne)),
            None if cond[i..].starts_with("==") => return Some((i, CmpOp::Eq)),
            None => {}
        }
    }
    None
}

fn parse_literal(s: &str) -> JsonValue {
    let s = s.trim_start_matches('=').trim();
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        return JsonValue::String(s[1..s.len() - 1].to_string());
    }
    match s {
        "true" => return JsonValue::Bool(true),
        "false" => return JsonValue::Bool(false),
        "null" => return JsonValue::Null,
        _ => {}
    }
    if let Ok(v) = serde_json::from_str::<JsonValue>(s) {
        return v;
    }
    JsonValue::String(s.to_string())
}

impl ParsedCondition {
    pub fn evaluate(&self, source: &JsonValue) -> bool {
        let actual = path::get(source, &self.path);
        match &self.cmp {
            None => is_truthy(actual.as_ref()),
            Some((op, expected)) => {
                let eq = actual
                    .as_ref()
                    .map(|a| json_eq(a, expected))
                    .unwrap_or(false);
                match op {
                    CmpOp::Eq => eq,
                    CmpOp::Ne => !eq,
                }
            }
        }
    }
}

fn json_eq(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Number(a), JsonValue::Number(b)) => a.as_f64() == b.as_f64(),
        (JsonValue::Array(a), JsonValue::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| json_eq(x, y))
        }
        (JsonValue::Object(a), JsonValue::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(k, v)| b.get(k).map(|bv| json_eq(v, bv)).unwrap_or(false))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(c: &str, src: JsonValue) -> bool {
        parse_condition(&Condition::Expr(c.to_string()))
            .unwrap()
            .evaluate(&src)
    }

    #[test]
    fn equality_with_literals() {
        assert!(eval("$.status == 'active'", json!({"status": "active"})));
        assert!(eval("$.status == \"active\"", json!({"status": "active"})));
        assert!(eval("$.count == 3", json!({"count": 3.0})));
        assert!(eval("$.flag == true", json!({"flag": true})));
        assert!(!eval("$.status == 'active'", json!({})));
    }

    #[test]
    fn inequality() {
        assert!(eval("$.status != 'closed'", json!({"status": "open"})));
        assert!(eval("$.status != 'closed'", json!({})));
        assert!(!eval("$.status != 'closed'", json!({"status": "closed"})));
    }

    #[test]
    fn operators_inside_literals_are_not_split_on() {
        assert!(eval("$.a == 'x!=y'", json!({"a": "x!=y"})));
        assert!(!eval("$.a == 'x!=y'", json!({"a": "x"})));
        assert!(eval("$.a != \"p==q\"", json!({"a": "p"})));
        assert!(eval("$['k==v'] == 1", json!({"k==v": 1})));
        assert!(eval("$.a === 'b'", json!({"a": "b"})));
        assert!(!eval("$.a !== 'b'", json!({"a": "b"})));
    }

    #[test]
    fn truthy_form() {
        assert!(eval("$.isVip", json!({"isVip": true})));
        assert!(!eval("$.isVip", json!({"isVip": 0})));
        assert!(!eval("$.isVip", json!({})));
    }

    #[test]
    fn structured_form() {
        let c = Condition::Match {
            path: "$.kind".into(),
            equals: Some(json!("a")),
        };
        assert!(parse_condition(&c).unwrap().evaluate(&json!({"kind": "a"})));
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(
            parse_condition(&Condition::Expr("  ".into())),
            Err(ConditionError::Empty)
        );
        assert!(parse_condition(&Condition::Expr("== 3".into())).is_err());
    }
}

use serde_json::{Number, Value as JsonValue};

use crate::path::is_truthy;

/// Scalar transforms available to every mapping by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Round2,
    Uppercase,
    Lowercase,
    ToNumber,
    ToString,
    Trim,
    ToBoolean,
}

impl Builtin {
    /// Matches case-insensitively, ignoring `_` and `-`.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "round2" | "round" | "roundtwodecimals" => Some(Builtin::Round2),
            "uppercase" | "upper" | "touppercase" => Some(Builtin::Uppercase),
            "lowercase" | "lower" | "tolowercase" => Some(Builtin::Lowercase),
            "tonumber" | "number" => Some(Builtin::ToNumber),
            "tostring" | "string" => Some(Builtin::ToString),
            "trim" => Some(Builtin::Trim),
            "toboolean" | "boolean" | "tobool" => Some(Builtin::ToBoolean),
            _ => None,
        }
    }

    pub fn apply(self, value: JsonValue) -> Result<JsonValue, String> {
        match self {
            Builtin::Round2 => {
                let n = as_number(&value).ok_or_else(|| cannot("round2", &value))?;
                float_value((n * 100.0).round() / 100.0)
            }
            Builtin::Uppercase => text(&value)
                .map(|s| JsonValue::String(s.to_uppercase()))
                .ok_or_else(|| cannot("uppercase", &value)),
            Builtin::Lowercase => text(&value)
                .map(|s| JsonValue::String(s.to_lowercase()))
                .ok_or_else(|| cannot("lowercase", &value)),
            Builtin::ToNumber => to_number(&value).ok_or_else(|| cannot("toNumber", &value)),
            Builtin::ToString => Ok(JsonValue::String(match value {
                JsonValue::String(s) => s,
                other => other.to_string(),
            })),
            Builtin::Trim => Ok(match value {
                JsonValue::String(s) => JsonValue::String(s.trim().to_string()),
                other => other,
            }),
            Builtin::ToBoolean => Ok(JsonValue::Bool(is_truthy(Some(&value)))),
        }
    }
}

fn cannot(name: &str, value: &JsonValue) -> String {
    format!("{name} cannot be applied to {value}")
}

fn text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn to_number(value: &JsonValue) -> Option<JsonValue> {
    match value {
        JsonValue::Number(_) => Some(value.clone()),
        JsonValue::Bool(b) => Some(JsonValue::from(u8::from(*b))),
        JsonValue::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Some(JsonValue::from(i));
            }
            s.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(JsonValue::Number)
        }
        _ => None,
    }
}

fn float_value(f: f64) -> Result<JsonValue, String> {
    Number::from_f64(f)
        .map(JsonValue::Number)
        .ok_or_else(|| format!("{f} is not representable as JSON"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_aliases() {
        assert_eq!(Builtin::from_name("round2"), Some(Builtin::Round2));
        assert_eq!(Builtin::from_name("TO_NUMBER"), Some(Builtin::ToNumber));
        assert_eq!(Builtin::from_name("to-string"), Some(Builtin::ToString));
        assert_eq!(Builtin::from_name("reverse"), None);
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(Builtin::Round2.apply(json!(3.14159)).unwrap(), json!(3.14));
        assert_eq!(Builtin::Round2.apply(json!("2.005e1")).unwrap(), json!(20.05));
        assert!(Builtin::Round2.apply(json!({"a": 1})).is_err());
    }

    #[test]
    fn converts_numbers_and_strings() {
        assert_eq!(Builtin::ToNumber.apply(json!(" 42 ")).unwrap(), json!(42));
        assert_eq!(Builtin::ToNumber.apply(json!("1.5")).unwrap(), json!(1.5));
        assert!(Builtin::ToNumber.apply(json!("abc")).is_err());
        assert_eq!(Builtin::ToString.apply(json!(12)).unwrap(), json!("12"));
        assert_eq!(Builtin::Uppercase.apply(json!("ada")).unwrap(), json!("ADA"));
        assert_eq!(Builtin::Lowercase.apply(json!("ADA")).unwrap(), json!("ada"));
        assert_eq!(Builtin::ToBoolean.apply(json!("")).unwrap(), json!(false));
    }
}

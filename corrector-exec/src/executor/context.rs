use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use corrector_core::{path, HttpMethod, PathError};

use crate::executor::CallOverrides;

/// Per-`execute` state. Owned by one call and dropped with it.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub execution_id: Uuid,
    pub operation: Option<String>,
    pub method: Option<HttpMethod>,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    /// Workflow scratchpad, seeded from the payload.
    pub bag: JsonValue,
}

impl ExecutionContext {
    pub fn new(overrides: &CallOverrides, payload: &JsonValue) -> Self {
        let bag = match payload {
            JsonValue::Object(_) => payload.clone(),
            JsonValue::Null => JsonValue::Object(Map::new()),
            other => {
                let mut m = Map::new();
                m.insert("payload".to_string(), other.clone());
                JsonValue::Object(m)
            }
        };
        Self {
            execution_id: Uuid::new_v4(),
            operation: overrides.operation.clone(),
            method: overrides.method,
            query: overrides.query.clone(),
            headers: overrides.headers.clone(),
            bag,
        }
    }

    /// Make a step result visible to later steps under `key`.
    pub fn publish(&mut self, key: &str, value: JsonValue) -> Result<(), PathError> {
        path::set(&mut self.bag, key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bag_is_seeded_and_extended() {
        let mut ctx = ExecutionContext::new(&CallOverrides::default(), &json!({"a": 1}));
        ctx.publish("userInfo", json!({"id": 7})).unwrap();
        assert_eq!(ctx.bag, json!({"a": 1, "userInfo": {"id": 7}}));
    }

    #[test]
    fn scalar_payload_is_wrapped() {
        let ctx = ExecutionContext::new(&CallOverrides::default(), &json!(5));
        assert_eq!(ctx.bag, json!({"payload": 5}));
    }
}

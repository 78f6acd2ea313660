use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use corrector_core::{path, HttpMethod};

use crate::http::HttpRequestParts;

/// An outbound request before serialization. Auth providers mutate its
/// headers and query.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDraft {
    pub method: HttpMethod,
    /// Placeholders already substituted, no query string.
    pub url: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<JsonValue>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RequestError {
    #[error("invalid target url {url:?}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("failed to serialize request body: {0}")]
    Body(String),
}

impl RequestDraft {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Replace any existing header with the same name, ignoring case.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn build(&self) -> Result<HttpRequestParts, RequestError> {
        let mut url = url::Url::parse(&self.url).map_err(|e| RequestError::InvalidUrl {
            url: self.url.clone(),
            message: e.to_string(),
        })?;
        if !self.query.is_empty() {
            let mut qp = url.query_pairs_mut();
            for (k, v) in &self.query {
                qp.append_pair(k, v);
            }
        }

        let mut headers = self.headers.clone();
        let body = match &self.body {
            Some(v) if self.method.allows_body() => {
                if self.header("content-type").is_none() {
                    headers.insert("Content-Type".to_string(), "application/json".to_string());
                }
                serde_json::to_vec(v).map_err(|e| RequestError::Body(e.to_string()))?
            }
            _ => Vec::new(),
        };

        Ok(HttpRequestParts {
            method: self.method,
            url,
            headers,
            body,
        })
    }
}

/// Resolve parameter bindings against the payload. String values starting
/// with `$` are path expressions; unresolved or null ones are omitted.
pub fn resolve_params(
    bindings: &BTreeMap<String, JsonValue>,
    payload: &JsonValue,
) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (name, binding) in bindings {
        let value = match binding {
            JsonValue::String(s) if s.trim_start().starts_with('$') => {
                match path::get(payload, s) {
                    Some(v) => v,
                    None => {
                        tracing::debug!(param = %name, path = %s, "parameter unresolved, omitting");
                        continue;
                    }
                }
            }
            other => other.clone(),
        };
        if let Some(s) = value_to_string(&value) {
            out.insert(name.clone(), s);
        }
    }
    out
}

pub fn fill_placeholders(template: &str, params: &BTreeMap<String, String>) -> String {
    let mut url = template.to_string();
    for (k, v) in params {
        url = url.replace(&format!("{{{k}}}"), &urlencoding::encode(v));
    }
    url
}

fn value_to_string(v: &JsonValue) -> Option<String> {
    match v {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use corrector_core::{AuthConfig, AuthType, MappingConfig};
use corrector_exec::audit::{StoreAuditSink, REDACTED};
use corrector_exec::http::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts};
use corrector_exec::{
    AuthOverridePolicy, CallRequest, Corrector, Envelope, ErrorType, Executor, ExecutorConfig,
};
use corrector_store::{MemoryAuditStore, MemoryMappingStore};
use serde_json::{json, Value as JsonValue};

struct ScriptedHttp {
    status: u16,
    body: JsonValue,
    seen: Mutex<Vec<HttpRequestParts>>,
}

impl ScriptedHttp {
    fn new(status: u16, body: JsonValue) -> Arc<Self> {
        Arc::new(Self {
            status,
            body,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    fn last(&self) -> HttpRequestParts {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn send(
        &self,
        req: HttpRequestParts,
        _timeout: Duration,
        _max_response_bytes: usize,
    ) -> Result<HttpResponseParts, HttpError> {
        self.seen.lock().unwrap().push(req);
        Ok(HttpResponseParts {
            status: self.status,
            headers: BTreeMap::new(),
            body: serde_json::to_vec(&self.body).unwrap(),
        })
    }
}

struct Harness {
    corrector: Corrector,
    http: Arc<ScriptedHttp>,
    audit: Arc<MemoryAuditStore>,
}

fn harness(mappings: Vec<(&str, JsonValue)>, http: Arc<ScriptedHttp>, policy: AuthOverridePolicy) -> Harness {
    let store = MemoryMappingStore::new();
    for (key, doc) in mappings {
        let m: MappingConfig = serde_json::from_value(doc).unwrap();
        store.insert(key, m);
    }
    let config = ExecutorConfig {
        auth_override_policy: policy,
        ..Default::default()
    };
    let executor = Arc::new(Executor::new(http.clone(), config));
    let audit = Arc::new(MemoryAuditStore::new());
    let corrector = Corrector::new(Arc::new(store), executor)
        .with_audit_sink(Arc::new(StoreAuditSink::new(audit.clone())));
    Harness {
        corrector,
        http,
        audit,
    }
}

fn keyed_mapping() -> JsonValue {
    json!({
        "id": "keyed",
        "targetApi": {"url": "https://api.example/items", "method": "GET"},
        "authConfig": {"authType": "API_KEY", "config": {"keyName": "X-Key", "keyValue": "secret"}}
    })
}

#[tokio::test]
async fn success_envelope_and_audit_record() {
    let h = harness(
        vec![("keyed", keyed_mapping())],
        ScriptedHttp::new(200, json!({"items": []})),
        AuthOverridePolicy::default(),
    );
    let request = CallRequest {
        operation: Some("list".into()),
        ..Default::default()
    };

    let env = h.corrector.handle("keyed", json!({"q": 1}), request).await;
    assert_eq!(env, Envelope::ok(200, json!({"items": []})));
    assert_eq!(
        h.http.last().headers.get("X-Key").map(String::as_str),
        Some("secret")
    );

    let records = h.audit.records();
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert!(r.success);
    assert_eq!(r.mapping_key, "keyed");
    assert_eq!(r.operation.as_deref(), Some("list"));
    assert_eq!(r.payload, json!({"q": 1}));
    assert_eq!(r.result, Some(json!({"items": []})));
    assert_eq!(r.headers.get("X-Key").map(String::as_str), Some(REDACTED));
}

#[tokio::test]
async fn unknown_mapping_is_not_found() {
    let h = harness(vec![], ScriptedHttp::new(200, json!({})), AuthOverridePolicy::default());
    let env = h.corrector.handle("missing", json!({}), CallRequest::default()).await;
    assert!(!env.success);
    assert_eq!(env.status_code, 404);
    assert_eq!(env.error_type, Some(ErrorType::FrameworkError));
    assert_eq!(h.http.count(), 0);
    assert_eq!(h.audit.records().len(), 1);
}

#[tokio::test]
async fn mapping_without_target_is_not_found() {
    let h = harness(
        vec![("empty", json!({"id": "empty"}))],
        ScriptedHttp::new(200, json!({})),
        AuthOverridePolicy::default(),
    );
    let env = h.corrector.handle("empty", json!({}), CallRequest::default()).await;
    assert_eq!(env.status_code, 404);
}

#[tokio::test]
async fn mismatched_override_is_rejected() {
    let h = harness(
        vec![("keyed", keyed_mapping())],
        ScriptedHttp::new(200, json!({})),
        AuthOverridePolicy::default(),
    );
    let request = CallRequest {
        auth_override: Some(AuthConfig::new(AuthType::BearerToken).with("token", "t")),
        ..Default::default()
    };
    let env = h.corrector.handle("keyed", json!({}), request).await;
    assert_eq!(env.error_type, Some(ErrorType::AuthMismatch));
    assert_eq!(env.status_code, 400);
    assert_eq!(h.http.count(), 0);
}

#[tokio::test]
async fn matching_override_replaces_credentials() {
    let h = harness(
        vec![("keyed", keyed_mapping())],
        ScriptedHttp::new(200, json!({})),
        AuthOverridePolicy::default(),
    );
    let request = CallRequest {
        auth_override: Some(
            AuthConfig::new(AuthType::ApiKey)
                .with("keyName", "X-Other")
                .with("keyValue", "v2"),
        ),
        ..Default::default()
    };
    let env = h.corrector.handle("keyed", json!({}), request).await;
    assert!(env.success);
    let sent = h.http.last();
    assert_eq!(sent.headers.get("X-Other").map(String::as_str), Some("v2"));
    assert!(!sent.headers.contains_key("X-Key"));
    assert_eq!(
        h.audit.records()[0].headers.get("X-Other").map(String::as_str),
        Some(REDACTED)
    );
}

#[tokio::test]
async fn override_over_none_follows_policy() {
    let open = json!({"id": "open", "targetApi": {"url": "https://api.example/o", "method": "GET"}});
    let request = CallRequest {
        auth_override: Some(AuthConfig::new(AuthType::BearerToken).with("token", "t")),
        ..Default::default()
    };

    let lenient = harness(
        vec![("open", open.clone())],
        ScriptedHttp::new(200, json!({})),
        AuthOverridePolicy::AllowOverNone,
    );
    let env = lenient.corrector.handle("open", json!({}), request.clone()).await;
    assert!(env.success);
    assert_eq!(
        lenient.http.last().headers.get("Authorization").map(String::as_str),
        Some("Bearer t")
    );

    let strict = harness(
        vec![("open", open)],
        ScriptedHttp::new(200, json!({})),
        AuthOverridePolicy::Strict,
    );
    let env = strict.corrector.handle("open", json!({}), request).await;
    assert_eq!(env.error_type, Some(ErrorType::AuthMismatch));
}

#[tokio::test]
async fn invalid_auth_config_is_reported() {
    let h = harness(
        vec![(
            "basic",
            json!({
                "id": "basic",
                "targetApi": {"url": "https://api.example/b", "method": "GET"},
                "authConfig": {"authType": "BASIC", "config": {"username": "a"}}
            }),
        )],
        ScriptedHttp::new(200, json!({})),
        AuthOverridePolicy::default(),
    );
    let env = h.corrector.handle("basic", json!({}), CallRequest::default()).await;
    assert_eq!(env.error_type, Some(ErrorType::AuthValidationFailed));
    assert_eq!(env.status_code, 400);
    assert!(env.message.unwrap().contains("password"));
}

#[tokio::test]
async fn remote_failure_keeps_target_response() {
    let h = harness(
        vec![("keyed", keyed_mapping())],
        ScriptedHttp::new(422, json!({"field": "sku", "problem": "unknown"})),
        AuthOverridePolicy::default(),
    );
    let env = h.corrector.handle("keyed", json!({}), CallRequest::default()).await;
    assert_eq!(env.error_type, Some(ErrorType::TargetApiError));
    assert_eq!(env.status_code, 422);
    assert_eq!(
        env.target_response,
        Some(json!({"field": "sku", "problem": "unknown"}))
    );

    let r = &h.audit.records()[0];
    assert!(!r.success);
    assert_eq!(r.status_code, 422);
    assert_eq!(r.error.as_ref().unwrap()["errorType"], "TARGET_API_ERROR");
}

#[tokio::test]
async fn invalid_key_is_rejected_by_fs_store() {
    let dir = std::env::temp_dir();
    let store = corrector_store::FsMappingStore::new(dir);
    let executor = Arc::new(Executor::new(
        ScriptedHttp::new(200, json!({})),
        ExecutorConfig::default(),
    ));
    let corrector = Corrector::new(Arc::new(store), executor);
    let env = corrector.handle("../etc/passwd", json!({}), CallRequest::default()).await;
    assert_eq!(env.status_code, 400);
    assert_eq!(env.error_type, Some(ErrorType::FrameworkError));
}

#[tokio::test]
async fn step_credentials_are_redacted_in_audit() {
    let workflow = json!({
        "id": "flow",
        "steps": [{
            "name": "fetch",
            "targetApi": {"url": "https://api.example/items", "method": "GET"},
            "authConfig": {"authType": "API_KEY", "config": {
                "keyName": "X-Tenant-Key", "keyValue": "topsecret"
            }}
        }]
    });
    let h = harness(
        vec![("flow", workflow)],
        ScriptedHttp::new(200, json!({"items": []})),
        AuthOverridePolicy::default(),
    );

    let env = h.corrector.handle("flow", json!({}), CallRequest::default()).await;
    assert!(env.success);
    assert_eq!(
        h.http.last().headers.get("X-Tenant-Key").map(String::as_str),
        Some("topsecret")
    );

    let records = h.audit.records();
    assert_eq!(
        records[0].headers.get("X-Tenant-Key").map(String::as_str),
        Some(REDACTED)
    );
}

use std::sync::Arc;

use corrector_exec::audit::{AuditSink, CompositeAuditSink, StoreAuditSink, TracingAuditSink};
use corrector_exec::http::ReqwestHttpClient;
use corrector_exec::{CallRequest, Corrector, Executor};
use corrector_store::{FsMappingStore, JsonlAuditStore};

use crate::cmd::config::{
    build_executor_config, load_auth_override, load_payload, merge_set_fields, parse_pairs,
};
use crate::exit_codes;
use crate::output::{print_error, print_result};
use crate::{CallArgs, EngineArgs, MappingsArgs, OutputArgs};

pub async fn execute_cmd(
    key: &str,
    mappings: MappingsArgs,
    call: CallArgs,
    engine: EngineArgs,
    output: OutputArgs,
) -> i32 {
    let (payload, request) = match prepare(&call) {
        Ok(v) => v,
        Err(msg) => {
            print_error(output.format, output.quiet, &msg);
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let http = match ReqwestHttpClient::new() {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let executor = Executor::new(Arc::new(http), build_executor_config(&engine));

    let mut sinks = CompositeAuditSink::new();
    sinks.add(Arc::new(TracingAuditSink));
    if let Some(path) = &engine.audit_log {
        let store = Arc::new(JsonlAuditStore::new(path.clone()));
        sinks.add(Arc::new(StoreAuditSink::new(store)));
    }
    let sink: Arc<dyn AuditSink> = Arc::new(sinks);

    let store = Arc::new(FsMappingStore::new(mappings.mappings));
    let corrector = Corrector::new(store, Arc::new(executor)).with_audit_sink(sink);

    let envelope = corrector.handle(key, payload, request).await;
    print_result(output.format, output.quiet, &envelope);

    if envelope.success {
        exit_codes::SUCCESS
    } else {
        exit_codes::CALL_FAILED
    }
}

fn prepare(call: &CallArgs) -> Result<(serde_json::Value, CallRequest), String> {
    let mut payload = load_payload(call.payload.as_deref())?;
    merge_set_fields(&mut payload, &call.set_fields)?;

    let request = CallRequest {
        method: call.method,
        query: parse_pairs("query", &call.query)?,
        headers: parse_pairs("header", &call.headers)?,
        operation: call.operation.clone(),
        auth_override: load_auth_override(call.auth_override.as_deref())?,
    };
    Ok((payload, request))
}

use std::sync::LazyLock;

use regex::Regex;

use crate::types::TargetApi;
use crate::validate::validator::Validator;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}/]+\}").expect("valid regex"));

pub(crate) fn validate_target_api(v: &mut Validator, path: &str, api: &TargetApi) {
    let url = api.url.trim();
    if url.is_empty() {
        v.push(format!("{path}.url"), "must not be empty");
    } else {
        let filled = PLACEHOLDER_RE.replace_all(url, "placeholder");
        if let Err(e) = url::Url::parse(&filled) {
            v.push(format!("{path}.url"), format!("must be an absolute URL ({e})"));
        }
    }

    for (name, value) in &api.headers {
        if name.trim().is_empty() {
            v.push(format!("{path}.headers"), "header names must not be empty");
        } else if value.contains('\n') || value.contains('\r') {
            v.push(format!("{path}.headers.{name}"), "must not contain line breaks");
        }
    }

    for name in api.query_params.keys() {
        if name.trim().is_empty() {
            v.push(format!("{path}.queryParams"), "parameter names must not be empty");
        }
    }

    if api.resilience.timeout_ms == Some(0) {
        v.push(format!("{path}.resilience.timeoutMs"), "must be greater than zero");
    }
}

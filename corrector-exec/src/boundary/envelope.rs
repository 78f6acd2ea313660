use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    AuthMismatch,
    AuthValidationFailed,
    FrameworkError,
    TargetApiError,
    InternalCorrectorError,
}

/// The stable response shape returned for every handled call.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub success: bool,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_response: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl Envelope {
    pub fn ok(status_code: u16, data: JsonValue) -> Self {
        Self {
            success: true,
            status_code,
            data: Some(data),
            error_type: None,
            message: None,
            target_response: None,
            details: None,
        }
    }

    pub fn failure(error_type: ErrorType, status_code: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code,
            data: None,
            error_type: Some(error_type),
            message: Some(message.into()),
            target_response: None,
            details: None,
        }
    }

    pub fn with_target_response(mut self, body: JsonValue) -> Self {
        self.target_response = Some(body);
        self
    }

    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }

    /// The part of the envelope worth keeping in an audit record.
    pub(crate) fn error_detail(&self) -> Option<JsonValue> {
        if self.success {
            return None;
        }
        let mut doc = serde_json::Map::new();
        if let Some(t) = self.error_type {
            doc.insert("errorType".into(), serde_json::to_value(t).unwrap_or(JsonValue::Null));
        }
        if let Some(m) = &self.message {
            doc.insert("message".into(), JsonValue::String(m.clone()));
        }
        if let Some(d) = &self.details {
            doc.insert("details".into(), d.clone());
        }
        if let Some(b) = &self.target_response {
            doc.insert("targetResponse".into(), b.clone());
        }
        Some(JsonValue::Object(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_camel_case_without_empty_fields() {
        let env = Envelope::failure(ErrorType::TargetApiError, 503, "down")
            .with_target_response(json!({"err": "x"}));
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({
                "success": false,
                "statusCode": 503,
                "errorType": "TARGET_API_ERROR",
                "message": "down",
                "targetResponse": {"err": "x"}
            })
        );
        let ok = Envelope::ok(200, json!({"a": 1}));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"success": true, "statusCode": 200, "data": {"a": 1}})
        );
    }
}

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum TransformSpec {
    #[serde(rename = "OBJECT", alias = "object")]
    Object(ObjectSpec),
    #[serde(rename = "ARRAY", alias = "array")]
    Array(ArraySpec),
    #[serde(rename = "CUSTOM", alias = "custom")]
    Custom(CustomSpec),
    #[serde(rename = "DIRECT", alias = "direct")]
    Direct,
}

impl TransformSpec {
    pub fn object(mappings: Vec<FieldRule>) -> Self {
        TransformSpec::Object(ObjectSpec {
            mappings,
            defaults: BTreeMap::new(),
        })
    }

    pub fn array(root: impl Into<String>, mappings: Vec<FieldRule>) -> Self {
        TransformSpec::Array(ArraySpec {
            root: Some(root.into()),
            mappings,
            output_wrapper: None,
            defaults: BTreeMap::new(),
        })
    }

    pub fn custom(script: impl Into<String>) -> Self {
        TransformSpec::Custom(CustomSpec {
            script: script.into(),
        })
    }

    /// True when applying the spec would hand the source back unchanged.
    pub fn is_passthrough(&self) -> bool {
        match self {
            TransformSpec::Direct => true,
            TransformSpec::Object(o) => o.mappings.is_empty() && o.defaults.is_empty(),
            TransformSpec::Array(_) => false,
            TransformSpec::Custom(c) => c.script.trim().is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct ObjectSpec {
    #[serde(default, alias = "fields", alias = "rules")]
    pub mappings: Vec<FieldRule>,

    /// Literals written to result paths that are still undefined after all rules.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct ArraySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    #[serde(default, alias = "fields", alias = "rules")]
    pub mappings: Vec<FieldRule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "outputWrapper")]
    pub output_wrapper: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CustomSpec {
    #[serde(alias = "body", alias = "function")]
    pub script: String,
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct FieldRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "valueIfTrue")]
    pub value_if_true: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "valueIfFalse")]
    pub value_if_false: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,

    #[serde(default)]
    pub required: bool,

    /// Built-in transform name or a key of the mapping's custom transforms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

impl FieldRule {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: JsonValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_transform(mut self, name: impl Into<String>) -> Self {
        self.transform = Some(name.into());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// Either `"$.status == 'active'"` / `"$.isVip"` or `{path, equals?}`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Expr(String),
    Match {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        equals: Option<JsonValue>,
    },
}

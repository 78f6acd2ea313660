use corrector_core::{
    parse_mapping_str, validate_mapping, DocumentFormat, HttpMethod, TransformSpec,
};

fn minimal_valid_yaml() -> &'static str {
    r#"
id: customer-sync
sourceSystem: crm
targetSystem: billing
targetApi:
  url: https://billing.example.com/customers/{customerId}
  method: post
  pathParams:
    customerId: $.id
  queryParams:
    dryRun: "true"
  resilience:
    retryCount: 2
    retryDelayMs: 10
requestMapping:
  type: OBJECT
  mappings:
    - source: $.inputName
      target: $.fullName
      required: true
    - source: $.amount
      target: $.billing.amount
      transform: round2
authConfig:
  authType: basic
  config:
    username: svc
    password: secret
"#
}

#[test]
fn parse_yaml_and_validate_ok() {
    let parsed = parse_mapping_str(minimal_valid_yaml(), DocumentFormat::Yaml).unwrap();
    validate_mapping(&parsed.mapping).unwrap();

    let api = parsed.mapping.target_api.as_ref().unwrap();
    assert_eq!(api.method, HttpMethod::Post);
    assert_eq!(api.resilience.retry_count, 2);
    assert_eq!(api.resilience.retry_delay_ms, 10);
    assert!(matches!(
        parsed.mapping.request_mapping,
        Some(TransformSpec::Object(_))
    ));
}

#[test]
fn parse_auto_detects_yaml() {
    let parsed = parse_mapping_str(minimal_valid_yaml(), DocumentFormat::Auto).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Yaml);
}

#[test]
fn parse_json_workflow_and_validate_ok() {
    let json = r#"
{
  "id": "two-step",
  "targetApi": { "url": "https://api.example.com/unused", "method": "GET" },
  "steps": [
    {
      "name": "lookup",
      "targetApi": { "url": "https://api.example.com/users", "method": "GET" },
      "saveResultToContextAs": "userInfo"
    },
    {
      "name": "order",
      "targetApi": { "url": "https://api.example.com/orders", "method": "POST" },
      "requestMapping": {
        "type": "OBJECT",
        "mappings": [ { "source": "$.userInfo.id", "target": "$.userId" } ]
      }
    }
  ]
}
"#;
    let parsed = parse_mapping_str(json, DocumentFormat::Auto).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Json);
    assert!(parsed.mapping.is_workflow());
    validate_mapping(&parsed.mapping).unwrap();
}

#[test]
fn unknown_method_is_a_parse_error() {
    let json = r#"{ "id": "x", "targetApi": { "url": "https://a.example", "method": "FETCH" } }"#;
    assert!(parse_mapping_str(json, DocumentFormat::Json).is_err());
}

#[test]
fn validation_collects_all_violations() {
    let json = r#"
{
  "id": "",
  "targetApi": { "url": "not a url", "method": "GET" },
  "requestMapping": {
    "type": "ARRAY",
    "mappings": [
      { "target": "" },
      { "source": "$.a", "target": "$.b", "transform": "frobnicate" },
      { "source": "$.a", "target": "$.c", "condition": "" }
    ]
  },
  "responseMapping": { "type": "CUSTOM", "script": "while true { }" },
  "steps": [
    { "name": "dup", "targetApi": { "url": "https://a.example", "method": "GET" } },
    { "name": "dup", "targetApi": { "url": "https://a.example", "method": "GET" }, "saveResultToContextAs": " " }
  ]
}
"#;
    let parsed = parse_mapping_str(json, DocumentFormat::Json).unwrap();
    let err = validate_mapping(&parsed.mapping).unwrap_err();
    let paths: Vec<&str> = err.violations.iter().map(|v| v.path.as_str()).collect();

    for expected in [
        "id",
        "targetApi.url",
        "requestMapping.root",
        "requestMapping.mappings[0].target",
        "requestMapping.mappings[0].source",
        "requestMapping.mappings[1].transform",
        "requestMapping.mappings[2].condition",
        "responseMapping.script",
        "steps[1].name",
        "steps[1].saveResultToContextAs",
    ] {
        assert!(paths.contains(&expected), "missing {expected} in {paths:?}");
    }
}

#[test]
fn declared_custom_transform_satisfies_validation() {
    let json = r#"
{
  "id": "m",
  "targetApi": { "url": "https://a.example/{id}", "method": "PUT" },
  "transforms": { "cents": "input * 100" },
  "requestMapping": {
    "type": "OBJECT",
    "mappings": [ { "source": "$.price", "target": "$.priceCents", "transform": "cents" } ]
  }
}
"#;
    let parsed = parse_mapping_str(json, DocumentFormat::Json).unwrap();
    validate_mapping(&parsed.mapping).unwrap();
}

#[test]
fn conditional_literal_rule_needs_no_source() {
    let json = r#"
{
  "id": "m",
  "targetApi": { "url": "https://a.example", "method": "POST" },
  "requestMapping": {
    "type": "OBJECT",
    "mappings": [
      { "target": "$.tier", "condition": { "path": "$.vip", "equals": true }, "valueIfTrue": "gold" }
    ]
  }
}
"#;
    let parsed = parse_mapping_str(json, DocumentFormat::Json).unwrap();
    validate_mapping(&parsed.mapping).unwrap();
}

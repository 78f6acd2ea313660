use std::collections::BTreeMap;

use corrector_core::path;
use corrector_core::{
    parse_mapping_str, transform, transform_with_report, DocumentFormat, FieldRule, TransformSpec,
};
use serde_json::json;

#[test]
fn request_mapping_from_document() {
    let yaml = r#"
id: orders
targetApi: { url: "https://a.example/orders", method: POST }
transforms:
  cents: "input * 100"
requestMapping:
  type: OBJECT
  mappings:
    - { source: $.customer.name, target: $.buyer.name, transform: uppercase }
    - { source: $.price, target: $.amount, transform: cents }
    - { target: $.channel, condition: "$.web", valueIfTrue: online, valueIfFalse: store }
    - { source: $.note, target: $.note, default: "" }
  defaults:
    $.currency: EUR
"#;
    let mapping = parse_mapping_str(yaml, DocumentFormat::Yaml).unwrap().mapping;
    let spec = mapping.request_mapping.as_ref().unwrap();

    let out = transform(
        &json!({"customer": {"name": "ada"}, "price": 12, "web": true}),
        spec,
        &mapping.transforms,
    );
    assert_eq!(
        out,
        json!({
            "buyer": {"name": "ADA"},
            "amount": 1200,
            "channel": "online",
            "note": "",
            "currency": "EUR"
        })
    );
}

#[test]
fn later_rules_overwrite_earlier_targets() {
    let spec = TransformSpec::object(vec![
        FieldRule::new("$.a", "$.out"),
        FieldRule::new("$.b", "$.out"),
    ]);
    let out = transform(&json!({"a": 1, "b": 2}), &spec, &BTreeMap::new());
    assert_eq!(out, json!({"out": 2}));
}

#[test]
fn one_bad_field_does_not_blank_the_object() {
    let spec = TransformSpec::object(vec![
        FieldRule::new("$.a", "$.a").with_transform("toNumber"),
        FieldRule::new("$.age", "$.meta.age").required(),
        FieldRule::new("$.b", "$.b"),
    ]);
    let report = transform_with_report(&json!({"a": "x", "b": true}), &spec, &BTreeMap::new());
    assert_eq!(report.value, json!({"b": true}));
    let targets: Vec<_> = report.field_errors.iter().map(|e| e.target.as_str()).collect();
    assert_eq!(targets, vec!["$.a", "$.meta.age"]);
}

#[test]
fn oversized_index_target_is_a_field_error() {
    let spec = TransformSpec::object(vec![
        FieldRule::new("$.a", "$.list[18446744073709551615]"),
        FieldRule::new("$.a", "$.rows[100000000000].id"),
        FieldRule::new("$.a", "$.kept"),
    ]);
    let report = transform_with_report(&json!({"a": 1}), &spec, &BTreeMap::new());
    assert_eq!(report.value["kept"], json!(1));
    let targets: Vec<_> = report.field_errors.iter().map(|e| e.target.as_str()).collect();
    assert_eq!(
        targets,
        vec!["$.list[18446744073709551615]", "$.rows[100000000000].id"]
    );
}

#[test]
fn array_elements_carry_index_in_errors() {
    let spec = TransformSpec::array("items", vec![FieldRule::new("id", "value").required()]);
    let report = transform_with_report(
        &json!({"items": [{"id": 1}, {}]}),
        &spec,
        &BTreeMap::new(),
    );
    assert_eq!(report.value, json!([{"value": 1}, {}]));
    assert_eq!(report.field_errors[0].target, "[1]value");
}

#[test]
fn wildcard_source_collects_matches() {
    let spec = TransformSpec::object(vec![FieldRule::new("$.lines[*].sku", "$.skus")]);
    let out = transform(
        &json!({"lines": [{"sku": "a"}, {"sku": "b"}]}),
        &spec,
        &BTreeMap::new(),
    );
    assert_eq!(out, json!({"skus": ["a", "b"]}));
}

#[test]
fn path_helpers_round_out_the_evaluator() {
    let mut tree = json!({});
    path::set(&mut tree, "$.a.list[2]", json!("x")).unwrap();
    assert_eq!(tree, json!({"a": {"list": [null, null, "x"]}}));
    assert_eq!(path::delete(&mut tree, "a.list"), Some(json!([null, null, "x"])));
    assert_eq!(path::get(&tree, "$.a"), Some(json!({})));
    assert_eq!(path::get(&tree, "$.[broken"), None);
}

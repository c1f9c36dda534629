use std::collections::HashMap;

use json_parser::{JsonError, JsonParser, JsonValue};

fn object(pairs: &[(&str, JsonValue)]) -> JsonValue {
    JsonValue::Object(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<HashMap<_, _>>(),
    )
}

#[test]
fn mixed_document() {
    let parser = JsonParser::new();
    let value = parser
        .parse(r#"{"one": 1, "two": "three", "four": [5, "six", 7.8, {}]}"#)
        .unwrap();
    assert_eq!(
        value,
        object(&[
            ("one", JsonValue::Int(1)),
            ("two", JsonValue::String("three".into())),
            (
                "four",
                JsonValue::Array(vec![
                    JsonValue::Int(5),
                    JsonValue::String("six".into()),
                    JsonValue::Float(7.8),
                    object(&[]),
                ])
            ),
        ])
    );
}

#[test]
fn scalars_and_literals() {
    let parser = JsonParser::new();
    assert_eq!(parser.parse("42").unwrap(), JsonValue::Int(42));
    assert!(parser.parse("-0.5").is_err()); // leading minus is not lexed as a number
    assert_eq!(parser.parse("true").unwrap(), JsonValue::Bool(true));
    assert_eq!(parser.parse("false").unwrap(), JsonValue::Bool(false));
    assert_eq!(parser.parse("null").unwrap(), JsonValue::Null);
    assert_eq!(
        parser.parse(r#""plain""#).unwrap(),
        JsonValue::String("plain".into())
    );
}

#[test]
fn escaped_strings_unescape() {
    let parser = JsonParser::new();
    let value = parser.parse(r#"{"say": "he said \"hi\"\n"}"#).unwrap();
    assert_eq!(
        value,
        object(&[("say", JsonValue::String("he said \"hi\"\n".into()))])
    );
}

#[test]
fn nested_objects() {
    let parser = JsonParser::new();
    let value = parser
        .parse(r#"{"a": {"b": {"c": [1, 2, 3]}}}"#)
        .unwrap();
    let expected = object(&[(
        "a",
        object(&[(
            "b",
            object(&[(
                "c",
                JsonValue::Array(vec![
                    JsonValue::Int(1),
                    JsonValue::Int(2),
                    JsonValue::Int(3),
                ]),
            )]),
        )]),
    )]);
    assert_eq!(value, expected);
}

#[test]
fn trailing_comma_is_rejected_with_position() {
    let parser = JsonParser::new();
    let err = parser.parse(r#"{"a": 1,}"#).unwrap_err();
    assert!(matches!(err, JsonError::UnexpectedToken { .. }));
    let rendered = err.to_string();
    assert!(rendered.contains("line 1"), "{rendered}");
}

#[test]
fn truncated_document_reports_unexpected_end() {
    let parser = JsonParser::new();
    let err = parser.parse(r#"{"a": "#).unwrap_err();
    assert!(matches!(err, JsonError::UnexpectedEnd { .. }));
}

#[test]
fn garbage_value_is_rejected() {
    let parser = JsonParser::new();
    assert!(parser.parse(r#"{"a": @}"#).is_err());
}

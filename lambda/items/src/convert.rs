//! JSON <-> DynamoDB attribute marshalling.
//!
//! Mirrors what a document client does: records are plain JSON objects on the
//! wire and attribute maps in the table.

use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use base64::{engine::general_purpose, Engine as _};
use serde_json::{Number, Value};
use std::collections::HashMap;

use crate::error::StoreError;
use crate::store::Record;

pub(crate) fn to_item(record: &Record) -> HashMap<String, AttributeValue> {
    record
        .iter()
        .map(|(key, value)| (key.clone(), to_attribute(value)))
        .collect()
}

fn to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(to_item(map)),
    }
}

pub(crate) fn from_item(item: &HashMap<String, AttributeValue>) -> Result<Record, StoreError> {
    item.iter()
        .map(|(key, attr)| from_attribute(key, attr).map(|value| (key.clone(), value)))
        .collect()
}

fn from_attribute(key: &str, attr: &AttributeValue) -> Result<Value, StoreError> {
    let value = match attr {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => number(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(values) => Value::Array(
            values
                .iter()
                .map(|v| from_attribute(key, v))
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| from_attribute(key, v).map(|value| (k.clone(), value)))
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::Ss(set) => Value::Array(set.iter().cloned().map(Value::String).collect()),
        AttributeValue::Ns(set) => Value::Array(set.iter().map(String::as_str).map(number).collect()),
        AttributeValue::B(blob) => binary(blob),
        AttributeValue::Bs(set) => Value::Array(set.iter().map(binary).collect()),
        other => {
            return Err(StoreError::Unmarshal {
                attribute: key.to_string(),
                reason: format!("unsupported attribute type {:?}", other),
            })
        }
    };
    Ok(value)
}

// DynamoDB numbers carry up to 38 digits; anything that doesn't fit a JSON
// number is handed back as its decimal text.
fn number(text: &str) -> Value {
    if let Ok(n) = text.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(n) = text.parse::<u64>() {
        return Value::from(n);
    }
    match text.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(n) => Value::Number(n),
        None => Value::String(text.to_string()),
    }
}

fn binary(blob: &Blob) -> Value {
    Value::String(general_purpose::STANDARD.encode(blob.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn marshals_every_json_kind() {
        let item = to_item(&record(json!({
            "id": "1",
            "count": 3,
            "ratio": 0.5,
            "done": false,
            "gone": null,
            "tags": ["a", 1],
            "nested": { "k": "v" }
        })));

        assert_eq!(item["id"], AttributeValue::S("1".to_string()));
        assert_eq!(item["count"], AttributeValue::N("3".to_string()));
        assert_eq!(item["ratio"], AttributeValue::N("0.5".to_string()));
        assert_eq!(item["done"], AttributeValue::Bool(false));
        assert_eq!(item["gone"], AttributeValue::Null(true));
        assert_eq!(
            item["tags"],
            AttributeValue::L(vec![
                AttributeValue::S("a".to_string()),
                AttributeValue::N("1".to_string())
            ])
        );
        let mut nested = HashMap::new();
        nested.insert("k".to_string(), AttributeValue::S("v".to_string()));
        assert_eq!(item["nested"], AttributeValue::M(nested));
    }

    #[test]
    fn unmarshals_what_it_marshalled() {
        let original = record(json!({
            "id": "1700000000000",
            "n": -12,
            "f": 1.25,
            "list": [true, null, {"deep": [1, 2]}]
        }));
        let back = from_item(&to_item(&original)).unwrap();
        assert_eq!(Value::Object(back), Value::Object(original));
    }

    #[test]
    fn numbers_prefer_integers() {
        assert_eq!(number("42"), json!(42));
        assert_eq!(number("18446744073709551615"), json!(u64::MAX));
        assert_eq!(number("2.5"), json!(2.5));
        assert_eq!(number("1E400"), json!("1E400"));
    }

    #[test]
    fn sets_and_binaries_become_arrays_and_base64() {
        let mut item = HashMap::new();
        item.insert("ss".to_string(), AttributeValue::Ss(vec!["x".to_string(), "y".to_string()]));
        item.insert("ns".to_string(), AttributeValue::Ns(vec!["1".to_string(), "1.5".to_string()]));
        item.insert("b".to_string(), AttributeValue::B(Blob::new(b"hi".to_vec())));
        item.insert("bs".to_string(), AttributeValue::Bs(vec![Blob::new(vec![0u8, 255])]));

        let back = Value::Object(from_item(&item).unwrap());
        assert_eq!(back["ss"], json!(["x", "y"]));
        assert_eq!(back["ns"], json!([1, 1.5]));
        assert_eq!(back["b"], json!("aGk="));
        assert_eq!(back["bs"], json!(["AP8="]));
    }
}

//! Conversion between JSON values and Bolt values.

use neo4rs::{BoltList, BoltMap, BoltNull, BoltString, BoltType};
use serde_json::{json, Map, Value};

/// One result row: column name → value.
pub type Record = Map<String, Value>;

/// Convert a JSON parameter value into its Bolt equivalent.
///
/// Integers that fit `i64` stay integers; other numbers become floats.
pub fn json_to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::from(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => BoltType::from(i),
            None => BoltType::from(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => BoltType::from(s.as_str()),
        Value::Array(items) => {
            let mut list = BoltList::new();
            for item in items {
                list.push(json_to_bolt(item));
            }
            BoltType::List(list)
        }
        Value::Object(map) => {
            let mut bolt = BoltMap::new();
            for (key, item) in map {
                bolt.put(BoltString::from(key.as_str()), json_to_bolt(item));
            }
            BoltType::Map(bolt)
        }
    }
}

/// Read the given columns out of a row.
///
/// Nodes become `{identity, labels, properties}`, relationships
/// `{identity, start, end, type, properties}`; anything else is read as
/// plain JSON. Unreadable columns map to `null`.
pub fn row_to_record(row: &neo4rs::Row, columns: &[String]) -> Record {
    columns
        .iter()
        .map(|column| (column.clone(), column_value(row, column)))
        .collect()
}

fn column_value(row: &neo4rs::Row, column: &str) -> Value {
    if let Ok(node) = row.get::<neo4rs::Node>(column) {
        return node_to_json(&node);
    }
    if let Ok(rel) = row.get::<neo4rs::Relation>(column) {
        return relation_to_json(&rel);
    }
    row.get::<Value>(column).unwrap_or(Value::Null)
}

fn node_to_json(node: &neo4rs::Node) -> Value {
    let mut properties = Map::new();
    for key in node.keys() {
        if let Ok(v) = node.get::<Value>(key) {
            properties.insert(key.to_string(), v);
        }
    }

    json!({
        "identity": node.id(),
        "labels": node.labels(),
        "properties": properties,
    })
}

fn relation_to_json(rel: &neo4rs::Relation) -> Value {
    let mut properties = Map::new();
    for key in rel.keys() {
        if let Ok(v) = rel.get::<Value>(key) {
            properties.insert(key.to_string(), v);
        }
    }

    json!({
        "identity": rel.id(),
        "start": rel.start_node_id(),
        "end": rel.end_node_id(),
        "type": rel.typ(),
        "properties": properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert!(matches!(json_to_bolt(&json!(null)), BoltType::Null(_)));
        assert!(matches!(json_to_bolt(&json!(true)), BoltType::Boolean(_)));
        assert!(matches!(json_to_bolt(&json!(30)), BoltType::Integer(_)));
        assert!(matches!(json_to_bolt(&json!(1.5)), BoltType::Float(_)));
        assert!(matches!(json_to_bolt(&json!("Alice")), BoltType::String(_)));
    }

    #[test]
    fn test_u64_beyond_i64_becomes_float() {
        assert!(matches!(json_to_bolt(&json!(u64::MAX)), BoltType::Float(_)));
    }

    #[test]
    fn test_nested_structures() {
        let bolt = json_to_bolt(&json!({"tags": ["a", "b"], "age": 30}));
        let BoltType::Map(map) = bolt else {
            panic!("expected map");
        };
        assert_eq!(map.value.len(), 2);
        assert!(matches!(
            map.value.get(&BoltString::from("tags")),
            Some(BoltType::List(list)) if list.len() == 2
        ));
    }
}

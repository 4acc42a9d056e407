// src/classification.rs
//! Classification tally normalization: a purely functional walk over
//! the audits' variable-shape "clasificación" payloads. Each node
//! yields an explicit contribution or none; JSON parse failures are
//! swallowed as "no contribution".

use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::{normalize_text, AuditRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationTally {
    pub condicion: u64,
    pub actitud: u64,
}

impl ClassificationTally {
    pub fn total(self) -> u64 {
        self.condicion + self.actitud
    }

    fn merge(self, other: Self) -> Self {
        Self {
            condicion: self.condicion + other.condicion,
            actitud: self.actitud + other.actitud,
        }
    }
}

/// The closed set of shapes the walker recognizes.
enum Shape<'a> {
    Container(&'a Vec<Value>),
    Record(&'a Map<String, Value>),
    Embedded(&'a str),
    Opaque,
}

fn shape_of(value: &Value) -> Shape<'_> {
    match value {
        Value::Array(items) => Shape::Container(items),
        Value::Object(map) => Shape::Record(map),
        Value::String(raw) => Shape::Embedded(raw),
        _ => Shape::Opaque,
    }
}

/// Contribution of one node, or `None` for shapes that carry nothing.
pub fn walk(value: &Value) -> Option<ClassificationTally> {
    match shape_of(value) {
        Shape::Container(items) => Some(
            items
                .iter()
                .filter_map(walk)
                .fold(ClassificationTally::default(), ClassificationTally::merge),
        ),
        Shape::Record(map) => Some(record_tally(map)),
        Shape::Embedded(raw) => {
            // Stringified JSON; unparseable strings contribute nothing.
            let parsed = serde_json::from_str::<Value>(raw).ok()?;
            walk(&parsed)
        }
        Shape::Opaque => None,
    }
}

/// A record contributes through its own condición/actitud fields and
/// through any nested container (`valores` arrays, child objects).
fn record_tally(map: &Map<String, Value>) -> ClassificationTally {
    let mut tally = ClassificationTally::default();
    for (key, value) in map {
        match normalize_text(key).as_str() {
            "condicion" => tally.condicion += field_increment(value),
            "actitud" => tally.actitud += field_increment(value),
            _ => {
                if matches!(value, Value::Array(_) | Value::Object(_)) {
                    if let Some(nested) = walk(value) {
                        tally = tally.merge(nested);
                    }
                }
            }
        }
    }
    tally
}

/// Boolean-like fields count 1; pre-summed numeric fields add their
/// value. Accepted truthy forms: `true`, positive numbers, and the
/// strings "true"/"1"/"sí"/"si" in any casing.
fn field_increment(value: &Value) -> u64 {
    match value {
        Value::Bool(true) => 1,
        Value::Number(n) => {
            let v = n.as_f64().unwrap_or(0.0);
            if v >= 1.0 {
                v.trunc() as u64
            } else if v > 0.0 {
                1
            } else {
                0
            }
        }
        Value::String(raw) => match normalize_text(raw).as_str() {
            "true" | "1" | "si" => 1,
            _ => 0,
        },
        _ => 0,
    }
}

/// Per-audit tally. Falls back to the pre-summed
/// `resumenClasificaciones` only when the primary payload yields zero.
pub fn tally_audit(audit: &AuditRecord) -> ClassificationTally {
    let primary = audit
        .clasificacion
        .as_ref()
        .and_then(walk)
        .unwrap_or_default();
    if primary.total() > 0 {
        return primary;
    }
    audit
        .resumen_clasificaciones
        .as_ref()
        .and_then(walk)
        .unwrap_or_default()
}

/// Recursive numeric-leaf sum used for the nested nonconformity counts.
pub fn sum_numeric_leaves(value: &Value) -> u64 {
    match value {
        Value::Number(n) => {
            let v = n.as_f64().unwrap_or(0.0);
            if v > 0.0 {
                v.trunc() as u64
            } else {
                0
            }
        }
        Value::Array(items) => items.iter().map(sum_numeric_leaves).sum(),
        Value::Object(map) => map.values().map(sum_numeric_leaves).sum(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_and_nested_containers_accumulate() {
        let payload = json!([
            { "condicion": true, "actitud": false },
            { "valores": [ { "actitud": 1 } ] },
        ]);
        let tally = walk(&payload).unwrap();
        assert_eq!(
            tally,
            ClassificationTally {
                condicion: 1,
                actitud: 1
            }
        );
        assert_eq!(tally.total(), 2);
    }

    #[test]
    fn summary_objects_add_their_numeric_values() {
        let payload = json!({ "condición": 4, "Actitud": 3 });
        assert_eq!(
            walk(&payload).unwrap(),
            ClassificationTally {
                condicion: 4,
                actitud: 3
            }
        );
    }

    #[test]
    fn stringified_payloads_are_parsed() {
        let payload = json!("[{\"condicion\": \"sí\"}, {\"actitud\": \"1\"}]");
        assert_eq!(
            walk(&payload).unwrap(),
            ClassificationTally {
                condicion: 1,
                actitud: 1
            }
        );
    }

    #[test]
    fn unparseable_strings_contribute_nothing() {
        let payload = json!("{esto no es json");
        assert_eq!(walk(&payload), None);
        // And inside a container they are simply skipped.
        let mixed = json!([ "{roto", { "condicion": 1 } ]);
        assert_eq!(
            walk(&mixed).unwrap(),
            ClassificationTally {
                condicion: 1,
                actitud: 0
            }
        );
    }

    #[test]
    fn falsy_and_negative_values_do_not_count() {
        let payload = json!([
            { "condicion": false, "actitud": 0 },
            { "condicion": -2, "actitud": "no" },
        ]);
        assert_eq!(walk(&payload).unwrap(), ClassificationTally::default());
    }

    #[test]
    fn resumen_is_only_a_fallback() {
        let with_primary = AuditRecord {
            id: "A-1".into(),
            clasificacion: Some(json!([{ "condicion": true }])),
            resumen_clasificaciones: Some(json!({ "condicion": 10, "actitud": 10 })),
            ..AuditRecord::default()
        };
        assert_eq!(
            tally_audit(&with_primary),
            ClassificationTally {
                condicion: 1,
                actitud: 0
            }
        );

        let empty_primary = AuditRecord {
            id: "A-2".into(),
            clasificacion: Some(json!([])),
            resumen_clasificaciones: Some(json!({ "condicion": 2, "actitud": 1 })),
            ..AuditRecord::default()
        };
        assert_eq!(
            tally_audit(&empty_primary),
            ClassificationTally {
                condicion: 2,
                actitud: 1
            }
        );
    }

    #[test]
    fn nonconformity_counts_sum_numeric_leaves() {
        let payload = json!({ "criticas": 2, "detalle": { "mayores": 1, "menores": 3 } });
        assert_eq!(sum_numeric_leaves(&payload), 6);
    }
}

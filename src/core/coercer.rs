use crate::core::validator::{check_field, check_type, join_path, strip_value};
use crate::domain::model::{Fallback, FieldSpec, FieldType, OutputRecord, OutputSchema, RawRecord};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type Extractor = Arc<dyn Fn(&RawRecord) -> Option<Value> + Send + Sync>;

/// 每個欄位的替代取值規則：頂層值不合格時，從原始紀錄的其他位置找。
#[derive(Clone, Default)]
pub struct CoercionRules {
    extractors: HashMap<String, Extractor>,
}

impl CoercionRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule<F>(mut self, field: impl Into<String>, extractor: F) -> Self
    where
        F: Fn(&RawRecord) -> Option<Value> + Send + Sync + 'static,
    {
        self.extractors.insert(field.into(), Arc::new(extractor));
        self
    }

    /// 以 JSON Pointer 指向巢狀位置，例如 `/optionsByFare/0/options/0/displayPrice`
    pub fn pointer(self, field: impl Into<String>, pointer: &'static str) -> Self {
        self.rule(field, move |raw| raw.pointer(pointer).cloned())
    }

    pub fn extract(&self, field: &str, raw: &RawRecord) -> Option<Value> {
        self.extractors.get(field).and_then(|extract| extract(raw))
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl fmt::Debug for CoercionRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<&String> = self.extractors.keys().collect();
        fields.sort();
        f.debug_struct("CoercionRules").field("fields", &fields).finish()
    }
}

/// 將一筆原始紀錄修復成 schema 形狀。永遠不會失敗。
///
/// 每個欄位依序嘗試：原值合格就照抄 → 巢狀物件或陣列逐層修復 → 替代取值規則 → fallback。
/// 非物件的原始紀錄視為空物件。
pub fn coerce(raw: &RawRecord, schema: &OutputSchema, rules: &CoercionRules) -> OutputRecord {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);

    let mut data = passthrough_fields(obj, schema);
    for spec in &schema.fields {
        let value = obj
            .get(&spec.name)
            .and_then(|value| repair_field(value, spec, &spec.name))
            .or_else(|| {
                rules
                    .extract(&spec.name, raw)
                    .filter(|candidate| check_field(candidate, spec, &spec.name).is_ok())
                    .map(|candidate| strip_value(candidate, &spec.field_type))
            })
            .or_else(|| fallback_value(spec));

        if let Some(value) = value {
            data.insert(spec.name.clone(), value);
        }
    }

    OutputRecord::new(data)
}

fn coerce_object(obj: &Map<String, Value>, schema: &OutputSchema, prefix: &str) -> Map<String, Value> {
    let mut data = passthrough_fields(obj, schema);
    for spec in &schema.fields {
        let path = join_path(prefix, &spec.name);
        let value = obj
            .get(&spec.name)
            .and_then(|value| repair_field(value, spec, &path))
            .or_else(|| fallback_value(spec));

        if let Some(value) = value {
            data.insert(spec.name.clone(), value);
        }
    }
    data
}

fn passthrough_fields(obj: &Map<String, Value>, schema: &OutputSchema) -> Map<String, Value> {
    if !schema.passthrough_unknown_fields {
        return Map::new();
    }
    obj.iter()
        .filter(|(key, _)| !schema.is_known(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn repair_field(value: &Value, spec: &FieldSpec, path: &str) -> Option<Value> {
    if check_field(value, spec, path).is_ok() {
        return Some(strip_value(value.clone(), &spec.field_type));
    }

    let repaired = repair_structure(value, &spec.field_type, path)?;
    check_field(&repaired, spec, path).ok().map(|_| repaired)
}

fn repair_structure(value: &Value, field_type: &FieldType, path: &str) -> Option<Value> {
    match (value, field_type) {
        (Value::Object(obj), FieldType::Object(schema)) => {
            Some(Value::Object(coerce_object(obj, schema, path)))
        }
        (Value::Array(elements), FieldType::Array(inner)) => Some(Value::Array(
            elements
                .iter()
                .enumerate()
                .filter_map(|(i, element)| repair_element(element, inner, &format!("{}[{}]", path, i)))
                .collect(),
        )),
        _ => None,
    }
}

// 修不好的陣列元素直接丟掉
fn repair_element(element: &Value, field_type: &FieldType, path: &str) -> Option<Value> {
    if check_type(element, field_type, false, path).is_ok() {
        return Some(strip_value(element.clone(), field_type));
    }
    let repaired = repair_structure(element, field_type, path)?;
    check_type(&repaired, field_type, false, path)
        .ok()
        .map(|_| repaired)
}

fn fallback_value(spec: &FieldSpec) -> Option<Value> {
    match &spec.fallback {
        Fallback::Omit => None,
        Fallback::Null => Some(Value::Null),
        Fallback::Static(value) => Some(value.clone()),
    }
}

use crate::domain::model::{
    FieldSpec, FieldType, FieldViolation, ItemViolations, OutputSchema, ViolationReason,
};
use serde_json::{Map, Value};
use url::Url;

/// 結構化、遞迴地驗證單筆資料。未知欄位永遠不算違規。
pub fn validate(value: &Value, schema: &OutputSchema) -> Result<(), Vec<FieldViolation>> {
    match value {
        Value::Object(obj) => {
            let violations = validate_object(obj, schema, "");
            if violations.is_empty() {
                Ok(())
            } else {
                Err(violations)
            }
        }
        _ => Err(vec![FieldViolation::new(
            "$",
            ViolationReason::WrongType { expected: "object" },
        )]),
    }
}

/// 陣列只有在每個元素都合法時才算合法
pub fn validate_items<'a, I>(items: I, schema: &OutputSchema) -> Result<(), Vec<ItemViolations>>
where
    I: IntoIterator<Item = &'a Value>,
{
    let failures: Vec<ItemViolations> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            validate(item, schema)
                .err()
                .map(|violations| ItemViolations { index, violations })
        })
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}

pub(crate) fn validate_object(
    obj: &Map<String, Value>,
    schema: &OutputSchema,
    prefix: &str,
) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    for spec in &schema.fields {
        let path = join_path(prefix, &spec.name);
        match obj.get(&spec.name) {
            None if spec.required => {
                violations.push(FieldViolation::new(path, ViolationReason::Missing));
            }
            None => {}
            Some(value) => {
                if let Err(reason) = check_field(value, spec, &path) {
                    violations.push(FieldViolation::new(path, reason));
                }
            }
        }
    }

    violations
}

/// 單一欄位值是否符合宣告；驗證器與 coercer 共用同一個判斷
pub fn check_field(value: &Value, spec: &FieldSpec, path: &str) -> Result<(), ViolationReason> {
    if value.is_null() {
        return if spec.nullable {
            Ok(())
        } else {
            Err(ViolationReason::WrongType {
                expected: spec.field_type.name(),
            })
        };
    }
    check_type(value, &spec.field_type, spec.non_empty, path)
}

pub(crate) fn check_type(
    value: &Value,
    field_type: &FieldType,
    non_empty: bool,
    path: &str,
) -> Result<(), ViolationReason> {
    let wrong_type = || ViolationReason::WrongType {
        expected: field_type.name(),
    };

    match field_type {
        FieldType::String => {
            let s = value.as_str().ok_or_else(wrong_type)?;
            if non_empty && s.is_empty() {
                return Err(ViolationReason::Missing);
            }
            Ok(())
        }
        FieldType::Url => {
            let s = value.as_str().ok_or_else(wrong_type)?;
            if non_empty && s.is_empty() {
                return Err(ViolationReason::Missing);
            }
            Url::parse(s).map(|_| ()).map_err(|_| wrong_type())
        }
        FieldType::Number => value.as_f64().map(|_| ()).ok_or_else(wrong_type),
        FieldType::Integer => {
            if is_integer(value) {
                Ok(())
            } else {
                Err(wrong_type())
            }
        }
        FieldType::Boolean => value.as_bool().map(|_| ()).ok_or_else(wrong_type),
        FieldType::Object(schema) => {
            let obj = value.as_object().ok_or_else(wrong_type)?;
            let nested = validate_object(obj, schema, path);
            if nested.is_empty() {
                Ok(())
            } else {
                Err(ViolationReason::FailedNestedValidation(nested))
            }
        }
        FieldType::Array(inner) => {
            let elements = value.as_array().ok_or_else(wrong_type)?;
            let nested: Vec<FieldViolation> = elements
                .iter()
                .enumerate()
                .filter_map(|(i, element)| {
                    let element_path = format!("{}[{}]", path, i);
                    if element.is_null() {
                        return Some(FieldViolation::new(
                            element_path,
                            ViolationReason::WrongType {
                                expected: inner.name(),
                            },
                        ));
                    }
                    check_type(element, inner, false, &element_path)
                        .err()
                        .map(|reason| FieldViolation::new(element_path, reason))
                })
                .collect();
            if nested.is_empty() {
                Ok(())
            } else {
                Err(ViolationReason::FailedNestedValidation(nested))
            }
        }
    }
}

fn is_integer(value: &Value) -> bool {
    if value.is_i64() || value.is_u64() {
        return true;
    }
    value
        .as_f64()
        .map(|f| f.is_finite() && f.fract() == 0.0)
        .unwrap_or(false)
}

/// 移除 schema 未宣告的欄位（除非該層允許 passthrough），遞迴處理巢狀物件與陣列。
pub fn strip_unknown(obj: Map<String, Value>, schema: &OutputSchema) -> Map<String, Value> {
    obj.into_iter()
        .filter_map(|(key, value)| match schema.field_spec(&key) {
            Some(spec) => {
                let value = strip_value(value, &spec.field_type);
                Some((key, value))
            }
            None if schema.passthrough_unknown_fields => Some((key, value)),
            None => None,
        })
        .collect()
}

pub(crate) fn strip_value(value: Value, field_type: &FieldType) -> Value {
    match (value, field_type) {
        (Value::Object(obj), FieldType::Object(schema)) => Value::Object(strip_unknown(obj, schema)),
        (Value::Array(elements), FieldType::Array(inner)) => Value::Array(
            elements
                .into_iter()
                .map(|element| strip_value(element, inner))
                .collect(),
        ),
        (value, _) => value,
    }
}

pub(crate) fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

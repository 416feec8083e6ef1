use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 第三方供應商回傳的原始資料，不對形狀做任何假設（可能根本不是物件）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Value);

impl RawRecord {
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.as_object().and_then(|obj| obj.get(key))
    }

    /// JSON Pointer 查詢，例如 `/optionsByFare/0/options/0/displayPrice`
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.0.pointer(pointer)
    }

    pub fn into_object(self) -> Option<Map<String, Value>> {
        match self.0 {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<OutputRecord> for RawRecord {
    fn from(record: OutputRecord) -> Self {
        Self(Value::Object(record.data))
    }
}

/// 通過 schema 驗證後回傳給呼叫端的紀錄
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputRecord {
    pub data: Map<String, Value>,
}

impl OutputRecord {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    /// 可解析為絕對 URL 的字串
    Url,
    Number,
    /// 沒有小數部分的數字
    Integer,
    Boolean,
    Object(OutputSchema),
    Array(Box<FieldType>),
}

impl FieldType {
    pub fn array_of(inner: FieldType) -> Self {
        FieldType::Array(Box::new(inner))
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Url => "url",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Object(_) => "object",
            FieldType::Array(_) => "array",
        }
    }
}

/// 欄位修復失敗時使用的值
#[derive(Debug, Clone, PartialEq)]
pub enum Fallback {
    /// 不輸出該欄位
    Omit,
    Null,
    Static(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub nullable: bool,
    pub non_empty: bool,
    pub fallback: Fallback,
}

impl FieldSpec {
    /// 必填欄位，fallback 預設為省略
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            nullable: false,
            non_empty: false,
            fallback: Fallback::Omit,
        }
    }

    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, field_type)
        }
    }

    /// 選填且可為 null，修復失敗時填 null
    pub fn nullable(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            required: false,
            nullable: true,
            fallback: Fallback::Null,
            ..Self::required(name, field_type)
        }
    }

    /// key 必須存在（值仍可為 null，視 nullable 而定）
    pub fn always_present(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn or_default(self, value: impl Into<Value>) -> Self {
        self.with_fallback(Fallback::Static(value.into()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputSchema {
    pub fields: Vec<FieldSpec>,
    pub passthrough_unknown_fields: bool,
}

impl OutputSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn passthrough(mut self) -> Self {
        self.passthrough_unknown_fields = true;
        self
    }

    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.field_spec(name).is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViolationReason {
    Missing,
    WrongType { expected: &'static str },
    FailedNestedValidation(Vec<FieldViolation>),
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationReason::Missing => write!(f, "missing"),
            ViolationReason::WrongType { expected } => write!(f, "wrong-type (expected {})", expected),
            ViolationReason::FailedNestedValidation(inner) => {
                write!(f, "failed-nested-validation [")?;
                for (i, violation) in inner.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", violation)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct FieldViolation {
    pub field: String,
    pub reason: ViolationReason,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: ViolationReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemViolations {
    pub index: usize,
    pub violations: Vec<FieldViolation>,
}

/// 產出結果的那一層
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Strict,
    Coerced,
    Filtered { dropped: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub items: Vec<OutputRecord>,
    pub tier: Tier,
}

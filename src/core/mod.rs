pub mod coercer;
pub mod normalizer;
pub mod validator;

pub use crate::domain::model::{
    Fallback, FieldSpec, FieldType, FieldViolation, Normalized, OutputRecord, OutputSchema,
    RawRecord, Tier, ViolationReason,
};
pub use crate::domain::ports::SearchTool;
pub use crate::utils::error::Result;
pub use coercer::CoercionRules;
pub use normalizer::TieredNormalizer;

pub mod document;
pub mod policy;
pub mod record;
pub mod result;
pub mod value;

pub use document::{DocumentId, DocumentKind};
pub use policy::{ConditionDef, RuleDef, RuleDocument};
pub use record::ProcessRecord;
pub use result::EvaluationResult;
pub use value::Value;

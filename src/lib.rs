pub mod api;
pub mod batch;
pub mod config;
pub mod domain;
pub mod ingest;
pub mod normalize;
pub mod observability;
pub mod policy;
pub mod report;
pub mod rules;
pub mod storage;

pub use config::Config;
pub use domain::{EvaluationResult, ProcessRecord, Value};
pub use normalize::{normalize, parse_amount};
pub use policy::{load_config, ConfigError};
pub use rules::{evaluate, RuleConfig};

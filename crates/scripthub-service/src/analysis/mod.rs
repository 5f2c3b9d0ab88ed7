//! Analysis lifecycle, content, env, and log operations.

pub mod service;

pub use service::{AnalysisService, CreateAnalysisRequest, UpdateAnalysisRequest};

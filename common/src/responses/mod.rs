use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON body of every non-2xx response from the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable error kind, e.g. `validation_error` or `template_not_found`.
    pub error: String,
    pub message: String,
    /// Names of the required form fields that were empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

/// Readiness flags reported by `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub ready: bool,
    pub fields_loaded: bool,
    pub families: usize,
    pub template_dir_present: bool,
    pub templates_present: usize,
    pub templates_configured: usize,
    pub store_available: bool,
}

/// Configuration presence reported by `GET /debug`. Values are masked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugReport {
    pub bucket_name: String,
    pub store_root: String,
    pub template_dir: String,
    pub output_prefix: String,
    pub families_file: Option<String>,
    /// `EFILING_*` variable name to `missing` or a masked value.
    pub environment: BTreeMap<String, String>,
}

use serde::{Deserialize, Serialize};

/// Liveness report.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    /// Always `"ok"` in a successful response.
    pub status: String,
    /// Storage backend name.
    pub storage: String,
}

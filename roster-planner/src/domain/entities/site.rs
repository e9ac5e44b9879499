use serde::{Deserialize, Serialize};

/// A work site and the shift types it offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    #[serde(default)]
    pub available_shifts: Vec<String>,
}

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::portfolio::holdings::RiskBucket;

/// Manager responsible for a risk bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manager {
    pub manager_id: String,
    pub risk_bucket: RiskBucket,
    pub name: String,
}

impl Manager {
    pub fn validate(&self) -> Result<()> {
        if self.manager_id.trim().is_empty() {
            return Err(ValidationError::MissingField("manager_id".to_string()).into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        Ok(())
    }
}

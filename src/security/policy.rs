//! Block policy
//!
//! Which risk levels withhold content. Default blocks Malicious only;
//! Suspicious content is shown with an annotation.

use serde::{Deserialize, Serialize};

use crate::threat::RiskLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockPolicy {
    pub block_malicious: bool,
    pub block_suspicious: bool,
}

impl Default for BlockPolicy {
    fn default() -> Self {
        Self {
            block_malicious: true,
            block_suspicious: false,
        }
    }
}

impl BlockPolicy {
    /// Block nothing; everything is shown annotated.
    pub fn permissive() -> Self {
        Self {
            block_malicious: false,
            block_suspicious: false,
        }
    }

    /// Block suspicious content too.
    pub fn strict() -> Self {
        Self {
            block_malicious: true,
            block_suspicious: true,
        }
    }

    pub fn blocks(&self, risk: RiskLevel) -> bool {
        match risk {
            RiskLevel::Safe => false,
            RiskLevel::Suspicious => self.block_suspicious,
            RiskLevel::Malicious => self.block_malicious,
        }
    }
}

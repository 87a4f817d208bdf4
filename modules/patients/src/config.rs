use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceConfig;

/// Configuration for the patients module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientsConfig {
    #[serde(default = "default_email_domain")]
    pub email_domain: String,
    #[serde(default = "default_max_email_probes")]
    pub max_email_probes: u32,
}

impl Default for PatientsConfig {
    fn default() -> Self {
        Self {
            email_domain: default_email_domain(),
            max_email_probes: default_max_email_probes(),
        }
    }
}

impl From<PatientsConfig> for ServiceConfig {
    fn from(cfg: PatientsConfig) -> Self {
        Self {
            email_domain: cfg.email_domain,
            max_email_probes: cfg.max_email_probes,
        }
    }
}

fn default_email_domain() -> String {
    "example.com".to_string()
}

fn default_max_email_probes() -> u32 {
    1000
}

use serde::{Deserialize, Serialize};

use mockup_core::QueueStats;
use mockup_model::LeadFields;

/// Body of `POST /api/mockup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockupSubmission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, alias = "segment")]
    pub segmento: Option<String>,
    /// Publicly reachable logo, already uploaded.
    #[serde(default)]
    pub logo_url: String,
    /// Logo as the user uploaded it, before any conversion.
    #[serde(default)]
    pub original_logo_url: Option<String>,
    /// Extension or mime type of the upload (`pdf`, `image/png`, ...).
    #[serde(default)]
    pub file_type: Option<String>,
}

impl MockupSubmission {
    pub fn lead(&self) -> LeadFields {
        LeadFields {
            email: self.email.trim().to_string(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            segment: self.segmento.clone(),
        }
    }
}

/// Body of a successful `POST /api/mockup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockupResponse {
    pub success: bool,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub segmento: Option<String>,
    pub logo_url: String,
    pub original_logo_url: Option<String>,
    /// Rendered mockup, or the placeholder when the backend produced none.
    pub url: String,
    pub redirect_url: Option<String>,
}

/// Body of `GET /api/diagnostics`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub queue_name: String,
    pub queue: QueueStats,
}

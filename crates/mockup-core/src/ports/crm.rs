use async_trait::async_trait;
use mockup_model::{LeadFields, ModelError};
use thiserror::Error;

/// CRM-side contact identifier.
pub type ContactId = String;

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("crm transport error: {0}")]
    Transport(String),

    #[error("crm returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected crm response: {0}")]
    UnexpectedResponse(String),

    #[error("invalid lead: {0}")]
    InvalidLead(#[from] ModelError),

    #[error("invalid crm client configuration: {0}")]
    Config(String),
}

impl CrmError {
    /// Network failures and 5xx responses.
    pub fn is_retryable(&self) -> bool {
        match self {
            CrmError::Transport(_) => true,
            CrmError::Status { status, .. } => *status >= 500,
            CrmError::UnexpectedResponse(_) | CrmError::InvalidLead(_) | CrmError::Config(_) => {
                false
            }
        }
    }
}

/// Find-or-create contact synchronisation against the CRM.
#[async_trait]
pub trait CrmClient: Send + Sync + 'static {
    /// Upsert the contact and its custom fields, then subscribe it to the lead list.
    async fn sync_lead(&self, lead: &LeadFields) -> Result<ContactId, CrmError>;

    /// Same as [`CrmClient::sync_lead`] and also set the mockup URL field.
    async fn sync_lead_with_mockup(
        &self,
        lead: &LeadFields,
        mockup_url: &str,
    ) -> Result<ContactId, CrmError>;

    /// Set the mockup URL field of an existing contact. `Ok(false)` if no contact matches.
    async fn update_mockup_url(&self, email: &str, mockup_url: &str) -> Result<bool, CrmError>;

    /// Set the logo URL field of an existing contact. `Ok(false)` if no contact matches.
    async fn update_logo_url(&self, email: &str, logo_url: &str) -> Result<bool, CrmError>;
}

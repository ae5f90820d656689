use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Contact details captured by the mockup form.
///
/// Only `email` is mandatory; it is the key used to find the contact in the CRM.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadFields {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Business segment picked in the form.
    #[serde(default, alias = "segmento", skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
}

impl LeadFields {
    /// Create lead fields with only an email set.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    /// Check that the lead can be synced.
    pub fn validate(&self) -> ModelResult<()> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ModelError::MissingField("email"));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(ModelError::InvalidEmail(self.email.clone())),
        }
    }

    /// Split the display name into `(first, last)` at the first space.
    ///
    /// A missing name yields two empty strings; a single word has an empty last name.
    pub fn split_name(&self) -> (String, String) {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        match name.split_once(' ') {
            Some((first, rest)) => (first.to_string(), rest.trim_start().to_string()),
            None => (name.to_string(), String::new()),
        }
    }

    /// Segment value, ignoring blank input.
    pub fn segment(&self) -> Option<&str> {
        self.segment.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

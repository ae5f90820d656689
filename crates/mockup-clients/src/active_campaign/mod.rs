//! ActiveCampaign REST v3 client with find-or-create semantics.
mod types;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use mockup_core::{ContactId, CrmClient, CrmError};
use mockup_model::LeadFields;
use types::{
    ContactEnvelope, ContactsPage, FieldEnvelope, FieldValuesPage, FieldsPage, ListEnvelope,
    ListsPage,
};
pub use types::{Contact, Field, FieldType, List, list_string_id};

/// Names of the custom fields and list the lead flow writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmFieldNames {
    pub segment: String,
    pub mockup_url: String,
    pub logo_url: String,
    pub list: String,
}

impl Default for CrmFieldNames {
    fn default() -> Self {
        Self {
            segment: "Segmento de Negócio".to_string(),
            mockup_url: "mockup_url".to_string(),
            logo_url: "mockup_logotipo".to_string(),
            list: "Mockup Generator".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActiveCampaignConfig {
    /// Account URL, e.g. `https://acme.api-us1.com`.
    pub base_url: String,
    pub api_key: String,
    pub names: CrmFieldNames,
    pub timeout: Duration,
}

impl ActiveCampaignConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            names: CrmFieldNames::default(),
            timeout: Duration::from_secs(15),
        }
    }
}

pub struct ActiveCampaignClient {
    http: reqwest::Client,
    base: String,
    cfg: ActiveCampaignConfig,
}

impl ActiveCampaignClient {
    pub fn new(cfg: ActiveCampaignConfig) -> Result<Self, CrmError> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| CrmError::Config(e.to_string()))?;
        let base = format!("{}/api/3", cfg.base_url.trim_end_matches('/'));
        Ok(Self { http, base, cfg })
    }

    pub fn names(&self) -> &CrmFieldNames {
        &self.cfg.names
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<T, CrmError> {
        let mut req = self
            .http
            .request(method.clone(), format!("{}{path}", self.base))
            .header("Api-Token", &self.cfg.api_key)
            .header("Accept", "application/json")
            .query(query);
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| CrmError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CrmError::Status {
                status: status.as_u16(),
                body,
            });
        }
        resp.json::<T>()
            .await
            .map_err(|e| CrmError::UnexpectedResponse(format!("{method} {path}: {e}")))
    }

    /// Check the API token against `GET /users/me`.
    pub async fn verify_credentials(&self) -> Result<(), CrmError> {
        self.call::<Value>(Method::GET, "/users/me", &[], None).await?;
        Ok(())
    }

    pub async fn find_contact(&self, email: &str) -> Result<Option<Contact>, CrmError> {
        let page: ContactsPage = self
            .call(Method::GET, "/contacts", &[("email", email)], None)
            .await?;
        Ok(page.contacts.into_iter().next())
    }

    fn contact_body(lead: &LeadFields) -> Value {
        let (first, last) = lead.split_name();
        json!({
            "contact": {
                "email": lead.email.trim(),
                "firstName": first,
                "lastName": last,
                "phone": lead.phone.as_deref().unwrap_or_default(),
            }
        })
    }

    pub async fn create_contact(&self, lead: &LeadFields) -> Result<Contact, CrmError> {
        let env: ContactEnvelope = self
            .call(Method::POST, "/contacts", &[], Some(Self::contact_body(lead)))
            .await?;
        info!(email = %lead.email, contact = %env.contact.id, "crm contact created");
        Ok(env.contact)
    }

    pub async fn update_contact(&self, id: &str, lead: &LeadFields) -> Result<Contact, CrmError> {
        let env: ContactEnvelope = self
            .call(
                Method::PUT,
                &format!("/contacts/{id}"),
                &[],
                Some(Self::contact_body(lead)),
            )
            .await?;
        debug!(email = %lead.email, contact = %env.contact.id, "crm contact updated");
        Ok(env.contact)
    }

    /// Update the contact matching the lead's email, or create it.
    pub async fn upsert_contact(&self, lead: &LeadFields) -> Result<Contact, CrmError> {
        lead.validate()?;
        match self.find_contact(lead.email.trim()).await? {
            Some(existing) => self.update_contact(&existing.id, lead).await,
            None => self.create_contact(lead).await,
        }
    }

    /// Field with a case-insensitively equal title, created when missing.
    pub async fn find_or_create_field(&self, title: &str, kind: FieldType) -> Result<Field, CrmError> {
        let page: FieldsPage = self
            .call(Method::GET, "/fields", &[("limit", "100")], None)
            .await?;
        let wanted = title.to_lowercase();
        if let Some(field) = page.fields.into_iter().find(|f| f.title.to_lowercase() == wanted) {
            return Ok(field);
        }

        let body = json!({ "field": { "title": title, "type": kind, "visible": 1 } });
        let env: FieldEnvelope = self.call(Method::POST, "/fields", &[], Some(body)).await?;
        info!(field = %env.field.id, title, "crm custom field created");
        Ok(env.field)
    }

    /// Set a custom field on a contact, updating the existing value when there is one.
    pub async fn set_field_value(
        &self,
        contact_id: &str,
        field_id: &str,
        value: &str,
    ) -> Result<(), CrmError> {
        let page: FieldValuesPage = self
            .call(
                Method::GET,
                &format!("/contacts/{contact_id}/fieldValues"),
                &[],
                None,
            )
            .await?;

        match page.field_values.iter().find(|v| v.field == field_id) {
            Some(existing) => {
                let body = json!({ "fieldValue": { "value": value } });
                self.call::<Value>(
                    Method::PUT,
                    &format!("/fieldValues/{}", existing.id),
                    &[],
                    Some(body),
                )
                .await?;
            }
            None => {
                let body = json!({
                    "fieldValue": { "contact": contact_id, "field": field_id, "value": value }
                });
                self.call::<Value>(Method::POST, "/fieldValues", &[], Some(body))
                    .await?;
            }
        }
        debug!(contact = contact_id, field = field_id, "crm field value stored");
        Ok(())
    }

    /// List with a case-insensitively equal name, created when missing.
    pub async fn find_or_create_list(&self, name: &str) -> Result<List, CrmError> {
        let page: ListsPage = self
            .call(Method::GET, "/lists", &[("limit", "100")], None)
            .await?;
        let wanted = name.to_lowercase();
        if let Some(list) = page.lists.into_iter().find(|l| l.name.to_lowercase() == wanted) {
            return Ok(list);
        }

        let body = json!({ "list": { "name": name, "stringid": list_string_id(name) } });
        let env: ListEnvelope = self.call(Method::POST, "/lists", &[], Some(body)).await?;
        info!(list = %env.list.id, name, "crm list created");
        Ok(env.list)
    }

    pub async fn subscribe(&self, contact_id: &str, list_id: &str) -> Result<(), CrmError> {
        let body = json!({ "contactList": { "list": list_id, "contact": contact_id, "status": 1 } });
        self.call::<Value>(Method::POST, "/contactLists", &[], Some(body))
            .await?;
        Ok(())
    }

    async fn sync(&self, lead: &LeadFields, mockup_url: Option<&str>) -> Result<ContactId, CrmError> {
        let contact = self.upsert_contact(lead).await?;
        let names = &self.cfg.names;

        if let Some(segment) = lead.segment() {
            let field = self.find_or_create_field(&names.segment, FieldType::Dropdown).await?;
            self.set_field_value(&contact.id, &field.id, segment).await?;
        }
        if let Some(url) = mockup_url {
            let field = self.find_or_create_field(&names.mockup_url, FieldType::Text).await?;
            self.set_field_value(&contact.id, &field.id, url).await?;
        }

        let list = self.find_or_create_list(&names.list).await?;
        self.subscribe(&contact.id, &list.id).await?;
        Ok(contact.id)
    }

    async fn update_field_by_email(
        &self,
        email: &str,
        field_title: &str,
        value: &str,
    ) -> Result<bool, CrmError> {
        let Some(contact) = self.find_contact(email.trim()).await? else {
            return Ok(false);
        };
        let field = self.find_or_create_field(field_title, FieldType::Text).await?;
        self.set_field_value(&contact.id, &field.id, value).await?;
        Ok(true)
    }
}

#[async_trait]
impl CrmClient for ActiveCampaignClient {
    #[instrument(level = "debug", skip_all, fields(email = %lead.email))]
    async fn sync_lead(&self, lead: &LeadFields) -> Result<ContactId, CrmError> {
        self.sync(lead, None).await
    }

    #[instrument(level = "debug", skip_all, fields(email = %lead.email))]
    async fn sync_lead_with_mockup(
        &self,
        lead: &LeadFields,
        mockup_url: &str,
    ) -> Result<ContactId, CrmError> {
        self.sync(lead, Some(mockup_url)).await
    }

    #[instrument(level = "debug", skip(self, mockup_url))]
    async fn update_mockup_url(&self, email: &str, mockup_url: &str) -> Result<bool, CrmError> {
        self.update_field_by_email(email, &self.cfg.names.mockup_url, mockup_url)
            .await
    }

    #[instrument(level = "debug", skip(self, logo_url))]
    async fn update_logo_url(&self, email: &str, logo_url: &str) -> Result<bool, CrmError> {
        self.update_field_by_email(email, &self.cfg.names.logo_url, logo_url)
            .await
    }
}

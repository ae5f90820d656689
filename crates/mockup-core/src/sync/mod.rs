//! Background CRM synchronisation of captured leads.
//!
//! Every operation enqueues onto the [`TaskQueue`] and returns at once; the CRM
//! calls run later on the queue worker, one at a time, so contact creation never
//! races with the field updates that follow it.
use std::{sync::Arc, time::Duration};

use mockup_model::{LeadFields, StorageLocation, normalize_mockup_url};
use tracing::{debug, warn};

use crate::{
    error::CoreError,
    ports::{CrmClient, CrmError},
    queue::{TaskId, TaskQueue},
    retry::{RetryPolicy, with_retry},
};

/// Default wait before a logo update, so the contact-creation task lands first.
pub const DEFAULT_LOGO_SETTLE_DELAY: Duration = Duration::from_secs(2);
/// Default wait before the single retry of a logo update.
pub const DEFAULT_LOGO_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct LeadSyncConfig {
    /// Bucket the mockup URLs must point into.
    pub location: StorageLocation,
    pub logo_settle_delay: Duration,
    pub logo_retry_delay: Duration,
}

impl LeadSyncConfig {
    pub fn new(location: StorageLocation) -> Self {
        Self {
            location,
            logo_settle_delay: DEFAULT_LOGO_SETTLE_DELAY,
            logo_retry_delay: DEFAULT_LOGO_RETRY_DELAY,
        }
    }
}

/// Lead synchronisation service. Single-task methods return `Ok(None)` when the call was skipped.
#[derive(Clone)]
pub struct LeadSync {
    queue: TaskQueue,
    crm: Arc<dyn CrmClient>,
    cfg: Arc<LeadSyncConfig>,
}

impl LeadSync {
    pub fn new(queue: TaskQueue, crm: Arc<dyn CrmClient>, cfg: LeadSyncConfig) -> Self {
        Self {
            queue,
            crm,
            cfg: Arc::new(cfg),
        }
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub fn config(&self) -> &LeadSyncConfig {
        &self.cfg
    }

    /// Queue creation or update of the contact with its basic fields.
    pub fn process_lead_basic_info_async(
        &self,
        lead: LeadFields,
    ) -> Result<Option<TaskId>, CoreError> {
        lead.validate()?;
        let crm = Arc::clone(&self.crm);
        let id = self
            .queue
            .add_task_with("sync-lead", lead, move |lead| async move {
                let contact = crm.sync_lead(&lead).await?;
                debug!(email = %lead.email, contact = %contact, "lead synced");
                Ok::<_, CrmError>(())
            })?;
        Ok(Some(id))
    }

    /// Queue a contact sync that also stores the mockup URL.
    pub fn process_lead_with_mockup_async(
        &self,
        lead: LeadFields,
        mockup_url: impl Into<String>,
    ) -> Result<Option<TaskId>, CoreError> {
        lead.validate()?;
        let crm = Arc::clone(&self.crm);
        let url = mockup_url.into();
        let id = self.queue.add_task_with(
            "sync-lead-with-mockup",
            (lead, url),
            move |(lead, url)| async move {
                let contact = crm.sync_lead_with_mockup(&lead, &url).await?;
                debug!(email = %lead.email, contact = %contact, "lead synced with mockup");
                Ok::<_, CrmError>(())
            },
        )?;
        Ok(Some(id))
    }

    /// Queue an update of the contact's mockup URL.
    ///
    /// The URL is normalized to the direct bucket URL first; an unusable URL is
    /// rejected here and nothing is queued.
    pub fn update_mockup_url_async(
        &self,
        email: impl Into<String>,
        mockup_url: &str,
    ) -> Result<Option<TaskId>, CoreError> {
        let email = email.into();
        if mockup_url.trim().is_empty() {
            debug!(email = %email, "no mockup url, skipping update");
            return Ok(None);
        }
        let url = normalize_mockup_url(mockup_url.trim(), &self.cfg.location)?;
        self.enqueue_mockup_url(email, url).map(Some)
    }

    fn enqueue_mockup_url(&self, email: String, url: String) -> Result<TaskId, CoreError> {
        let crm = Arc::clone(&self.crm);
        self.queue.add_task_with(
            "update-mockup-url",
            (email, url),
            move |(email, url)| async move {
                if !crm.update_mockup_url(&email, &url).await? {
                    warn!(email = %email, "contact not found, mockup url not stored");
                }
                Ok::<_, CrmError>(())
            },
        )
    }

    /// Queue an update of the contact's logo URL.
    ///
    /// The task waits the settle delay, then tries twice with the retry delay in between.
    pub fn update_logo_url_async(
        &self,
        email: impl Into<String>,
        logo_url: &str,
    ) -> Result<Option<TaskId>, CoreError> {
        let email = email.into();
        if logo_url.trim().is_empty() {
            debug!(email = %email, "no logo url, skipping update");
            return Ok(None);
        }
        let crm = Arc::clone(&self.crm);
        let settle = self.cfg.logo_settle_delay;
        let policy = RetryPolicy::<CrmError>::default()
            .named("update-logo-url")
            .with_max_retries(1)
            .with_initial_delay(self.cfg.logo_retry_delay)
            .with_max_delay(self.cfg.logo_retry_delay);

        let id = self.queue.add_task_with(
            "update-logo-url",
            (email, logo_url.trim().to_string()),
            move |(email, url)| async move {
                tokio::time::sleep(settle).await;
                let found = with_retry(|| crm.update_logo_url(&email, &url), &policy).await?;
                if !found {
                    warn!(email = %email, "contact not found, logo url not stored");
                }
                Ok::<_, CrmError>(())
            },
        )?;
        Ok(Some(id))
    }

    /// Queue the basic info sync, then the mockup URL update when one is known.
    ///
    /// The lead and the URL are both checked first, so an error means nothing was queued.
    pub fn process_lead_async(
        &self,
        lead: LeadFields,
        mockup_url: Option<&str>,
    ) -> Result<Vec<TaskId>, CoreError> {
        lead.validate()?;
        let mockup_url = match mockup_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(raw) => Some(normalize_mockup_url(raw, &self.cfg.location)?),
            None => None,
        };

        let email = lead.email.clone();
        let mut ids = Vec::with_capacity(2);
        ids.extend(self.process_lead_basic_info_async(lead)?);
        if let Some(url) = mockup_url {
            ids.push(self.enqueue_mockup_url(email, url)?);
        }
        Ok(ids)
    }
}

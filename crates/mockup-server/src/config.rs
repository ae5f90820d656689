use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, anyhow};

use mockup_clients::{ActiveCampaignConfig, CrmFieldNames, LambdaConfig};
use mockup_core::LeadSyncConfig;
use mockup_model::{DEFAULT_REGION, StorageLocation};

/// Service configuration read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub lambda: LambdaConfig,
    pub crm: ActiveCampaignConfig,
    pub sync: LeadSyncConfig,
    /// Page the form redirects to after a submission.
    pub redirect_url: Option<String>,
}

impl AppConfig {
    /// Load from process variables; call `dotenvy::dotenv()` first to honor a `.env` file.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Vars(&lookup);

        let lambda = LambdaConfig::new(env.required("LAMBDA_API_ENDPOINT")?)
            .with_timeout(Duration::from_millis(env.parsed("LAMBDA_TIMEOUT_MS", 30_000u64)?));
        let lambda = match env.optional("AWS_API_KEY") {
            Some(key) => lambda.with_api_key(key),
            None => lambda,
        };

        let defaults = CrmFieldNames::default();
        let mut crm = ActiveCampaignConfig::new(
            env.required("ACTIVE_CAMPAIGN_URL")?,
            env.required("ACTIVE_CAMPAIGN_API_KEY")?,
        );
        crm.names = CrmFieldNames {
            segment: env.optional("CRM_SEGMENT_FIELD").unwrap_or(defaults.segment),
            mockup_url: env.optional("CRM_MOCKUP_URL_FIELD").unwrap_or(defaults.mockup_url),
            logo_url: env.optional("CRM_LOGO_URL_FIELD").unwrap_or(defaults.logo_url),
            list: env.optional("CRM_LIST_NAME").unwrap_or(defaults.list),
        };

        let location = StorageLocation::new(
            env.required("MOCKUP_BUCKET")?,
            env.optional("MOCKUP_REGION")
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        );
        let mut sync = LeadSyncConfig::new(location);
        sync.logo_settle_delay = Duration::from_millis(env.parsed("LOGO_SETTLE_DELAY_MS", 2_000u64)?);
        sync.logo_retry_delay = Duration::from_millis(env.parsed("LOGO_RETRY_DELAY_MS", 5_000u64)?);

        Ok(Self {
            listen_addr: env.parsed("MOCKUP_LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            lambda,
            crm,
            sync,
            redirect_url: env.optional("REDIRECT_URL"),
        })
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> anyhow::Result<String> {
        self.optional(key)
            .ok_or_else(|| anyhow!("{key} environment variable is required"))
    }

    fn parsed<T>(&self, key: &str, default: T) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.optional(key) {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("{key} has an invalid value: {raw}")),
            None => Ok(default),
        }
    }
}

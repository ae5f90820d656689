use serde::{Deserialize, Serialize};

use crate::domain::constants::MOCKUPS_PREFIX;
use crate::error::{ModelError, ModelResult};

/// Bucket that holds rendered mockups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageLocation {
    pub bucket: String,
    pub region: String,
}

impl StorageLocation {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
        }
    }

    /// Virtual-hosted style host, e.g. `bucket.s3.us-east-1.amazonaws.com`.
    pub fn host(&self) -> String {
        format!("{}.s3.{}.amazonaws.com", self.bucket, self.region)
    }

    /// Direct (unsigned) URL of an object key.
    pub fn object_url(&self, key: &str) -> String {
        format!("https://{}/{}", self.host(), key.trim_start_matches('/'))
    }
}

/// URL handed to the user before the real mockup exists.
///
/// The email is made path-safe by rewriting its first `@` and first `.`.
pub fn placeholder_mockup_url(email: &str, location: &StorageLocation) -> String {
    let safe = email.replacen('@', "-at-", 1).replacen('.', "-dot-", 1);
    location.object_url(&format!("{MOCKUPS_PREFIX}{safe}-placeholder.png"))
}

/// Turn whatever the rendering backend returned into the direct bucket URL stored in the CRM.
///
/// Steps, in order:
/// 1. drop the query string (pre-signed URLs expire);
/// 2. add the region to a region-less `s3.amazonaws.com` host;
/// 3. rebuild path-style or foreign-region URLs that name the bucket as `https://<host>/<key>`;
/// 4. reject anything outside `/mockups/` or not ending in `.png`.
pub fn normalize_mockup_url(raw: &str, location: &StorageLocation) -> ModelResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ModelError::InvalidMockupUrl("empty url".to_string()));
    }

    let mut url = match trimmed.split_once('?') {
        Some((direct, _query)) => direct.to_string(),
        None => trimmed.to_string(),
    };

    let regional = format!("s3.{}.amazonaws.com", location.region);
    if url.contains("s3.amazonaws.com") && !url.contains(&regional) {
        url = url.replacen("s3.amazonaws.com", &regional, 1);
    }

    let host = location.host();
    if !url.contains(&host) && url.contains(&location.bucket) && url.contains("amazonaws.com") {
        let parts: Vec<&str> = url.split('/').collect();
        if let Some(idx) = parts.iter().position(|p| p.contains(&location.bucket)) {
            let key = parts[idx + 1..].join("/");
            url = location.object_url(&key);
        }
    }

    if !url.contains(&format!("/{MOCKUPS_PREFIX}")) {
        return Err(ModelError::InvalidMockupUrl(format!(
            "{url} is outside /{MOCKUPS_PREFIX}"
        )));
    }
    if !url.ends_with(".png") {
        return Err(ModelError::InvalidMockupUrl(format!("{url} is not a png")));
    }
    Ok(url)
}

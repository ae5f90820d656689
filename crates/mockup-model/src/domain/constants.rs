//! Well-known values shared by the storage and CRM layers.

/// Key prefix under which the rendering backend stores generated mockups.
///
/// A mockup URL that does not contain `/mockups/` was not produced by the backend and must never reach the CRM.
pub const MOCKUPS_PREFIX: &str = "mockups/";

/// Region used when a bucket URL omits one.
pub const DEFAULT_REGION: &str = "us-east-1";

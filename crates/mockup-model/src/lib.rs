mod domain;
pub use domain::{LeadFields, StorageLocation, normalize_mockup_url, placeholder_mockup_url};
pub use domain::{MOCKUPS_PREFIX, DEFAULT_REGION};

mod error;
pub use error::{ModelError, ModelResult};

mod kind;
pub use kind::LogoKind;

mod strategy;
pub use strategy::RetryStrategy;

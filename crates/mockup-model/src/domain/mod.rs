mod lead;
pub use lead::LeadFields;

mod location;
pub use location::{StorageLocation, normalize_mockup_url, placeholder_mockup_url};

mod constants;
pub use constants::{DEFAULT_REGION, MOCKUPS_PREFIX};

//! HTTP implementations of the collaborators declared in `mockup_core::ports`.
//!
//! - [`LambdaRenderBackend`]: mockup rendering through an API-gateway fronted function.
//! - [`ActiveCampaignClient`]: contact, custom field and list management over REST v3.
mod active_campaign;
mod lambda;

pub use active_campaign::{
    ActiveCampaignClient, ActiveCampaignConfig, Contact, CrmFieldNames, Field, FieldType, List,
    list_string_id,
};
pub use lambda::{LambdaConfig, LambdaRenderBackend, parse_render_response};

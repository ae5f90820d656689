//! Interfaces of the external collaborators the lead flow depends on.
mod crm;
mod render;

pub use crm::{ContactId, CrmClient, CrmError};
pub use render::{RenderBackend, RenderError, RenderRequest, RenderedMockup};

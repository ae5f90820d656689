//! HTTP surface of the mockup lead flow.
//!
//! [`HttpApi`] mounts the routes over any [`ApiHandler`]; [`LeadFlowHandler`] is the
//! handler wired to the renderer, the lead sync service and the metrics registry.
mod adapter;
mod dto;
mod error;
mod handler;
mod http;

pub use adapter::LeadFlowHandler;
pub use dto::{Diagnostics, MockupResponse, MockupSubmission};
pub use error::ApiError;
pub use handler::ApiHandler;
pub use http::HttpApi;

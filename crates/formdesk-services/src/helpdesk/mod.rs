//! Helpdesk REST API client

mod client;
mod types;

pub use client::{HelpdeskApi, HelpdeskClient};
pub use types::UploadedAttachment;

//! Outbound ticket payload and the attachment records that feed it.
//!
//! Field names follow the helpdesk's REST API (snake_case JSON).

use serde::{Deserialize, Serialize};

pub const TICKET_CHANNEL: &str = "email";
pub const TICKET_VIA: &str = "api";
pub const TICKET_STATUS_OPEN: &str = "open";

/// Normalized metadata for a file stored by the helpdesk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDescriptor {
    pub url: String,
    pub name: String,
    pub size: u64,
    pub content_type: String,
}

/// A file that could not be uploaded; omitted from the ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedFile {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketCustomer {
    pub email: String,
    pub name: String,
    pub firstname: String,
    pub lastname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Party {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub from: Party,
    pub to: Vec<Party>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketMessage {
    pub channel: String,
    pub via: String,
    pub from_agent: bool,
    pub sender: Party,
    pub receiver: Party,
    pub source: MessageSource,
    pub subject: String,
    pub body_html: String,
    pub attachments: Vec<AttachmentDescriptor>,
    /// Sender integration the reply should appear to come from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketTag {
    pub name: String,
}

/// Complete ticket-creation request. Built fresh per submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketPayload {
    pub channel: String,
    pub via: String,
    pub customer: TicketCustomer,
    pub subject: String,
    pub messages: Vec<TicketMessage>,
    pub tags: Vec<TicketTag>,
    pub status: String,
}

/// The part of the ticket-creation response the service relies on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TicketCreated {
    pub id: u64,
}

/// Body returned to the browser after a ticket is created. The helpdesk host
/// and ticket URL are intentionally absent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub success: bool,
    pub ticket_id: u64,
    pub files_uploaded: usize,
    pub files_rejected: usize,
    pub rejected_files: Vec<RejectedFile>,
}

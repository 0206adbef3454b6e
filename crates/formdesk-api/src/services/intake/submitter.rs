//! Ticket payload assembly and submission

use formdesk_core::html::truncate_chars;
use formdesk_core::models::{
    AttachmentDescriptor, MessageSource, Party, TicketCreated, TicketCustomer, TicketMessage,
    TicketPayload, TicketTag, ValidatedSubmission, TICKET_CHANNEL, TICKET_STATUS_OPEN, TICKET_VIA,
};
use formdesk_core::validation::{sanitize_subject, MAX_TAG_LENGTH};
use formdesk_core::AppError;
use formdesk_services::HelpdeskApi;

use super::renderer::humanize_label;
use super::types::CustomerName;
use crate::error::upstream_error;

pub struct TicketDraft<'a> {
    pub submission: &'a ValidatedSubmission,
    pub body_html: String,
    pub attachments: Vec<AttachmentDescriptor>,
    pub support_email: &'a str,
    pub integration_id: Option<u64>,
}

/// Fallback chain: `fullName`, then `firstName`/`lastName`, then a split `name`,
/// then the local part of the email address.
pub fn resolve_customer_name(submission: &ValidatedSubmission) -> CustomerName {
    if let Some(full) = submission.field("fullName") {
        let (first, last) = split_name(full);
        return CustomerName {
            full: full.to_string(),
            first,
            last,
        };
    }

    let first = submission.field("firstName");
    let last = submission.field("lastName");
    if first.is_some() || last.is_some() {
        let first = first.unwrap_or_default().to_string();
        let last = last.unwrap_or_default().to_string();
        let full = format!("{first} {last}").trim().to_string();
        return CustomerName { full, first, last };
    }

    if let Some(name) = submission.field("name") {
        let (first, last) = split_name(name);
        return CustomerName {
            full: name.split_whitespace().collect::<Vec<_>>().join(" "),
            first,
            last,
        };
    }

    let local = submission
        .email()
        .split('@')
        .next()
        .unwrap_or_default()
        .to_string();
    CustomerName {
        full: local.clone(),
        first: local,
        last: String::new(),
    }
}

fn split_name(name: &str) -> (String, String) {
    let mut words = name.split_whitespace();
    let first = words.next().unwrap_or_default().to_string();
    let last = words.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// Client subject when one was supplied (already sanitized), otherwise
/// `"<Form Type> from <name>"`. Both paths come out escaped and capped.
pub fn resolve_subject(submission: &ValidatedSubmission, customer: &CustomerName) -> String {
    match submission.subject() {
        Some(subject) => subject.to_string(),
        None => sanitize_subject(&format!(
            "{} from {}",
            humanize_label(submission.form_type()),
            customer.full
        )),
    }
}

/// The form type first, then client tags without duplicates, each capped at 100
/// characters.
///
/// `raw` is read as a JSON array of strings; anything that is not such an array
/// (invalid JSON, an object, a bare string) is split on commas instead.
pub fn resolve_tags(form_type: &str, raw: Option<&str>) -> Vec<String> {
    let mut tags = vec![truncate_chars(form_type, MAX_TAG_LENGTH).to_string()];

    let client_tags = raw
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(parse_client_tags)
        .unwrap_or_default();

    for tag in client_tags {
        let tag = truncate_chars(tag.trim(), MAX_TAG_LENGTH).to_string();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

fn parse_client_tags(raw: &str) -> Vec<String> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => raw.split(',').map(str::to_string).collect(),
    }
}

pub fn build_payload(draft: TicketDraft<'_>) -> TicketPayload {
    let submission = draft.submission;
    let customer_name = resolve_customer_name(submission);
    let subject = resolve_subject(submission, &customer_name);
    let tags = resolve_tags(submission.form_type(), submission.field("tags"));

    let customer = Party {
        email: submission.email().to_string(),
        name: Some(customer_name.full.clone()).filter(|n| !n.is_empty()),
    };
    let support = Party {
        email: draft.support_email.to_string(),
        name: None,
    };

    let message = TicketMessage {
        channel: TICKET_CHANNEL.to_string(),
        via: TICKET_VIA.to_string(),
        from_agent: false,
        sender: customer.clone(),
        receiver: support.clone(),
        source: MessageSource {
            kind: TICKET_CHANNEL.to_string(),
            from: customer,
            to: vec![support],
        },
        subject: subject.clone(),
        body_html: draft.body_html,
        attachments: draft.attachments,
        integration_id: draft.integration_id,
    };

    TicketPayload {
        channel: TICKET_CHANNEL.to_string(),
        via: TICKET_VIA.to_string(),
        customer: TicketCustomer {
            email: submission.email().to_string(),
            name: customer_name.full,
            firstname: customer_name.first,
            lastname: customer_name.last,
        },
        subject,
        messages: vec![message],
        tags: tags.into_iter().map(|name| TicketTag { name }).collect(),
        status: TICKET_STATUS_OPEN.to_string(),
    }
}

/// Single attempt; any failure is a 502 for the caller.
pub async fn submit(
    helpdesk: &dyn HelpdeskApi,
    payload: &TicketPayload,
) -> Result<TicketCreated, AppError> {
    helpdesk
        .create_ticket(payload)
        .await
        .map_err(|e| upstream_error("ticketing", e))
}

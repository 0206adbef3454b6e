//! Ticket body rendering
//!
//! Every interpolated label and value passes through `escape_html` exactly once.
//! The body ends up as agent-visible HTML in the helpdesk.

use formdesk_core::html::escape_html;
use formdesk_core::models::{is_reserved_field, ValidatedSubmission};

use super::templates::TemplateRegistry;

/// Values up to this many characters (and without a newline) render inline.
const INLINE_MAX_CHARS: usize = 100;

const NO_DATA_NOTICE: &str = "<p><em>No additional data was submitted.</em></p>\n";

/// Render the ticket's initial message: a heading naming the form, then either the
/// registered template for the form type or the generic field listing.
pub fn render_body(templates: &TemplateRegistry, submission: &ValidatedSubmission) -> String {
    let mut html = format!(
        "<h2>{}</h2>\n",
        escape_html(&humanize_label(submission.form_type()))
    );

    let content = match templates.get(submission.form_type()) {
        Some(template) => template.render(submission),
        None => render_generic(submission),
    };

    if content.trim().is_empty() {
        html.push_str(NO_DATA_NOTICE);
    } else {
        html.push_str(&content);
    }
    html
}

/// List every non-reserved, non-blank field in submission order.
pub fn render_generic(submission: &ValidatedSubmission) -> String {
    let mut html = String::new();
    for (name, value) in submission.fields() {
        if is_reserved_field(name) || value.trim().is_empty() {
            continue;
        }
        push_field(&mut html, &humanize_label(name), value);
    }

    if html.is_empty() {
        html.push_str(NO_DATA_NOTICE);
    }
    html
}

/// Append one labelled value, inline when short and single-line, otherwise as a
/// whitespace-preserving block.
pub fn push_field(html: &mut String, label: &str, value: &str) {
    let value = value.trim().replace("\r\n", "\n");
    let label = escape_html(label);
    let escaped = escape_html(&value);

    if value.chars().count() <= INLINE_MAX_CHARS && !value.contains('\n') {
        html.push_str(&format!("<p><strong>{label}:</strong> {escaped}</p>\n"));
    } else {
        html.push_str(&format!(
            "<div><p><strong>{label}:</strong></p>\
             <div style=\"white-space: pre-wrap;\">{escaped}</div></div>\n"
        ));
    }
}

/// Turn a compact field identifier into a label: `companyName` and
/// `company_name` both become `Company Name`.
///
/// Splits on `-`, `_`, `.`, whitespace and on a lowercase letter or digit followed
/// by an uppercase letter, then uppercases the first character of each word.
/// Applying it to its own output is a no-op.
pub fn humanize_label(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in name.chars() {
        if c == '-' || c == '_' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        }

        let boundary = c.is_uppercase()
            && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit());
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }

        current.push(c);
        prev = Some(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|w| capitalize_first(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

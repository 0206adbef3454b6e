//! Per-form-type ticket templates
//!
//! A template lays out the fields it knows about in fixed sections; anything it
//! does not name is left out of the ticket. Form types without a template use the
//! generic renderer.

use formdesk_core::models::ValidatedSubmission;
use std::collections::HashMap;
use std::sync::Arc;

use super::renderer::push_field;

pub trait TicketTemplate: Send + Sync {
    /// Form type this template handles.
    fn form_type(&self) -> &'static str;

    /// HTML body for the submission. Must escape every value it interpolates.
    fn render(&self, submission: &ValidatedSubmission) -> String;
}

/// Form type to template lookup. Cheap to clone.
#[derive(Clone)]
pub struct TemplateRegistry {
    templates: HashMap<&'static str, Arc<dyn TicketTemplate>>,
}

impl TemplateRegistry {
    /// Registry with no templates; everything renders generically.
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn register(&mut self, template: Arc<dyn TicketTemplate>) {
        self.templates.insert(template.form_type(), template);
    }

    pub fn get(&self, form_type: &str) -> Option<&Arc<dyn TicketTemplate>> {
        self.templates.get(form_type)
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(BusinessLeadTemplate));
        registry
    }
}

/// Append a titled section with whichever of `fields` are present.
/// Nothing is written when none of them are.
fn push_section(
    html: &mut String,
    title: &str,
    submission: &ValidatedSubmission,
    fields: &[(&str, &str)],
) {
    let mut rows = String::new();
    for (name, label) in fields {
        if let Some(value) = submission.field(name) {
            push_field(&mut rows, label, value);
        }
    }
    if !rows.is_empty() {
        html.push_str(&format!("<h3>{title}</h3>\n"));
        html.push_str(&rows);
    }
}

/// Partnership enquiries. The details section depends on `organizationType`.
pub struct BusinessLeadTemplate;

impl TicketTemplate for BusinessLeadTemplate {
    fn form_type(&self) -> &'static str {
        "business-lead"
    }

    fn render(&self, submission: &ValidatedSubmission) -> String {
        let mut html = String::new();

        push_section(
            &mut html,
            "Contact",
            submission,
            &[
                ("fullName", "Name"),
                ("firstName", "First Name"),
                ("lastName", "Last Name"),
                ("name", "Name"),
                ("email", "Email"),
                ("phone", "Phone"),
                ("jobTitle", "Job Title"),
            ],
        );

        push_section(
            &mut html,
            "Company",
            submission,
            &[
                ("company", "Company"),
                ("website", "Website"),
                ("country", "Country"),
                ("organizationType", "Organization Type"),
            ],
        );

        let organization_type = submission
            .field("organizationType")
            .map(str::to_lowercase)
            .unwrap_or_default();

        match organization_type.as_str() {
            "agency" => push_section(
                &mut html,
                "Agency Details",
                submission,
                &[
                    ("agencySize", "Team Size"),
                    ("clientCount", "Active Clients"),
                    ("servicesOffered", "Services Offered"),
                ],
            ),
            "brand" => push_section(
                &mut html,
                "Brand Details",
                submission,
                &[
                    ("brandName", "Brand"),
                    ("productCategory", "Product Category"),
                    ("annualRevenue", "Annual Revenue"),
                    ("currentPlatform", "Current Platform"),
                ],
            ),
            "reseller" => push_section(
                &mut html,
                "Reseller Details",
                submission,
                &[
                    ("territory", "Territory"),
                    ("monthlyVolume", "Expected Monthly Volume"),
                    ("brandsCarried", "Brands Carried"),
                ],
            ),
            _ => {}
        }

        push_section(&mut html, "Message", submission, &[("message", "Message")]);

        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn lead(pairs: &[(&str, &str)]) -> ValidatedSubmission {
        let mut fields = IndexMap::new();
        fields.insert("formType".to_string(), "business-lead".to_string());
        fields.insert("email".to_string(), "lead@brand.io".to_string());
        for (k, v) in pairs {
            fields.insert(k.to_string(), v.to_string());
        }
        ValidatedSubmission::new("business-lead".into(), "lead@brand.io".into(), None, fields)
    }

    #[test]
    fn brand_section_only_for_brands() {
        let s = lead(&[
            ("organizationType", "Brand"),
            ("brandName", "Acme"),
            ("clientCount", "40"),
        ]);
        let html = BusinessLeadTemplate.render(&s);
        assert!(html.contains("<h3>Brand Details</h3>"));
        assert!(html.contains("<strong>Brand:</strong> Acme"));
        assert!(!html.contains("Agency Details"));
        assert!(!html.contains("Active Clients"));
    }

    #[test]
    fn agency_section_for_agencies() {
        let s = lead(&[("organizationType", "agency"), ("clientCount", "12")]);
        let html = BusinessLeadTemplate.render(&s);
        assert!(html.contains("<h3>Agency Details</h3>"));
        assert!(html.contains("<strong>Active Clients:</strong> 12"));
    }

    #[test]
    fn unknown_fields_are_not_shown() {
        let s = lead(&[("utmCampaign", "spring"), ("message", "<hi>")]);
        let html = BusinessLeadTemplate.render(&s);
        assert!(!html.contains("spring"));
        assert!(html.contains("&lt;hi&gt;"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let s = lead(&[]);
        let html = BusinessLeadTemplate.render(&s);
        assert!(html.contains("<h3>Contact</h3>"));
        assert!(!html.contains("<h3>Company</h3>"));
        assert!(!html.contains("<h3>Message</h3>"));
    }

    #[test]
    fn registry_has_business_lead_only() {
        let registry = TemplateRegistry::default();
        assert!(registry.get("business-lead").is_some());
        assert!(registry.get("contact-form").is_none());
        assert!(TemplateRegistry::empty().get("business-lead").is_none());
    }
}

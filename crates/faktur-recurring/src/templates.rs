use chrono::{DateTime, NaiveDate, Utc};
use faktur_core::{
    Frequency, Invoice, InvoiceStatus, RecurringTemplate, TemplateState, ValidationError,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TEMPLATE_NUMBER: &str = "TEMPLATE";

/// Fields of the "create recurring invoice" form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRequest {
    pub name: String,
    pub frequency: Frequency,
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Builds a new active template from the form and the invoice currently open
/// in the editor.
pub fn create_template(
    request: &TemplateRequest,
    source: &Invoice,
    now: DateTime<Utc>,
) -> Result<RecurringTemplate, ValidationError> {
    let (name, start_date) = validate(request, source)?;

    Ok(RecurringTemplate {
        id: Uuid::new_v4(),
        name,
        frequency: request.frequency,
        start_date,
        end_date: request.end_date,
        next_due_date: Some(start_date),
        last_generated_at: None,
        days_between_invoices: request.frequency.fixed_day_count(),
        state: TemplateState::Active,
        invoice_template: snapshot(source, now),
        created_at: now,
    })
}

/// Re-creates `existing` from an edited form, keeping its identity and
/// generation history. The schedule restarts at the new start date.
pub fn update_template(
    existing: &RecurringTemplate,
    request: &TemplateRequest,
    source: &Invoice,
    now: DateTime<Utc>,
) -> Result<RecurringTemplate, ValidationError> {
    let mut updated = create_template(request, source, now)?;
    updated.id = existing.id;
    updated.created_at = existing.created_at;
    updated.last_generated_at = existing.last_generated_at;
    Ok(updated)
}

/// Inserts `template`, replacing any stored template with the same id.
pub fn upsert_template(templates: &mut Vec<RecurringTemplate>, template: RecurringTemplate) {
    match templates.iter_mut().find(|stored| stored.id == template.id) {
        Some(stored) => *stored = template,
        None => templates.push(template),
    }
}

/// Flips Active and Inactive. Returns false for unknown ids and expired
/// templates, which stay untouched.
pub fn toggle_active(templates: &mut [RecurringTemplate], id: Uuid) -> bool {
    let Some(template) = templates.iter_mut().find(|template| template.id == id) else {
        return false;
    };

    template.state = match template.state {
        TemplateState::Active => TemplateState::Inactive,
        TemplateState::Inactive => TemplateState::Active,
        TemplateState::Expired => return false,
    };
    true
}

pub fn delete_template(templates: &mut Vec<RecurringTemplate>, id: Uuid) -> bool {
    let before = templates.len();
    templates.retain(|template| template.id != id);
    templates.len() != before
}

/// Case-insensitive match on template name or customer name.
pub fn search_templates<'a>(
    templates: &'a [RecurringTemplate],
    query: &str,
) -> Vec<&'a RecurringTemplate> {
    let query = query.trim().to_lowercase();
    templates
        .iter()
        .filter(|template| {
            query.is_empty()
                || template.name.to_lowercase().contains(&query)
                || template.customer_name().to_lowercase().contains(&query)
        })
        .collect()
}

fn validate(
    request: &TemplateRequest,
    source: &Invoice,
) -> Result<(String, NaiveDate), ValidationError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }

    let start_date = request.start_date.ok_or(ValidationError::StartDateRequired)?;
    if request.end_date.is_some_and(|end| end < start_date) {
        return Err(ValidationError::EndBeforeStart);
    }

    if source.customer_name().trim().is_empty() {
        return Err(ValidationError::CustomerRequired);
    }

    Ok((name.to_string(), start_date))
}

fn snapshot(source: &Invoice, now: DateTime<Utc>) -> Invoice {
    Invoice {
        id: Uuid::new_v4(),
        invoice_number: TEMPLATE_NUMBER.to_string(),
        status: InvoiceStatus::Draft,
        paid_date: None,
        paid_amount: None,
        created_at: now,
        ..source.clone()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use faktur_core::Party;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    fn open_invoice() -> Invoice {
        let mut invoice = Invoice::draft("INV-014", now());
        invoice.parties.to = Party::named("Toko Makmur");
        invoice.status = InvoiceStatus::Paid;
        invoice
    }

    fn request() -> TemplateRequest {
        TemplateRequest {
            name: "  Cleaning contract ".to_string(),
            frequency: Frequency::Quarterly,
            start_date: Some(date(2024, 2, 1)),
            end_date: Some(date(2024, 12, 31)),
        }
    }

    #[test]
    fn creates_active_template_from_open_invoice() {
        let template = create_template(&request(), &open_invoice(), now()).unwrap();

        assert_eq!(template.name, "Cleaning contract");
        assert_eq!(template.state, TemplateState::Active);
        assert_eq!(template.next_due_date, Some(date(2024, 2, 1)));
        assert_eq!(template.days_between_invoices, 90);
        assert_eq!(template.invoice_template.invoice_number, TEMPLATE_NUMBER);
        assert_eq!(template.invoice_template.status, InvoiceStatus::Draft);
        assert_eq!(template.customer_name(), "Toko Makmur");
    }

    #[test]
    fn rejects_invalid_forms() {
        let mut blank_name = request();
        blank_name.name = "   ".to_string();
        assert_eq!(
            create_template(&blank_name, &open_invoice(), now()).unwrap_err(),
            ValidationError::NameRequired
        );

        let mut no_start = request();
        no_start.start_date = None;
        assert_eq!(
            create_template(&no_start, &open_invoice(), now()).unwrap_err(),
            ValidationError::StartDateRequired
        );

        let mut reversed = request();
        reversed.end_date = Some(date(2024, 1, 31));
        assert_eq!(
            create_template(&reversed, &open_invoice(), now()).unwrap_err(),
            ValidationError::EndBeforeStart
        );

        let anonymous = Invoice::draft("INV-015", now());
        assert_eq!(
            create_template(&request(), &anonymous, now()).unwrap_err(),
            ValidationError::CustomerRequired
        );
    }

    #[test]
    fn end_date_equal_to_start_is_allowed() {
        let mut single_day = request();
        single_day.end_date = single_day.start_date;
        assert!(create_template(&single_day, &open_invoice(), now()).is_ok());
    }

    #[test]
    fn update_keeps_identity_and_history() {
        let mut original = create_template(&request(), &open_invoice(), now()).unwrap();
        original.last_generated_at = Some(now());
        original.next_due_date = Some(date(2024, 5, 1));

        let mut edited = request();
        edited.frequency = Frequency::Monthly;
        let updated = update_template(&original, &edited, &open_invoice(), now()).unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.last_generated_at, original.last_generated_at);
        assert_eq!(updated.frequency, Frequency::Monthly);
        assert_eq!(updated.next_due_date, Some(date(2024, 2, 1)));

        let mut templates = vec![original];
        upsert_template(&mut templates, updated.clone());
        assert_eq!(templates, vec![updated]);
    }

    #[test]
    fn toggle_and_delete_ignore_unknown_ids() {
        let template = create_template(&request(), &open_invoice(), now()).unwrap();
        let id = template.id;
        let mut templates = vec![template];

        assert!(!toggle_active(&mut templates, Uuid::new_v4()));
        assert!(toggle_active(&mut templates, id));
        assert_eq!(templates[0].state, TemplateState::Inactive);
        assert!(toggle_active(&mut templates, id));
        assert_eq!(templates[0].state, TemplateState::Active);

        templates[0].state = TemplateState::Expired;
        assert!(!toggle_active(&mut templates, id));

        assert!(!delete_template(&mut templates, Uuid::new_v4()));
        assert_eq!(templates.len(), 1);
        assert!(delete_template(&mut templates, id));
        assert!(templates.is_empty());
    }

    #[test]
    fn search_matches_name_or_customer() {
        let template = create_template(&request(), &open_invoice(), now()).unwrap();
        let templates = vec![template];

        assert_eq!(search_templates(&templates, "cleaning").len(), 1);
        assert_eq!(search_templates(&templates, "MAKMUR").len(), 1);
        assert_eq!(search_templates(&templates, "").len(), 1);
        assert!(search_templates(&templates, "payroll").is_empty());
    }
}

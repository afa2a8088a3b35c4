use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use faktur_core::{
    DomainEvent, DomainEventKind, Frequency, Invoice, InvoiceStatus, RecurringTemplate,
    TemplateState,
};
use faktur_finance::{next_invoice_number, next_number_from};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Days between a generated invoice's issue date and its due date.
pub const PAYMENT_TERM_DAYS: u64 = 14;

/// How a template's due date moves forward after a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Advancement {
    /// Weekly/biweekly by days, the rest by calendar months and years.
    #[default]
    CalendarUnits,
    /// The template's stored `days_between_invoices`.
    FixedDayCount,
}

impl Advancement {
    pub fn step(&self, date: NaiveDate, template: &RecurringTemplate) -> Option<NaiveDate> {
        match self {
            Advancement::CalendarUnits => calendar_step(date, template.frequency),
            Advancement::FixedDayCount => {
                let days = u64::from(template.days_between_invoices.max(1));
                date.checked_add_days(Days::new(days))
            }
        }
    }
}

/// One calendar step; month arithmetic clamps to the last day of shorter
/// months (Jan 31 + 1 month = Feb 29 in a leap year).
pub fn calendar_step(date: NaiveDate, frequency: Frequency) -> Option<NaiveDate> {
    match frequency {
        Frequency::Weekly => date.checked_add_days(Days::new(7)),
        Frequency::Biweekly => date.checked_add_days(Days::new(14)),
        Frequency::Monthly => date.checked_add_months(Months::new(1)),
        Frequency::Quarterly => date.checked_add_months(Months::new(3)),
        Frequency::Yearly => date.checked_add_months(Months::new(12)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Inactive or already expired; not looked at.
    Skipped,
    /// End date passed during this evaluation.
    Expired,
    NotDue,
    Generated(Invoice),
}

#[derive(Debug, Clone, Default)]
pub struct CycleOutcome {
    pub generated: Vec<Invoice>,
    pub events: Vec<DomainEvent>,
    pub templates_changed: bool,
}

impl CycleOutcome {
    pub fn expired_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| event.kind == DomainEventKind::TemplateExpired)
            .count()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecurrenceEngine {
    advancement: Advancement,
}

impl RecurrenceEngine {
    pub fn new(advancement: Advancement) -> Self {
        Self { advancement }
    }

    /// Evaluates a single template at `now`, numbering a generated invoice
    /// against `existing`.
    pub fn evaluate(
        &self,
        template: &mut RecurringTemplate,
        existing: &[Invoice],
        now: DateTime<Utc>,
    ) -> Evaluation {
        self.evaluate_with(template, now, || next_invoice_number(existing))
    }

    /// Evaluates every template once. Invoices generated earlier in the cycle
    /// count towards numbering for later templates.
    pub fn run_cycle(
        &self,
        templates: &mut [RecurringTemplate],
        invoices: &[Invoice],
        now: DateTime<Utc>,
    ) -> CycleOutcome {
        let mut outcome = CycleOutcome::default();

        for template in templates.iter_mut() {
            let generated = &outcome.generated;
            let evaluation = self.evaluate_with(template, now, || {
                next_number_from(
                    invoices
                        .iter()
                        .chain(generated.iter())
                        .map(|invoice| invoice.invoice_number.as_str()),
                )
            });

            match evaluation {
                Evaluation::Generated(invoice) => {
                    outcome.events.push(generated_event(template, &invoice, now));
                    outcome.generated.push(invoice);
                    outcome.templates_changed = true;
                }
                Evaluation::Expired => {
                    outcome.events.push(expired_event(template, now));
                    outcome.templates_changed = true;
                }
                Evaluation::Skipped | Evaluation::NotDue => {}
            }
        }

        outcome
    }

    /// Generates an invoice immediately regardless of the due date and
    /// consumes the current period. Expired templates never generate.
    pub fn generate_now(
        &self,
        template: &mut RecurringTemplate,
        existing: &[Invoice],
        now: DateTime<Utc>,
    ) -> Option<Invoice> {
        if template.state == TemplateState::Expired {
            return None;
        }

        let today = now.date_naive();
        let current = template.effective_next_due();
        let first = self.advancement.step(current, template).unwrap_or(current);
        let invoice = materialize(template, next_invoice_number(existing), now);
        template.next_due_date = Some(self.advance_past(template, first, today));
        template.last_generated_at = Some(now);
        Some(invoice)
    }

    fn evaluate_with<F>(
        &self,
        template: &mut RecurringTemplate,
        now: DateTime<Utc>,
        next_number: F,
    ) -> Evaluation
    where
        F: FnOnce() -> String,
    {
        if !template.is_active() {
            return Evaluation::Skipped;
        }

        let today = now.date_naive();
        if template.end_date.is_some_and(|end| today > end) {
            template.state = TemplateState::Expired;
            return Evaluation::Expired;
        }

        let due = template.effective_next_due();
        if due > today {
            return Evaluation::NotDue;
        }

        let invoice = materialize(template, next_number(), now);
        template.next_due_date = Some(self.advance_past(template, due, today));
        template.last_generated_at = Some(now);
        Evaluation::Generated(invoice)
    }

    /// Steps `from` forward until it lies strictly after `today`; missed
    /// periods are skipped, not back-filled.
    fn advance_past(
        &self,
        template: &RecurringTemplate,
        from: NaiveDate,
        today: NaiveDate,
    ) -> NaiveDate {
        let mut next = from;
        while next <= today {
            match self.advancement.step(next, template) {
                Some(stepped) if stepped > next => next = stepped,
                _ => break,
            }
        }
        next
    }
}

/// Active templates whose due date has been reached and whose end date has
/// not passed.
pub fn due_templates(templates: &[RecurringTemplate], today: NaiveDate) -> Vec<&RecurringTemplate> {
    templates
        .iter()
        .filter(|template| template.is_active())
        .filter(|template| template.end_date.is_none_or(|end| today <= end))
        .filter(|template| template.effective_next_due() <= today)
        .collect()
}

fn materialize(
    template: &RecurringTemplate,
    invoice_number: String,
    now: DateTime<Utc>,
) -> Invoice {
    let today = now.date_naive();

    Invoice {
        id: Uuid::new_v4(),
        invoice_number,
        issue_date: Some(today),
        due_date: today.checked_add_days(Days::new(PAYMENT_TERM_DAYS)),
        status: InvoiceStatus::Draft,
        paid_date: None,
        paid_amount: None,
        created_at: now,
        ..template.invoice_template.clone()
    }
}

fn generated_event(
    template: &RecurringTemplate,
    invoice: &Invoice,
    now: DateTime<Utc>,
) -> DomainEvent {
    DomainEvent::new(
        template.id,
        DomainEventKind::InvoiceGenerated,
        now,
        json!({
            "templateName": template.name,
            "invoiceId": invoice.id,
            "invoiceNumber": invoice.invoice_number,
            "nextDueDate": template.next_due_date,
        }),
    )
}

fn expired_event(template: &RecurringTemplate, now: DateTime<Utc>) -> DomainEvent {
    DomainEvent::new(
        template.id,
        DomainEventKind::TemplateExpired,
        now,
        json!({
            "templateName": template.name,
            "endDate": template.end_date,
        }),
    )
}

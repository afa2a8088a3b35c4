use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::Currency;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: i64, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiscountMode {
    #[default]
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiscountConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub mode: DiscountMode,
    #[serde(default)]
    pub value: Decimal,
}

impl DiscountConfig {
    pub fn percentage(value: Decimal) -> Self {
        Self {
            enabled: true,
            mode: DiscountMode::Percentage,
            value,
        }
    }

    pub fn fixed(value: Decimal) -> Self {
        Self {
            enabled: true,
            mode: DiscountMode::Fixed,
            value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Party {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub whatsapp: String,
}

impl Party {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Parties {
    pub from: Party,
    pub to: Party,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }
}

/// A saved invoice as it round-trips through the persistence layer.
///
/// Calendar dates are optional because stored payloads are not guaranteed to
/// carry them; derived totals are never stored and are always recomputed from
/// `items`, `discount` and `tax_enabled`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub parties: Parties,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub discount: DiscountConfig,
    #[serde(default)]
    pub tax_enabled: bool,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub terms: String,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default)]
    pub paid_date: Option<NaiveDate>,
    #[serde(default)]
    pub paid_amount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Blank draft with a fresh id, the shape the editor starts from.
    pub fn draft(invoice_number: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            invoice_number: invoice_number.into(),
            issue_date: Some(created_at.date_naive()),
            due_date: None,
            payment_method: String::new(),
            parties: Parties::default(),
            items: Vec::new(),
            discount: DiscountConfig::default(),
            tax_enabled: false,
            currency: Currency::default(),
            notes: String::new(),
            terms: String::new(),
            status: InvoiceStatus::Draft,
            paid_date: None,
            paid_amount: None,
            created_at,
        }
    }

    pub fn customer_name(&self) -> &str {
        &self.parties.to.name
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Day count used by the fixed-interval advancement strategy.
    pub fn fixed_day_count(&self) -> u32 {
        match self {
            Frequency::Weekly => 7,
            Frequency::Biweekly => 14,
            Frequency::Monthly => 30,
            Frequency::Quarterly => 90,
            Frequency::Yearly => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemplateState {
    #[default]
    Active,
    Inactive,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTemplate {
    pub id: Uuid,
    pub name: String,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub next_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_generated_at: Option<DateTime<Utc>>,
    pub days_between_invoices: u32,
    #[serde(default)]
    pub state: TemplateState,
    pub invoice_template: Invoice,
    pub created_at: DateTime<Utc>,
}

impl RecurringTemplate {
    /// Next due date, falling back to the start date when none was recorded.
    pub fn effective_next_due(&self) -> NaiveDate {
        self.next_due_date.unwrap_or(self.start_date)
    }

    pub fn is_active(&self) -> bool {
        self.state == TemplateState::Active
    }

    pub fn customer_name(&self) -> &str {
        self.invoice_template.customer_name()
    }
}

/// One period of a report time series. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportBucket {
    pub label: String,
    pub period_start: NaiveDate,
    pub total: Decimal,
}

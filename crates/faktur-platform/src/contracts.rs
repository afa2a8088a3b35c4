use chrono::{DateTime, NaiveDate, Utc};
use faktur_core::{Currency, DiscountConfig, Invoice, InvoiceStatus, LineItem, Parties};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry of an import file. Exports produced elsewhere may lack an id,
/// a status or a creation time; everything else defaults to empty.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportedInvoice {
    pub id: Option<Uuid>,
    pub invoice_number: String,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub payment_method: String,
    pub parties: Parties,
    pub items: Vec<LineItem>,
    pub discount: DiscountConfig,
    pub tax_enabled: bool,
    pub currency: Currency,
    pub notes: String,
    pub terms: String,
    pub status: Option<InvoiceStatus>,
    pub paid_date: Option<NaiveDate>,
    pub paid_amount: Option<Decimal>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ImportedInvoice {
    pub fn into_invoice(self, now: DateTime<Utc>) -> Invoice {
        Invoice {
            id: self.id.filter(|id| !id.is_nil()).unwrap_or_else(Uuid::new_v4),
            invoice_number: self.invoice_number,
            issue_date: self.issue_date,
            due_date: self.due_date,
            payment_method: self.payment_method,
            parties: self.parties,
            items: self.items,
            discount: self.discount,
            tax_enabled: self.tax_enabled,
            currency: self.currency,
            notes: self.notes,
            terms: self.terms,
            status: self.status.unwrap_or_default(),
            paid_date: self.paid_date,
            paid_amount: self.paid_amount,
            created_at: self.created_at.unwrap_or(now),
        }
    }
}

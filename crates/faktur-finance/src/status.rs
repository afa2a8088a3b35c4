use chrono::NaiveDate;
use faktur_core::{Invoice, InvoiceStatus};

use crate::calculation::invoice_totals;

/// Moves an invoice to `new_status`.
///
/// Marking an invoice paid fills in a missing (or zero) paid amount with the
/// invoice total and a missing paid date with `today`. Other transitions leave
/// recorded payment data alone.
pub fn apply_status(mut invoice: Invoice, new_status: InvoiceStatus, today: NaiveDate) -> Invoice {
    invoice.status = new_status;

    if new_status == InvoiceStatus::Paid {
        if invoice.paid_date.is_none() {
            invoice.paid_date = Some(today);
        }
        if invoice.paid_amount.is_none_or(|amount| amount.is_zero()) {
            invoice.paid_amount = Some(invoice_totals(&invoice).total);
        }
    }

    invoice
}

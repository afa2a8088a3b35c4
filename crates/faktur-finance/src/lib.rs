pub mod calculation;
pub mod numbering;
pub mod status;

pub use calculation::{
    InvoiceTotals, compute_totals, discount_amount, format_currency, invoice_totals, subtotal,
    sum_amounts, tax_amount, total,
};
pub use numbering::{
    DEFAULT_PREFIX, increment_invoice_number, next_invoice_number, next_number_from,
};
pub use status::apply_status;

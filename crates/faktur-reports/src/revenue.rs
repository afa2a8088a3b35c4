use std::collections::{BTreeMap, HashMap};

use chrono::{Months, NaiveDate};
use faktur_core::{Currency, Invoice, InvoiceStatus, ReportBucket};
use faktur_finance::{invoice_totals, sum_amounts};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::period::Granularity;
use crate::summary::{CustomerTotal, TOP_CUSTOMER_LIMIT, accumulate, rank_customers};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReportPeriod {
    #[default]
    AllTime,
    ThisMonth,
    LastMonth,
    ThisQuarter,
    ThisYear,
    Custom { from: NaiveDate, to: NaiveDate },
}

impl ReportPeriod {
    /// Inclusive date range relative to `today`, or `None` for all time.
    pub fn bounds(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let month_start = Granularity::Monthly.period_start(today);
        match self {
            ReportPeriod::AllTime => None,
            ReportPeriod::ThisMonth => Some((month_start, end_after(month_start, 1))),
            ReportPeriod::LastMonth => {
                let start = month_start
                    .checked_sub_months(Months::new(1))
                    .unwrap_or(month_start);
                Some((start, end_after(start, 1)))
            }
            ReportPeriod::ThisQuarter => {
                let start = Granularity::Quarterly.period_start(today);
                Some((start, end_after(start, 3)))
            }
            ReportPeriod::ThisYear => {
                let start = Granularity::Yearly.period_start(today);
                Some((start, end_after(start, 12)))
            }
            ReportPeriod::Custom { from, to } => Some((*from, *to)),
        }
    }
}

/// Last day of the `months`-long span beginning at `start`.
fn end_after(start: NaiveDate, months: u32) -> NaiveDate {
    start
        .checked_add_months(Months::new(months))
        .and_then(|next| next.pred_opt())
        .unwrap_or(start)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RevenueQuery {
    pub period: ReportPeriod,
    #[serde(default)]
    pub currency: Option<Currency>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub total_revenue: Decimal,
    pub outstanding: Decimal,
    pub paid_count: usize,
    pub unpaid_count: usize,
    pub overdue_count: usize,
    pub revenue_by_month: Vec<ReportBucket>,
    pub top_customers: Vec<CustomerTotal>,
}

/// Overdue as of `today`: not paid and past the due date. Unlike
/// [`crate::stored_overdue`] this ignores the stored Overdue status.
pub fn is_overdue_at(invoice: &Invoice, today: NaiveDate) -> bool {
    invoice.status != InvoiceStatus::Paid && invoice.due_date.is_some_and(|due| due < today)
}

fn paid_amount(invoice: &Invoice) -> Decimal {
    if invoice.status == InvoiceStatus::Paid {
        invoice.paid_amount.unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

/// Paid amounts bucketed by the month they were paid in. Paid invoices without
/// a paid date are left out.
pub fn revenue_by_paid_month(invoices: &[&Invoice]) -> Vec<ReportBucket> {
    let mut months: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for invoice in invoices {
        if invoice.status != InvoiceStatus::Paid {
            continue;
        }
        let Some(paid_on) = invoice.paid_date else {
            continue;
        };
        let month = months
            .entry(Granularity::Monthly.period_start(paid_on))
            .or_insert(Decimal::ZERO);
        accumulate(month, paid_amount(invoice));
    }

    months
        .into_iter()
        .map(|(period_start, total)| ReportBucket {
            label: Granularity::Monthly.label(period_start),
            period_start,
            total,
        })
        .collect()
}

/// Payers ranked by what they actually paid. Customers with only unpaid
/// invoices still appear, with a zero total.
pub fn top_customers_by_paid(invoices: &[&Invoice], limit: usize) -> Vec<CustomerTotal> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for invoice in invoices {
        let total = totals.entry(invoice.customer_name()).or_insert(Decimal::ZERO);
        accumulate(total, paid_amount(invoice));
    }
    rank_customers(totals, limit)
}

pub fn revenue_report(
    invoices: &[Invoice],
    query: &RevenueQuery,
    today: NaiveDate,
) -> RevenueReport {
    let bounds = query.period.bounds(today);
    let selected: Vec<&Invoice> = invoices
        .iter()
        .filter(|invoice| query.currency.is_none_or(|currency| invoice.currency == currency))
        .filter(|invoice| match bounds {
            None => true,
            Some((from, to)) => invoice
                .issue_date
                .is_some_and(|issued| issued >= from && issued <= to),
        })
        .collect();

    let (paid, unpaid): (Vec<&Invoice>, Vec<&Invoice>) = selected
        .iter()
        .copied()
        .partition(|invoice| invoice.status == InvoiceStatus::Paid);

    RevenueReport {
        total_revenue: sum_amounts(paid.iter().map(|invoice| paid_amount(invoice))),
        outstanding: sum_amounts(unpaid.iter().map(|invoice| invoice_totals(invoice).total)),
        paid_count: paid.len(),
        unpaid_count: unpaid.len(),
        overdue_count: selected
            .iter()
            .filter(|invoice| is_overdue_at(invoice, today))
            .count(),
        revenue_by_month: revenue_by_paid_month(&selected),
        top_customers: top_customers_by_paid(&selected, TOP_CUSTOMER_LIMIT),
    }
}

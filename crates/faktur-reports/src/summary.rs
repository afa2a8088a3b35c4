use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use faktur_core::{Currency, Invoice, InvoiceStatus, ReportBucket};
use faktur_finance::{invoice_totals, sum_amounts};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::period::Granularity;

pub const TOP_CUSTOMER_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub currency: Currency,
    pub granularity: Granularity,
}

/// Amounts by stored status. `unpaid_not_overdue` and `overdue` together make
/// up everything sent but not paid; drafts are not counted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub paid: Decimal,
    pub unpaid_not_overdue: Decimal,
    pub overdue: Decimal,
}

impl StatusBreakdown {
    pub fn unpaid(&self) -> Decimal {
        self.unpaid_not_overdue.saturating_add(self.overdue)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerTotal {
    pub name: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_revenue: Decimal,
    pub invoice_count: usize,
    pub status: StatusBreakdown,
    pub time_series: Vec<ReportBucket>,
    pub top_customers: Vec<CustomerTotal>,
}

/// Invoices issued within `[from, to]` (inclusive) in the selected currency.
/// Invoices without an issue date never match.
pub fn filter_invoices<'a>(invoices: &'a [Invoice], query: &ReportQuery) -> Vec<&'a Invoice> {
    invoices
        .iter()
        .filter(|invoice| invoice.currency == query.currency)
        .filter(|invoice| {
            invoice
                .issue_date
                .is_some_and(|issued| issued >= query.from && issued <= query.to)
        })
        .collect()
}

/// Totals per period in chronological order. Daily series cover every day of
/// the query range, including days without invoices.
pub fn time_series(filtered: &[&Invoice], query: &ReportQuery) -> Vec<ReportBucket> {
    let granularity = query.granularity;
    let mut buckets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    if granularity == Granularity::Daily && query.from <= query.to {
        for day in query.from.iter_days().take_while(|day| *day <= query.to) {
            buckets.insert(day, Decimal::ZERO);
        }
    }

    for invoice in filtered {
        let Some(issued) = invoice.issue_date else {
            continue;
        };
        let bucket = buckets
            .entry(granularity.period_start(issued))
            .or_insert(Decimal::ZERO);
        accumulate(bucket, invoice_totals(invoice).total);
    }

    buckets
        .into_iter()
        .map(|(period_start, total)| ReportBucket {
            label: granularity.label(period_start),
            period_start,
            total,
        })
        .collect()
}

/// Overdue as recorded by the user; the due date is not consulted.
pub fn stored_overdue(invoice: &Invoice) -> bool {
    invoice.status == InvoiceStatus::Overdue
}

pub fn status_breakdown(filtered: &[&Invoice]) -> StatusBreakdown {
    let mut breakdown = StatusBreakdown::default();

    for invoice in filtered {
        let total = invoice_totals(invoice).total;
        if stored_overdue(invoice) {
            accumulate(&mut breakdown.overdue, total);
            continue;
        }
        match invoice.status {
            InvoiceStatus::Paid => accumulate(&mut breakdown.paid, total),
            InvoiceStatus::Sent => accumulate(&mut breakdown.unpaid_not_overdue, total),
            InvoiceStatus::Draft | InvoiceStatus::Overdue => {}
        }
    }

    breakdown
}

/// Payers ranked by the sum of their invoice totals, whatever the status.
pub fn top_customers_by_total(filtered: &[&Invoice], limit: usize) -> Vec<CustomerTotal> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for invoice in filtered {
        let total = totals.entry(invoice.customer_name()).or_insert(Decimal::ZERO);
        accumulate(total, invoice_totals(invoice).total);
    }
    rank_customers(totals, limit)
}

pub fn summarize(invoices: &[Invoice], query: &ReportQuery) -> ReportSummary {
    let filtered = filter_invoices(invoices, query);

    ReportSummary {
        total_revenue: sum_amounts(
            filtered
                .iter()
                .map(|invoice| invoice_totals(invoice).total),
        ),
        invoice_count: filtered.len(),
        status: status_breakdown(&filtered),
        time_series: time_series(&filtered, query),
        top_customers: top_customers_by_total(&filtered, TOP_CUSTOMER_LIMIT),
    }
}

/// Adds into a running total without overflowing.
pub(crate) fn accumulate(total: &mut Decimal, amount: Decimal) {
    *total = total.saturating_add(amount);
}

/// Highest amount first; ties are broken by name so output is stable.
pub(crate) fn rank_customers(
    totals: HashMap<&str, Decimal>,
    limit: usize,
) -> Vec<CustomerTotal> {
    let mut ranked: Vec<CustomerTotal> = totals
        .into_iter()
        .map(|(name, total)| CustomerTotal {
            name: name.to_string(),
            total,
        })
        .collect();
    ranked.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use faktur_core::{LineItem, Party};

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn invoice(
        customer: &str,
        issued: NaiveDate,
        amount: i64,
        status: InvoiceStatus,
        currency: Currency,
    ) -> Invoice {
        let mut invoice = Invoice::draft("INV-001", Utc::now());
        invoice.parties.to = Party::named(customer);
        invoice.issue_date = Some(issued);
        invoice.items = vec![LineItem::new("Service", 1, Decimal::from(amount))];
        invoice.status = status;
        invoice.currency = currency;
        invoice
    }

    fn query(from: NaiveDate, to: NaiveDate, granularity: Granularity) -> ReportQuery {
        ReportQuery {
            from,
            to,
            currency: Currency::IDR,
            granularity,
        }
    }

    #[test]
    fn same_month_invoices_share_a_bucket() {
        let invoices = vec![
            invoice("A", date(2024, 1, 5), 100_000, InvoiceStatus::Sent, Currency::IDR),
            invoice("B", date(2024, 1, 20), 250_000, InvoiceStatus::Paid, Currency::IDR),
        ];
        let query = query(date(2024, 1, 1), date(2024, 12, 31), Granularity::Monthly);
        let filtered = filter_invoices(&invoices, &query);

        let series = time_series(&filtered, &query);
        assert_eq!(
            series,
            vec![ReportBucket {
                label: "Jan 2024".to_string(),
                period_start: date(2024, 1, 1),
                total: Decimal::from(350_000),
            }]
        );
    }

    #[test]
    fn buckets_are_chronological_across_years() {
        let invoices = vec![
            invoice("A", date(2025, 1, 3), 1, InvoiceStatus::Sent, Currency::IDR),
            invoice("A", date(2024, 11, 3), 2, InvoiceStatus::Sent, Currency::IDR),
            invoice("A", date(2024, 3, 3), 3, InvoiceStatus::Sent, Currency::IDR),
        ];
        let query = query(date(2024, 1, 1), date(2025, 12, 31), Granularity::Monthly);
        let filtered = filter_invoices(&invoices, &query);

        let labels: Vec<_> = time_series(&filtered, &query)
            .into_iter()
            .map(|bucket| bucket.label)
            .collect();
        assert_eq!(labels, vec!["Mar 2024", "Nov 2024", "Jan 2025"]);
    }

    #[test]
    fn quarterly_and_yearly_keys() {
        let invoices = vec![
            invoice("A", date(2024, 2, 10), 10, InvoiceStatus::Sent, Currency::IDR),
            invoice("A", date(2024, 3, 31), 20, InvoiceStatus::Sent, Currency::IDR),
            invoice("A", date(2024, 4, 1), 30, InvoiceStatus::Sent, Currency::IDR),
            invoice("A", date(2023, 12, 31), 40, InvoiceStatus::Sent, Currency::IDR),
        ];
        let quarterly = query(date(2023, 1, 1), date(2024, 12, 31), Granularity::Quarterly);
        let filtered = filter_invoices(&invoices, &quarterly);

        let series: Vec<_> = time_series(&filtered, &quarterly)
            .into_iter()
            .map(|bucket| (bucket.label, bucket.total))
            .collect();
        assert_eq!(
            series,
            vec![
                ("2023-Q4".to_string(), Decimal::from(40)),
                ("2024-Q1".to_string(), Decimal::from(30)),
                ("2024-Q2".to_string(), Decimal::from(30)),
            ]
        );

        let yearly = ReportQuery {
            granularity: Granularity::Yearly,
            ..quarterly
        };
        let years: Vec<_> = time_series(&filtered, &yearly)
            .into_iter()
            .map(|bucket| bucket.label)
            .collect();
        assert_eq!(years, vec!["2023", "2024"]);
    }

    #[test]
    fn daily_series_fills_empty_days() {
        let invoices = vec![invoice(
            "A",
            date(2024, 5, 2),
            500,
            InvoiceStatus::Sent,
            Currency::IDR,
        )];
        let query = query(date(2024, 5, 1), date(2024, 5, 3), Granularity::Daily);
        let filtered = filter_invoices(&invoices, &query);

        let totals: Vec<_> = time_series(&filtered, &query)
            .into_iter()
            .map(|bucket| bucket.total)
            .collect();
        assert_eq!(totals, vec![Decimal::ZERO, Decimal::from(500), Decimal::ZERO]);
    }

    #[test]
    fn filter_is_inclusive_and_currency_specific() {
        let invoices = vec![
            invoice("A", date(2024, 1, 1), 1, InvoiceStatus::Sent, Currency::IDR),
            invoice("A", date(2024, 1, 31), 1, InvoiceStatus::Sent, Currency::IDR),
            invoice("A", date(2024, 2, 1), 1, InvoiceStatus::Sent, Currency::IDR),
            invoice("A", date(2024, 1, 15), 1, InvoiceStatus::Sent, Currency::USD),
        ];
        let query = query(date(2024, 1, 1), date(2024, 1, 31), Granularity::Monthly);
        assert_eq!(filter_invoices(&invoices, &query).len(), 2);
    }

    #[test]
    fn status_split_uses_stored_status_only() {
        let mut late_but_sent =
            invoice("A", date(2024, 1, 2), 100, InvoiceStatus::Sent, Currency::IDR);
        late_but_sent.due_date = Some(date(2024, 1, 3));
        let invoices = vec![
            late_but_sent,
            invoice("B", date(2024, 1, 2), 200, InvoiceStatus::Overdue, Currency::IDR),
            invoice("C", date(2024, 1, 2), 400, InvoiceStatus::Paid, Currency::IDR),
            invoice("D", date(2024, 1, 2), 800, InvoiceStatus::Draft, Currency::IDR),
        ];
        let query = query(date(2024, 1, 1), date(2024, 12, 31), Granularity::Monthly);
        let filtered = filter_invoices(&invoices, &query);

        let breakdown = status_breakdown(&filtered);
        assert_eq!(breakdown.paid, Decimal::from(400));
        assert_eq!(breakdown.unpaid_not_overdue, Decimal::from(100));
        assert_eq!(breakdown.overdue, Decimal::from(200));
        assert_eq!(breakdown.unpaid(), Decimal::from(300));
    }

    #[test]
    fn top_customers_sum_all_totals() {
        let mut invoices = vec![
            invoice("Alpha", date(2024, 1, 2), 100, InvoiceStatus::Sent, Currency::IDR),
            invoice("Alpha", date(2024, 1, 3), 100, InvoiceStatus::Paid, Currency::IDR),
            invoice("Beta", date(2024, 1, 4), 150, InvoiceStatus::Draft, Currency::IDR),
        ];
        for (index, name) in ["C", "D", "E", "F"].into_iter().enumerate() {
            let amount = i64::try_from(index).unwrap() + 1;
            let issued = date(2024, 1, 5);
            invoices.push(invoice(name, issued, amount, InvoiceStatus::Sent, Currency::IDR));
        }
        let query = query(date(2024, 1, 1), date(2024, 1, 31), Granularity::Monthly);

        let summary = summarize(&invoices, &query);
        let names: Vec<_> = summary
            .top_customers
            .iter()
            .map(|customer| customer.name.as_str())
            .collect();
        assert_eq!(names, vec!["Alpha", "Beta", "F", "E", "D"]);
        assert_eq!(summary.top_customers[0].total, Decimal::from(200));
        assert_eq!(summary.invoice_count, 7);
        assert_eq!(summary.total_revenue, Decimal::from(360));
    }

    #[test]
    fn huge_invoices_saturate_the_summary() {
        let mut invoices = Vec::new();
        for customer in ["A", "B"] {
            let issued = date(2024, 1, 2);
            let mut huge = invoice(customer, issued, 0, InvoiceStatus::Sent, Currency::IDR);
            huge.items = vec![LineItem::new("Everything", 1, Decimal::MAX)];
            invoices.push(huge);
        }
        let query = query(date(2024, 1, 1), date(2024, 1, 31), Granularity::Monthly);

        let summary = summarize(&invoices, &query);
        assert_eq!(summary.total_revenue, Decimal::MAX);
        assert_eq!(summary.status.unpaid_not_overdue, Decimal::MAX);
        assert_eq!(summary.time_series[0].total, Decimal::MAX);
    }
}

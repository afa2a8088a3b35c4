pub mod period;
pub mod revenue;
pub mod summary;

pub use period::Granularity;
pub use revenue::{
    ReportPeriod, RevenueQuery, RevenueReport, is_overdue_at, revenue_by_paid_month,
    revenue_report, top_customers_by_paid,
};
pub use summary::{
    CustomerTotal, ReportQuery, ReportSummary, StatusBreakdown, TOP_CUSTOMER_LIMIT,
    filter_invoices, status_breakdown, stored_overdue, summarize, time_series,
    top_customers_by_total,
};

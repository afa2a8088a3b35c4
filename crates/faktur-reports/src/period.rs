use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl Granularity {
    /// First day of the period containing `date`. Weeks start on Monday.
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        let start = match self {
            Granularity::Daily => Some(date),
            Granularity::Weekly => {
                let offset = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(offset))
            }
            Granularity::Monthly => date.with_day(1),
            Granularity::Quarterly => {
                let first_month = (date.month0() / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(date.year(), first_month, 1)
            }
            Granularity::Yearly => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        };
        start.unwrap_or(date)
    }

    /// Display label for a period start: `2024-01-05`, `Jan 2024`, `2024-Q1`,
    /// `2024`. Weekly buckets are labelled by their Monday.
    pub fn label(&self, period_start: NaiveDate) -> String {
        match self {
            Granularity::Daily | Granularity::Weekly => {
                period_start.format("%Y-%m-%d").to_string()
            }
            Granularity::Monthly => period_start.format("%b %Y").to_string(),
            Granularity::Quarterly => {
                format!("{}-Q{}", period_start.year(), period_start.month0() / 3 + 1)
            }
            Granularity::Yearly => period_start.year().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn period_starts() {
        let day = date(2024, 8, 15);
        assert_eq!(Granularity::Daily.period_start(day), day);
        assert_eq!(Granularity::Weekly.period_start(day), date(2024, 8, 12));
        assert_eq!(Granularity::Weekly.period_start(date(2024, 8, 12)), date(2024, 8, 12));
        assert_eq!(Granularity::Weekly.period_start(date(2024, 8, 18)), date(2024, 8, 12));
        assert_eq!(Granularity::Monthly.period_start(day), date(2024, 8, 1));
        assert_eq!(Granularity::Quarterly.period_start(day), date(2024, 7, 1));
        assert_eq!(Granularity::Yearly.period_start(day), date(2024, 1, 1));
    }

    #[test]
    fn week_can_start_in_previous_year() {
        assert_eq!(Granularity::Weekly.period_start(date(2025, 1, 1)), date(2024, 12, 30));
    }

    #[test]
    fn labels() {
        assert_eq!(Granularity::Monthly.label(date(2024, 3, 1)), "Mar 2024");
        assert_eq!(Granularity::Quarterly.label(date(2024, 10, 1)), "2024-Q4");
        assert_eq!(Granularity::Yearly.label(date(2024, 1, 1)), "2024");
        assert_eq!(Granularity::Weekly.label(date(2024, 8, 12)), "2024-08-12");
    }
}

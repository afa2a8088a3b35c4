use faktur_core::Invoice;

pub const DEFAULT_PREFIX: &str = "INV";
const MIN_WIDTH: usize = 3;

/// Next sequential number for a stored collection, e.g. `INV-008` after
/// `INV-001`, `INV-007`, `INV-003`.
pub fn next_invoice_number(invoices: &[Invoice]) -> String {
    next_number_from(invoices.iter().map(|invoice| invoice.invoice_number.as_str()))
}

/// Same as [`next_invoice_number`] over bare numbers, in storage order.
///
/// The maximum numeric suffix wins; prefix and padding follow the last
/// (most recently stored) number.
pub fn next_number_from<'a, I>(numbers: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut highest: u64 = 0;
    let mut latest: Option<&str> = None;

    for number in numbers {
        highest = highest.max(parse_suffix(number));
        latest = Some(number);
    }

    let (prefix, width) = match latest {
        Some(number) => convention_of(number),
        None => (DEFAULT_PREFIX, MIN_WIDTH),
    };

    format_number(prefix, highest.saturating_add(1), width)
}

/// Bumps a single number by one, keeping its prefix and padding
/// (`INV-2024-009` -> `INV-2024-010`).
pub fn increment_invoice_number(number: &str) -> String {
    let (prefix, width) = convention_of(number);
    format_number(prefix, parse_suffix(number).saturating_add(1), width)
}

fn suffix_of(number: &str) -> &str {
    match number.rsplit_once('-') {
        Some((_, suffix)) => suffix,
        None => number,
    }
}

/// Leading digits of the part after the last `-`; anything else counts as 0.
fn parse_suffix(number: &str) -> u64 {
    let digits: String = suffix_of(number.trim())
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

fn convention_of(number: &str) -> (&str, usize) {
    let number = number.trim();
    match number.rsplit_once('-') {
        Some((prefix, suffix)) if !prefix.is_empty() => {
            let digits = suffix.chars().take_while(char::is_ascii_digit).count();
            (prefix, digits.max(MIN_WIDTH))
        }
        _ => (DEFAULT_PREFIX, MIN_WIDTH),
    }
}

fn format_number(prefix: &str, value: u64, width: usize) -> String {
    format!("{prefix}-{value:0width$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collection_starts_at_one() {
        assert_eq!(next_invoice_number(&[]), "INV-001");
    }

    #[test]
    fn takes_maximum_not_last() {
        assert_eq!(next_number_from(["INV-001", "INV-007", "INV-003"]), "INV-008");
    }

    #[test]
    fn non_numeric_suffix_counts_as_zero() {
        assert_eq!(next_number_from(["TEMPLATE"]), "INV-001");
        assert_eq!(next_number_from(["INV-ABC", "INV-002"]), "INV-003");
    }

    #[test]
    fn reuses_latest_prefix_and_width() {
        assert_eq!(next_number_from(["INV-001", "FAK-2024-0041"]), "FAK-2024-0042");
        assert_eq!(next_number_from(["INV-999"]), "INV-1000");
    }

    #[test]
    fn increments_single_number_for_duplicates() {
        assert_eq!(increment_invoice_number("INV-009"), "INV-010");
        assert_eq!(increment_invoice_number("INV-2024-0099"), "INV-2024-0100");
        assert_eq!(increment_invoice_number("draft"), "INV-001");
    }

    #[test]
    fn never_collides_with_existing_numbers() {
        let mut numbers = vec!["INV-001".to_string()];
        for _ in 0..50 {
            let next = next_number_from(numbers.iter().map(String::as_str));
            assert!(!numbers.contains(&next));
            numbers.push(next);
        }
        assert_eq!(numbers.last().map(String::as_str), Some("INV-051"));
    }
}

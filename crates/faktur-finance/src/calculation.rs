use faktur_core::{
    Currency, DiscountConfig, DiscountMode, Invoice, LineItem, PpnProfile, TaxProfile,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Sum of `quantity * unit_price`. Negative quantities or prices count as
/// zero, and so does a line whose amount does not fit in a `Decimal`.
pub fn subtotal(items: &[LineItem]) -> Decimal {
    sum_amounts(items.iter().map(|item| {
        let quantity = Decimal::from(item.quantity.max(0));
        let unit_price = item.unit_price.max(Decimal::ZERO);
        quantity.checked_mul(unit_price).unwrap_or(Decimal::ZERO)
    }))
}

/// Adds amounts, saturating at the `Decimal` bounds instead of panicking.
pub fn sum_amounts<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |sum, amount| sum.saturating_add(amount))
}

/// Absolute discount for the given subtotal.
///
/// A fixed discount is passed through as-is, even when it exceeds the
/// subtotal and drives the invoice total negative.
pub fn discount_amount(subtotal: Decimal, discount: &DiscountConfig) -> Decimal {
    if !discount.enabled {
        return Decimal::ZERO;
    }

    let value = discount.value.max(Decimal::ZERO);
    match discount.mode {
        DiscountMode::Percentage => match subtotal.checked_mul(value) {
            Some(scaled) => scaled / Decimal::ONE_HUNDRED,
            None => (subtotal / Decimal::ONE_HUNDRED).saturating_mul(value),
        },
        DiscountMode::Fixed => value,
    }
}

pub fn tax_amount(subtotal: Decimal, discount: Decimal, tax_enabled: bool) -> Decimal {
    if !tax_enabled {
        return Decimal::ZERO;
    }

    subtotal.saturating_sub(discount).saturating_mul(PpnProfile.rate())
}

pub fn total(subtotal: Decimal, discount: Decimal, tax: Decimal) -> Decimal {
    subtotal.saturating_sub(discount).saturating_add(tax)
}

pub fn compute_totals(
    items: &[LineItem],
    discount: &DiscountConfig,
    tax_enabled: bool,
) -> InvoiceTotals {
    let subtotal = subtotal(items);
    let discount = discount_amount(subtotal, discount);
    let tax = tax_amount(subtotal, discount, tax_enabled);

    InvoiceTotals {
        subtotal,
        discount,
        tax,
        total: total(subtotal, discount, tax),
    }
}

pub fn invoice_totals(invoice: &Invoice) -> InvoiceTotals {
    compute_totals(&invoice.items, &invoice.discount, invoice.tax_enabled)
}

/// Renders an amount with the currency's symbol, precision and digit grouping,
/// e.g. `Rp 1.000.000`, `$1,234.50`, `SAR 99.00`.
pub fn format_currency(amount: Decimal, currency: Currency) -> String {
    let config = currency.config();
    let mut rounded = amount
        .round_dp_with_strategy(config.decimal_places, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded.set_sign_positive(true);
    rounded.rescale(config.decimal_places);

    let digits = rounded.to_string();
    let (integer_part, fraction_part) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut body = group_digits(integer_part, config.group_separator);
    if let Some(fraction) = fraction_part {
        body.push(config.decimal_separator);
        body.push_str(fraction);
    }

    let separator = if config.spaced_symbol { " " } else { "" };
    let sign = if negative { "-" } else { "" };
    format!("{sign}{}{separator}{body}", config.symbol)
}

fn group_digits(integer_part: &str, separator: char) -> String {
    let len = integer_part.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (index, digit) in integer_part.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }
    grouped
}

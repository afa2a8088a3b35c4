use rust_decimal::Decimal;

pub trait TaxProfile {
    fn name(&self) -> &'static str;
    /// Rate applied to the discounted subtotal, as a fraction (0.11 = 11%).
    fn rate(&self) -> Decimal;
}

/// Indonesian value-added tax (PPN) at the flat 11% rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PpnProfile;

impl TaxProfile for PpnProfile {
    fn name(&self) -> &'static str {
        "PPN 11%"
    }

    fn rate(&self) -> Decimal {
        Decimal::new(11, 2)
    }
}

use serde::{Deserialize, Serialize};

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Currency {
    #[default]
    IDR,
    USD,
    SAR,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyConfig {
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimal_places: u32,
    pub group_separator: char,
    pub decimal_separator: char,
    /// Whether the symbol is followed by a space (`Rp 1.000`, `$1,000.00`).
    pub spaced_symbol: bool,
}

const IDR_CONFIG: CurrencyConfig = CurrencyConfig {
    code: "IDR",
    symbol: "Rp",
    name: "Indonesian Rupiah",
    decimal_places: 0,
    group_separator: '.',
    decimal_separator: ',',
    spaced_symbol: true,
};

const USD_CONFIG: CurrencyConfig = CurrencyConfig {
    code: "USD",
    symbol: "$",
    name: "US Dollar",
    decimal_places: 2,
    group_separator: ',',
    decimal_separator: '.',
    spaced_symbol: false,
};

const SAR_CONFIG: CurrencyConfig = CurrencyConfig {
    code: "SAR",
    symbol: "SAR",
    name: "Saudi Riyal",
    decimal_places: 2,
    group_separator: ',',
    decimal_separator: '.',
    spaced_symbol: true,
};

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::IDR, Currency::USD, Currency::SAR];

    pub fn config(&self) -> &'static CurrencyConfig {
        match self {
            Currency::IDR => &IDR_CONFIG,
            Currency::USD => &USD_CONFIG,
            Currency::SAR => &SAR_CONFIG,
        }
    }

    pub fn code(&self) -> &'static str {
        self.config().code
    }

    pub fn from_code(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|currency| currency.code() == normalized)
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

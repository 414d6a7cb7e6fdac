//! Money and VAT types using decimal arithmetic.
//!
//! Invoice arithmetic must be exact: three lines of 100, 200 and 300 at a
//! 10 % VAT rate give 600 net, 60 VAT and 660 gross, with no binary
//! floating-point residue. Amounts therefore use [`Decimal`] throughout.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A monetary amount with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (dirhams, not centimes).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A price in Moroccan dirhams.
    #[must_use]
    pub const fn mad(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::MAD)
    }

    /// Format for a French-language document, e.g. `12 345,60 MAD`.
    ///
    /// The amount is rounded half away from zero to two decimals, thousands
    /// are separated by a space and the decimal separator is a comma.
    #[must_use]
    pub fn display_fr(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let text = format!("{:.2}", rounded.abs());
        let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(digit);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}{grouped},{cents} {}", self.currency_code.code())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_fr())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    MAD,
    EUR,
    USD,
}

impl CurrencyCode {
    /// The three-letter code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MAD => "MAD",
            Self::EUR => "EUR",
            Self::USD => "USD",
        }
    }
}

/// A VAT rate stored as a fraction (`0.10` for 10 %).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct VatRate(Decimal);

impl VatRate {
    /// Zero rate.
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[must_use]
    pub const fn new(fraction: Decimal) -> Self {
        Self(fraction)
    }

    #[must_use]
    pub const fn fraction(&self) -> Decimal {
        self.0
    }

    /// Rate as a percentage (`10` for `0.10`), with trailing zeros removed.
    #[must_use]
    pub fn percent(&self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED).normalize()
    }

    /// VAT due on a net amount.
    #[must_use]
    pub fn apply(&self, net: Decimal) -> Decimal {
        net * self.0
    }
}

impl fmt::Display for VatRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

//! Amounts in words for the legal total line of an invoice.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Spells a monetary amount in words.
pub trait AmountSpeller: Send + Sync {
    /// Spell `amount` (negative amounts are spelled by magnitude).
    fn spell(&self, amount: Decimal) -> String;
}

/// French spelling of dirham amounts.
///
/// Uses the traditional rules: `et` before `un` and `onze` up to
/// `soixante`, plural `cents` and `quatre-vingts` only at the end of a
/// number, invariable `mille`, and `de` after a round number of millions.
/// Feminine agreement (`une`) is never applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrenchAmountSpeller;

impl AmountSpeller for FrenchAmountSpeller {
    fn spell(&self, amount: Decimal) -> String {
        let rounded = amount
            .abs()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let whole_part = rounded.trunc();
        let whole = whole_part.to_u64().unwrap_or(u64::MAX);
        let cents = ((rounded - whole_part) * Decimal::ONE_HUNDRED)
            .to_u64()
            .unwrap_or_default();

        let mut text = spell_integer(whole);
        if whole >= 1_000_000 && whole % 1_000_000 == 0 {
            text.push_str(" de");
        }
        text.push_str(" dirham");
        if whole > 1 {
            text.push('s');
        }
        if cents > 0 {
            text.push_str(" et ");
            text.push_str(&spell_integer(cents));
            text.push_str(" centime");
            if cents > 1 {
                text.push('s');
            }
        }
        text
    }
}

const fn small(n: u64) -> &'static str {
    match n {
        1 => "un",
        2 => "deux",
        3 => "trois",
        4 => "quatre",
        5 => "cinq",
        6 => "six",
        7 => "sept",
        8 => "huit",
        9 => "neuf",
        10 => "dix",
        11 => "onze",
        12 => "douze",
        13 => "treize",
        14 => "quatorze",
        15 => "quinze",
        16 => "seize",
        _ => "zéro",
    }
}

// 70s and 90s count on from soixante and quatre-vingt.
const fn tens(n: u64) -> &'static str {
    match n {
        1 => "dix",
        2 => "vingt",
        3 => "trente",
        4 => "quarante",
        5 => "cinquante",
        6 | 7 => "soixante",
        _ => "quatre-vingt",
    }
}

fn below_hundred(n: u64, last: bool) -> String {
    match n {
        0..=16 => small(n).to_string(),
        17..=19 => format!("dix-{}", small(n - 10)),
        _ => {
            let ten = n / 10;
            let rest = if ten == 7 || ten == 9 { n % 10 + 10 } else { n % 10 };
            let base = tens(ten);
            match rest {
                0 if ten == 8 && last => "quatre-vingts".to_string(),
                0 => base.to_string(),
                1 | 11 if ten < 8 => format!("{base} et {}", small(rest)),
                _ => format!("{base}-{}", below_hundred(rest, last)),
            }
        }
    }
}

fn below_thousand(n: u64, last: bool) -> String {
    let hundreds = n / 100;
    let rest = n % 100;
    let head = match hundreds {
        0 => return below_hundred(rest, last),
        1 => "cent".to_string(),
        h if rest == 0 && last => format!("{} cents", small(h)),
        h => format!("{} cent", small(h)),
    };
    if rest == 0 {
        head
    } else {
        format!("{head} {}", below_hundred(rest, last))
    }
}

fn spell_integer(n: u64) -> String {
    if n == 0 {
        return "zéro".to_string();
    }

    let mut parts = Vec::new();
    let mut rest = n;
    for (size, noun) in [(1_000_000_000, "milliard"), (1_000_000, "million")] {
        let count = rest / size;
        rest %= size;
        if count > 0 {
            let plural = if count > 1 { "s" } else { "" };
            parts.push(format!("{} {noun}{plural}", spell_integer(count)));
        }
    }

    let thousands = rest / 1000;
    rest %= 1000;
    match thousands {
        0 => {}
        1 => parts.push("mille".to_string()),
        t => parts.push(format!("{} mille", below_thousand(t, false))),
    }
    if rest > 0 {
        parts.push(below_thousand(rest, true));
    }
    parts.join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use core::str::FromStr;

    use super::*;

    fn spell(amount: &str) -> String {
        FrenchAmountSpeller.spell(Decimal::from_str(amount).unwrap())
    }

    #[test]
    fn test_invoice_total() {
        assert_eq!(spell("660"), "six cent soixante dirhams");
        assert_eq!(spell("660").to_uppercase(), "SIX CENT SOIXANTE DIRHAMS");
    }

    #[test]
    fn test_tens_idioms() {
        assert_eq!(spell("21"), "vingt et un dirhams");
        assert_eq!(spell("71"), "soixante et onze dirhams");
        assert_eq!(spell("77"), "soixante-dix-sept dirhams");
        assert_eq!(spell("80"), "quatre-vingts dirhams");
        assert_eq!(spell("81"), "quatre-vingt-un dirhams");
        assert_eq!(spell("91"), "quatre-vingt-onze dirhams");
        assert_eq!(spell("99"), "quatre-vingt-dix-neuf dirhams");
    }

    #[test]
    fn test_hundreds_and_thousands() {
        assert_eq!(spell("1"), "un dirham");
        assert_eq!(spell("100"), "cent dirhams");
        assert_eq!(spell("200"), "deux cents dirhams");
        assert_eq!(spell("201"), "deux cent un dirhams");
        assert_eq!(spell("1000"), "mille dirhams");
        assert_eq!(spell("80000"), "quatre-vingt mille dirhams");
        assert_eq!(spell("200000"), "deux cent mille dirhams");
    }

    #[test]
    fn test_millions() {
        assert_eq!(spell("1000000"), "un million de dirhams");
        assert_eq!(spell("2500000"), "deux millions cinq cent mille dirhams");
        assert_eq!(spell("3000000000"), "trois milliards de dirhams");
    }

    #[test]
    fn test_centimes() {
        assert_eq!(
            spell("1234.56"),
            "mille deux cent trente-quatre dirhams et cinquante-six centimes"
        );
        assert_eq!(spell("0.01"), "zéro dirham et un centime");
        assert_eq!(spell("10.005"), "dix dirhams et un centime");
    }
}

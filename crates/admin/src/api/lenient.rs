//! Forgiving deserializers for spreadsheet-shaped backend records.
//!
//! Records originate from ERP spreadsheets, so the same column can arrive as
//! a JSON string on one row and a number on the next (`"200123"` vs
//! `200123`), and blank cells arrive as `""` or `null`.

use rust_decimal::Decimal;
use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Self::Str(s) => s.trim().to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{f:.0}")
                } else {
                    f.to_string()
                }
            }
            Self::Bool(b) => b.to_string(),
        }
    }
}

/// String from a string or number; `null` becomes an empty string.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_text)
        .unwrap_or_default())
}

/// Optional string from a string or number; blank values become `None`.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_text)
        .filter(|s| !s.is_empty()))
}

/// Float from a number or numeric string; blanks become `0.0`.
pub fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_f64(deserializer)?.unwrap_or(0.0))
}

/// Optional float from a number or numeric string.
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        #[allow(clippy::cast_precision_loss)] // spreadsheet quantities stay far below 2^52
        Some(Scalar::Int(i)) => Ok(Some(i as f64)),
        Some(Scalar::Float(f)) => Ok(Some(f)),
        Some(Scalar::Bool(_)) => Err(de::Error::custom("expected a number")),
        Some(Scalar::Str(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                s.replace(',', ".").parse().map(Some).map_err(de::Error::custom)
            }
        }
    }
}

/// Optional decimal from a number or numeric string.
pub fn opt_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(i)) => Ok(Some(Decimal::from(i))),
        Some(Scalar::Float(f)) => Decimal::try_from(f).map(Some).map_err(de::Error::custom),
        Some(Scalar::Bool(_)) => Err(de::Error::custom("expected a number")),
        Some(Scalar::Str(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                s.replace(',', ".").parse().map(Some).map_err(de::Error::custom)
            }
        }
    }
}

/// Count from a number or numeric string; blanks become `0`.
pub fn u32_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = opt_f64(deserializer)?.unwrap_or(0.0);
    if value < 0.0 || value > f64::from(u32::MAX) || value.fract() != 0.0 {
        return Err(de::Error::custom(format!("expected a whole count, got {value}")));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked above
    Ok(value as u32)
}

/// Parsed value of a label column, `None` when blank or unrecognised.
pub fn opt_parsed<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
{
    Ok(opt_string(deserializer)?.and_then(|s| s.parse().ok()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "super::string")]
        code: String,
        #[serde(default, deserialize_with = "super::opt_f64")]
        qty: Option<f64>,
        #[serde(default, deserialize_with = "super::u32_or_zero")]
        seals: u32,
    }

    #[test]
    fn test_accepts_numbers_and_strings() {
        let row: Row = serde_json::from_str(r#"{"code": 200123, "qty": "12,5", "seals": "4"}"#).unwrap();
        assert_eq!(row.code, "200123");
        assert_eq!(row.qty, Some(12.5));
        assert_eq!(row.seals, 4);
    }

    #[test]
    fn test_blank_and_missing_values() {
        let row: Row = serde_json::from_str(r#"{"code": null, "qty": ""}"#).unwrap();
        assert_eq!(row.code, "");
        assert_eq!(row.qty, None);
        assert_eq!(row.seals, 0);
    }

    #[test]
    fn test_float_codes_render_without_fraction() {
        let row: Row = serde_json::from_str(r#"{"code": 1020.0}"#).unwrap();
        assert_eq!(row.code, "1020");
    }
}

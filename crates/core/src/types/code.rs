//! Business codes exchanged with the ERP export.
//!
//! Spreadsheet exports carry codes with formatting noise: material codes and
//! document numbers are left-padded with zeros (`000000000000200123`) and
//! vehicle registrations are typed with separators (`12345-A-6`). The
//! normalized form is the one the backend stores, so every code entering the
//! system goes through [`strip_leading_zeros`] or [`strip_separators`].
//!
//! Both helpers are idempotent: normalizing an already normalized code
//! returns it unchanged.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a business code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    /// The input is empty after trimming.
    #[error("code cannot be empty")]
    Empty,
}

/// Remove leading `0` characters from a code.
///
/// A code made only of zeros collapses to the empty string, matching how the
/// backend stores such values.
#[must_use]
pub fn strip_leading_zeros(value: &str) -> String {
    value.trim().trim_start_matches('0').to_string()
}

/// Remove separator characters (`-` and whitespace) from a vehicle identifier.
#[must_use]
pub fn strip_separators(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

macro_rules! define_code {
    ($(#[$meta:meta])* $name:ident, $normalize:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse and normalize a code.
            ///
            /// # Errors
            ///
            /// Returns [`CodeError::Empty`] if nothing is left after normalization.
            pub fn parse(value: &str) -> Result<Self, CodeError> {
                let normalize: fn(&str) -> String = $normalize;
                let normalized = normalize(value);
                if normalized.is_empty() {
                    return Err(CodeError::Empty);
                }
                Ok(Self(normalized))
            }

            /// Get the normalized code as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_code!(
    /// A product material code with leading zeros removed.
    MaterialCode,
    strip_leading_zeros
);

define_code!(
    /// A depot (plant) code, kept as written apart from surrounding whitespace.
    PlantCode,
    |s| s.trim().to_string()
);

define_code!(
    /// A truck registration with separators removed, in upper case.
    VehicleId,
    |s| strip_separators(s).to_uppercase()
);

impl PlantCode {
    /// Customer code used for internal depot-to-depot transfers (`CP` + plant).
    #[must_use]
    pub fn transfer_customer(&self) -> String {
        format!("CP{}", self.0)
    }

    /// Extract the plant code from a transfer customer reference.
    ///
    /// Accepts both `CP1234` and a bare `1234`.
    ///
    /// # Errors
    ///
    /// Returns [`CodeError::Empty`] if no plant code remains.
    pub fn from_transfer_customer(customer: &str) -> Result<Self, CodeError> {
        let trimmed = customer.trim();
        Self::parse(trimmed.strip_prefix("CP").unwrap_or(trimmed))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_leading_zeros() {
        assert_eq!(strip_leading_zeros("000200123"), "200123");
        assert_eq!(strip_leading_zeros("200123"), "200123");
        assert_eq!(strip_leading_zeros("1020"), "1020");
        assert_eq!(strip_leading_zeros("0000"), "");
    }

    #[test]
    fn test_strip_leading_zeros_is_idempotent() {
        for input in ["000123", "123", "0", "00100", " 0042 "] {
            let once = strip_leading_zeros(input);
            assert_eq!(strip_leading_zeros(&once), once);
        }
    }

    #[test]
    fn test_strip_separators() {
        assert_eq!(strip_separators("12345-A-6"), "12345A6");
        assert_eq!(strip_separators("12 345 A 6"), "12345A6");
        assert_eq!(strip_separators("12345A6"), "12345A6");
    }

    #[test]
    fn test_material_code_parse() {
        let code = MaterialCode::parse("0000200123").unwrap();
        assert_eq!(code.as_str(), "200123");
        assert_eq!(MaterialCode::parse("000"), Err(CodeError::Empty));
    }

    #[test]
    fn test_plant_transfer_customer() {
        let plant = PlantCode::from_transfer_customer("CP1020").unwrap();
        assert_eq!(plant.as_str(), "1020");
        assert_eq!(plant.transfer_customer(), "CP1020");

        let bare = PlantCode::from_transfer_customer("1020").unwrap();
        assert_eq!(bare, plant);
    }

    #[test]
    fn test_vehicle_id_serializes_normalized() {
        let vehicle = VehicleId::parse("1234-A-56").unwrap();
        assert_eq!(serde_json::to_string(&vehicle).unwrap(), "\"1234A56\"");
        assert_eq!(VehicleId::parse("1234-a-56").unwrap(), vehicle);
        assert_eq!(VehicleId::parse(" - "), Err(CodeError::Empty));
    }
}

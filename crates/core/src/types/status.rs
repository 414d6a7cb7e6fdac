//! Status enums for orders, trips and import runs.
//!
//! The backend stores these as human-readable strings (`"In Progress"`,
//! `"VRAC"`), so each enum serializes to the exact label the dashboard shows.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a status label is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Lifecycle of a sales order line item.
///
/// Orders move forward only: `Created -> Planning -> Loading -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Created,
    Planning,
    Loading,
    Completed,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Created, Self::Planning, Self::Loading, Self::Completed];

    /// Backend label for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Planning => "Planning",
            Self::Loading => "Loading",
            Self::Completed => "Completed",
        }
    }

    /// The status that follows this one, if any.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Created => Some(Self::Planning),
            Self::Planning => Some(Self::Loading),
            Self::Loading => Some(Self::Completed),
            Self::Completed => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant::new("order status", s))
    }
}

/// Lifecycle of a delivery trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TripStatus {
    #[default]
    Planned,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub const ALL: [Self; 4] = [
        Self::Planned,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', '_'], " ");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| UnknownVariant::new("trip status", s))
    }
}

/// Product regime of an order or a truck.
///
/// `Vrac` is bulk product carried in a tanker; `Pack` is packaged goods.
/// The two never share a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderRegime {
    Vrac,
    Pack,
}

impl OrderRegime {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vrac => "VRAC",
            Self::Pack => "PACK",
        }
    }

    /// Regime served by a truck, from its `MPGI` product group label.
    ///
    /// Trucks whose group mentions "packed" carry packaged goods; every other
    /// truck is a bulk tanker.
    #[must_use]
    pub fn from_truck_group(mpgi: &str) -> Self {
        if mpgi.to_lowercase().contains("packed") {
            Self::Pack
        } else {
            Self::Vrac
        }
    }
}

impl fmt::Display for OrderRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderRegime {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VRAC" => Ok(Self::Vrac),
            "PACK" => Ok(Self::Pack),
            _ => Err(UnknownVariant::new("order regime", s)),
        }
    }
}

/// Entity type targeted by a spreadsheet import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Clients,
    Products,
    Tanks,
    Trucks,
    Plants,
    Prices,
    Orders,
}

impl ImportKind {
    pub const ALL: [Self; 7] = [
        Self::Clients,
        Self::Products,
        Self::Tanks,
        Self::Trucks,
        Self::Plants,
        Self::Prices,
        Self::Orders,
    ];

    /// Path segment used by the import endpoints.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Products => "products",
            Self::Tanks => "tanks",
            Self::Trucks => "trucks",
            Self::Plants => "plants",
            Self::Prices => "prices",
            Self::Orders => "orders",
        }
    }

    /// Whether this import targets master data rather than sales orders.
    #[must_use]
    pub const fn is_master_data(&self) -> bool {
        !matches!(self, Self::Orders)
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| UnknownVariant::new("import type", s))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_lifecycle() {
        assert_eq!(OrderStatus::Created.next(), Some(OrderStatus::Planning));
        assert_eq!(OrderStatus::Loading.next(), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::Completed.next(), None);
    }

    #[test]
    fn test_trip_status_serde_label() {
        let json = serde_json::to_string(&TripStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        assert_eq!("in-progress".parse::<TripStatus>().unwrap(), TripStatus::InProgress);
    }

    #[test]
    fn test_regime_from_truck_group() {
        assert_eq!(OrderRegime::from_truck_group("Packed Lubricants"), OrderRegime::Pack);
        assert_eq!(OrderRegime::from_truck_group("Fuels"), OrderRegime::Vrac);
        assert_eq!(serde_json::to_string(&OrderRegime::Vrac).unwrap(), "\"VRAC\"");
        assert_eq!("pack".parse::<OrderRegime>().unwrap(), OrderRegime::Pack);
    }

    #[test]
    fn test_import_kind_parse() {
        assert_eq!("Trucks".parse::<ImportKind>().unwrap(), ImportKind::Trucks);
        assert!(!ImportKind::Orders.is_master_data());
        let err = "drivers".parse::<ImportKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown import type: drivers");
    }
}

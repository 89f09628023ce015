use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    PickedUp,
    Cancelled,
    Expired,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 5] = [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::PickedUp,
        ReservationStatus::Cancelled,
        ReservationStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::PickedUp => "PICKED_UP",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Expired => "EXPIRED",
        }
    }

    /// Lowercase form expected by the backend in filters and status updates.
    pub fn as_backend(&self) -> String {
        self.as_str().to_lowercase()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::PickedUp | ReservationStatus::Cancelled | ReservationStatus::Expired
        )
    }

    /// Edges of the reservation state machine. Nothing leaves a terminal state.
    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Pending, Expired) | (Confirmed, PickedUp)
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical uppercase, underscore-separated spelling of a wire status.
///
/// Runs of whitespace and dashes collapse into one underscore, and the two
/// spelling variants the backend is known to emit are folded in.
pub fn normalize_status(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_separator = false;
    for ch in raw.trim().chars() {
        if ch == '-' || ch.is_whitespace() {
            if !in_separator {
                out.push('_');
                in_separator = true;
            }
        } else {
            out.extend(ch.to_uppercase());
            in_separator = false;
        }
    }
    match out.as_str() {
        "CANCELED" => "CANCELLED".to_string(),
        "PICKEDUP" => "PICKED_UP".to_string(),
        _ => out,
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key = normalize_status(raw);
        ReservationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == key)
            .ok_or_else(|| format!("unknown reservation status `{raw}`"))
    }
}

impl Serialize for ReservationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReservationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub business_id: Option<i64>,
    #[serde(default)]
    pub outlet_id: Option<i64>,
    pub user_id: i64,
    pub quantity: i32,
    pub status: ReservationStatus,
    #[serde(deserialize_with = "wire_time::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "wire_time::option::deserialize")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "wire_time::option::deserialize")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "wire_time::option::deserialize")]
    pub picked_up_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "wire_time::option::deserialize")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub product: Option<ProductSummary>,
}

impl Reservation {
    /// The business the reservation belongs to; older payloads only carry `outletId`.
    pub fn business_ref(&self) -> Option<i64> {
        self.business_id.or(self.outlet_id)
    }

    /// Last time the server touched this reservation.
    pub fn last_update(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    /// Terminal timestamps agree with the status: exactly one for
    /// `CANCELLED`/`PICKED_UP`, none while still open.
    pub fn terminal_stamps_consistent(&self) -> bool {
        match self.status {
            ReservationStatus::Cancelled => {
                self.cancelled_at.is_some() && self.picked_up_at.is_none()
            }
            ReservationStatus::PickedUp => {
                self.picked_up_at.is_some() && self.cancelled_at.is_none()
            }
            ReservationStatus::Pending | ReservationStatus::Confirmed => {
                self.cancelled_at.is_none() && self.picked_up_at.is_none()
            }
            ReservationStatus::Expired => {
                !(self.cancelled_at.is_some() && self.picked_up_at.is_some())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub discounted_price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub business: Option<BusinessSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Catalog row from `getAllProducts` / `getProductsByBusiness`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    #[serde(default)]
    pub business_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub discounted_price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: Option<i32>,
    #[serde(default)]
    pub business: Option<BusinessSummary>,
}

/// Catalog row from `getAllBusinesses` / `getBusinessesByUser`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl From<&Business> for BusinessSummary {
    fn from(business: &Business) -> Self {
        Self {
            id: business.id,
            name: business.name.clone(),
            address: business.address.clone().unwrap_or_default(),
            phone: business.phone.clone(),
            latitude: business.latitude,
            longitude: business.longitude,
        }
    }
}

mod wire_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, de::Error};

    // The backend mixes RFC 3339 and naive timestamps; naive ones are UTC.
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(d)? {
                None => Ok(None),
                Some(raw) if raw.is_empty() => Ok(None),
                Some(raw) => parse(&raw)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`"))),
            }
        }
    }
}

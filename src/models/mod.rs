use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The five amenity tag attributes a cafe carries, in canonical order.
pub const TAG_NAMES: [&str; 5] = ["wifi", "outlets", "desk", "restroom", "parking"];

/// Availability level of a single amenity. Persisted as its canonical
/// uppercase name; an unset tag is the absence of a value, not a variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AmenityLevel {
    Available,
    Limited,
    Unavailable,
}

impl AmenityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmenityLevel::Available => "AVAILABLE",
            AmenityLevel::Limited => "LIMITED",
            AmenityLevel::Unavailable => "UNAVAILABLE",
        }
    }

    /// Case-sensitive parse of a canonical name. Anything else is unset.
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "AVAILABLE" => Some(AmenityLevel::Available),
            "LIMITED" => Some(AmenityLevel::Limited),
            "UNAVAILABLE" => Some(AmenityLevel::Unavailable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cafe {
    pub id: Uuid,
    /// Identifier of the cafe in the external place catalog it was
    /// imported from, when known.
    pub place_id: Option<i64>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website_url: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub average_rating: Option<f64>,
    pub opening_hours: Option<String>,
    pub wifi: Option<AmenityLevel>,
    pub outlets: Option<AmenityLevel>,
    pub desk: Option<AmenityLevel>,
    pub restroom: Option<AmenityLevel>,
    pub parking: Option<AmenityLevel>,
}

impl Cafe {
    /// Tag attributes paired with their names, in canonical order.
    pub fn tags(&self) -> [(&'static str, Option<AmenityLevel>); 5] {
        [
            ("wifi", self.wifi),
            ("outlets", self.outlets),
            ("desk", self.desk),
            ("restroom", self.restroom),
            ("parking", self.parking),
        ]
    }
}

/// A photo attached to a cafe. Owned by exactly one cafe and removed
/// with it.
#[derive(Debug, Clone)]
pub struct Image {
    pub id: Uuid,
    pub cafe_id: Uuid,
    pub image_data: Vec<u8>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CafeCreateRequest {
    pub place_id: Option<i64>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website_url: Option<String>,
    pub average_rating: Option<f64>,
    pub opening_hours: Option<String>,
    pub wifi: Option<AmenityLevel>,
    pub outlets: Option<AmenityLevel>,
    pub desk: Option<AmenityLevel>,
    pub restroom: Option<AmenityLevel>,
    pub parking: Option<AmenityLevel>,
    /// Base64-encoded photo payloads, stored in the order given.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Partial tag update: a field left null leaves the stored value
/// untouched. There is no way to clear a tag back to unset through
/// this payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CafeTagUpdateRequest {
    pub wifi: Option<AmenityLevel>,
    pub outlets: Option<AmenityLevel>,
    pub desk: Option<AmenityLevel>,
    pub restroom: Option<AmenityLevel>,
    pub parking: Option<AmenityLevel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amenity_level_canonical_names() {
        assert_eq!(AmenityLevel::Available.as_str(), "AVAILABLE");
        assert_eq!(AmenityLevel::Limited.as_str(), "LIMITED");
        assert_eq!(AmenityLevel::Unavailable.as_str(), "UNAVAILABLE");
    }

    #[test]
    fn test_amenity_level_from_db_is_case_sensitive() {
        assert_eq!(
            AmenityLevel::from_db("AVAILABLE"),
            Some(AmenityLevel::Available)
        );
        assert_eq!(AmenityLevel::from_db("available"), None);
        assert_eq!(AmenityLevel::from_db(""), None);
        assert_eq!(AmenityLevel::from_db("SOMETIMES"), None);
    }

    #[test]
    fn test_amenity_level_serde_round_trip() {
        let json = serde_json::to_string(&AmenityLevel::Unavailable).unwrap();
        assert_eq!(json, "\"UNAVAILABLE\"");
        let level: AmenityLevel = serde_json::from_str("\"LIMITED\"").unwrap();
        assert_eq!(level, AmenityLevel::Limited);
    }
}

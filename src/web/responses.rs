//! Response shapes for the cafe endpoints.
//!
//! Each endpoint projects the `Cafe` entity differently: the detail view
//! carries every image, the search view carries none, and the map-pin
//! view carries at most the first. Image payloads are never sent raw;
//! they are base64-encoded into the JSON body. All constructors are pure
//! and preserve input order.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{AmenityLevel, Cafe, Image};

/// Unset tags are presented as this placeholder in the tag map.
const TAG_PLACEHOLDER: &str = "-";

pub fn encode_image(image: &Image) -> String {
    STANDARD.encode(&image.image_data)
}

/// Full projection for single-record detail views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CafeDetailResponse {
    pub id: Uuid,
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
    pub images: Vec<String>,
}

impl CafeDetailResponse {
    pub fn new(cafe: Cafe, images: &[Image]) -> Self {
        let images = images.iter().map(encode_image).collect();
        Self {
            id: cafe.id,
            place_id: cafe.place_id,
            name: cafe.name,
            latitude: cafe.latitude,
            longitude: cafe.longitude,
            address: cafe.address,
            phone: cafe.phone,
            website_url: cafe.website_url,
            updated_at: cafe.updated_at,
            average_rating: cafe.average_rating,
            opening_hours: cafe.opening_hours,
            wifi: cafe.wifi,
            outlets: cafe.outlets,
            desk: cafe.desk,
            restroom: cafe.restroom,
            parking: cafe.parking,
            images,
        }
    }
}

/// Minimal projection for high-volume keyword search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CafeSearchResult {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Cafe> for CafeSearchResult {
    fn from(cafe: Cafe) -> Self {
        Self {
            id: cafe.id,
            name: cafe.name,
            address: cafe.address,
            latitude: cafe.latitude,
            longitude: cafe.longitude,
        }
    }
}

/// Compact projection for rendering many cafes on a map. Carries the
/// tags and at most the first image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CafeMapPin {
    pub id: Uuid,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub average_rating: Option<f64>,
    pub opening_hours: Option<String>,
    pub wifi: Option<AmenityLevel>,
    pub outlets: Option<AmenityLevel>,
    pub desk: Option<AmenityLevel>,
    pub restroom: Option<AmenityLevel>,
    pub parking: Option<AmenityLevel>,
    pub image: Option<String>,
}

impl CafeMapPin {
    pub fn new(cafe: Cafe, first_image: Option<&Image>) -> Self {
        Self {
            id: cafe.id,
            name: cafe.name,
            latitude: cafe.latitude,
            longitude: cafe.longitude,
            address: cafe.address,
            average_rating: cafe.average_rating,
            opening_hours: cafe.opening_hours,
            wifi: cafe.wifi,
            outlets: cafe.outlets,
            desk: cafe.desk,
            restroom: cafe.restroom,
            parking: cafe.parking,
            image: first_image.map(encode_image),
        }
    }
}

/// Tag-name to canonical-value map, with `"-"` standing in for unset
/// tags. The placeholder is presentation only, never a stored value.
pub fn tag_map(cafe: &Cafe) -> HashMap<String, String> {
    cafe.tags()
        .into_iter()
        .map(|(name, level)| {
            let value = level
                .map(|l| l.as_str().to_string())
                .unwrap_or_else(|| TAG_PLACEHOLDER.to_string());
            (name.to_string(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cafe() -> Cafe {
        Cafe {
            id: Uuid::new_v4(),
            place_id: Some(12345),
            name: "Corner Roasters".to_string(),
            latitude: 37.5,
            longitude: 127.0,
            address: Some("12 Main St".to_string()),
            phone: None,
            website_url: None,
            updated_at: Utc::now(),
            average_rating: Some(4.5),
            opening_hours: Some("08:00-22:00".to_string()),
            wifi: Some(AmenityLevel::Available),
            outlets: None,
            desk: None,
            restroom: None,
            parking: Some(AmenityLevel::Unavailable),
        }
    }

    fn sample_image(cafe_id: Uuid, sort_order: i32, data: &[u8]) -> Image {
        Image {
            id: Uuid::new_v4(),
            cafe_id,
            image_data: data.to_vec(),
            sort_order,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_detail_shape_encodes_every_image_in_order() {
        let cafe = sample_cafe();
        let images = vec![
            sample_image(cafe.id, 0, b"first"),
            sample_image(cafe.id, 1, b"second"),
            sample_image(cafe.id, 2, b"third"),
        ];

        let detail = CafeDetailResponse::new(cafe, &images);

        assert_eq!(detail.images.len(), 3);
        assert_eq!(detail.images[0], STANDARD.encode(b"first"));
        assert_eq!(detail.images[2], STANDARD.encode(b"third"));
    }

    #[test]
    fn test_map_pin_carries_at_most_the_first_image() {
        let cafe = sample_cafe();
        let first = sample_image(cafe.id, 0, b"first");

        let pin = CafeMapPin::new(cafe.clone(), Some(&first));
        assert_eq!(pin.image, Some(STANDARD.encode(b"first")));

        let bare = CafeMapPin::new(cafe, None);
        assert_eq!(bare.image, None);
    }

    #[test]
    fn test_search_shape_has_no_tags_or_images() {
        let cafe = sample_cafe();
        let result = CafeSearchResult::from(cafe.clone());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["name"], cafe.name);
        assert!(json.get("wifi").is_none());
        assert!(json.get("images").is_none());
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_tag_map_uses_placeholder_for_unset_tags() {
        let cafe = sample_cafe();
        let tags = tag_map(&cafe);

        assert_eq!(tags["wifi"], "AVAILABLE");
        assert_eq!(tags["parking"], "UNAVAILABLE");
        assert_eq!(tags["outlets"], "-");
        assert_eq!(tags["desk"], "-");
        assert_eq!(tags["restroom"], "-");
    }
}

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use super::Database;
use crate::models::*;

const CAFE_COLUMNS: &str = "id, place_id, name, latitude, longitude, address, phone, \
     website_url, updated_at, average_rating, opening_hours, \
     wifi, outlets, desk, restroom, parking";

// Helper function to parse datetime from either RFC3339 or SQLite format
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }
    Err(anyhow::anyhow!("Failed to parse datetime: {}", s))
}

fn amenity_from_row(row: &SqliteRow, column: &str) -> Option<AmenityLevel> {
    row.get::<Option<String>, _>(column)
        .as_deref()
        .and_then(AmenityLevel::from_db)
}

fn cafe_from_row(row: &SqliteRow) -> Result<Cafe> {
    let updated_at = row.get::<String, _>("updated_at");

    Ok(Cafe {
        id: Uuid::parse_str(&row.get::<String, _>("id"))?,
        place_id: row.get("place_id"),
        name: row.get("name"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        address: row.get("address"),
        phone: row.get("phone"),
        website_url: row.get("website_url"),
        updated_at: parse_datetime(&updated_at)?,
        average_rating: row.get("average_rating"),
        opening_hours: row.get("opening_hours"),
        wifi: amenity_from_row(row, "wifi"),
        outlets: amenity_from_row(row, "outlets"),
        desk: amenity_from_row(row, "desk"),
        restroom: amenity_from_row(row, "restroom"),
        parking: amenity_from_row(row, "parking"),
    })
}

fn image_from_row(row: &SqliteRow) -> Result<Image> {
    let created_at = row.get::<String, _>("created_at");

    Ok(Image {
        id: Uuid::parse_str(&row.get::<String, _>("id"))?,
        cafe_id: Uuid::parse_str(&row.get::<String, _>("cafe_id"))?,
        image_data: row.get("image_data"),
        sort_order: row.get("sort_order"),
        created_at: parse_datetime(&created_at)?,
    })
}

/// Tag names are whitelisted against the known attribute columns before
/// being spliced into SQL. The match is case-sensitive.
fn tag_column(name: &str) -> Option<&'static str> {
    TAG_NAMES.iter().find(|known| **known == name).copied()
}

impl Database {
    pub async fn list_cafes(&self) -> Result<Vec<Cafe>> {
        let rows = sqlx::query(&format!(
            "SELECT {CAFE_COLUMNS} FROM cafes ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(cafe_from_row).collect()
    }

    pub async fn get_cafe(&self, id: Uuid) -> Result<Option<Cafe>> {
        let row = sqlx::query(&format!("SELECT {CAFE_COLUMNS} FROM cafes WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(cafe_from_row).transpose()
    }

    /// Every image attached to a cafe, in attachment order.
    pub async fn get_cafe_images(&self, cafe_id: Uuid) -> Result<Vec<Image>> {
        let rows = sqlx::query(
            "SELECT id, cafe_id, image_data, sort_order, created_at
             FROM cafe_images WHERE cafe_id = ?
             ORDER BY sort_order, id",
        )
        .bind(cafe_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(image_from_row).collect()
    }

    /// The first attached image only, for the compact map-pin shape.
    pub async fn get_first_cafe_image(&self, cafe_id: Uuid) -> Result<Option<Image>> {
        let row = sqlx::query(
            "SELECT id, cafe_id, image_data, sort_order, created_at
             FROM cafe_images WHERE cafe_id = ?
             ORDER BY sort_order, id LIMIT 1",
        )
        .bind(cafe_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(image_from_row).transpose()
    }

    /// Keyword search over name and address. An empty query matches
    /// nothing rather than everything.
    pub async fn search_cafes(&self, query: &str) -> Result<Vec<Cafe>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("%{}%", query);
        let rows = sqlx::query(&format!(
            "SELECT {CAFE_COLUMNS} FROM cafes
             WHERE name LIKE ? OR address LIKE ?
             ORDER BY name"
        ))
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(cafe_from_row).collect()
    }

    /// Cafes inside the closed rectangle [min_lat, max_lat] x
    /// [min_lng, max_lng]. BETWEEN is boundary-inclusive, and inverted
    /// bounds simply match no rows.
    pub async fn get_cafes_in_area(
        &self,
        min_lat: f64,
        max_lat: f64,
        min_lng: f64,
        max_lng: f64,
    ) -> Result<Vec<Cafe>> {
        let rows = sqlx::query(&format!(
            "SELECT {CAFE_COLUMNS} FROM cafes
             WHERE latitude BETWEEN ? AND ?
               AND longitude BETWEEN ? AND ?
             ORDER BY name"
        ))
        .bind(min_lat)
        .bind(max_lat)
        .bind(min_lng)
        .bind(max_lng)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(cafe_from_row).collect()
    }

    /// AND-conjunction filter over (tag name, value) pairs. Callers have
    /// already dropped pairs with empty values; an empty pair list means
    /// no constraint. Unrecognized tag names are ignored and contribute
    /// no constraint. Values compare case-insensitively against the
    /// canonical uppercase level names.
    pub async fn get_cafes_by_tags(&self, pairs: &[(String, String)]) -> Result<Vec<Cafe>> {
        let mut conditions = Vec::new();
        let mut values = Vec::new();

        for (name, value) in pairs {
            if let Some(column) = tag_column(name) {
                conditions.push(format!("{column} = ?"));
                values.push(value.to_uppercase());
            }
        }

        let sql = if conditions.is_empty() {
            format!("SELECT {CAFE_COLUMNS} FROM cafes ORDER BY name")
        } else {
            format!(
                "SELECT {CAFE_COLUMNS} FROM cafes WHERE {} ORDER BY name",
                conditions.join(" AND ")
            )
        };

        let mut query = sqlx::query(&sql);
        for value in values {
            query = query.bind(value);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(cafe_from_row).collect()
    }

    /// Inserts the cafe and its decoded image payloads in one
    /// transaction and returns the persisted entity.
    pub async fn create_cafe(
        &self,
        request: &CafeCreateRequest,
        images: &[Vec<u8>],
    ) -> Result<Cafe> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        info!("Creating cafe '{}' ({})", request.name, id);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO cafes
             (id, place_id, name, latitude, longitude, address, phone, website_url,
              updated_at, average_rating, opening_hours, wifi, outlets, desk, restroom, parking)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(request.place_id)
        .bind(&request.name)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(&request.address)
        .bind(&request.phone)
        .bind(&request.website_url)
        .bind(now.to_rfc3339())
        .bind(request.average_rating)
        .bind(&request.opening_hours)
        .bind(request.wifi.map(|t| t.as_str()))
        .bind(request.outlets.map(|t| t.as_str()))
        .bind(request.desk.map(|t| t.as_str()))
        .bind(request.restroom.map(|t| t.as_str()))
        .bind(request.parking.map(|t| t.as_str()))
        .execute(&mut *tx)
        .await?;

        for (index, data) in images.iter().enumerate() {
            let image_id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO cafe_images (id, cafe_id, image_data, sort_order, created_at)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(image_id.to_string())
            .bind(id.to_string())
            .bind(data.as_slice())
            .bind(index as i32)
            .bind(now.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Cafe {
            id,
            place_id: request.place_id,
            name: request.name.clone(),
            latitude: request.latitude,
            longitude: request.longitude,
            address: request.address.clone(),
            phone: request.phone.clone(),
            website_url: request.website_url.clone(),
            updated_at: now,
            average_rating: request.average_rating,
            opening_hours: request.opening_hours.clone(),
            wifi: request.wifi,
            outlets: request.outlets,
            desk: request.desk,
            restroom: request.restroom,
            parking: request.parking,
        })
    }

    /// Partial tag update: only non-null fields in the request overwrite
    /// the stored values. Returns None when the cafe does not exist.
    pub async fn update_cafe_tags(
        &self,
        id: Uuid,
        request: &CafeTagUpdateRequest,
    ) -> Result<Option<Cafe>> {
        let Some(existing) = self.get_cafe(id).await? else {
            return Ok(None);
        };

        let updated = Cafe {
            wifi: request.wifi.or(existing.wifi),
            outlets: request.outlets.or(existing.outlets),
            desk: request.desk.or(existing.desk),
            restroom: request.restroom.or(existing.restroom),
            parking: request.parking.or(existing.parking),
            updated_at: Utc::now(),
            ..existing
        };

        sqlx::query(
            "UPDATE cafes
             SET wifi = ?, outlets = ?, desk = ?, restroom = ?, parking = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(updated.wifi.map(|t| t.as_str()))
        .bind(updated.outlets.map(|t| t.as_str()))
        .bind(updated.desk.map(|t| t.as_str()))
        .bind(updated.restroom.map(|t| t.as_str()))
        .bind(updated.parking.map(|t| t.as_str()))
        .bind(updated.updated_at.to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        info!("Updated tags for cafe '{}' ({})", updated.name, id);

        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_column_is_case_sensitive() {
        assert_eq!(tag_column("wifi"), Some("wifi"));
        assert_eq!(tag_column("parking"), Some("parking"));
        assert_eq!(tag_column("Wifi"), None);
        assert_eq!(tag_column("price"), None);
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert!(parse_datetime("2024-01-01T12:00:00Z").is_ok());
        assert!(parse_datetime("2024-01-01 12:00:00").is_ok());
        assert!(parse_datetime("not a date").is_err());
    }
}

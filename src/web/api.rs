use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use super::responses::{tag_map, CafeDetailResponse, CafeMapPin, CafeSearchResult};
use super::AppState;
use crate::errors::{ApiResult, AppError};
use crate::models::*;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaParams {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// `tagNames` and `values` arrive as comma-separated lists.
#[derive(Debug, Deserialize)]
pub struct FilterParams {
    #[serde(rename = "tagNames", default)]
    pub tag_names: String,
    #[serde(default)]
    pub values: String,
}

fn split_csv(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|s| s.to_string()).collect()
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn list_cafes(State(state): State<AppState>) -> ApiResult<Json<Vec<Cafe>>> {
    let cafes = state.database.list_cafes().await?;
    Ok(Json(cafes))
}

pub async fn get_cafe(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> ApiResult<Json<CafeDetailResponse>> {
    let cafe = state
        .database
        .get_cafe(id)
        .await?
        .ok_or_else(|| AppError::not_found("cafe", id.to_string()))?;

    let images = state.database.get_cafe_images(id).await?;
    Ok(Json(CafeDetailResponse::new(cafe, &images)))
}

pub async fn search_cafes(
    Query(params): Query<SearchParams>,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CafeSearchResult>>> {
    let cafes = state.database.search_cafes(&params.query).await?;
    Ok(Json(cafes.into_iter().map(CafeSearchResult::from).collect()))
}

pub async fn get_cafes_in_area(
    Query(params): Query<AreaParams>,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CafeMapPin>>> {
    let cafes = state
        .database
        .get_cafes_in_area(params.min_lat, params.max_lat, params.min_lng, params.max_lng)
        .await?;

    Ok(Json(map_pins(&state, cafes).await?))
}

pub async fn get_cafes_by_tags(
    Query(params): Query<FilterParams>,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CafeMapPin>>> {
    let tag_names = split_csv(&params.tag_names);
    let values = split_csv(&params.values);

    if tag_names.len() != values.len() {
        return Err(AppError::bad_request(format!(
            "tagNames and values must have the same length ({} != {})",
            tag_names.len(),
            values.len()
        )));
    }

    // Pairs with an empty value carry no constraint and are dropped
    // before the store is consulted.
    let pairs: Vec<(String, String)> = tag_names
        .into_iter()
        .zip(values)
        .filter(|(_, value)| !value.is_empty())
        .collect();

    let cafes = state.database.get_cafes_by_tags(&pairs).await?;
    Ok(Json(map_pins(&state, cafes).await?))
}

pub async fn create_cafe(
    State(state): State<AppState>,
    Json(payload): Json<CafeCreateRequest>,
) -> ApiResult<Json<Cafe>> {
    let mut decoded = Vec::with_capacity(payload.images.len());
    for (index, encoded) in payload.images.iter().enumerate() {
        let data = STANDARD
            .decode(encoded)
            .map_err(|_| AppError::bad_request(format!("image {index} is not valid base64")))?;
        decoded.push(data);
    }

    let cafe = state.database.create_cafe(&payload, &decoded).await?;
    Ok(Json(cafe))
}

pub async fn update_cafe_tags(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<CafeTagUpdateRequest>,
) -> ApiResult<Json<Cafe>> {
    let cafe = state
        .database
        .update_cafe_tags(id, &payload)
        .await?
        .ok_or_else(|| AppError::not_found("cafe", id.to_string()))?;

    Ok(Json(cafe))
}

pub async fn get_cafe_tags(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> ApiResult<Json<HashMap<String, String>>> {
    let cafe = state
        .database
        .get_cafe(id)
        .await?
        .ok_or_else(|| AppError::not_found("cafe", id.to_string()))?;

    Ok(Json(tag_map(&cafe)))
}

/// Assembles map-pin shapes, loading at most the first image per cafe.
/// Output order follows the input order.
async fn map_pins(state: &AppState, cafes: Vec<Cafe>) -> Result<Vec<CafeMapPin>, AppError> {
    let mut pins = Vec::with_capacity(cafes.len());
    for cafe in cafes {
        let first = state.database.get_first_cafe_image(cafe.id).await?;
        pins.push(CafeMapPin::new(cafe, first.as_ref()));
    }
    Ok(pins)
}

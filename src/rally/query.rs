//! Listing inputs: filters and pagination.

use serde::{Deserialize, Deserializer, de};

use super::geo;
use super::models::Station;
use crate::error::ApiError;

const DEFAULT_PAGE_SIZE: i64 = 50;

fn first_page() -> i64 { 1 }
fn default_page_size() -> i64 { DEFAULT_PAGE_SIZE }

/// `GET /stations` inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct StationQuery {
    pub prefecture: Option<String>,
    /// Comma-separated; a station matches if it carries any of them.
    pub tags: Option<String>,
    pub nearby_lat: Option<f64>,
    pub nearby_lng: Option<f64>,
    pub radius_km: Option<f64>,
    #[serde(default = "first_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl StationQuery {
    /// Applies prefecture, tag and proximity filters, then pagination.
    pub fn apply<'a>(
        &self,
        stations: impl Iterator<Item = &'a Station>,
    ) -> Result<Vec<Station>, ApiError> {
        let page = Page::new(self.page, self.page_size)?;
        let nearby = Nearby::from_parts(self.nearby_lat, self.nearby_lng, self.radius_km)?;
        let prefecture = self.prefecture.as_deref().filter(|p| !p.is_empty());
        let tags = self.tags.as_deref().map(parse_tags).unwrap_or_default();

        let matched: Vec<Station> = stations
            .filter(|s| prefecture.is_none_or(|p| s.prefecture == p))
            .filter(|s| tags.is_empty() || s.tags.iter().any(|t| tags.contains(t)))
            .filter(|s| nearby.as_ref().is_none_or(|n| n.contains(s)))
            .cloned()
            .collect();
        Ok(page.slice(&matched).to_vec())
    }
}

/// `GET /users/me/stamps` inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct StampQuery {
    /// `station_id=` with no value means no filter.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub station_id: Option<i64>,
    #[serde(default = "first_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(id) => id.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Splits a tag CSV, trimming entries and dropping empty ones.
pub fn parse_tags(csv: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in csv.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_owned());
        }
    }
    tags
}

// ── Page ─────────────────────────────────────────────────────────────────────

/// 1-based offset pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: usize,
    page_size: usize,
}

impl Page {
    /// Rejects non-positive values with 400.
    pub fn new(page: i64, page_size: i64) -> Result<Self, ApiError> {
        let positive = |n: i64| usize::try_from(n).ok().filter(|&n| n > 0);
        match (positive(page), positive(page_size)) {
            (Some(page), Some(page_size)) => Ok(Self { page, page_size }),
            _ => Err(ApiError::validation("page and page_size must be positive")),
        }
    }

    /// Items `(page-1)*page_size .. page*page_size`, clamped to `items`.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page - 1).saturating_mul(self.page_size).min(items.len());
        let end = start.saturating_add(self.page_size).min(items.len());
        &items[start..end]
    }
}

// ── Nearby ───────────────────────────────────────────────────────────────────

/// A search circle around the device position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearby {
    lat: f64,
    lng: f64,
    radius_km: f64,
}

impl Nearby {
    /// All three parts or none; anything in between is a 400.
    pub fn from_parts(
        lat: Option<f64>,
        lng: Option<f64>,
        radius_km: Option<f64>,
    ) -> Result<Option<Self>, ApiError> {
        match (lat, lng, radius_km) {
            (None, None, None) => Ok(None),
            (Some(lat), Some(lng), Some(radius_km)) => {
                if radius_km.is_nan() || radius_km < 0.0 {
                    return Err(ApiError::validation("radius_km must not be negative"));
                }
                Ok(Some(Self { lat, lng, radius_km }))
            }
            _ => Err(ApiError::validation(
                "nearby_lat, nearby_lng and radius_km must be given together",
            )),
        }
    }

    pub fn contains(&self, station: &Station) -> bool {
        geo::distance_km(self.lat, self.lng, station.latitude, station.longitude) <= self.radius_km
    }
}

//! Records exchanged over the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{Field, Schema};

/// The demo traveller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    pub total_points: i64,
    pub total_stamps: i64,
    pub prefecture_completion_rate: f64,
}

impl Schema for UserProfile {}

/// `PATCH /users/me` payload. Only supplied, non-null fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfileUpdate {
    pub display_name: Field<String>,
    pub email: Field<String>,
    pub avatar_url: Field<String>,
    pub bio: Field<String>,
    pub total_points: Field<i64>,
    pub total_stamps: Field<i64>,
    pub prefecture_completion_rate: Field<f64>,
}

impl Schema for UserProfileUpdate {
    fn fields_set(&self) -> Option<Vec<&'static str>> {
        let fields = [
            ("display_name", self.display_name.is_set()),
            ("email", self.email.is_set()),
            ("avatar_url", self.avatar_url.is_set()),
            ("bio", self.bio.is_set()),
            ("total_points", self.total_points.is_set()),
            ("total_stamps", self.total_stamps.is_set()),
            ("prefecture_completion_rate", self.prefecture_completion_rate.is_set()),
        ];
        Some(fields.into_iter().filter_map(|(name, set)| set.then_some(name)).collect())
    }
}

/// A roadside station on the rally map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub prefecture: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub opened_at: Option<String>,
    #[serde(default)]
    pub latest_stamp_count: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub facilities: Vec<String>,
}

impl Schema for Station {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefectureSummary {
    pub prefecture: String,
    pub total_stations: i64,
    pub stamped_stations: i64,
    pub completion_rate: f64,
}

impl Schema for PrefectureSummary {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub code: String,
    pub title: String,
    pub description: String,
    pub criteria: String,
    pub points: i64,
}

impl Schema for Achievement {}

/// One recorded visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamp {
    pub id: i64,
    pub user_id: i64,
    pub station_id: i64,
    pub stamped_at: DateTime<Utc>,
    pub source: String,
    #[serde(default)]
    pub device_lat: Option<f64>,
    #[serde(default)]
    pub device_lng: Option<f64>,
}

impl Schema for Stamp {}

/// `POST /stamps` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampCreate {
    pub station_id: i64,
    #[serde(default)]
    pub stamped_at: Option<DateTime<Utc>>,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub device_lat: Option<f64>,
    #[serde(default)]
    pub device_lng: Option<f64>,
}

impl Schema for StampCreate {}

fn default_source() -> String {
    "gps".to_owned()
}

/// `POST /stamps` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampCreated {
    pub stamp: Stamp,
    pub points_awarded: i64,
    pub unlocked_achievements: Vec<Achievement>,
}

/// `GET /progress/overall` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallProgress {
    pub total_stations: i64,
    pub stamped: i64,
    pub completion_rate: f64,
    pub total_points: i64,
    pub total_stamps: i64,
}

/// Bearer token handed out by the demo auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: u64,
}

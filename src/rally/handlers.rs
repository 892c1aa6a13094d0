//! Endpoint handlers.
//!
//! Each takes the shared [`AppState`] and the routed [`Request`], binds its
//! declared inputs, and works on the store under a single lock.

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::models::{
    Achievement, OverallProgress, PrefectureSummary, Stamp, StampCreate, StampCreated, Station,
    TokenGrant, UserProfile, UserProfileUpdate,
};
use super::query::{Page, StampQuery, StationQuery};
use super::state::AppState;
use crate::error::ApiError;
use crate::request::Request;
use crate::response::Json;
use crate::schema::{DumpOptions, Schema};

type ApiResult<T> = Result<Json<T>, ApiError>;

const DEMO_ACCESS_TOKEN: &str = "demo-access-token";
const TOKEN_TTL_SECS: u64 = 3600;

// ── Auth ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Credentials {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    refresh_token: Option<String>,
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

fn demo_grant() -> TokenGrant {
    TokenGrant { access_token: DEMO_ACCESS_TOKEN.to_owned(), expires_in: TOKEN_TTL_SECS }
}

/// `POST /auth/login`
pub async fn login(_state: AppState, req: Request) -> ApiResult<TokenGrant> {
    let creds: Credentials = req.bind()?;
    if is_blank(creds.email.as_deref()) || is_blank(creds.password.as_deref()) {
        return Err(ApiError::validation("email and password are required"));
    }
    Ok(Json(demo_grant()))
}

/// `POST /auth/refresh`
pub async fn refresh(_state: AppState, req: Request) -> ApiResult<TokenGrant> {
    let body: RefreshRequest = req.bind()?;
    if is_blank(body.refresh_token.as_deref()) {
        return Err(ApiError::validation("refresh_token is required"));
    }
    Ok(Json(demo_grant()))
}

// ── Profile ──────────────────────────────────────────────────────────────────

/// `GET /users/me`
pub async fn get_me(state: AppState, _req: Request) -> ApiResult<UserProfile> {
    Ok(Json(state.store().profile().clone()))
}

/// `PATCH /users/me`: applies supplied, non-null fields only.
pub async fn update_me(state: AppState, req: Request) -> ApiResult<UserProfile> {
    let update: UserProfileUpdate = req.json()?;
    let changes = update.dump(DumpOptions::PATCH)?;
    let changed: Vec<String> = changes.keys().cloned().collect();

    let mut store = state.store();
    let profile = store.profile().copy_with(changes)?;
    store.set_profile(profile.clone());

    info!(user_id = profile.id, ?changed, "profile updated");
    Ok(Json(profile))
}

/// `GET /users/{user_id}/achievements`
///
/// An id that is not an integer names no user, so the list is empty.
pub async fn user_achievements(state: AppState, req: Request) -> ApiResult<Vec<Achievement>> {
    let Ok(user_id) = req.param::<i64>("user_id") else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(state.store().unlocked_achievements(user_id)))
}

// ── Stations ─────────────────────────────────────────────────────────────────

/// `GET /stations`
pub async fn list_stations(state: AppState, req: Request) -> ApiResult<Vec<Station>> {
    let query: StationQuery = req.bind()?;
    let store = state.store();
    let stations = query.apply(store.stations())?;
    Ok(Json(stations))
}

/// `GET /stations/{station_id}`
///
/// Non-integer ids are not in the catalog either: 404, not 422.
pub async fn get_station(state: AppState, req: Request) -> ApiResult<Station> {
    let Ok(station_id) = req.param::<i64>("station_id") else {
        return Err(ApiError::not_found("station not found"));
    };
    state.store()
        .station(station_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("station not found"))
}

/// `GET /prefectures` and `GET /progress/prefectures`
pub async fn prefecture_summaries(state: AppState, _req: Request) -> ApiResult<Vec<PrefectureSummary>> {
    Ok(Json(state.store().prefectures().to_vec()))
}

/// `GET /prefectures/{prefecture}/stations`
pub async fn prefecture_stations(state: AppState, req: Request) -> ApiResult<Vec<Station>> {
    let prefecture: String = req.param("prefecture")?;
    let store = state.store();
    let stations = store.stations().filter(|s| s.prefecture == prefecture).cloned().collect();
    Ok(Json(stations))
}

// ── Stamps ───────────────────────────────────────────────────────────────────

/// `POST /stamps`
pub async fn create_stamp(state: AppState, req: Request) -> ApiResult<StampCreated> {
    let payload: StampCreate = req.json()?;

    let mut store = state.store();
    let user_id = store.profile().id;
    let created = store.record_stamp(user_id, payload, Utc::now())?;

    info!(
        user_id,
        stamp_id = created.stamp.id,
        station_id = created.stamp.station_id,
        unlocked = created.unlocked_achievements.len(),
        "stamp recorded"
    );
    Ok(Json(created))
}

/// `GET /users/me/stamps`
pub async fn my_stamps(state: AppState, req: Request) -> ApiResult<Vec<Stamp>> {
    let query: StampQuery = req.bind()?;
    let page = Page::new(query.page, query.page_size)?;

    let store = state.store();
    let stamps: Vec<Stamp> = store.stamps(store.profile().id)
        .iter()
        .filter(|s| query.station_id.is_none_or(|id| s.station_id == id))
        .cloned()
        .collect();
    Ok(Json(page.slice(&stamps).to_vec()))
}

// ── Catalog & progress ───────────────────────────────────────────────────────

/// `GET /achievements`
pub async fn achievements(state: AppState, _req: Request) -> ApiResult<Vec<Achievement>> {
    Ok(Json(state.store().achievements().to_vec()))
}

/// `GET /progress/overall`
pub async fn overall_progress(state: AppState, _req: Request) -> ApiResult<OverallProgress> {
    let store = state.store();
    let summaries = store.prefectures();
    let total_stations: i64 = summaries.iter().map(|s| s.total_stations).sum();
    let stamped: i64 = summaries.iter().map(|s| s.stamped_stations).sum();
    let completion_rate = if total_stations == 0 {
        0.0
    } else {
        stamped as f64 / total_stations as f64
    };
    let profile = store.profile();

    Ok(Json(OverallProgress {
        total_stations,
        stamped,
        completion_rate,
        total_points: profile.total_points,
        total_stamps: profile.total_stamps,
    }))
}

//! The API route table.

use super::handlers;
use super::state::AppState;
use crate::health;
use crate::router::Router;

/// Every endpoint, bound to `state`.
pub fn router(state: AppState) -> Router<AppState> {
    Router::with_state(state)
        .get("/health",                             health::health)
        .post("/auth/login",                        handlers::login)
        .post("/auth/refresh",                      handlers::refresh)
        .get("/users/me",                           handlers::get_me)
        .patch("/users/me",                         handlers::update_me)
        .get("/users/me/stamps",                    handlers::my_stamps)
        .get("/users/{user_id}/achievements",       handlers::user_achievements)
        .get("/stations",                           handlers::list_stations)
        .get("/stations/{station_id}",              handlers::get_station)
        .get("/prefectures",                        handlers::prefecture_summaries)
        .get("/prefectures/{prefecture}/stations",  handlers::prefecture_stations)
        .post("/stamps",                            handlers::create_stamp)
        .get("/achievements",                       handlers::achievements)
        .get("/progress/prefectures",               handlers::prefecture_summaries)
        .get("/progress/overall",                   handlers::overall_progress)
}

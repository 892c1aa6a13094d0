//! End-to-end behaviour of the route table, driven in-process.

use bytes::Bytes;
use michi::rally::{self, AppState};
use michi::{Method, Router};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

struct Reply {
    status: u16,
    body: Value,
}

#[fixture]
fn app() -> Router<AppState> {
    rally::router(AppState::seeded())
}

async fn call(app: &Router<AppState>, method: Method, target: &str, body: Option<Value>) -> Reply {
    let body = body.map_or_else(Bytes::new, |v| Bytes::from(v.to_string()));
    let res = app.dispatch(method, target, body).await;
    let body = if res.body().is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(res.body()).expect("response body is JSON")
    };
    Reply { status: res.status_code(), body }
}

async fn get(app: &Router<AppState>, target: &str) -> Reply {
    call(app, Method::Get, target, None).await
}

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|item| item["id"].as_i64().expect("numeric id"))
        .collect()
}

// ── Health & auth ────────────────────────────────────────────────────────────

#[rstest]
#[tokio::test]
async fn health_reports_service_version_and_time(app: Router<AppState>) {
    let reply = get(&app, "/health").await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["service"], "ok");
    assert_eq!(reply.body["version"], env!("CARGO_PKG_VERSION"));
    assert!(reply.body["timestamp"].as_str().is_some_and(|t| t.contains('T')));
}

#[rstest]
#[tokio::test]
async fn login_with_query_credentials_returns_token(app: Router<AppState>) {
    let reply = call(&app, Method::Post, "/auth/login?email=taro%40example.com&password=secret", None).await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["access_token"], "demo-access-token");
    assert_eq!(reply.body["expires_in"], 3600);
}

#[rstest]
#[tokio::test]
async fn login_accepts_credentials_in_body(app: Router<AppState>) {
    let body = json!({"email": "taro@example.com", "password": "secret"});
    let reply = call(&app, Method::Post, "/auth/login", Some(body)).await;

    assert_eq!(reply.status, 200);
    assert!(!reply.body["access_token"].as_str().unwrap_or_default().is_empty());
}

#[rstest]
#[case("/auth/login?email=&password=secret")]
#[case("/auth/login?password=secret")]
#[case("/auth/login?email=taro%40example.com")]
#[tokio::test]
async fn login_without_both_fields_is_bad_request(app: Router<AppState>, #[case] target: &str) {
    let reply = call(&app, Method::Post, target, None).await;

    assert_eq!(reply.status, 400);
    assert_eq!(reply.body, json!({"detail": "email and password are required"}));
}

#[rstest]
#[tokio::test]
async fn refresh_requires_token(app: Router<AppState>) {
    let missing = call(&app, Method::Post, "/auth/refresh", None).await;
    assert_eq!(missing.status, 400);
    assert_eq!(missing.body["detail"], "refresh_token is required");

    let ok = call(&app, Method::Post, "/auth/refresh", Some(json!({"refresh_token": "r"}))).await;
    assert_eq!(ok.status, 200);
    assert_eq!(ok.body["access_token"], "demo-access-token");
}

// ── Routing ──────────────────────────────────────────────────────────────────

#[rstest]
#[tokio::test]
async fn unknown_route_is_not_found(app: Router<AppState>) {
    let reply = get(&app, "/nowhere").await;

    assert_eq!(reply.status, 404);
    assert_eq!(reply.body, json!({"detail": "Not Found"}));
}

#[rstest]
#[tokio::test]
async fn trailing_slash_is_ignored(app: Router<AppState>) {
    assert_eq!(get(&app, "/stations/").await.status, 200);
    assert_eq!(get(&app, "/stations/1/").await.body["id"], 1);
}

// ── Stations & prefectures ───────────────────────────────────────────────────

#[rstest]
#[tokio::test]
async fn every_listed_station_resolves_by_id(app: Router<AppState>) {
    let listed = get(&app, "/stations").await;
    assert_eq!(listed.status, 200);

    let all = ids(&listed.body);
    assert!(all.len() >= 2);
    for id in all {
        let detail = get(&app, &format!("/stations/{id}")).await;
        assert_eq!(detail.status, 200);
        assert_eq!(detail.body["id"], id);
    }
}

#[rstest]
#[case("/stations/999")]
#[case("/stations/0")]
#[case("/stations/abc")]
#[case("/stations/1.5")]
#[case("/stations/99999999999999999999")]
#[tokio::test]
async fn unknown_station_is_not_found(app: Router<AppState>, #[case] target: &str) {
    let reply = get(&app, target).await;

    assert_eq!(reply.status, 404);
    assert_eq!(reply.body, json!({"detail": "station not found"}));
}

#[rstest]
#[case("/stations?prefecture=%E5%8C%97%E6%B5%B7%E9%81%93", &[1])]
#[case("/stations?tags=%E6%B8%A9%E6%B3%89,%E6%99%AF%E8%A6%B3", &[1, 2])]
#[case("/stations?tags=%E3%82%AD%E3%83%A3%E3%83%B3%E3%83%97", &[2])]
#[case("/stations?page=2&page_size=1", &[2])]
#[case("/stations?page=3&page_size=1", &[])]
#[case("/stations?nearby_lat=40.8&nearby_lng=140.7&radius_km=20", &[2])]
#[tokio::test]
async fn station_listing_filters_and_paginates(
    app: Router<AppState>,
    #[case] target: &str,
    #[case] expected: &[i64],
) {
    let reply = get(&app, target).await;

    assert_eq!(reply.status, 200);
    assert_eq!(ids(&reply.body), expected);
}

#[rstest]
#[case("/stations?page=0")]
#[case("/stations?page_size=-5")]
#[case("/stations?nearby_lat=40.8")]
#[case("/users/me/stamps?page_size=0")]
#[tokio::test]
async fn invalid_listing_input_is_bad_request(app: Router<AppState>, #[case] target: &str) {
    assert_eq!(get(&app, target).await.status, 400);
}

#[rstest]
#[tokio::test]
async fn unparseable_query_numbers_are_unprocessable(app: Router<AppState>) {
    assert_eq!(get(&app, "/stations?page=first").await.status, 422);
    assert_eq!(get(&app, "/users/me/stamps?station_id=abc").await.status, 422);
}

#[rstest]
#[case("北海道")]
#[case("青森県")]
#[case("沖縄県")]
#[tokio::test]
async fn prefecture_catalog_only_holds_that_prefecture(app: Router<AppState>, #[case] prefecture: &str) {
    let reply = get(&app, &format!("/prefectures/{prefecture}/stations")).await;

    assert_eq!(reply.status, 200);
    for station in reply.body.as_array().expect("array body") {
        assert_eq!(station["prefecture"], prefecture);
    }
}

#[rstest]
#[tokio::test]
async fn prefecture_summaries_match_progress_view(app: Router<AppState>) {
    let summaries = get(&app, "/prefectures").await;
    let progress = get(&app, "/progress/prefectures").await;

    assert_eq!(summaries.status, 200);
    assert_eq!(summaries.body, progress.body);
    assert_eq!(summaries.body[0]["prefecture"], "北海道");
}

#[rstest]
#[tokio::test]
async fn overall_progress_sums_prefecture_summaries(app: Router<AppState>) {
    let summaries = get(&app, "/prefectures").await.body;
    let total: i64 = summaries.as_array().unwrap().iter().map(|s| s["total_stations"].as_i64().unwrap()).sum();
    let stamped: i64 = summaries.as_array().unwrap().iter().map(|s| s["stamped_stations"].as_i64().unwrap()).sum();

    let overall = get(&app, "/progress/overall").await;

    assert_eq!(overall.status, 200);
    assert_eq!(overall.body["total_stations"], total);
    assert_eq!(overall.body["stamped"], stamped);
    assert_eq!(overall.body["completion_rate"].as_f64(), Some(stamped as f64 / total as f64));
    assert_eq!(overall.body["total_points"], 120);
    assert_eq!(overall.body["total_stamps"], 8);
}

#[tokio::test]
async fn overall_progress_is_zero_without_stations() {
    let profile = rally::Store::seeded().profile().clone();
    let store = rally::Store::new(profile, Vec::new(), Vec::new(), Vec::new());
    let app = rally::router(AppState::new(store, "test"));

    let overall = get(&app, "/progress/overall").await;

    assert_eq!(overall.body["total_stations"], 0);
    assert_eq!(overall.body["completion_rate"].as_f64(), Some(0.0));
}

// ── Profile ──────────────────────────────────────────────────────────────────

#[rstest]
#[tokio::test]
async fn patch_with_one_field_leaves_the_rest(app: Router<AppState>) {
    let before = get(&app, "/users/me").await.body;

    let reply = call(&app, Method::Patch, "/users/me", Some(json!({"display_name": "X"}))).await;
    assert_eq!(reply.status, 200);

    let mut expected = before.clone();
    expected["display_name"] = json!("X");
    assert_eq!(reply.body, expected);
    assert_eq!(get(&app, "/users/me").await.body, expected);
}

#[rstest]
#[tokio::test]
async fn patch_ignores_explicit_nulls_and_unknown_fields(app: Router<AppState>) {
    let reply = call(
        &app,
        Method::Patch,
        "/users/me",
        Some(json!({"id": 99, "bio": null, "total_points": 200, "prefecture_completion_rate": 0.5})),
    )
    .await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["id"], 1);
    assert_eq!(reply.body["bio"], "47都道府県制覇を目指しています。");
    assert_eq!(reply.body["total_points"], 200);
    assert_eq!(reply.body["prefecture_completion_rate"], 0.5);
}

#[rstest]
#[tokio::test]
async fn patch_with_wrong_type_is_unprocessable(app: Router<AppState>) {
    let reply = call(&app, Method::Patch, "/users/me", Some(json!({"total_points": "many"}))).await;

    assert_eq!(reply.status, 422);
    assert!(reply.body["detail"].is_string());
}

// ── Stamps & achievements ────────────────────────────────────────────────────

#[rstest]
#[tokio::test]
async fn stamping_seed_station_awards_points_and_first_stamp(app: Router<AppState>) {
    let reply = call(&app, Method::Post, "/stamps", Some(json!({"station_id": 1, "source": "gps"}))).await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["points_awarded"], 10);
    assert_eq!(reply.body["stamp"]["station_id"], 1);
    assert_eq!(reply.body["stamp"]["user_id"], 1);
    assert_eq!(reply.body["stamp"]["source"], "gps");

    let unlocked = get(&app, "/users/1/achievements").await.body;
    let codes: Vec<&str> = unlocked.as_array().unwrap().iter().filter_map(|a| a["code"].as_str()).collect();
    assert!(codes.contains(&"first_stamp"));
}

#[rstest]
#[tokio::test]
async fn new_stamp_id_follows_previous_max_and_shows_in_history(app: Router<AppState>) {
    let history = get(&app, "/users/me/stamps").await.body;
    let previous_max = ids(&history).into_iter().max().unwrap_or(0);

    let created = call(
        &app,
        Method::Post,
        "/stamps",
        Some(json!({"station_id": 2, "stamped_at": "2025-05-05T09:30:00Z", "device_lat": 40.8})),
    )
    .await;
    assert_eq!(created.status, 200);
    assert_eq!(created.body["stamp"]["id"], previous_max + 1);
    assert_eq!(created.body["stamp"]["stamped_at"], "2025-05-05T09:30:00Z");
    assert_eq!(created.body["stamp"]["source"], "gps");

    let filtered = get(&app, "/users/me/stamps?station_id=2").await;
    assert_eq!(filtered.status, 200);
    assert_eq!(ids(&filtered.body), [previous_max + 1]);
}

#[rstest]
#[tokio::test]
async fn stamping_unknown_station_leaves_history_untouched(app: Router<AppState>) {
    let before = get(&app, "/users/me/stamps").await.body;

    let reply = call(&app, Method::Post, "/stamps", Some(json!({"station_id": 404}))).await;

    assert_eq!(reply.status, 404);
    assert_eq!(reply.body, json!({"detail": "station not found"}));
    assert_eq!(get(&app, "/users/me/stamps").await.body, before);
}

#[rstest]
#[tokio::test]
async fn stamp_without_body_is_unprocessable(app: Router<AppState>) {
    assert_eq!(call(&app, Method::Post, "/stamps", None).await.status, 422);
}

#[rstest]
#[tokio::test]
async fn first_stamp_unlocks_remaining_catalog_then_nothing(app: Router<AppState>) {
    let first = call(&app, Method::Post, "/stamps", Some(json!({"station_id": 1}))).await;
    assert_eq!(first.body["unlocked_achievements"][0]["code"], "hokkaido_collector");

    let second = call(&app, Method::Post, "/stamps", Some(json!({"station_id": 1}))).await;
    assert_eq!(second.body["unlocked_achievements"], json!([]));

    let unlocked = get(&app, "/users/1/achievements").await.body;
    assert_eq!(unlocked.as_array().map(Vec::len), Some(2));
}

#[rstest]
#[tokio::test]
async fn unknown_user_has_no_achievements(app: Router<AppState>) {
    let reply = get(&app, "/users/999/achievements").await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, json!([]));
}

#[rstest]
#[tokio::test]
async fn non_numeric_user_id_has_no_achievements(app: Router<AppState>) {
    let reply = get(&app, "/users/abc/achievements").await;

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, json!([]));
}

#[rstest]
#[tokio::test]
async fn blank_station_filter_lists_whole_history(app: Router<AppState>) {
    call(&app, Method::Post, "/stamps", Some(json!({"station_id": 2}))).await;

    let reply = get(&app, "/users/me/stamps?station_id=").await;

    assert_eq!(reply.status, 200);
    assert_eq!(ids(&reply.body), [1, 2]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_stamps_get_distinct_consecutive_ids() {
    const REQUESTS: i64 = 16;
    let state = AppState::seeded();

    let mut tasks = tokio::task::JoinSet::new();
    for n in 0..REQUESTS {
        let app = rally::router(state.clone());
        tasks.spawn(async move {
            let body = json!({"station_id": 1 + n % 2});
            call(&app, Method::Post, "/stamps", Some(body)).await
        });
    }

    let mut created = Vec::new();
    while let Some(reply) = tasks.join_next().await {
        let reply = reply.expect("stamp task finished");
        assert_eq!(reply.status, 200);
        created.push(reply.body["stamp"]["id"].as_i64().expect("numeric id"));
    }
    created.sort_unstable();
    assert_eq!(created, (2..=REQUESTS + 1).collect::<Vec<_>>());

    let app = rally::router(state);
    let mut history = ids(&get(&app, "/users/me/stamps").await.body);
    history.sort_unstable();
    assert_eq!(history, (1..=REQUESTS + 1).collect::<Vec<_>>());

    let unlocked = get(&app, "/users/1/achievements").await.body;
    let mut codes: Vec<&str> = unlocked.as_array().unwrap().iter().filter_map(|a| a["code"].as_str()).collect();
    let held = codes.len();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), held);
    assert_eq!(codes, ["first_stamp", "hokkaido_collector"]);
}

#[rstest]
#[tokio::test]
async fn achievement_catalog_lists_first_stamp(app: Router<AppState>) {
    let reply = get(&app, "/achievements").await;

    assert_eq!(reply.status, 200);
    assert!(reply.body.as_array().unwrap().iter().any(|a| a["code"] == "first_stamp"));
}

#[rstest]
#[tokio::test]
async fn stamp_history_paginates(app: Router<AppState>) {
    for _ in 0..3 {
        call(&app, Method::Post, "/stamps", Some(json!({"station_id": 1}))).await;
    }

    let page = get(&app, "/users/me/stamps?page=2&page_size=2").await;

    assert_eq!(page.status, 200);
    assert_eq!(ids(&page.body), [3, 4]);
}

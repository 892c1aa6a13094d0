//! In-memory rally data.
//!
//! [`Store::seeded`] loads the demo dataset. Nothing is persisted; every
//! mutation lives until the process exits.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, TimeZone, Utc};

use super::models::{
    Achievement, PrefectureSummary, Stamp, StampCreate, StampCreated, Station, UserProfile,
};
use super::policy;
use crate::error::ApiError;

/// Points granted for every stamp, regardless of station.
pub const POINTS_PER_STAMP: i64 = 10;

#[derive(Debug, Clone)]
pub struct Store {
    profile: UserProfile,
    stations: BTreeMap<i64, Station>,
    prefectures: Vec<PrefectureSummary>,
    achievements: Vec<Achievement>,
    user_achievements: HashMap<i64, Vec<String>>,
    stamp_history: HashMap<i64, Vec<Stamp>>,
}

impl Store {
    /// Builds a store from explicit collections. Stations are keyed by id.
    pub fn new(
        profile: UserProfile,
        stations: impl IntoIterator<Item = Station>,
        prefectures: Vec<PrefectureSummary>,
        achievements: Vec<Achievement>,
    ) -> Self {
        Self {
            profile,
            stations: stations.into_iter().map(|s| (s.id, s)).collect(),
            prefectures,
            achievements,
            user_achievements: HashMap::new(),
            stamp_history: HashMap::new(),
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn set_profile(&mut self, profile: UserProfile) {
        self.profile = profile;
    }

    // ── Catalog ──────────────────────────────────────────────────────────

    /// Stations in id order.
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn station(&self, id: i64) -> Option<&Station> {
        self.stations.get(&id)
    }

    pub fn prefectures(&self) -> &[PrefectureSummary] {
        &self.prefectures
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    // ── Per-user state ───────────────────────────────────────────────────

    /// Catalog entries the user has unlocked, in catalog order.
    pub fn unlocked_achievements(&self, user_id: i64) -> Vec<Achievement> {
        let Some(codes) = self.user_achievements.get(&user_id) else {
            return Vec::new();
        };
        self.achievements.iter()
            .filter(|a| codes.contains(&a.code))
            .cloned()
            .collect()
    }

    /// Adds codes to the user's unlocked set, skipping ones already there.
    pub fn grant(&mut self, user_id: i64, codes: impl IntoIterator<Item = String>) {
        let held = self.user_achievements.entry(user_id).or_default();
        for code in codes {
            if !held.contains(&code) {
                held.push(code);
            }
        }
    }

    /// The user's stamps in the order they were recorded.
    pub fn stamps(&self, user_id: i64) -> &[Stamp] {
        self.stamp_history.get(&user_id).map_or(&[][..], Vec::as_slice)
    }

    /// Highest existing stamp id for the user, plus one; 1 when none.
    pub fn next_stamp_id(&self, user_id: i64) -> i64 {
        self.stamps(user_id).iter().map(|s| s.id).max().map_or(1, |id| id + 1)
    }

    /// Appends a pre-built stamp to its user's history.
    pub fn push_stamp(&mut self, stamp: Stamp) {
        self.stamp_history.entry(stamp.user_id).or_default().push(stamp);
    }

    /// Records a visit for `user_id` and unlocks achievements.
    ///
    /// Fails with 404 when the station is not in the catalog; nothing is
    /// changed in that case.
    pub fn record_stamp(
        &mut self,
        user_id: i64,
        payload: StampCreate,
        now: DateTime<Utc>,
    ) -> Result<StampCreated, ApiError> {
        if self.station(payload.station_id).is_none() {
            return Err(ApiError::not_found("station not found"));
        }

        let stamp = Stamp {
            id: self.next_stamp_id(user_id),
            user_id,
            station_id: payload.station_id,
            stamped_at: payload.stamped_at.unwrap_or(now),
            source: payload.source,
            device_lat: payload.device_lat,
            device_lng: payload.device_lng,
        };
        self.push_stamp(stamp.clone());

        let held = self.user_achievements.get(&user_id).map_or(&[][..], Vec::as_slice);
        let unlocked = policy::unlock_every_remaining(&self.achievements, held);
        self.grant(user_id, unlocked.iter().map(|a| a.code.clone()));

        Ok(StampCreated {
            stamp,
            points_awarded: POINTS_PER_STAMP,
            unlocked_achievements: unlocked,
        })
    }

    // ── Seed ─────────────────────────────────────────────────────────────

    /// The demo dataset: one traveller, two stations, two achievements.
    pub fn seeded() -> Self {
        let profile = UserProfile {
            id: 1,
            display_name: "旅人太郎".to_owned(),
            email: "taro@example.com".to_owned(),
            avatar_url: None,
            bio: Some("47都道府県制覇を目指しています。".to_owned()),
            total_points: 120,
            total_stamps: 8,
            prefecture_completion_rate: 0.17,
        };

        let stations = [
            Station {
                id: 1,
                name: "道の駅 みちの里".to_owned(),
                prefecture: "北海道".to_owned(),
                latitude: 43.06417,
                longitude: 141.34694,
                tags: strings(&["地元野菜", "温泉"]),
                opened_at: Some("2001-07-15".to_owned()),
                latest_stamp_count: Some(254),
                description: Some("広い駐車場と地元食材の直売所が人気。".to_owned()),
                facilities: strings(&["駐車場", "トイレ", "レストラン"]),
            },
            Station {
                id: 2,
                name: "道の駅 青葉の森".to_owned(),
                prefecture: "青森県".to_owned(),
                latitude: 40.82207,
                longitude: 140.74736,
                tags: strings(&["キャンプ", "景観"]),
                opened_at: Some("2010-04-20".to_owned()),
                latest_stamp_count: Some(98),
                description: Some("青々とした森に囲まれた休憩スポット。".to_owned()),
                facilities: strings(&["キャンプ場", "売店"]),
            },
        ];

        let prefectures = vec![
            summary("北海道", 15, 4, 0.27),
            summary("青森県", 9, 2, 0.22),
        ];

        let achievements = vec![
            Achievement {
                code: "first_stamp".to_owned(),
                title: "初めてのスタンプ".to_owned(),
                description: "最初の道の駅スタンプを獲得".to_owned(),
                criteria: "スタンプを1つ取得".to_owned(),
                points: 10,
            },
            Achievement {
                code: "hokkaido_collector".to_owned(),
                title: "北海道コレクター".to_owned(),
                description: "北海道内の道の駅スタンプを5つ集める".to_owned(),
                criteria: "北海道のスタンプ5個".to_owned(),
                points: 30,
            },
        ];

        let mut store = Self::new(profile, stations, prefectures, achievements);
        store.grant(1, ["first_stamp".to_owned()]);
        store.push_stamp(Stamp {
            id: 1,
            user_id: 1,
            station_id: 1,
            stamped_at: Utc.with_ymd_and_hms(2024, 4, 1, 10, 0, 0).single().unwrap_or_default(),
            source: "gps".to_owned(),
            device_lat: Some(43.06),
            device_lng: Some(141.34),
        });
        store
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

fn summary(prefecture: &str, total: i64, stamped: i64, rate: f64) -> PrefectureSummary {
    PrefectureSummary {
        prefecture: prefecture.to_owned(),
        total_stations: total,
        stamped_stations: stamped,
        completion_rate: rate,
    }
}

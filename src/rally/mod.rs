//! The stamp-rally API: travellers collect stamps at roadside stations,
//! track per-prefecture completion, and unlock achievements.
//!
//! Everything lives in memory, seeded by [`Store::seeded`].

pub mod geo;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod query;
pub mod routes;
pub mod state;
pub mod store;

pub use routes::router;
pub use state::AppState;
pub use store::Store;

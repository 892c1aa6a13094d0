//! # michi
//!
//! A stamp-rally backend for Japanese roadside stations (michi-no-eki),
//! running on a deliberately small HTTP framework.
//!
//! ## The framework
//!
//! - Radix-tree routing via [`matchit`], one tree per method; static
//!   segments beat `{param}` segments, conflicting templates are refused
//! - Handlers are plain `async fn(state, Request)` returning anything that
//!   implements [`IntoResponse`]
//! - Inputs are bound explicitly: [`Request::param`], [`Request::bind`],
//!   [`Request::json`]
//! - [`ApiError`] maps to a status code and a `{"detail": ...}` body
//! - hyper HTTP/1.1 + HTTP/2, graceful shutdown on SIGTERM / Ctrl-C
//!
//! TLS, rate limiting and body-size limits are the reverse proxy's job.
//!
//! ## The application
//!
//! [`rally`] holds the data model, the in-memory store and the handlers;
//! [`rally::router`] wires them up.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use michi::{Config, Server, rally};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), michi::Error> {
//!     let config = Config::from_env()?;
//!     michi::telemetry::init(config.log_format)?;
//!
//!     let app = rally::router(rally::AppState::seeded());
//!     Server::bind(config.socket_addr()).serve(app).await
//! }
//! ```
//!
//! Handlers can also be driven in-process, which is how the tests work:
//!
//! ```rust
//! use michi::{Method, rally};
//!
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let app = rally::router(rally::AppState::seeded());
//! let res = app.dispatch(Method::Get, "/stations/1", Default::default()).await;
//! assert_eq!(res.status_code(), 200);
//! # }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod config;
pub mod health;
pub mod rally;
pub mod schema;
pub mod telemetry;

pub use config::Config;
pub use error::{ApiError, Error};
pub use handler::Handler;
pub use method::{Method, UnknownMethod};
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;

//! HTTP status codes as a typed enum.
//!
//! Use [`Status`] anywhere a status code is accepted: `Response::status()`,
//! `Response::builder().status()`, or as a bare handler return value.
//!
//! ```rust
//! use michi::{Response, Status};
//!
//! Response::status(Status::NotFound);
//!
//! Response::builder()
//!     .status(Status::BadRequest)
//!     .json(br#"{"detail":"page and page_size must be positive"}"#.to_vec());
//! ```

/// The status codes this service produces.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Ok,                            // 200
    BadRequest,                    // 400
    NotFound,                      // 404
    MethodNotAllowed,              // 405
    UnprocessableContent,          // 422
    InternalServerError,           // 500
}

impl Status {
    /// Numeric code.
    pub fn code(self) -> u16 {
        match self {
            Self::Ok                   => 200,
            Self::BadRequest           => 400,
            Self::NotFound             => 404,
            Self::MethodNotAllowed     => 405,
            Self::UnprocessableContent => 422,
            Self::InternalServerError  => 500,
        }
    }
}

impl From<Status> for u16 {
    fn from(status: Status) -> u16 {
        status.code()
    }
}

//! Incoming HTTP request type and input binding.
//!
//! Handlers declare what they read. There is no signature reflection: a
//! handler either asks for one path parameter, binds a small `Deserialize`
//! struct of scalar inputs, or reads the whole body as a schema record.
//!
//! | Call | Source | Typical use |
//! |---|---|---|
//! | [`Request::param`] | path | `/stations/{station_id}` |
//! | [`Request::bind`] | path > query > body fields | filters, pagination, credentials |
//! | [`Request::json`] | body | `StampCreate`, `UserProfileUpdate` |

use std::collections::HashMap;
use std::str::FromStr;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// An incoming HTTP request after routing.
#[derive(Debug)]
pub struct Request {
    pub(crate) query: String,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(query: String, body: Bytes, params: HashMap<String, String>) -> Self {
        Self { query, body, params }
    }

    /// Returns a named path parameter, converted to `T`.
    ///
    /// For a route `/stations/{station_id}`, `req.param::<i64>("station_id")`
    /// on `/stations/42` returns `Ok(42)`.
    pub fn param<T: FromStr>(&self, name: &str) -> Result<T, ApiError> {
        let raw = self.params.get(name).ok_or_else(|| {
            ApiError::unprocessable(format!("missing path parameter `{name}`"))
        })?;
        raw.parse().map_err(|_| {
            ApiError::unprocessable(format!("path parameter `{name}` has an invalid value"))
        })
    }

    /// Binds a struct of scalar inputs.
    ///
    /// Each name is looked up in path parameters first, then the query
    /// string, then the top-level fields of a JSON object body. String values
    /// are converted to the field's declared type (`i64`, `f64`, ...).
    pub fn bind<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let mut pairs: Vec<(String, String)> = self.params.iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let query: Vec<(String, String)> = serde_urlencoded::from_str(&self.query)
            .map_err(|e| ApiError::unprocessable(format!("query: {e}")))?;
        for (name, value) in query {
            push_absent(&mut pairs, name, value);
        }

        if let Some(Value::Object(fields)) = self.body_value() {
            for (name, value) in fields {
                let value = match value {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Null | Value::Array(_) | Value::Object(_) => continue,
                };
                push_absent(&mut pairs, name, value);
            }
        }

        // Round-trip through the form codec so serde_urlencoded does the
        // string-to-declared-type conversion.
        let encoded = serde_urlencoded::to_string(&pairs)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        serde_urlencoded::from_str(&encoded).map_err(|e| ApiError::unprocessable(e.to_string()))
    }

    /// Deserializes the JSON body as `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        if self.body.is_empty() {
            return Err(ApiError::unprocessable("request body is required"));
        }
        serde_json::from_slice(&self.body).map_err(|e| ApiError::unprocessable(e.to_string()))
    }

    fn body_value(&self) -> Option<Value> {
        if self.body.is_empty() {
            return None;
        }
        serde_json::from_slice(&self.body).ok()
    }
}

fn push_absent(pairs: &mut Vec<(String, String)>, name: String, value: String) {
    if !pairs.iter().any(|(k, _)| *k == name) {
        pairs.push((name, value));
    }
}

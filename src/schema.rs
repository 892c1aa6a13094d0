//! Declarative records: construct, dump, copy.
//!
//! A schema type is any serde record that opts in with `impl Schema for T {}`.
//! Defaults come from `#[serde(default)]` attributes, so every instance gets
//! its own fresh container values.
//!
//! Partial updates need to tell "the client left this field out" apart from
//! "the client sent `null`". [`Field`] carries that third state, and
//! [`Schema::fields_set`] reports which fields were actually supplied so that
//! [`DumpOptions::exclude_unset`] can drop the rest.
//!
//! ```rust
//! use michi::schema::{DumpOptions, Field, Schema};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Rename {
//!     #[serde(default)]
//!     name: Field<String>,
//!     #[serde(default)]
//!     bio: Field<String>,
//! }
//!
//! impl Schema for Rename {
//!     fn fields_set(&self) -> Option<Vec<&'static str>> {
//!         let mut set = Vec::new();
//!         if self.name.is_set() { set.push("name"); }
//!         if self.bio.is_set() { set.push("bio"); }
//!         Some(set)
//!     }
//! }
//!
//! let update: Rename = serde_json::from_str(r#"{"bio": null}"#).unwrap();
//! let dumped = update.dump(DumpOptions { exclude_unset: true, ..Default::default() }).unwrap();
//! assert_eq!(serde_json::Value::Object(dumped), serde_json::json!({"bio": null}));
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Errors from building or dumping a schema record.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("value is not a record")]
    NotARecord,
}

// ── Field ────────────────────────────────────────────────────────────────────

/// An optional field that remembers whether it was supplied at all.
///
/// Declare with `#[serde(default)]`: a missing key stays [`Field::Unset`],
/// an explicit `null` becomes [`Field::Null`].
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Unset,
    Null,
    Value(T),
}

impl<T> Field<T> {
    /// `true` unless the field was left out of the payload.
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.map_or(Self::Null, Self::Value))
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            Self::Unset | Self::Null => serializer.serialize_none(),
        }
    }
}

// ── Schema ───────────────────────────────────────────────────────────────────

/// Filters applied by [`Schema::dump`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpOptions {
    /// Drop fields whose value is `null`.
    pub exclude_none: bool,
    /// Drop fields not reported by [`Schema::fields_set`].
    pub exclude_unset: bool,
}

impl DumpOptions {
    /// The filter set a partial update uses: only supplied, non-null fields.
    pub const PATCH: Self = Self { exclude_none: true, exclude_unset: true };
}

/// A typed record with named fields.
pub trait Schema: Serialize + DeserializeOwned {
    /// Names of the fields explicitly supplied when this instance was built.
    ///
    /// `None` means every field counts as set.
    fn fields_set(&self) -> Option<Vec<&'static str>> {
        None
    }

    /// Builds an instance from named fields; missing fields take their
    /// declared default.
    fn construct(fields: Map<String, Value>) -> Result<Self, SchemaError> {
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    /// Field name → value, in declaration order.
    fn dump(&self, options: DumpOptions) -> Result<Map<String, Value>, SchemaError> {
        let Value::Object(mut fields) = serde_json::to_value(self)? else {
            return Err(SchemaError::NotARecord);
        };
        if options.exclude_unset {
            if let Some(set) = self.fields_set() {
                fields.retain(|name, _| set.contains(&name.as_str()));
            }
        }
        if options.exclude_none {
            fields.retain(|_, value| !value.is_null());
        }
        Ok(fields)
    }

    /// A new instance equal to `self` except for the fields in `updates`.
    fn copy_with(&self, updates: Map<String, Value>) -> Result<Self, SchemaError> {
        let mut fields = self.dump(DumpOptions::default())?;
        fields.extend(updates);
        Self::construct(fields)
    }
}

//! Custom scalar adapters.
//!
//! Each custom scalar in a schema (`ID`, `DateTime`, ...) is addressed by a
//! [`CustomTypeId`]. The host registers one adapter per id at startup; the
//! reader and writer look the adapter up whenever a descriptor of kind
//! `CustomScalar` is decoded or encoded.

use gqlshape_core::{CustomTypeId, ErrorCode, ResponseError, ResponseResult};
use rustc_hash::FxHashMap;
use serde_json::{Number, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The raw wire form of a custom scalar, before adaptation.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomTypeValue {
    String(String),
    Boolean(bool),
    Number(Number),
    /// Objects and lists, for JSON-like scalars.
    Json(Value),
}

impl CustomTypeValue {
    /// Wraps a non-null JSON value.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => Self::String(s),
            Value::Bool(b) => Self::Boolean(b),
            Value::Number(n) => Self::Number(n),
            other => Self::Json(other),
        }
    }

    /// Unwraps into a JSON value.
    pub fn into_json(self) -> Value {
        match self {
            Self::String(s) => Value::String(s),
            Self::Boolean(b) => Value::Bool(b),
            Self::Number(n) => Value::Number(n),
            Self::Json(v) => v,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::Json(_) => "json",
        }
    }
}

impl fmt::Display for CustomTypeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

/// Converts between a custom scalar's wire form and its host type.
///
/// `encode` must be the inverse of `decode` for every value the adapter
/// produces.
pub trait CustomTypeAdapter<T>: Send + Sync {
    fn decode(&self, value: CustomTypeValue) -> ResponseResult<T>;
    fn encode(&self, value: &T) -> ResponseResult<CustomTypeValue>;
}

/// Identity adapter for scalars carried as strings (`ID`, opaque cursors).
///
/// Numeric wire values are accepted and kept as their decimal text, as
/// GraphQL allows for `ID`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringAdapter;

impl CustomTypeAdapter<String> for StringAdapter {
    fn decode(&self, value: CustomTypeValue) -> ResponseResult<String> {
        match value {
            CustomTypeValue::String(s) => Ok(s),
            CustomTypeValue::Number(n) => Ok(n.to_string()),
            other => Err(ResponseError::type_mismatch("string", other.kind())),
        }
    }

    fn encode(&self, value: &String) -> ResponseResult<CustomTypeValue> {
        Ok(CustomTypeValue::String(value.clone()))
    }
}

/// Pass-through adapter that keeps the raw wire value.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawAdapter;

impl CustomTypeAdapter<CustomTypeValue> for RawAdapter {
    fn decode(&self, value: CustomTypeValue) -> ResponseResult<CustomTypeValue> {
        Ok(value)
    }

    fn encode(&self, value: &CustomTypeValue) -> ResponseResult<CustomTypeValue> {
        Ok(value.clone())
    }
}

/// The custom scalar registry.
#[derive(Clone, Default)]
pub struct ScalarTypeAdapters {
    adapters: FxHashMap<CustomTypeId, Arc<dyn Any + Send + Sync>>,
}

impl ScalarTypeAdapters {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the adapter for a custom scalar, replacing any previous one.
    #[must_use]
    pub fn register<T, A>(mut self, type_id: CustomTypeId, adapter: A) -> Self
    where
        T: 'static,
        A: CustomTypeAdapter<T> + 'static,
    {
        let adapter: Arc<dyn CustomTypeAdapter<T>> = Arc::new(adapter);
        self.adapters.insert(type_id, Arc::new(adapter));
        self
    }

    /// Registers [`StringAdapter`] for a custom scalar.
    #[must_use]
    pub fn register_string(self, type_id: CustomTypeId) -> Self {
        self.register::<String, _>(type_id, StringAdapter)
    }

    /// Returns true if an adapter is registered for `type_id`.
    pub fn contains(&self, type_id: &CustomTypeId) -> bool {
        self.adapters.contains_key(type_id)
    }

    /// Fails with `UnknownCustomType` unless an adapter is registered.
    pub fn require(&self, type_id: &CustomTypeId) -> ResponseResult<()> {
        if self.contains(type_id) {
            Ok(())
        } else {
            Err(ResponseError::unknown_custom_type(type_id))
        }
    }

    /// Looks up the adapter producing host type `T`.
    pub fn adapter_for<T: 'static>(
        &self,
        type_id: &CustomTypeId,
    ) -> ResponseResult<&dyn CustomTypeAdapter<T>> {
        let entry = self
            .adapters
            .get(type_id)
            .ok_or_else(|| ResponseError::unknown_custom_type(type_id))?;
        entry
            .downcast_ref::<Arc<dyn CustomTypeAdapter<T>>>()
            .map(|adapter| adapter.as_ref())
            .ok_or_else(|| {
                ResponseError::new(
                    ErrorCode::TypeMismatch,
                    format!(
                        "adapter for `{type_id}` does not produce `{}`",
                        std::any::type_name::<T>()
                    ),
                )
            })
    }

    /// Decodes a wire value with the adapter for `type_id`.
    pub fn decode<T: 'static>(
        &self,
        type_id: &CustomTypeId,
        value: CustomTypeValue,
    ) -> ResponseResult<T> {
        self.adapter_for::<T>(type_id)?.decode(value)
    }

    /// Encodes a host value with the adapter for `type_id`.
    pub fn encode<T: 'static>(
        &self,
        type_id: &CustomTypeId,
        value: &T,
    ) -> ResponseResult<CustomTypeValue> {
        self.adapter_for::<T>(type_id)?.encode(value)
    }
}

impl fmt::Debug for ScalarTypeAdapters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.adapters.keys().map(CustomTypeId::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("ScalarTypeAdapters")
            .field("registered", &ids)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: CustomTypeId = CustomTypeId::from_static("ID");
    const DATE: CustomTypeId = CustomTypeId::from_static("Date");

    struct EpochDays;

    impl CustomTypeAdapter<u32> for EpochDays {
        fn decode(&self, value: CustomTypeValue) -> ResponseResult<u32> {
            match value {
                CustomTypeValue::Number(n) => n
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| ResponseError::type_mismatch("day count", n)),
                other => Err(ResponseError::type_mismatch("number", other.kind())),
            }
        }

        fn encode(&self, value: &u32) -> ResponseResult<CustomTypeValue> {
            Ok(CustomTypeValue::Number(Number::from(*value)))
        }
    }

    #[test]
    fn test_string_adapter_is_identity() {
        let adapters = ScalarTypeAdapters::new().register_string(ID);
        let decoded: String = adapters
            .decode(&ID, CustomTypeValue::String("1000".into()))
            .unwrap();
        assert_eq!(decoded, "1000");
        assert_eq!(
            adapters.encode(&ID, &decoded).unwrap(),
            CustomTypeValue::String("1000".into())
        );

        let numeric: String = adapters
            .decode(&ID, CustomTypeValue::Number(Number::from(7)))
            .unwrap();
        assert_eq!(numeric, "7");
    }

    #[test]
    fn test_unknown_custom_type() {
        let adapters = ScalarTypeAdapters::new();
        let err = adapters
            .decode::<String>(&ID, CustomTypeValue::String("1".into()))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownCustomType);
        assert!(adapters.require(&ID).is_err());
    }

    #[test]
    fn test_host_type_mismatch() {
        let adapters = ScalarTypeAdapters::new().register::<u32, _>(DATE, EpochDays);
        let err = adapters
            .decode::<String>(&DATE, CustomTypeValue::Number(Number::from(3)))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TypeMismatch);

        let days: u32 = adapters
            .decode(&DATE, CustomTypeValue::Number(Number::from(19000)))
            .unwrap();
        assert_eq!(days, 19000);
    }
}

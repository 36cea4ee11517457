//! The reader half of the response protocol.
//!
//! A [`ResponseReader`] is positioned over one object of a structured
//! payload. Mappers extract values from it one descriptor at a time, in
//! descriptor order. Readers are oblivious to the physical payload format;
//! see [`crate::json`] for the JSON-backed implementation.

use crate::scalars::{CustomTypeValue, ScalarTypeAdapters};
use gqlshape_core::{CustomTypeId, ResponseError, ResponseField, ResponseResult, Variables};

/// Everything a reader needs besides the payload itself.
#[derive(Debug, Clone, Copy)]
pub struct ReadContext<'a> {
    /// Bound variables, consulted to evaluate `@skip`/`@include`.
    pub variables: &'a Variables,
    /// The custom scalar registry.
    pub adapters: &'a ScalarTypeAdapters,
}

impl<'a> ReadContext<'a> {
    pub fn new(variables: &'a Variables, adapters: &'a ScalarTypeAdapters) -> Self {
        Self {
            variables,
            adapters,
        }
    }
}

/// Progress of a reader over a single object.
///
/// `Start → ReadTypename → ReadFields → ReadFragments → Done`, or `Failed`
/// from any state on an unrecoverable decode error. A selection without a
/// typename goes straight from `Start` to `ReadFields`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Start,
    ReadTypename,
    ReadFields,
    ReadFragments,
    Done,
    Failed,
}

/// Typed extraction from one object of a response payload.
///
/// Every `read_*` method yields `Ok(Some(_))` for a present value,
/// `Ok(None)` for an absent one (only when the descriptor is optional or
/// excluded by its conditions) and `Err(_)` otherwise.
pub trait ResponseReader: Sized {
    /// Reader handed to list element callbacks.
    type ListItem: ListItemReader<Object = Self>;

    fn read_string(&mut self, field: &ResponseField) -> ResponseResult<Option<String>>;

    fn read_int(&mut self, field: &ResponseField) -> ResponseResult<Option<i64>>;

    fn read_double(&mut self, field: &ResponseField) -> ResponseResult<Option<f64>>;

    fn read_boolean(&mut self, field: &ResponseField) -> ResponseResult<Option<bool>>;

    /// Reads the raw wire form of a custom scalar.
    fn read_custom_value(&mut self, field: &ResponseField)
        -> ResponseResult<Option<CustomTypeValue>>;

    /// Invokes `read` with a reader positioned over the nested object.
    fn read_object<T, F>(&mut self, field: &ResponseField, read: F) -> ResponseResult<Option<T>>
    where
        F: FnOnce(&mut Self) -> ResponseResult<T>;

    /// Decodes every element through `read`, preserving input order.
    fn read_list<T, F>(&mut self, field: &ResponseField, read: F) -> ResponseResult<Option<Vec<T>>>
    where
        F: FnMut(&mut Self::ListItem) -> ResponseResult<T>;

    /// Exposes the current object's `__typename` and invokes `read` with
    /// this same reader, so fragment mappers can re-read the object.
    fn read_conditional<T, F>(
        &mut self,
        field: &ResponseField,
        read: F,
    ) -> ResponseResult<Option<T>>
    where
        F: FnOnce(&str, &mut Self) -> ResponseResult<T>;

    /// The custom scalar registry this reader decodes with.
    fn scalar_adapters(&self) -> &ScalarTypeAdapters;

    /// Variables the operation was executed with.
    fn variables(&self) -> &Variables;

    /// Reads a custom scalar and adapts it to host type `T`.
    fn read_custom_type<T: 'static>(&mut self, field: &ResponseField) -> ResponseResult<Option<T>> {
        let Some(type_id) = field.custom_type_id() else {
            return Err(ResponseError::type_mismatch(
                "custom scalar descriptor",
                format!("{:?}", field.kind()),
            )
            .at(field.response_name()));
        };
        let type_id = type_id.clone();
        self.scalar_adapters()
            .require(&type_id)
            .map_err(|e| e.at(field.response_name()))?;
        match self.read_custom_value(field)? {
            Some(value) => self
                .scalar_adapters()
                .decode(&type_id, value)
                .map(Some)
                .map_err(|e| e.at(field.response_name())),
            None => Ok(None),
        }
    }
}

/// Reader for a single list element.
///
/// Elements have no descriptor of their own; nullability of an element is
/// reported as `Ok(None)` and left to the caller.
pub trait ListItemReader: Sized {
    /// Reader used for object elements.
    type Object: ResponseReader;

    fn read_string(&mut self) -> ResponseResult<Option<String>>;

    fn read_int(&mut self) -> ResponseResult<Option<i64>>;

    fn read_double(&mut self) -> ResponseResult<Option<f64>>;

    fn read_boolean(&mut self) -> ResponseResult<Option<bool>>;

    fn read_custom_value(&mut self) -> ResponseResult<Option<CustomTypeValue>>;

    fn read_object<T, F>(&mut self, read: F) -> ResponseResult<Option<T>>
    where
        F: FnOnce(&mut Self::Object) -> ResponseResult<T>;

    fn read_list<T, F>(&mut self, read: F) -> ResponseResult<Option<Vec<T>>>
    where
        F: FnMut(&mut Self) -> ResponseResult<T>;

    fn scalar_adapters(&self) -> &ScalarTypeAdapters;

    fn read_custom_type<T: 'static>(&mut self, type_id: &CustomTypeId) -> ResponseResult<Option<T>> {
        self.scalar_adapters().require(type_id)?;
        match self.read_custom_value()? {
            Some(value) => self.scalar_adapters().decode(type_id, value).map(Some),
            None => Ok(None),
        }
    }
}

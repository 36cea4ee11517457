//! The writer half of the response protocol.

use crate::model::ResponseFieldMarshaller;
use crate::scalars::{CustomTypeValue, ScalarTypeAdapters};
use gqlshape_core::{CustomTypeId, ResponseError, ResponseField, ResponseResult};

/// Emits one object of a response payload, one descriptor at a time.
///
/// Writing `None` for a non-optional descriptor fails with
/// `MissingRequiredField`.
pub trait ResponseWriter: Sized {
    /// Writer handed to list element callbacks.
    type ListItem: ListItemWriter<Object = Self>;

    fn write_string(&mut self, field: &ResponseField, value: Option<&str>) -> ResponseResult<()>;

    fn write_int(&mut self, field: &ResponseField, value: Option<i64>) -> ResponseResult<()>;

    fn write_double(&mut self, field: &ResponseField, value: Option<f64>) -> ResponseResult<()>;

    fn write_boolean(&mut self, field: &ResponseField, value: Option<bool>) -> ResponseResult<()>;

    /// Writes the raw wire form of a custom scalar.
    fn write_custom_value(
        &mut self,
        field: &ResponseField,
        value: Option<CustomTypeValue>,
    ) -> ResponseResult<()>;

    /// Writes a nested object produced by `marshaller`.
    fn write_object<M>(&mut self, field: &ResponseField, marshaller: Option<&M>) -> ResponseResult<()>
    where
        M: ResponseFieldMarshaller;

    /// Writes every item through `write`, in order.
    fn write_list<T, F>(
        &mut self,
        field: &ResponseField,
        items: Option<&[T]>,
        write: F,
    ) -> ResponseResult<()>
    where
        F: FnMut(&T, &mut Self::ListItem) -> ResponseResult<()>;

    /// The custom scalar registry this writer encodes with.
    fn scalar_adapters(&self) -> &ScalarTypeAdapters;

    /// Encodes host value `T` with its adapter and writes it.
    fn write_custom<T: 'static>(&mut self, field: &ResponseField, value: Option<&T>) -> ResponseResult<()> {
        let Some(type_id) = field.custom_type_id() else {
            return Err(ResponseError::type_mismatch(
                "custom scalar descriptor",
                format!("{:?}", field.kind()),
            )
            .at(field.response_name()));
        };
        let encoded = match value {
            Some(value) => Some(
                self.scalar_adapters()
                    .encode(type_id, value)
                    .map_err(|e| e.at(field.response_name()))?,
            ),
            None => None,
        };
        self.write_custom_value(field, encoded)
    }
}

/// Writer for a single list element.
pub trait ListItemWriter: Sized {
    /// Writer used for object elements.
    type Object: ResponseWriter;

    fn write_string(&mut self, value: Option<&str>) -> ResponseResult<()>;

    fn write_int(&mut self, value: Option<i64>) -> ResponseResult<()>;

    fn write_double(&mut self, value: Option<f64>) -> ResponseResult<()>;

    fn write_boolean(&mut self, value: Option<bool>) -> ResponseResult<()>;

    fn write_custom_value(&mut self, value: Option<CustomTypeValue>) -> ResponseResult<()>;

    fn write_object<M>(&mut self, marshaller: Option<&M>) -> ResponseResult<()>
    where
        M: ResponseFieldMarshaller;

    fn write_list<T, F>(&mut self, items: Option<&[T]>, write: F) -> ResponseResult<()>
    where
        F: FnMut(&T, &mut Self) -> ResponseResult<()>;

    fn scalar_adapters(&self) -> &ScalarTypeAdapters;

    fn write_custom<T: 'static>(&mut self, type_id: &CustomTypeId, value: Option<&T>) -> ResponseResult<()> {
        let encoded = match value {
            Some(value) => Some(self.scalar_adapters().encode(type_id, value)?),
            None => None,
        };
        self.write_custom_value(encoded)
    }
}

//! JSON-backed reader and writer.

use crate::model::{ResponseFieldMapper, ResponseFieldMarshaller};
use crate::reader::{ListItemReader, ReadContext, ReaderState, ResponseReader};
use crate::scalars::{CustomTypeValue, ScalarTypeAdapters};
use crate::writer::{ListItemWriter, ResponseWriter};
use gqlshape_core::{
    ErrorCode, ResponseError, ResponseField, ResponseResult, ResultExt, ScalarType, Variables,
    TYPENAME,
};
use serde_json::{Map, Number, Value};

/// Parses raw payload bytes into a JSON document.
///
/// Truncated input fails with `ReaderExhausted`, anything else that is not
/// JSON with `InvalidPayload`.
pub fn parse_payload(bytes: &[u8]) -> ResponseResult<Value> {
    serde_json::from_slice(bytes).map_err(|e| {
        if e.is_eof() {
            ResponseError::exhausted(format!("payload ended early: {e}"))
        } else {
            ResponseError::new(ErrorCode::InvalidPayload, e.to_string())
        }
    })
}

/// Decodes a root selection from a JSON object.
pub fn read_data<D: ResponseFieldMapper>(value: &Value, context: ReadContext<'_>) -> ResponseResult<D> {
    let Value::Object(object) = value else {
        return Err(ResponseError::type_mismatch("object", kind_of(value)));
    };
    let mut reader = JsonResponseReader::new(object, context);
    let data = D::map(&mut reader);
    reader.finish(data.is_ok());
    data
}

/// Encodes a root selection as a JSON object.
pub fn write_data<M: ResponseFieldMarshaller>(
    model: &M,
    adapters: &ScalarTypeAdapters,
) -> ResponseResult<Value> {
    let mut writer = JsonResponseWriter::new(adapters);
    model.marshal(&mut writer)?;
    Ok(writer.into_value())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn as_string(value: &Value) -> ResponseResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(ResponseError::type_mismatch(ScalarType::String, kind_of(other))),
    }
}

fn as_int(value: &Value) -> ResponseResult<i64> {
    value
        .as_i64()
        .ok_or_else(|| ResponseError::type_mismatch(ScalarType::Int, kind_of(value)))
}

fn as_double(value: &Value) -> ResponseResult<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ResponseError::type_mismatch(ScalarType::Double, n)),
        other => Err(ResponseError::type_mismatch(ScalarType::Double, kind_of(other))),
    }
}

fn as_boolean(value: &Value) -> ResponseResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| ResponseError::type_mismatch(ScalarType::Boolean, kind_of(value)))
}

fn double_value(value: f64) -> ResponseResult<Value> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| ResponseError::type_mismatch("finite number", value))
}

/// Reads one JSON object.
#[derive(Debug)]
pub struct JsonResponseReader<'a> {
    object: &'a Map<String, Value>,
    context: ReadContext<'a>,
    state: ReaderState,
}

impl<'a> JsonResponseReader<'a> {
    pub fn new(object: &'a Map<String, Value>, context: ReadContext<'a>) -> Self {
        Self {
            object,
            context,
            state: ReaderState::Start,
        }
    }

    /// Positions a reader over `value`, which must be an object.
    pub fn from_value(value: &'a Value, context: ReadContext<'a>) -> ResponseResult<Self> {
        match value {
            Value::Object(object) => Ok(Self::new(object, context)),
            other => Err(ResponseError::type_mismatch("object", kind_of(other))),
        }
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Marks the object as fully read, or failed.
    pub fn finish(&mut self, ok: bool) {
        self.state = if ok {
            ReaderState::Done
        } else {
            ReaderState::Failed
        };
    }

    fn advance(&mut self, field: &ResponseField) {
        self.state = match self.state {
            ReaderState::Start if field.response_name() == TYPENAME => ReaderState::ReadTypename,
            ReaderState::Start | ReaderState::ReadTypename => ReaderState::ReadFields,
            other => other,
        };
    }

    /// Looks up the value for `field`, applying conditions and nullability.
    fn value_for(&mut self, field: &ResponseField) -> ResponseResult<Option<&'a Value>> {
        if !field.is_included(self.context.variables) {
            tracing::debug!(field = field.response_name(), "field excluded by condition");
            return Ok(None);
        }
        self.advance(field);
        let object = self.object;
        match object.get(field.response_name()) {
            None | Some(Value::Null) if field.is_optional() => Ok(None),
            None | Some(Value::Null) => {
                self.state = ReaderState::Failed;
                Err(ResponseError::missing_field(field.response_name()))
            }
            Some(value) => Ok(Some(value)),
        }
    }

    fn read_with<T>(
        &mut self,
        field: &ResponseField,
        convert: impl FnOnce(&'a Value) -> ResponseResult<T>,
    ) -> ResponseResult<Option<T>> {
        let Some(value) = self.value_for(field)? else {
            return Ok(None);
        };
        let result = convert(value).at(field.response_name());
        if result.is_err() {
            self.state = ReaderState::Failed;
        }
        result.map(Some)
    }
}

impl<'a> ResponseReader for JsonResponseReader<'a> {
    type ListItem = JsonListItemReader<'a>;

    fn read_string(&mut self, field: &ResponseField) -> ResponseResult<Option<String>> {
        self.read_with(field, as_string)
    }

    fn read_int(&mut self, field: &ResponseField) -> ResponseResult<Option<i64>> {
        self.read_with(field, as_int)
    }

    fn read_double(&mut self, field: &ResponseField) -> ResponseResult<Option<f64>> {
        self.read_with(field, as_double)
    }

    fn read_boolean(&mut self, field: &ResponseField) -> ResponseResult<Option<bool>> {
        self.read_with(field, as_boolean)
    }

    fn read_custom_value(
        &mut self,
        field: &ResponseField,
    ) -> ResponseResult<Option<CustomTypeValue>> {
        self.read_with(field, |value| Ok(CustomTypeValue::from_json(value.clone())))
    }

    fn read_object<T, F>(&mut self, field: &ResponseField, read: F) -> ResponseResult<Option<T>>
    where
        F: FnOnce(&mut Self) -> ResponseResult<T>,
    {
        let context = self.context;
        self.read_with(field, |value| {
            let mut nested = JsonResponseReader::from_value(value, context)?;
            let result = read(&mut nested);
            nested.finish(result.is_ok());
            result
        })
    }

    fn read_list<T, F>(&mut self, field: &ResponseField, mut read: F) -> ResponseResult<Option<Vec<T>>>
    where
        F: FnMut(&mut Self::ListItem) -> ResponseResult<T>,
    {
        let context = self.context;
        self.read_with(field, |value| {
            let Value::Array(items) = value else {
                return Err(ResponseError::type_mismatch("list", kind_of(value)));
            };
            items
                .iter()
                .enumerate()
                .map(|(index, item)| read(&mut JsonListItemReader::new(item, context)).at(index))
                .collect()
        })
    }

    fn read_conditional<T, F>(&mut self, field: &ResponseField, read: F) -> ResponseResult<Option<T>>
    where
        F: FnOnce(&str, &mut Self) -> ResponseResult<T>,
    {
        if !field.is_included(self.context.variables) {
            return Ok(None);
        }
        let object = self.object;
        let typename = match object.get(TYPENAME) {
            Some(Value::String(typename)) => typename.as_str(),
            None | Some(Value::Null) => {
                self.state = ReaderState::Failed;
                return Err(ResponseError::missing_field(TYPENAME));
            }
            Some(other) => {
                self.state = ReaderState::Failed;
                return Err(ResponseError::type_mismatch(ScalarType::String, kind_of(other)).at(TYPENAME));
            }
        };
        if self.state == ReaderState::Start {
            tracing::warn!(typename, "fragments read before `__typename`");
        }
        self.state = ReaderState::ReadFragments;
        tracing::trace!(typename, "dispatching fragments");
        let result = read(typename, self);
        if result.is_err() {
            self.state = ReaderState::Failed;
        }
        result.map(Some)
    }

    fn scalar_adapters(&self) -> &ScalarTypeAdapters {
        self.context.adapters
    }

    fn variables(&self) -> &Variables {
        self.context.variables
    }
}

/// Reads one JSON list element.
#[derive(Debug)]
pub struct JsonListItemReader<'a> {
    value: &'a Value,
    context: ReadContext<'a>,
}

impl<'a> JsonListItemReader<'a> {
    pub fn new(value: &'a Value, context: ReadContext<'a>) -> Self {
        Self { value, context }
    }

    fn read_with<T>(&self, convert: impl FnOnce(&'a Value) -> ResponseResult<T>) -> ResponseResult<Option<T>> {
        match self.value {
            Value::Null => Ok(None),
            value => convert(value).map(Some),
        }
    }
}

impl<'a> ListItemReader for JsonListItemReader<'a> {
    type Object = JsonResponseReader<'a>;

    fn read_string(&mut self) -> ResponseResult<Option<String>> {
        self.read_with(as_string)
    }

    fn read_int(&mut self) -> ResponseResult<Option<i64>> {
        self.read_with(as_int)
    }

    fn read_double(&mut self) -> ResponseResult<Option<f64>> {
        self.read_with(as_double)
    }

    fn read_boolean(&mut self) -> ResponseResult<Option<bool>> {
        self.read_with(as_boolean)
    }

    fn read_custom_value(&mut self) -> ResponseResult<Option<CustomTypeValue>> {
        self.read_with(|value| Ok(CustomTypeValue::from_json(value.clone())))
    }

    fn read_object<T, F>(&mut self, read: F) -> ResponseResult<Option<T>>
    where
        F: FnOnce(&mut Self::Object) -> ResponseResult<T>,
    {
        let context = self.context;
        self.read_with(|value| {
            let mut nested = JsonResponseReader::from_value(value, context)?;
            let result = read(&mut nested);
            nested.finish(result.is_ok());
            result
        })
    }

    fn read_list<T, F>(&mut self, mut read: F) -> ResponseResult<Option<Vec<T>>>
    where
        F: FnMut(&mut Self) -> ResponseResult<T>,
    {
        let context = self.context;
        self.read_with(|value| {
            let Value::Array(items) = value else {
                return Err(ResponseError::type_mismatch("list", kind_of(value)));
            };
            items
                .iter()
                .enumerate()
                .map(|(index, item)| read(&mut JsonListItemReader::new(item, context)).at(index))
                .collect()
        })
    }

    fn scalar_adapters(&self) -> &ScalarTypeAdapters {
        self.context.adapters
    }
}

/// Builds one JSON object.
///
/// Fields land in write order. Writing a response name twice keeps its
/// first position and the last value, which is how fragment marshallers
/// merge into their parent object.
#[derive(Debug)]
pub struct JsonResponseWriter<'a> {
    fields: Map<String, Value>,
    adapters: &'a ScalarTypeAdapters,
}

impl<'a> JsonResponseWriter<'a> {
    pub fn new(adapters: &'a ScalarTypeAdapters) -> Self {
        Self {
            fields: Map::new(),
            adapters,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    fn put(&mut self, field: &ResponseField, value: Option<Value>) -> ResponseResult<()> {
        match value {
            Some(value) => {
                self.fields.insert(field.response_name().to_owned(), value);
                Ok(())
            }
            None if field.is_optional() => {
                self.fields.insert(field.response_name().to_owned(), Value::Null);
                Ok(())
            }
            None => Err(ResponseError::missing_field(field.response_name())),
        }
    }
}

impl<'a> ResponseWriter for JsonResponseWriter<'a> {
    type ListItem = JsonListItemWriter<'a>;

    fn write_string(&mut self, field: &ResponseField, value: Option<&str>) -> ResponseResult<()> {
        self.put(field, value.map(|s| Value::String(s.to_owned())))
    }

    fn write_int(&mut self, field: &ResponseField, value: Option<i64>) -> ResponseResult<()> {
        self.put(field, value.map(Value::from))
    }

    fn write_double(&mut self, field: &ResponseField, value: Option<f64>) -> ResponseResult<()> {
        let value = value.map(double_value).transpose().at(field.response_name())?;
        self.put(field, value)
    }

    fn write_boolean(&mut self, field: &ResponseField, value: Option<bool>) -> ResponseResult<()> {
        self.put(field, value.map(Value::Bool))
    }

    fn write_custom_value(
        &mut self,
        field: &ResponseField,
        value: Option<CustomTypeValue>,
    ) -> ResponseResult<()> {
        self.put(field, value.map(CustomTypeValue::into_json))
    }

    fn write_object<M>(&mut self, field: &ResponseField, marshaller: Option<&M>) -> ResponseResult<()>
    where
        M: ResponseFieldMarshaller,
    {
        let value = match marshaller {
            Some(marshaller) => {
                let mut nested = JsonResponseWriter::new(self.adapters);
                marshaller.marshal(&mut nested).at(field.response_name())?;
                Some(nested.into_value())
            }
            None => None,
        };
        self.put(field, value)
    }

    fn write_list<T, F>(
        &mut self,
        field: &ResponseField,
        items: Option<&[T]>,
        mut write: F,
    ) -> ResponseResult<()>
    where
        F: FnMut(&T, &mut Self::ListItem) -> ResponseResult<()>,
    {
        let value = match items {
            Some(items) => {
                let mut list = JsonListItemWriter::new(self.adapters);
                for (index, item) in items.iter().enumerate() {
                    write(item, &mut list).at(index).at(field.response_name())?;
                }
                Some(Value::Array(list.values))
            }
            None => None,
        };
        self.put(field, value)
    }

    fn scalar_adapters(&self) -> &ScalarTypeAdapters {
        self.adapters
    }
}

/// Collects the elements of one JSON list.
#[derive(Debug)]
pub struct JsonListItemWriter<'a> {
    values: Vec<Value>,
    adapters: &'a ScalarTypeAdapters,
}

impl<'a> JsonListItemWriter<'a> {
    pub fn new(adapters: &'a ScalarTypeAdapters) -> Self {
        Self {
            values: Vec::new(),
            adapters,
        }
    }

    fn push(&mut self, value: Option<Value>) {
        self.values.push(value.unwrap_or(Value::Null));
    }
}

impl<'a> ListItemWriter for JsonListItemWriter<'a> {
    type Object = JsonResponseWriter<'a>;

    fn write_string(&mut self, value: Option<&str>) -> ResponseResult<()> {
        self.push(value.map(|s| Value::String(s.to_owned())));
        Ok(())
    }

    fn write_int(&mut self, value: Option<i64>) -> ResponseResult<()> {
        self.push(value.map(Value::from));
        Ok(())
    }

    fn write_double(&mut self, value: Option<f64>) -> ResponseResult<()> {
        let value = value.map(double_value).transpose()?;
        self.push(value);
        Ok(())
    }

    fn write_boolean(&mut self, value: Option<bool>) -> ResponseResult<()> {
        self.push(value.map(Value::Bool));
        Ok(())
    }

    fn write_custom_value(&mut self, value: Option<CustomTypeValue>) -> ResponseResult<()> {
        self.push(value.map(CustomTypeValue::into_json));
        Ok(())
    }

    fn write_object<M>(&mut self, marshaller: Option<&M>) -> ResponseResult<()>
    where
        M: ResponseFieldMarshaller,
    {
        let value = match marshaller {
            Some(marshaller) => {
                let mut nested = JsonResponseWriter::new(self.adapters);
                marshaller.marshal(&mut nested)?;
                Some(nested.into_value())
            }
            None => None,
        };
        self.push(value);
        Ok(())
    }

    fn write_list<T, F>(&mut self, items: Option<&[T]>, mut write: F) -> ResponseResult<()>
    where
        F: FnMut(&T, &mut Self) -> ResponseResult<()>,
    {
        let value = match items {
            Some(items) => {
                let mut list = JsonListItemWriter::new(self.adapters);
                for (index, item) in items.iter().enumerate() {
                    write(item, &mut list).at(index)?;
                }
                Some(Value::Array(list.values))
            }
            None => None,
        };
        self.push(value);
        Ok(())
    }

    fn scalar_adapters(&self) -> &ScalarTypeAdapters {
        self.adapters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlshape_core::{Condition, CustomTypeId, Variables};
    use serde_json::json;

    const ID: CustomTypeId = CustomTypeId::from_static("ID");

    fn with_reader<T>(
        payload: &Value,
        variables: &Variables,
        read: impl FnOnce(&mut JsonResponseReader<'_>) -> ResponseResult<T>,
    ) -> ResponseResult<T> {
        let adapters = ScalarTypeAdapters::new().register_string(ID);
        let context = ReadContext::new(variables, &adapters);
        let mut reader = JsonResponseReader::from_value(payload, context)?;
        read(&mut reader)
    }

    #[test]
    fn test_parse_payload_errors() {
        let err = parse_payload(br#"{"data": {"hero": "#).unwrap_err();
        assert_eq!(err.code, ErrorCode::ReaderExhausted);

        let err = parse_payload(b"not json").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPayload);

        assert_eq!(parse_payload(b"{}").unwrap(), json!({}));
    }

    #[test]
    fn test_read_scalars() {
        let payload = json!({"name": "R2-D2", "height": 1.09, "mass": 32, "flies": false});
        let vars = Variables::new();
        let values = with_reader(&payload, &vars, |r| {
            Ok((
                r.read_string(&ResponseField::for_string("name", "name"))?,
                r.read_double(&ResponseField::for_double("height", "height"))?,
                r.read_int(&ResponseField::for_int("mass", "mass"))?,
                r.read_boolean(&ResponseField::for_boolean("flies", "flies"))?,
            ))
        })
        .unwrap();
        assert_eq!(
            values,
            (Some("R2-D2".into()), Some(1.09), Some(32), Some(false))
        );
    }

    #[test]
    fn test_missing_and_null_fields() {
        let payload = json!({"name": null});
        let vars = Variables::new();

        let err = with_reader(&payload, &vars, |r| {
            r.read_string(&ResponseField::for_string("name", "name"))
        })
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
        assert_eq!(err.path.to_string(), "name");

        let value = with_reader(&payload, &vars, |r| {
            r.read_string(&ResponseField::for_string("nickname", "nickname").optional())
        })
        .unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_type_mismatch_path() {
        let payload = json!({"hero": {"appearsIn": ["JEDI", 3]}});
        let vars = Variables::new();
        let err = with_reader(&payload, &vars, |r| {
            r.read_object(&ResponseField::for_object("hero", "hero"), |hero| {
                hero.read_list(&ResponseField::for_list("appearsIn", "appearsIn"), |item| {
                    item.read_string()
                })
            })
        })
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::TypeMismatch);
        assert_eq!(err.path.to_string(), "hero.appearsIn[1]");
    }

    #[test]
    fn test_excluded_field_reads_absent() {
        let payload = json!({"name": "Luke"});
        let vars = Variables::new().with("skipName", true);
        let field = ResponseField::for_string("name", "name").with_condition(Condition::skip_if("skipName"));
        let value = with_reader(&payload, &vars, |r| r.read_string(&field)).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_read_custom_type() {
        let payload = json!({"id": "2001", "date": "2024-01-01"});
        let vars = Variables::new();
        let id: Option<String> = with_reader(&payload, &vars, |r| {
            r.read_custom_type(&ResponseField::for_custom_type("id", "id", ID))
        })
        .unwrap();
        assert_eq!(id.as_deref(), Some("2001"));

        let err = with_reader(&payload, &vars, |r| {
            r.read_custom_type::<String>(&ResponseField::for_custom_type(
                "date",
                "date",
                CustomTypeId::from_static("Date"),
            ))
        })
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownCustomType);
        assert_eq!(err.path.to_string(), "date");
    }

    #[test]
    fn test_read_conditional_reenters_reader() {
        let payload = json!({"__typename": "Droid", "name": "R2-D2"});
        let vars = Variables::new();
        let (typename, name) = with_reader(&payload, &vars, |r| {
            r.read_string(&ResponseField::for_typename())?;
            assert_eq!(r.state(), ReaderState::ReadTypename);
            let spread = ResponseField::for_fragment(["Droid"]);
            let result = r.read_conditional(&spread, |typename, r| {
                let name = r.read_string(&ResponseField::for_string("name", "name"))?;
                Ok((typename.to_owned(), name))
            })?;
            assert_eq!(r.state(), ReaderState::ReadFragments);
            Ok(result.unwrap())
        })
        .unwrap();
        assert_eq!(typename, "Droid");
        assert_eq!(name.as_deref(), Some("R2-D2"));
    }

    #[test]
    fn test_read_conditional_requires_typename() {
        let payload = json!({"name": "R2-D2"});
        let vars = Variables::new();
        let err = with_reader(&payload, &vars, |r| {
            r.read_conditional(&ResponseField::for_fragment(["Droid"]), |_, _| Ok(()))
        })
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
        assert_eq!(err.path.to_string(), TYPENAME);
    }

    #[test]
    fn test_writer_keeps_first_position() {
        let adapters = ScalarTypeAdapters::new();
        let mut writer = JsonResponseWriter::new(&adapters);
        let typename = ResponseField::for_typename();
        let name = ResponseField::for_string("name", "name");
        writer.write_string(&typename, Some("Droid")).unwrap();
        writer.write_string(&name, Some("R2")).unwrap();
        writer.write_string(&typename, Some("Droid")).unwrap();
        writer.write_string(&name, Some("R2-D2")).unwrap();

        let value = writer.into_value();
        assert_eq!(value, json!({"__typename": "Droid", "name": "R2-D2"}));
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["__typename", "name"]);
    }

    #[test]
    fn test_writer_rejects_missing_required() {
        let adapters = ScalarTypeAdapters::new();
        let mut writer = JsonResponseWriter::new(&adapters);
        let err = writer
            .write_string(&ResponseField::for_string("name", "name"), None)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);

        writer
            .write_list(
                &ResponseField::for_list("appearsIn", "appearsIn"),
                Some(&["JEDI", "EMPIRE"][..]),
                |item, w| w.write_string(Some(*item)),
            )
            .unwrap();
        assert_eq!(writer.into_value(), json!({"appearsIn": ["JEDI", "EMPIRE"]}));
    }
}

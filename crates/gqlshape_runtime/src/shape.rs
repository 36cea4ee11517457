//! Runtime selection shapes and the interpreter that decodes and encodes
//! them without generated code.
//!
//! A [`SelectionShape`] is the same tree the code generator walks: one
//! descriptor per merged field plus the fragments applicable to the
//! object. Decoding produces a [`ResponseObject`], a dynamically typed
//! model with the same equality, hashing and display rules as a generated
//! one.

use crate::model::{fx_hash, Memoized, ResponseFieldMarshaller, UNKNOWN_ENUM_VALUE};
use crate::reader::{ListItemReader, ResponseReader};
use crate::scalars::CustomTypeValue;
use crate::writer::{ListItemWriter, ResponseWriter};
use gqlshape_core::{
    required_item, Condition, CustomTypeId, ResponseError, ResponseField, ResponseResult, ScalarType,
    Variables,
};
use indexmap::IndexMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The shape of one object selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionShape {
    /// The schema type the selection is made on.
    pub type_name: String,
    pub fields: Vec<ShapeField>,
    pub fragments: Vec<FragmentShape>,
}

/// One merged field of a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeField {
    pub descriptor: ResponseField,
    pub value: ValueShape,
}

/// What a field holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueShape {
    Scalar(ScalarType),
    /// Known values of the enum; anything else decodes to the sentinel.
    Enum { values: Vec<String> },
    CustomScalar(CustomTypeId),
    Object(SelectionShape),
    List {
        item: Box<ValueShape>,
        item_optional: bool,
    },
}

/// A fragment applicable to an object at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentShape {
    /// Fragment name, or `As<Type>` for inline fragments.
    pub name: String,
    pub possible_types: Vec<String>,
    pub inline: bool,
    /// `@skip`/`@include` sets of the spreads that select this fragment.
    /// The fragment applies when any set passes; empty means always.
    pub conditions: Vec<Vec<Condition>>,
    pub selection: SelectionShape,
}

impl FragmentShape {
    /// Whether the fragment was requested under the bound variables.
    pub fn is_included(&self, variables: &Variables) -> bool {
        self.conditions.is_empty()
            || self
                .conditions
                .iter()
                .any(|set| set.iter().all(|c| c.passes(variables)))
    }

    /// Whether the fragment applies to an object of runtime type `typename`.
    pub fn applies_to(&self, typename: &str, variables: &Variables) -> bool {
        self.possible_types.iter().any(|t| t == typename) && self.is_included(variables)
    }
}

impl SelectionShape {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
            fragments: Vec::new(),
        }
    }

    /// Looks up a field by response name.
    pub fn field(&self, response_name: &str) -> Option<&ShapeField> {
        self.fields
            .iter()
            .find(|f| f.descriptor.response_name() == response_name)
    }

    /// The conditional descriptor covering every fragment, if any.
    ///
    /// It carries a condition set only when every fragment shares that one
    /// set; otherwise each fragment is checked during dispatch.
    pub fn fragment_descriptor(&self) -> Option<ResponseField> {
        let (first, rest) = self.fragments.split_first()?;
        let mut descriptor = ResponseField::for_fragment(
            self.fragments
                .iter()
                .flat_map(|f| f.possible_types.iter().cloned()),
        );
        if let [shared] = first.conditions.as_slice() {
            if rest.iter().all(|f| f.conditions == first.conditions) {
                for condition in shared {
                    descriptor = descriptor.with_condition(condition.clone());
                }
            }
        }
        Some(descriptor)
    }

    /// Field descriptors in read order, followed by the fragment descriptor.
    pub fn descriptor_table(&self) -> Vec<ResponseField> {
        let mut table: Vec<_> = self.fields.iter().map(|f| f.descriptor.clone()).collect();
        table.extend(self.fragment_descriptor());
        table
    }

    /// Decodes the object the reader is positioned over.
    pub fn read<R: ResponseReader>(&self, reader: &mut R) -> ResponseResult<ResponseObject> {
        let mut object = ResponseObject::new();
        for field in &self.fields {
            let value = read_field(reader, field)?;
            object.fields.insert(
                field.descriptor.response_name().to_owned(),
                value.unwrap_or(ResponseValue::Null),
            );
        }
        if let Some(spread) = self.fragment_descriptor() {
            let fragments = reader.read_conditional(&spread, |typename, reader| {
                let mut fragments = IndexMap::new();
                for fragment in &self.fragments {
                    let decoded = if fragment.applies_to(typename, reader.variables()) {
                        Some(fragment.selection.read(reader)?)
                    } else {
                        None
                    };
                    fragments.insert(fragment.name.clone(), decoded);
                }
                Ok(fragments)
            })?;
            object.fragments = fragments.unwrap_or_default();
        }
        Ok(object)
    }

    /// Encodes `object` into the writer's current object.
    pub fn write<W: ResponseWriter>(&self, object: &ResponseObject, writer: &mut W) -> ResponseResult<()> {
        for field in &self.fields {
            let value = object
                .fields
                .get(field.descriptor.response_name())
                .unwrap_or(&ResponseValue::Null);
            write_field(writer, field, value)?;
        }
        for fragment in &self.fragments {
            if let Some(Some(decoded)) = object.fragments.get(&fragment.name) {
                fragment.selection.write(decoded, writer)?;
            }
        }
        Ok(())
    }
}

/// Pairs a shape with a value so it can be passed where a marshaller is
/// expected.
#[derive(Debug, Clone, Copy)]
pub struct Shaped<'a> {
    pub shape: &'a SelectionShape,
    pub object: &'a ResponseObject,
}

impl ResponseFieldMarshaller for Shaped<'_> {
    fn marshal<W: ResponseWriter>(&self, writer: &mut W) -> ResponseResult<()> {
        self.shape.write(self.object, writer)
    }
}

fn enum_value(raw: String, values: &[String]) -> ResponseValue {
    if values.contains(&raw) {
        ResponseValue::Enum(raw)
    } else {
        tracing::debug!(value = %raw, "unknown enum value");
        ResponseValue::Enum(UNKNOWN_ENUM_VALUE.to_owned())
    }
}

fn read_field<R: ResponseReader>(reader: &mut R, field: &ShapeField) -> ResponseResult<Option<ResponseValue>> {
    let descriptor = &field.descriptor;
    Ok(match &field.value {
        ValueShape::Scalar(ScalarType::String) => reader.read_string(descriptor)?.map(ResponseValue::String),
        ValueShape::Scalar(ScalarType::Int) => reader.read_int(descriptor)?.map(ResponseValue::Int),
        ValueShape::Scalar(ScalarType::Double) => reader.read_double(descriptor)?.map(ResponseValue::Double),
        ValueShape::Scalar(ScalarType::Boolean) => reader.read_boolean(descriptor)?.map(ResponseValue::Boolean),
        ValueShape::Enum { values } => reader
            .read_string(descriptor)?
            .map(|raw| enum_value(raw, values)),
        ValueShape::CustomScalar(type_id) => {
            reader
                .scalar_adapters()
                .require(type_id)
                .map_err(|e| e.at(descriptor.response_name()))?;
            reader.read_custom_value(descriptor)?.map(ResponseValue::Custom)
        }
        ValueShape::Object(selection) => reader
            .read_object(descriptor, |reader| selection.read(reader))?
            .map(ResponseValue::Object),
        ValueShape::List { item, item_optional } => reader
            .read_list(descriptor, |element| read_item(element, item, *item_optional))?
            .map(ResponseValue::List),
    })
}

fn read_item<L: ListItemReader>(
    element: &mut L,
    shape: &ValueShape,
    optional: bool,
) -> ResponseResult<ResponseValue> {
    let value = match shape {
        ValueShape::Scalar(ScalarType::String) => element.read_string()?.map(ResponseValue::String),
        ValueShape::Scalar(ScalarType::Int) => element.read_int()?.map(ResponseValue::Int),
        ValueShape::Scalar(ScalarType::Double) => element.read_double()?.map(ResponseValue::Double),
        ValueShape::Scalar(ScalarType::Boolean) => element.read_boolean()?.map(ResponseValue::Boolean),
        ValueShape::Enum { values } => element.read_string()?.map(|raw| enum_value(raw, values)),
        ValueShape::CustomScalar(type_id) => {
            element.scalar_adapters().require(type_id)?;
            element.read_custom_value()?.map(ResponseValue::Custom)
        }
        ValueShape::Object(selection) => element
            .read_object(|reader| selection.read(reader))?
            .map(ResponseValue::Object),
        ValueShape::List { item, item_optional } => element
            .read_list(|inner| read_item(inner, item, *item_optional))?
            .map(ResponseValue::List),
    };
    match value {
        None if optional => Ok(ResponseValue::Null),
        value => required_item(value),
    }
}

fn mismatch(expected: impl fmt::Display, found: &ResponseValue) -> ResponseError {
    ResponseError::type_mismatch(expected, found.kind())
}

fn write_field<W: ResponseWriter>(writer: &mut W, field: &ShapeField, value: &ResponseValue) -> ResponseResult<()> {
    let descriptor = &field.descriptor;
    let name = descriptor.response_name();
    match &field.value {
        ValueShape::Scalar(ScalarType::String) | ValueShape::Enum { .. } => {
            writer.write_string(descriptor, value.as_str_opt().map_err(|e| e.at(name))?)
        }
        ValueShape::Scalar(ScalarType::Int) => match value {
            ResponseValue::Null => writer.write_int(descriptor, None),
            ResponseValue::Int(i) => writer.write_int(descriptor, Some(*i)),
            other => Err(mismatch(ScalarType::Int, other).at(name)),
        },
        ValueShape::Scalar(ScalarType::Double) => match value {
            ResponseValue::Null => writer.write_double(descriptor, None),
            ResponseValue::Double(d) => writer.write_double(descriptor, Some(*d)),
            other => Err(mismatch(ScalarType::Double, other).at(name)),
        },
        ValueShape::Scalar(ScalarType::Boolean) => match value {
            ResponseValue::Null => writer.write_boolean(descriptor, None),
            ResponseValue::Boolean(b) => writer.write_boolean(descriptor, Some(*b)),
            other => Err(mismatch(ScalarType::Boolean, other).at(name)),
        },
        ValueShape::CustomScalar(_) => match value {
            ResponseValue::Null => writer.write_custom_value(descriptor, None),
            ResponseValue::Custom(raw) => writer.write_custom_value(descriptor, Some(raw.clone())),
            other => Err(mismatch("custom scalar", other).at(name)),
        },
        ValueShape::Object(selection) => match value {
            ResponseValue::Null => writer.write_object::<Shaped<'_>>(descriptor, None),
            ResponseValue::Object(object) => writer.write_object(
                descriptor,
                Some(&Shaped {
                    shape: selection,
                    object,
                }),
            ),
            other => Err(mismatch("object", other).at(name)),
        },
        ValueShape::List { item, item_optional } => match value {
            ResponseValue::Null => writer.write_list(descriptor, None::<&[ResponseValue]>, |_, _| Ok(())),
            ResponseValue::List(items) => writer.write_list(descriptor, Some(items.as_slice()), |element, w| {
                write_item(w, item, *item_optional, element)
            }),
            other => Err(mismatch("list", other).at(name)),
        },
    }
}

fn write_item<L: ListItemWriter>(
    writer: &mut L,
    shape: &ValueShape,
    optional: bool,
    value: &ResponseValue,
) -> ResponseResult<()> {
    if value.is_null() && !optional {
        return required_item(None);
    }
    match shape {
        ValueShape::Scalar(ScalarType::String) | ValueShape::Enum { .. } => {
            writer.write_string(value.as_str_opt()?)
        }
        ValueShape::Scalar(ScalarType::Int) => match value {
            ResponseValue::Null => writer.write_int(None),
            ResponseValue::Int(i) => writer.write_int(Some(*i)),
            other => Err(mismatch(ScalarType::Int, other)),
        },
        ValueShape::Scalar(ScalarType::Double) => match value {
            ResponseValue::Null => writer.write_double(None),
            ResponseValue::Double(d) => writer.write_double(Some(*d)),
            other => Err(mismatch(ScalarType::Double, other)),
        },
        ValueShape::Scalar(ScalarType::Boolean) => match value {
            ResponseValue::Null => writer.write_boolean(None),
            ResponseValue::Boolean(b) => writer.write_boolean(Some(*b)),
            other => Err(mismatch(ScalarType::Boolean, other)),
        },
        ValueShape::CustomScalar(_) => match value {
            ResponseValue::Null => writer.write_custom_value(None),
            ResponseValue::Custom(raw) => writer.write_custom_value(Some(raw.clone())),
            other => Err(mismatch("custom scalar", other)),
        },
        ValueShape::Object(selection) => match value {
            ResponseValue::Null => writer.write_object::<Shaped<'_>>(None),
            ResponseValue::Object(object) => writer.write_object(Some(&Shaped {
                shape: selection,
                object,
            })),
            other => Err(mismatch("object", other)),
        },
        ValueShape::List { item, item_optional } => match value {
            ResponseValue::Null => writer.write_list(None::<&[ResponseValue]>, |_, _| Ok(())),
            ResponseValue::List(items) => writer.write_list(Some(items.as_slice()), |element, w| {
                write_item(w, item, *item_optional, element)
            }),
            other => Err(mismatch("list", other)),
        },
    }
}

/// A dynamically typed field value.
#[derive(Debug, Clone)]
pub enum ResponseValue {
    Null,
    String(String),
    Int(i64),
    Double(f64),
    Boolean(bool),
    /// An enum value, or [`UNKNOWN_ENUM_VALUE`].
    Enum(String),
    Custom(CustomTypeValue),
    Object(ResponseObject),
    List(Vec<ResponseValue>),
}

impl ResponseValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ResponseObject> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ResponseValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    fn as_str_opt(&self) -> ResponseResult<Option<&str>> {
        match self {
            Self::Null => Ok(None),
            Self::String(s) | Self::Enum(s) => Ok(Some(s)),
            other => Err(mismatch(ScalarType::String, other)),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::String(_) => "string",
            Self::Int(_) => "int",
            Self::Double(_) => "double",
            Self::Boolean(_) => "boolean",
            Self::Enum(_) => "enum",
            Self::Custom(_) => "custom scalar",
            Self::Object(_) => "object",
            Self::List(_) => "list",
        }
    }
}

impl PartialEq for ResponseValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::String(a), Self::String(b)) | (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ResponseValue {}

impl Hash for ResponseValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::String(s) | Self::Enum(s) => s.hash(state),
            Self::Int(i) => i.hash(state),
            Self::Double(d) => d.to_bits().hash(state),
            Self::Boolean(b) => b.hash(state),
            Self::Custom(raw) => raw.to_string().hash(state),
            Self::Object(object) => object.hash(state),
            Self::List(items) => items.hash(state),
        }
    }
}

impl fmt::Display for ResponseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::String(s) | Self::Enum(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Double(d) => write!(f, "{d}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Custom(raw) => write!(f, "{raw}"),
            Self::Object(object) => write!(f, "{object}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A decoded object: field values by response name plus the fragments
/// that applied to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseObject {
    pub fields: IndexMap<String, ResponseValue>,
    pub fragments: IndexMap<String, Option<ResponseObject>>,
    memo: Memoized,
}

impl ResponseObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field.
    #[must_use]
    pub fn with_field(mut self, response_name: impl Into<String>, value: ResponseValue) -> Self {
        self.fields.insert(response_name.into(), value);
        self
    }

    /// Sets a fragment slot.
    #[must_use]
    pub fn with_fragment(mut self, name: impl Into<String>, value: Option<ResponseObject>) -> Self {
        self.fragments.insert(name.into(), value);
        self
    }

    pub fn get(&self, response_name: &str) -> Option<&ResponseValue> {
        self.fields.get(response_name)
    }

    /// The decoded fragment, if it applied.
    pub fn fragment(&self, name: &str) -> Option<&ResponseObject> {
        self.fragments.get(name).and_then(Option::as_ref)
    }
}

/// Hash of a map's entries that ignores their order, matching `IndexMap`
/// equality.
fn unordered_hash<'a, K, V>(entries: impl Iterator<Item = (&'a K, &'a V)>) -> u64
where
    K: Hash + 'a,
    V: Hash + 'a,
{
    entries.fold(0u64, |acc, entry| acc.wrapping_add(fx_hash(&entry)))
}

impl Hash for ResponseObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let hash = self.memo.hash_with(|| {
            fx_hash(&(
                self.fields.len(),
                unordered_hash(self.fields.iter()),
                self.fragments.len(),
                unordered_hash(self.fragments.iter()),
            ))
        });
        state.write_u64(hash);
    }
}

impl fmt::Display for ResponseObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.memo.display_with(|| {
            let mut parts: Vec<String> = self
                .fields
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            if !self.fragments.is_empty() {
                let fragments: Vec<String> = self
                    .fragments
                    .iter()
                    .map(|(name, value)| match value {
                        Some(object) => format!("{name}={object}"),
                        None => format!("{name}=null"),
                    })
                    .collect();
                parts.push(format!("fragments={{{}}}", fragments.join(", ")));
            }
            format!("{{{}}}", parts.join(", "))
        });
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::{write_data, JsonResponseReader};
    use crate::reader::ReadContext;
    use crate::scalars::ScalarTypeAdapters;
    use gqlshape_core::{ErrorCode, Variables};
    use serde_json::json;

    const ID: CustomTypeId = CustomTypeId::from_static("ID");

    fn scalar(name: &str, scalar: ScalarType) -> ShapeField {
        let descriptor = match scalar {
            ScalarType::String => ResponseField::for_string(name, name),
            ScalarType::Int => ResponseField::for_int(name, name),
            ScalarType::Double => ResponseField::for_double(name, name),
            ScalarType::Boolean => ResponseField::for_boolean(name, name),
        };
        ShapeField {
            descriptor,
            value: ValueShape::Scalar(scalar),
        }
    }

    fn hero_shape() -> SelectionShape {
        let mut droid = SelectionShape::new("Droid");
        droid.fields.push(scalar("__typename", ScalarType::String));
        droid.fields.push(scalar("primaryFunction", ScalarType::String));

        let mut hero = SelectionShape::new("Character");
        hero.fields.push(scalar("__typename", ScalarType::String));
        hero.fields.push(ShapeField {
            descriptor: ResponseField::for_custom_type("id", "id", ID),
            value: ValueShape::CustomScalar(ID),
        });
        hero.fields.push(ShapeField {
            descriptor: ResponseField::for_list("appearsIn", "appearsIn"),
            value: ValueShape::List {
                item: Box::new(ValueShape::Enum {
                    values: vec!["NEWHOPE".into(), "EMPIRE".into(), "JEDI".into()],
                }),
                item_optional: false,
            },
        });
        hero.fragments.push(FragmentShape {
            name: "AsDroid".into(),
            possible_types: vec!["Droid".into()],
            inline: true,
            conditions: Vec::new(),
            selection: droid,
        });

        let mut root = SelectionShape::new("Query");
        root.fields.push(ShapeField {
            descriptor: ResponseField::for_object("hero", "hero").optional(),
            value: ValueShape::Object(hero),
        });
        root
    }

    fn decode(shape: &SelectionShape, payload: &serde_json::Value) -> ResponseResult<ResponseObject> {
        let variables = Variables::new();
        let adapters = ScalarTypeAdapters::new().register_string(ID);
        let mut reader = JsonResponseReader::from_value(payload, ReadContext::new(&variables, &adapters))?;
        shape.read(&mut reader)
    }

    #[test]
    fn test_descriptor_table_ends_with_fragment_spread() {
        let shape = hero_shape();
        let ValueShape::Object(hero) = &shape.fields[0].value else {
            panic!("hero is an object");
        };
        let table = hero.descriptor_table();
        assert_eq!(table.len(), 4);
        assert_eq!(table[3].conditional_types(), ["Droid".to_string()]);
    }

    #[test]
    fn test_decode_with_inline_fragment() {
        let shape = hero_shape();
        let payload = json!({"hero": {
            "__typename": "Droid",
            "id": "2001",
            "appearsIn": ["NEWHOPE", "CLONE_WARS"],
            "primaryFunction": "Astromech"
        }});
        let object = decode(&shape, &payload).unwrap();
        let hero = object.get("hero").and_then(ResponseValue::as_object).unwrap();

        let appears_in = hero.get("appearsIn").and_then(ResponseValue::as_list).unwrap();
        assert_eq!(appears_in[1], ResponseValue::Enum(UNKNOWN_ENUM_VALUE.into()));

        let droid = hero.fragment("AsDroid").unwrap();
        assert_eq!(droid.get("primaryFunction").and_then(ResponseValue::as_str), Some("Astromech"));
    }

    #[test]
    fn test_non_matching_fragment_is_absent() {
        let shape = hero_shape();
        let payload = json!({"hero": {"__typename": "Human", "id": "1000", "appearsIn": []}});
        let object = decode(&shape, &payload).unwrap();
        let hero = object.get("hero").and_then(ResponseValue::as_object).unwrap();
        assert!(hero.fragment("AsDroid").is_none());
        assert!(hero.fragments.contains_key("AsDroid"));
    }

    #[test]
    fn test_null_list_element_is_rejected() {
        let shape = hero_shape();
        let payload = json!({"hero": {"__typename": "Human", "id": "1000", "appearsIn": ["JEDI", null]}});
        let err = decode(&shape, &payload).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
        assert_eq!(err.path.to_string(), "hero.appearsIn[1]");
    }

    #[test]
    fn test_round_trip_and_memoized_display() {
        let shape = hero_shape();
        let payload = json!({"hero": {
            "__typename": "Droid",
            "id": "2001",
            "appearsIn": ["JEDI"],
            "primaryFunction": "Astromech"
        }});
        let object = decode(&shape, &payload).unwrap();

        let adapters = ScalarTypeAdapters::new().register_string(ID);
        let written = write_data(&Shaped { shape: &shape, object: &object }, &adapters).unwrap();
        assert_eq!(written, payload);

        let again = decode(&shape, &written).unwrap();
        assert_eq!(again, object);
        assert_eq!(fx_hash(&again), fx_hash(&object));
        assert_eq!(
            object.to_string(),
            "{hero={__typename=Droid, id=2001, appearsIn=[JEDI], \
             fragments={AsDroid={__typename=Droid, primaryFunction=Astromech}}}}"
        );
    }

    #[test]
    fn test_missing_adapter_for_custom_scalar() {
        let shape = hero_shape();
        let payload = json!({"hero": {"__typename": "Human", "id": "1000", "appearsIn": []}});
        let variables = Variables::new();
        let adapters = ScalarTypeAdapters::new();
        let mut reader =
            JsonResponseReader::from_value(&payload, ReadContext::new(&variables, &adapters)).unwrap();
        let err = shape.read(&mut reader).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownCustomType);
        assert_eq!(err.path.to_string(), "hero.id");
    }

    #[test]
    fn test_hash_ignores_field_order() {
        let a = ResponseObject::new()
            .with_field("name", ResponseValue::String("Luke".into()))
            .with_field("id", ResponseValue::String("1000".into()))
            .with_fragment("AsDroid", None);
        let b = ResponseObject::new()
            .with_fragment("AsDroid", None)
            .with_field("id", ResponseValue::String("1000".into()))
            .with_field("name", ResponseValue::String("Luke".into()));

        assert_eq!(a, b);
        assert_eq!(fx_hash(&a), fx_hash(&b));

        let c = ResponseObject::new()
            .with_field("name", ResponseValue::String("1000".into()))
            .with_field("id", ResponseValue::String("Luke".into()));
        assert_ne!(fx_hash(&a), fx_hash(&c));
    }

    #[test]
    fn test_excluded_fragment_is_absent() {
        let mut shape = hero_shape();
        let ValueShape::Object(hero) = &mut shape.fields[0].value else {
            panic!("hero is an object");
        };
        hero.fragments[0].conditions = vec![vec![Condition::include_if("withDroid")]];
        assert_eq!(
            hero.fragment_descriptor().unwrap().conditions(),
            [Condition::include_if("withDroid")]
        );

        let payload = json!({"hero": {"__typename": "Droid", "id": "2001", "appearsIn": []}});
        let adapters = ScalarTypeAdapters::new().register_string(ID);
        let read = |variables: &Variables| -> ResponseResult<ResponseObject> {
            let mut reader =
                JsonResponseReader::from_value(&payload, ReadContext::new(variables, &adapters))?;
            shape.read(&mut reader)
        };

        let object = read(&Variables::new().with("withDroid", false)).unwrap();
        let hero = object.get("hero").and_then(ResponseValue::as_object).unwrap();
        assert!(hero.fragment("AsDroid").is_none());

        let err = read(&Variables::new().with("withDroid", true)).unwrap_err();
        assert_eq!(err.path.to_string(), "hero.primaryFunction");
    }

    #[test]
    fn test_fragment_applies_when_any_spread_does() {
        let fragment = FragmentShape {
            name: "HeroDetails".into(),
            possible_types: vec!["Human".into(), "Droid".into()],
            inline: false,
            conditions: vec![
                vec![Condition::include_if("a")],
                vec![Condition::skip_if("b")],
            ],
            selection: SelectionShape::new("Character"),
        };
        let vars = |a: bool, b: bool| Variables::new().with("a", a).with("b", b);

        assert!(fragment.applies_to("Droid", &vars(true, true)));
        assert!(fragment.applies_to("Droid", &vars(false, false)));
        assert!(!fragment.applies_to("Droid", &vars(false, true)));
        assert!(!fragment.applies_to("Starship", &vars(true, false)));
    }
}

//! Response field descriptors.
//!
//! A [`ResponseField`] describes one selection inside a selection set. The
//! ordered list of descriptors for a selection (its descriptor table) drives
//! both decoding and encoding; nothing else about the wire shape lives in
//! generated code.

use crate::input::InputValue;
use crate::variables::Variables;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// The response name of the typename discriminator.
pub const TYPENAME: &str = "__typename";

/// Identifies a custom scalar (e.g. `ID`, `DateTime`) in the adapter registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomTypeId(Cow<'static, str>);

impl CustomTypeId {
    /// Creates an id usable in constants.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates an id from an owned name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the scalar name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Built-in scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
    Int,
    Double,
    Boolean,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "String",
            Self::Int => "Int",
            Self::Double => "Float",
            Self::Boolean => "Boolean",
        })
    }
}

/// What kind of value a descriptor selects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Scalar(ScalarType),
    CustomScalar(CustomTypeId),
    Enum,
    List,
    Object,
    /// A fragment spread or inline fragment, applicable when the runtime
    /// `__typename` is one of `conditional_types`.
    FragmentSpread { conditional_types: Vec<String> },
}

/// A `@skip`/`@include` directive bound to a boolean variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    variable_name: String,
    inverted: bool,
}

impl Condition {
    /// `@skip(if: $variable)`.
    pub fn skip_if(variable_name: impl Into<String>) -> Self {
        Self {
            variable_name: variable_name.into(),
            inverted: true,
        }
    }

    /// `@include(if: $variable)`.
    pub fn include_if(variable_name: impl Into<String>) -> Self {
        Self {
            variable_name: variable_name.into(),
            inverted: false,
        }
    }

    /// The variable the directive reads.
    pub fn variable_name(&self) -> &str {
        &self.variable_name
    }

    /// True for `@skip`.
    pub fn is_skip(&self) -> bool {
        self.inverted
    }

    /// Evaluates the directive. Unbound variables count as `false`.
    pub fn passes(&self, variables: &Variables) -> bool {
        variables.boolean(&self.variable_name).unwrap_or(false) != self.inverted
    }
}

/// Describes a single field within a selection set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseField {
    kind: FieldKind,
    response_name: String,
    field_name: String,
    arguments: BTreeMap<String, InputValue>,
    optional: bool,
    conditions: Vec<Condition>,
}

impl ResponseField {
    fn new(kind: FieldKind, response_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            kind,
            response_name: response_name.into(),
            field_name: field_name.into(),
            arguments: BTreeMap::new(),
            optional: false,
            conditions: Vec::new(),
        }
    }

    pub fn for_string(response_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::new(FieldKind::Scalar(ScalarType::String), response_name, field_name)
    }

    pub fn for_int(response_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::new(FieldKind::Scalar(ScalarType::Int), response_name, field_name)
    }

    pub fn for_double(response_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::new(FieldKind::Scalar(ScalarType::Double), response_name, field_name)
    }

    pub fn for_boolean(response_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::new(FieldKind::Scalar(ScalarType::Boolean), response_name, field_name)
    }

    pub fn for_enum(response_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::new(FieldKind::Enum, response_name, field_name)
    }

    pub fn for_custom_type(
        response_name: impl Into<String>,
        field_name: impl Into<String>,
        type_id: CustomTypeId,
    ) -> Self {
        Self::new(FieldKind::CustomScalar(type_id), response_name, field_name)
    }

    pub fn for_object(response_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::new(FieldKind::Object, response_name, field_name)
    }

    pub fn for_list(response_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::new(FieldKind::List, response_name, field_name)
    }

    /// The typename discriminator, `__typename: String!`.
    pub fn for_typename() -> Self {
        Self::for_string(TYPENAME, TYPENAME)
    }

    /// A fragment spread applicable to the given concrete typenames.
    ///
    /// Duplicate typenames are dropped; first occurrence wins.
    pub fn for_fragment<I, S>(conditional_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut types: Vec<String> = Vec::new();
        for ty in conditional_types {
            let ty = ty.into();
            if !types.contains(&ty) {
                types.push(ty);
            }
        }
        Self::new(
            FieldKind::FragmentSpread {
                conditional_types: types,
            },
            TYPENAME,
            TYPENAME,
        )
    }

    /// Marks the field as nullable.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Adds an argument.
    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Adds a skip/include condition. Conditional fields are always optional.
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self.optional = true;
        self
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Key used in the wire payload.
    pub fn response_name(&self) -> &str {
        &self.response_name
    }

    /// Schema field name.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn arguments(&self) -> &BTreeMap<String, InputValue> {
        &self.arguments
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The custom scalar id, for `CustomScalar` descriptors.
    pub fn custom_type_id(&self) -> Option<&CustomTypeId> {
        match &self.kind {
            FieldKind::CustomScalar(id) => Some(id),
            _ => None,
        }
    }

    /// The applicable typenames, for `FragmentSpread` descriptors.
    pub fn conditional_types(&self) -> &[String] {
        match &self.kind {
            FieldKind::FragmentSpread { conditional_types } => conditional_types,
            _ => &[],
        }
    }

    pub fn is_fragment_spread(&self) -> bool {
        matches!(self.kind, FieldKind::FragmentSpread { .. })
    }

    /// Evaluates every condition against bound variables.
    ///
    /// A field whose skip condition holds, or whose include condition does
    /// not, must be treated as absent by readers and writers.
    pub fn is_included(&self, variables: &Variables) -> bool {
        self.conditions.iter().all(|c| c.passes(variables))
    }

    /// Resolves the field's arguments against bound variables.
    pub fn resolve_arguments(&self, variables: &Variables) -> serde_json::Map<String, serde_json::Value> {
        self.arguments
            .iter()
            .map(|(name, value)| (name.clone(), value.resolve(variables)))
            .collect()
    }
}

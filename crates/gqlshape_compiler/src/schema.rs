//! The schema view the shape compiler resolves selections against.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in scalars every schema carries.
pub const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// A GraphQL schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    pub query_type: Option<String>,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
    pub types: IndexMap<String, TypeDef>,
}

impl Schema {
    /// Gets a type by name.
    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Returns all types.
    pub fn types(&self) -> impl Iterator<Item = (&String, &TypeDef)> {
        self.types.iter()
    }

    /// Looks up a field on an object or interface type.
    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDef> {
        match self.types.get(type_name)? {
            TypeDef::Object(def) => def.fields.get(field_name),
            TypeDef::Interface(def) => def.fields.get(field_name),
            _ => None,
        }
    }

    /// Concrete object types a value of `type_name` can have at runtime,
    /// in declaration order.
    pub fn possible_types(&self, type_name: &str) -> Vec<String> {
        match self.types.get(type_name) {
            Some(TypeDef::Object(_)) => vec![type_name.to_string()],
            Some(TypeDef::Interface(_)) => self
                .types
                .values()
                .filter_map(|ty| match ty {
                    TypeDef::Object(def) if def.implements.iter().any(|i| i == type_name) => {
                        Some(def.name.clone())
                    }
                    _ => None,
                })
                .collect(),
            Some(TypeDef::Union(def)) => def.members.clone(),
            _ => Vec::new(),
        }
    }

    /// Returns true for types that take a sub-selection.
    pub fn is_composite(&self, type_name: &str) -> bool {
        matches!(
            self.types.get(type_name),
            Some(TypeDef::Object(_) | TypeDef::Interface(_) | TypeDef::Union(_))
        )
    }
}

/// A type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeDef {
    Scalar(ScalarDef),
    Object(ObjectDef),
    Interface(InterfaceDef),
    Union(UnionDef),
    Enum(EnumDef),
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(s) => &s.name,
            Self::Object(o) => &o.name,
            Self::Interface(i) => &i.name,
            Self::Union(u) => &u.name,
            Self::Enum(e) => &e.name,
        }
    }
}

/// Scalar type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalarDef {
    pub name: String,
}

/// Object type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDef {
    pub name: String,
    pub fields: IndexMap<String, FieldDef>,
    pub implements: Vec<String>,
}

/// Interface type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceDef {
    pub name: String,
    pub fields: IndexMap<String, FieldDef>,
}

/// Union type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnionDef {
    pub name: String,
    pub members: Vec<String>,
}

/// Enum type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    pub values: Vec<String>,
}

/// Field definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub arguments: IndexMap<String, TypeRef>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            arguments: IndexMap::new(),
        }
    }

    /// Declares an argument.
    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.arguments.insert(name.into(), ty);
        self
    }
}

/// Type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Named(String),
    NonNull(Box<TypeRef>),
    List(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn non_null(inner: TypeRef) -> Self {
        Self::NonNull(Box::new(inner))
    }

    pub fn list(inner: TypeRef) -> Self {
        Self::List(Box::new(inner))
    }

    /// The innermost named type.
    pub fn named_type(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::NonNull(inner) | Self::List(inner) => inner.named_type(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::NonNull(inner) => write!(f, "{inner}!"),
            Self::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// Schema builder.
#[derive(Debug)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    /// Creates a new schema builder with the built-in scalars.
    pub fn new() -> Self {
        let mut schema = Schema::default();
        for name in BUILTIN_SCALARS {
            schema.types.insert(
                name.to_string(),
                TypeDef::Scalar(ScalarDef {
                    name: name.to_string(),
                }),
            );
        }
        Self { schema }
    }

    /// Sets the query type.
    #[must_use]
    pub fn query_type(mut self, name: impl Into<String>) -> Self {
        self.schema.query_type = Some(name.into());
        self
    }

    /// Sets the mutation type.
    #[must_use]
    pub fn mutation_type(mut self, name: impl Into<String>) -> Self {
        self.schema.mutation_type = Some(name.into());
        self
    }

    /// Sets the subscription type.
    #[must_use]
    pub fn subscription_type(mut self, name: impl Into<String>) -> Self {
        self.schema.subscription_type = Some(name.into());
        self
    }

    /// Adds a type.
    #[must_use]
    pub fn add_type(mut self, type_def: TypeDef) -> Self {
        self.schema.types.insert(type_def.name().to_string(), type_def);
        self
    }

    /// Adds a custom scalar.
    #[must_use]
    pub fn scalar(self, name: impl Into<String>) -> Self {
        self.add_type(TypeDef::Scalar(ScalarDef { name: name.into() }))
    }

    /// Adds an object type.
    #[must_use]
    pub fn object<I, S>(self, name: impl Into<String>, implements: I, fields: Vec<FieldDef>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_type(TypeDef::Object(ObjectDef {
            name: name.into(),
            fields: fields.into_iter().map(|f| (f.name.clone(), f)).collect(),
            implements: implements.into_iter().map(Into::into).collect(),
        }))
    }

    /// Adds an interface type.
    #[must_use]
    pub fn interface(self, name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        self.add_type(TypeDef::Interface(InterfaceDef {
            name: name.into(),
            fields: fields.into_iter().map(|f| (f.name.clone(), f)).collect(),
        }))
    }

    /// Adds a union type.
    #[must_use]
    pub fn union<I, S>(self, name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_type(TypeDef::Union(UnionDef {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }))
    }

    /// Adds an enum type.
    #[must_use]
    pub fn enumeration<I, S>(self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_type(TypeDef::Enum(EnumDef {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }))
    }

    /// Builds the schema.
    pub fn build(self) -> Schema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        SchemaBuilder::new()
            .query_type("Query")
            .interface(
                "Character",
                vec![FieldDef::new("name", TypeRef::non_null(TypeRef::named("String")))],
            )
            .object(
                "Human",
                ["Character"],
                vec![FieldDef::new("name", TypeRef::non_null(TypeRef::named("String")))],
            )
            .object("Starship", Vec::<String>::new(), vec![])
            .object(
                "Droid",
                ["Character"],
                vec![FieldDef::new("name", TypeRef::non_null(TypeRef::named("String")))],
            )
            .union("SearchResult", ["Human", "Droid", "Starship"])
            .build()
    }

    #[test]
    fn test_possible_types() {
        let schema = schema();
        assert_eq!(schema.possible_types("Character"), ["Human", "Droid"]);
        assert_eq!(schema.possible_types("Droid"), ["Droid"]);
        assert_eq!(schema.possible_types("SearchResult"), ["Human", "Droid", "Starship"]);
        assert!(schema.possible_types("String").is_empty());
    }

    #[test]
    fn test_builtin_scalars_and_lookup() {
        let schema = schema();
        for name in BUILTIN_SCALARS {
            assert!(matches!(schema.get_type(name), Some(TypeDef::Scalar(_))));
        }
        assert!(schema.field("Character", "name").is_some());
        assert!(schema.field("SearchResult", "name").is_none());
        assert!(schema.is_composite("SearchResult"));
        assert!(!schema.is_composite("ID"));
    }

    #[test]
    fn test_type_ref_display() {
        let ty = TypeRef::list(TypeRef::non_null(TypeRef::named("Episode")));
        assert_eq!(ty.to_string(), "[Episode!]");
        assert_eq!(ty.named_type(), "Episode");
        assert!(!ty.is_non_null());
    }
}

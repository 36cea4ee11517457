//! `TestQuery`: the hero's typename and name.

use gqlshape_core::{required, ResponseField, ResponseResult, Variables};
use gqlshape_runtime::{
    fx_hash, mutate, operation_id, query_document, Memoized, ModelBuilder, Operation,
    OperationDocument, OperationKind, ResponseFieldMapper, ResponseFieldMarshaller, ResponseModel,
    ResponseReader, ResponseWriter,
};
use once_cell::sync::Lazy;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::types::display_option;

pub const OPERATION_DEFINITION: &str = "query TestQuery {
  hero {
    __typename
    name
  }
}";

pub const OPERATION_NAME: &str = "TestQuery";

pub static QUERY_DOCUMENT: Lazy<String> = Lazy::new(|| query_document(OPERATION_DEFINITION, &[]));

pub static OPERATION_ID: Lazy<String> = Lazy::new(|| operation_id(&QUERY_DOCUMENT));

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestQuery {
    variables: Variables,
}

impl TestQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// The operation as a runtime document.
    pub fn document(&self) -> OperationDocument {
        OperationDocument::new(OPERATION_NAME, OperationKind::Query, OPERATION_DEFINITION, &[])
            .with_variables(self.variables.clone())
    }
}

impl Operation for TestQuery {
    type Data = Data;

    fn query_document(&self) -> &str {
        &QUERY_DOCUMENT
    }

    fn operation_id(&self) -> &str {
        &OPERATION_ID
    }

    fn operation_name(&self) -> &str {
        OPERATION_NAME
    }

    fn variables(&self) -> &Variables {
        &self.variables
    }
}

static DATA_FIELDS: Lazy<[ResponseField; 1]> =
    Lazy::new(|| [ResponseField::for_object("hero", "hero").optional()]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    hero: Option<Hero>,
    memo: Memoized,
}

impl Data {
    pub fn new(hero: Option<Hero>) -> Self {
        Self {
            hero,
            memo: Memoized::new(),
        }
    }

    pub fn response_fields() -> &'static [ResponseField] {
        &*DATA_FIELDS
    }

    pub fn hero(&self) -> Option<&Hero> {
        self.hero.as_ref()
    }
}

impl ResponseFieldMapper for Data {
    fn map<R: ResponseReader>(reader: &mut R) -> ResponseResult<Self> {
        let fields = &*DATA_FIELDS;
        let hero = reader.read_object(&fields[0], |reader| Hero::map(reader))?;
        Ok(Self::new(hero))
    }
}

impl ResponseFieldMarshaller for Data {
    fn marshal<W: ResponseWriter>(&self, writer: &mut W) -> ResponseResult<()> {
        let fields = &*DATA_FIELDS;
        writer.write_object(&fields[0], self.hero.as_ref())
    }
}

impl Hash for Data {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.memo.hash_with(|| fx_hash(&self.hero)));
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(
            self.memo
                .display_with(|| format!("Data{{hero={}}}", display_option(self.hero.as_ref()))),
        )
    }
}

impl ResponseModel for Data {
    type Builder = DataBuilder;

    fn to_builder(&self) -> DataBuilder {
        DataBuilder {
            hero: self.hero.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DataBuilder {
    hero: Option<Hero>,
}

impl DataBuilder {
    #[must_use]
    pub fn hero(mut self, hero: Option<Hero>) -> Self {
        self.hero = hero;
        self
    }

    /// Edits the hero in place, starting from an empty one when unset.
    pub fn hero_with(self, mutator: impl FnOnce(HeroBuilder) -> HeroBuilder) -> ResponseResult<Self> {
        let hero = mutate(self.hero.as_ref(), mutator)?;
        Ok(self.hero(Some(hero)))
    }
}

impl ModelBuilder for DataBuilder {
    type Model = Data;

    fn build(self) -> ResponseResult<Data> {
        Ok(Data::new(self.hero))
    }
}

static HERO_FIELDS: Lazy<[ResponseField; 2]> = Lazy::new(|| {
    [
        ResponseField::for_typename(),
        ResponseField::for_string("name", "name"),
    ]
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hero {
    typename: String,
    name: String,
    memo: Memoized,
}

impl Hero {
    pub fn new(typename: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            typename: typename.into(),
            name: name.into(),
            memo: Memoized::new(),
        }
    }

    pub fn response_fields() -> &'static [ResponseField] {
        &*HERO_FIELDS
    }

    pub fn typename(&self) -> &str {
        &self.typename
    }

    /// The name of the character.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ResponseFieldMapper for Hero {
    fn map<R: ResponseReader>(reader: &mut R) -> ResponseResult<Self> {
        let fields = &*HERO_FIELDS;
        let typename = required("__typename", reader.read_string(&fields[0])?)?;
        let name = required("name", reader.read_string(&fields[1])?)?;
        Ok(Self::new(typename, name))
    }
}

impl ResponseFieldMarshaller for Hero {
    fn marshal<W: ResponseWriter>(&self, writer: &mut W) -> ResponseResult<()> {
        let fields = &*HERO_FIELDS;
        writer.write_string(&fields[0], Some(self.typename.as_str()))?;
        writer.write_string(&fields[1], Some(self.name.as_str()))
    }
}

impl Hash for Hero {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.memo.hash_with(|| fx_hash(&(&self.typename, &self.name))));
    }
}

impl fmt::Display for Hero {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.memo.display_with(|| {
            format!("Hero{{__typename={}, name={}}}", self.typename, self.name)
        }))
    }
}

impl ResponseModel for Hero {
    type Builder = HeroBuilder;

    fn to_builder(&self) -> HeroBuilder {
        HeroBuilder {
            typename: Some(self.typename.clone()),
            name: Some(self.name.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeroBuilder {
    typename: Option<String>,
    name: Option<String>,
}

impl HeroBuilder {
    #[must_use]
    pub fn typename(mut self, typename: impl Into<String>) -> Self {
        self.typename = Some(typename.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl ModelBuilder for HeroBuilder {
    type Model = Hero;

    fn build(self) -> ResponseResult<Hero> {
        let typename = required("__typename", self.typename)?;
        let name = required("name", self.name)?;
        Ok(Hero::new(typename, name))
    }
}

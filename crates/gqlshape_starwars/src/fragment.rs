//! Named fragments.

use gqlshape_core::{required, ResponseField, ResponseResult};
use gqlshape_runtime::{
    fx_hash, mutate, resolve_fragment, ConditionalSelection, GraphQLFragment, Memoized,
    ModelBuilder, ResponseFieldMapper, ResponseFieldMarshaller, ResponseModel, ResponseReader,
    ResponseWriter,
};
use once_cell::sync::Lazy;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::types::display_option;

static HERO_DETAILS_FIELDS: Lazy<[ResponseField; 3]> = Lazy::new(|| {
    [
        ResponseField::for_typename(),
        ResponseField::for_string("name", "name"),
        ResponseField::for_fragment(AsDroid::POSSIBLE_TYPES.iter().copied()),
    ]
});

/// `fragment HeroDetails on Character`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroDetails {
    typename: String,
    name: String,
    as_droid: Option<AsDroid>,
    memo: Memoized,
}

impl HeroDetails {
    pub fn new(typename: impl Into<String>, name: impl Into<String>, as_droid: Option<AsDroid>) -> Self {
        Self {
            typename: typename.into(),
            name: name.into(),
            as_droid,
            memo: Memoized::new(),
        }
    }

    pub fn response_fields() -> &'static [ResponseField] {
        &*HERO_DETAILS_FIELDS
    }

    pub fn typename(&self) -> &str {
        &self.typename
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `... on Droid` selection, present only for droids.
    pub fn as_droid(&self) -> Option<&AsDroid> {
        self.as_droid.as_ref()
    }
}

impl ConditionalSelection for HeroDetails {
    const POSSIBLE_TYPES: &'static [&'static str] = &["Human", "Droid"];
}

impl GraphQLFragment for HeroDetails {
    const FRAGMENT_NAME: &'static str = "HeroDetails";
    const FRAGMENT_DEFINITION: &'static str = "fragment HeroDetails on Character {
  __typename
  name
  ... on Droid {
    __typename
    name
    primaryFunction
  }
}";
}

impl ResponseFieldMapper for HeroDetails {
    fn map<R: ResponseReader>(reader: &mut R) -> ResponseResult<Self> {
        let fields = &*HERO_DETAILS_FIELDS;
        let typename = required("__typename", reader.read_string(&fields[0])?)?;
        let name = required("name", reader.read_string(&fields[1])?)?;
        let as_droid = reader
            .read_conditional(&fields[2], |typename, reader| {
                resolve_fragment::<AsDroid, _>(typename, reader)
            })?
            .flatten();
        Ok(Self::new(typename, name, as_droid))
    }
}

impl ResponseFieldMarshaller for HeroDetails {
    fn marshal<W: ResponseWriter>(&self, writer: &mut W) -> ResponseResult<()> {
        let fields = &*HERO_DETAILS_FIELDS;
        writer.write_string(&fields[0], Some(self.typename.as_str()))?;
        writer.write_string(&fields[1], Some(self.name.as_str()))?;
        if let Some(as_droid) = &self.as_droid {
            as_droid.marshal(writer)?;
        }
        Ok(())
    }
}

impl Hash for HeroDetails {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(
            self.memo
                .hash_with(|| fx_hash(&(&self.typename, &self.name, &self.as_droid))),
        );
    }
}

impl fmt::Display for HeroDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.memo.display_with(|| {
            format!(
                "HeroDetails{{__typename={}, name={}, asDroid={}}}",
                self.typename,
                self.name,
                display_option(self.as_droid.as_ref())
            )
        }))
    }
}

impl ResponseModel for HeroDetails {
    type Builder = HeroDetailsBuilder;

    fn to_builder(&self) -> HeroDetailsBuilder {
        HeroDetailsBuilder {
            typename: Some(self.typename.clone()),
            name: Some(self.name.clone()),
            as_droid: self.as_droid.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeroDetailsBuilder {
    typename: Option<String>,
    name: Option<String>,
    as_droid: Option<AsDroid>,
}

impl HeroDetailsBuilder {
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

    #[must_use]
    pub fn as_droid(mut self, as_droid: Option<AsDroid>) -> Self {
        self.as_droid = as_droid;
        self
    }

    pub fn as_droid_with(self, mutator: impl FnOnce(AsDroidBuilder) -> AsDroidBuilder) -> ResponseResult<Self> {
        let as_droid = mutate(self.as_droid.as_ref(), mutator)?;
        Ok(self.as_droid(Some(as_droid)))
    }
}

impl ModelBuilder for HeroDetailsBuilder {
    type Model = HeroDetails;

    fn build(self) -> ResponseResult<HeroDetails> {
        let typename = required("__typename", self.typename)?;
        let name = required("name", self.name)?;
        Ok(HeroDetails::new(typename, name, self.as_droid))
    }
}

static AS_DROID_FIELDS: Lazy<[ResponseField; 3]> = Lazy::new(|| {
    [
        ResponseField::for_typename(),
        ResponseField::for_string("name", "name"),
        ResponseField::for_string("primaryFunction", "primaryFunction").optional(),
    ]
});

/// `... on Droid` inside `HeroDetails`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsDroid {
    typename: String,
    name: String,
    primary_function: Option<String>,
    memo: Memoized,
}

impl AsDroid {
    pub fn new(typename: impl Into<String>, name: impl Into<String>, primary_function: Option<String>) -> Self {
        Self {
            typename: typename.into(),
            name: name.into(),
            primary_function,
            memo: Memoized::new(),
        }
    }

    pub fn response_fields() -> &'static [ResponseField] {
        &*AS_DROID_FIELDS
    }

    pub fn typename(&self) -> &str {
        &self.typename
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// This droid's primary function.
    pub fn primary_function(&self) -> Option<&str> {
        self.primary_function.as_deref()
    }
}

impl ConditionalSelection for AsDroid {
    const POSSIBLE_TYPES: &'static [&'static str] = &["Droid"];
}

impl ResponseFieldMapper for AsDroid {
    fn map<R: ResponseReader>(reader: &mut R) -> ResponseResult<Self> {
        let fields = &*AS_DROID_FIELDS;
        let typename = required("__typename", reader.read_string(&fields[0])?)?;
        let name = required("name", reader.read_string(&fields[1])?)?;
        let primary_function = reader.read_string(&fields[2])?;
        Ok(Self::new(typename, name, primary_function))
    }
}

impl ResponseFieldMarshaller for AsDroid {
    fn marshal<W: ResponseWriter>(&self, writer: &mut W) -> ResponseResult<()> {
        let fields = &*AS_DROID_FIELDS;
        writer.write_string(&fields[0], Some(self.typename.as_str()))?;
        writer.write_string(&fields[1], Some(self.name.as_str()))?;
        writer.write_string(&fields[2], self.primary_function.as_deref())
    }
}

impl Hash for AsDroid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(
            self.memo
                .hash_with(|| fx_hash(&(&self.typename, &self.name, &self.primary_function))),
        );
    }
}

impl fmt::Display for AsDroid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.memo.display_with(|| {
            format!(
                "AsDroid{{__typename={}, name={}, primaryFunction={}}}",
                self.typename,
                self.name,
                display_option(self.primary_function.as_ref())
            )
        }))
    }
}

impl ResponseModel for AsDroid {
    type Builder = AsDroidBuilder;

    fn to_builder(&self) -> AsDroidBuilder {
        AsDroidBuilder {
            typename: Some(self.typename.clone()),
            name: Some(self.name.clone()),
            primary_function: self.primary_function.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AsDroidBuilder {
    typename: Option<String>,
    name: Option<String>,
    primary_function: Option<String>,
}

impl AsDroidBuilder {
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

    #[must_use]
    pub fn primary_function(mut self, primary_function: Option<String>) -> Self {
        self.primary_function = primary_function;
        self
    }
}

impl ModelBuilder for AsDroidBuilder {
    type Model = AsDroid;

    fn build(self) -> ResponseResult<AsDroid> {
        let typename = required("__typename", self.typename)?;
        let name = required("name", self.name)?;
        Ok(AsDroid::new(typename, name, self.primary_function))
    }
}

//! `TestQuery($episode)`: the hero with its `HeroDetails` fragment and the
//! episodes it appears in.

use gqlshape_core::{required, required_item, InputValue, ResponseField, ResponseResult, Variables};
use gqlshape_runtime::{
    fx_hash, mutate, operation_id, query_document, read_fragments, resolve_fragment,
    ConditionalSelection, FragmentResponseFieldMapper, GraphQLEnum, GraphQLFragment,
    ListItemReader, ListItemWriter, Memoized, ModelBuilder, Operation, OperationDocument,
    OperationKind, ResponseFieldMapper, ResponseFieldMarshaller, ResponseModel, ResponseReader,
    ResponseWriter,
};
use once_cell::sync::Lazy;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::fragment::{HeroDetails, HeroDetailsBuilder};
use crate::types::{display_list, display_option, Episode};

pub const OPERATION_DEFINITION: &str = "query TestQuery($episode: Episode) {
  hero(episode: $episode) {
    __typename
    name
    ...HeroDetails
    appearsIn
  }
}";

pub const OPERATION_NAME: &str = "TestQuery";

pub static QUERY_DOCUMENT: Lazy<String> =
    Lazy::new(|| query_document(OPERATION_DEFINITION, &[HeroDetails::FRAGMENT_DEFINITION]));

pub static OPERATION_ID: Lazy<String> = Lazy::new(|| operation_id(&QUERY_DOCUMENT));

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestQuery {
    episode: Option<Episode>,
    variables: Variables,
}

impl TestQuery {
    pub fn new(episode: Option<Episode>) -> Self {
        let mut variables = Variables::new();
        if let Some(episode) = episode {
            variables.insert("episode", episode.raw_value());
        }
        Self { episode, variables }
    }

    pub fn episode(&self) -> Option<Episode> {
        self.episode
    }

    pub fn document(&self) -> OperationDocument {
        OperationDocument::new(
            OPERATION_NAME,
            OperationKind::Query,
            OPERATION_DEFINITION,
            &[HeroDetails::FRAGMENT_DEFINITION],
        )
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

static DATA_FIELDS: Lazy<[ResponseField; 1]> = Lazy::new(|| {
    [ResponseField::for_object("hero", "hero")
        .optional()
        .with_argument("episode", InputValue::variable("episode"))]
});

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
        let hero = reader.read_object(&DATA_FIELDS[0], |reader| Hero::map(reader))?;
        Ok(Self::new(hero))
    }
}

impl ResponseFieldMarshaller for Data {
    fn marshal<W: ResponseWriter>(&self, writer: &mut W) -> ResponseResult<()> {
        writer.write_object(&DATA_FIELDS[0], self.hero.as_ref())
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

static HERO_FIELDS: Lazy<[ResponseField; 4]> = Lazy::new(|| {
    [
        ResponseField::for_typename(),
        ResponseField::for_string("name", "name"),
        ResponseField::for_list("appearsIn", "appearsIn").optional(),
        ResponseField::for_fragment(HeroDetails::POSSIBLE_TYPES.iter().copied()),
    ]
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hero {
    typename: String,
    name: String,
    appears_in: Option<Vec<Episode>>,
    fragments: Fragments,
    memo: Memoized,
}

impl Hero {
    pub fn new(
        typename: impl Into<String>,
        name: impl Into<String>,
        appears_in: Option<Vec<Episode>>,
        fragments: Fragments,
    ) -> Self {
        Self {
            typename: typename.into(),
            name: name.into(),
            appears_in,
            fragments,
            memo: Memoized::new(),
        }
    }

    pub fn response_fields() -> &'static [ResponseField] {
        &*HERO_FIELDS
    }

    pub fn typename(&self) -> &str {
        &self.typename
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The movies this character appears in.
    pub fn appears_in(&self) -> Option<&[Episode]> {
        self.appears_in.as_deref()
    }

    pub fn fragments(&self) -> &Fragments {
        &self.fragments
    }
}

impl ResponseFieldMapper for Hero {
    fn map<R: ResponseReader>(reader: &mut R) -> ResponseResult<Self> {
        let fields = &*HERO_FIELDS;
        let typename = required("__typename", reader.read_string(&fields[0])?)?;
        let name = required("name", reader.read_string(&fields[1])?)?;
        let appears_in = reader.read_list(&fields[2], |item| {
            let raw = required_item(item.read_string()?)?;
            Ok(Episode::safe_value_of(&raw))
        })?;
        let fragments = read_fragments::<Fragments, _>(reader, &fields[3])?;
        Ok(Self::new(typename, name, appears_in, fragments))
    }
}

impl ResponseFieldMarshaller for Hero {
    fn marshal<W: ResponseWriter>(&self, writer: &mut W) -> ResponseResult<()> {
        let fields = &*HERO_FIELDS;
        writer.write_string(&fields[0], Some(self.typename.as_str()))?;
        writer.write_string(&fields[1], Some(self.name.as_str()))?;
        writer.write_list(&fields[2], self.appears_in.as_deref(), |episode, item| {
            item.write_string(Some(episode.raw_value()))
        })?;
        self.fragments.marshal(writer)
    }
}

impl Hash for Hero {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.memo.hash_with(|| {
            fx_hash(&(&self.typename, &self.name, &self.appears_in, &self.fragments))
        }));
    }
}

impl fmt::Display for Hero {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.memo.display_with(|| {
            format!(
                "Hero{{__typename={}, name={}, appearsIn={}, fragments={}}}",
                self.typename,
                self.name,
                display_list(self.appears_in.as_deref()),
                self.fragments
            )
        }))
    }
}

impl ResponseModel for Hero {
    type Builder = HeroBuilder;

    fn to_builder(&self) -> HeroBuilder {
        HeroBuilder {
            typename: Some(self.typename.clone()),
            name: Some(self.name.clone()),
            appears_in: self.appears_in.clone(),
            fragments: Some(self.fragments.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeroBuilder {
    typename: Option<String>,
    name: Option<String>,
    appears_in: Option<Vec<Episode>>,
    fragments: Option<Fragments>,
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

    #[must_use]
    pub fn appears_in(mut self, appears_in: Option<Vec<Episode>>) -> Self {
        self.appears_in = appears_in;
        self
    }

    #[must_use]
    pub fn fragments(mut self, fragments: Fragments) -> Self {
        self.fragments = Some(fragments);
        self
    }

    pub fn fragments_with(
        self,
        mutator: impl FnOnce(FragmentsBuilder) -> FragmentsBuilder,
    ) -> ResponseResult<Self> {
        let fragments = mutate(self.fragments.as_ref(), mutator)?;
        Ok(self.fragments(fragments))
    }
}

impl ModelBuilder for HeroBuilder {
    type Model = Hero;

    fn build(self) -> ResponseResult<Hero> {
        let typename = required("__typename", self.typename)?;
        let name = required("name", self.name)?;
        Ok(Hero::new(
            typename,
            name,
            self.appears_in,
            self.fragments.unwrap_or_default(),
        ))
    }
}

/// Named fragments spread into `Hero`. A fragment is absent when it does
/// not apply to the hero's runtime type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragments {
    hero_details: Option<HeroDetails>,
    memo: Memoized,
}

impl Fragments {
    pub fn new(hero_details: Option<HeroDetails>) -> Self {
        Self {
            hero_details,
            memo: Memoized::new(),
        }
    }

    pub fn hero_details(&self) -> Option<&HeroDetails> {
        self.hero_details.as_ref()
    }
}

impl FragmentResponseFieldMapper for Fragments {
    fn map<R: ResponseReader>(reader: &mut R, conditional_type: &str) -> ResponseResult<Self> {
        let hero_details = resolve_fragment::<HeroDetails, _>(conditional_type, reader)?;
        Ok(Self::new(hero_details))
    }
}

impl ResponseFieldMarshaller for Fragments {
    fn marshal<W: ResponseWriter>(&self, writer: &mut W) -> ResponseResult<()> {
        match &self.hero_details {
            Some(hero_details) => hero_details.marshal(writer),
            None => Ok(()),
        }
    }
}

impl Hash for Fragments {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.memo.hash_with(|| fx_hash(&self.hero_details)));
    }
}

impl fmt::Display for Fragments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.memo.display_with(|| {
            format!(
                "Fragments{{heroDetails={}}}",
                display_option(self.hero_details.as_ref())
            )
        }))
    }
}

impl ResponseModel for Fragments {
    type Builder = FragmentsBuilder;

    fn to_builder(&self) -> FragmentsBuilder {
        FragmentsBuilder {
            hero_details: self.hero_details.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FragmentsBuilder {
    hero_details: Option<HeroDetails>,
}

impl FragmentsBuilder {
    #[must_use]
    pub fn hero_details(mut self, hero_details: Option<HeroDetails>) -> Self {
        self.hero_details = hero_details;
        self
    }

    pub fn hero_details_with(
        self,
        mutator: impl FnOnce(HeroDetailsBuilder) -> HeroDetailsBuilder,
    ) -> ResponseResult<Self> {
        let hero_details = mutate(self.hero_details.as_ref(), mutator)?;
        Ok(self.hero_details(Some(hero_details)))
    }
}

impl ModelBuilder for FragmentsBuilder {
    type Model = Fragments;

    fn build(self) -> ResponseResult<Fragments> {
        Ok(Fragments::new(self.hero_details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlshape_core::ErrorCode;

    #[test]
    fn test_query_document_appends_fragment() {
        assert!(QUERY_DOCUMENT.starts_with(OPERATION_DEFINITION));
        assert!(QUERY_DOCUMENT.ends_with(HeroDetails::FRAGMENT_DEFINITION));
        assert_eq!(
            QUERY_DOCUMENT.len(),
            OPERATION_DEFINITION.len() + 1 + HeroDetails::FRAGMENT_DEFINITION.len()
        );
    }

    #[test]
    fn test_variables_omit_unset_episode() {
        assert!(TestQuery::new(None).variables().is_empty());
        let query = TestQuery::new(Some(Episode::Empire));
        assert_eq!(query.variables().get("episode"), Some(&"EMPIRE".into()));
        assert_ne!(query.document(), TestQuery::new(None).document());
    }

    #[test]
    fn test_fragments_default_to_absent() {
        let hero = Hero::builder().typename("Starship").name("Falcon").build().unwrap();
        assert!(hero.fragments().hero_details().is_none());
        assert_eq!(
            hero.to_string(),
            "Hero{__typename=Starship, name=Falcon, appearsIn=null, fragments=Fragments{heroDetails=null}}"
        );
    }

    #[test]
    fn test_nested_scoped_mutators() {
        let data = Data::builder()
            .hero_with(|hero| hero.typename("Droid").name("R2-D2"))
            .unwrap()
            .build()
            .unwrap();
        let updated = data
            .to_builder()
            .hero_with(|hero| hero.appears_in(Some(vec![Episode::NewHope])))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            updated.hero().and_then(Hero::appears_in),
            Some(&[Episode::NewHope][..])
        );
        assert_eq!(updated.hero().map(Hero::name), Some("R2-D2"));
        assert_eq!(data.hero().and_then(Hero::appears_in), None);

        let missing = Fragments::builder()
            .hero_details_with(|details| details.name("R2-D2"))
            .unwrap_err();
        assert_eq!(missing.code, ErrorCode::MissingRequiredField);
    }
}

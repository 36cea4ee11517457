//! The checked-in models must match what the shape compiler produces for
//! the same operations.

use gqlshape_compiler::{
    compile_operation, CompiledOperation, ExecutableDocument, Field, FieldDef, FragmentDefinition,
    FragmentSpread, InlineFragment, OperationDefinition, Schema, SchemaBuilder, ShapeOptions,
    TypeRef, VariableDefinition,
};
use gqlshape_core::{InputValue, ResponseField};
use gqlshape_runtime::{GraphQLFragment, SelectionShape, ValueShape};
use gqlshape_starwars::fragment::{AsDroid, HeroDetails};
use gqlshape_starwars::{fragment_with_inline_fragment, hero_name, simple_hero};

fn non_null(name: &str) -> TypeRef {
    TypeRef::non_null(TypeRef::named(name))
}

fn character_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::new("id", non_null("ID")),
        FieldDef::new("name", non_null("String")),
        FieldDef::new("appearsIn", TypeRef::list(non_null("Episode"))),
    ]
}

fn schema() -> Schema {
    let human = character_fields();
    let mut droid = character_fields();
    droid.push(FieldDef::new("primaryFunction", TypeRef::named("String")));

    SchemaBuilder::new()
        .query_type("Query")
        .object(
            "Query",
            Vec::<String>::new(),
            vec![FieldDef::new("hero", TypeRef::named("Character"))
                .with_argument("episode", TypeRef::named("Episode"))],
        )
        .enumeration("Episode", ["NEWHOPE", "EMPIRE", "JEDI"])
        .interface("Character", character_fields())
        .object("Human", ["Character"], human)
        .object("Droid", ["Character"], droid)
        .build()
}

fn compile(document: &ExecutableDocument) -> CompiledOperation {
    let result = compile_operation(&schema(), document, "TestQuery", ShapeOptions::default());
    assert!(result.is_ok(), "{:?}", result.diagnostics);
    result.operation.expect("compiled operation")
}

fn hero(shape: &SelectionShape) -> &SelectionShape {
    match &shape.field("hero").expect("hero selected").value {
        ValueShape::Object(hero) => hero,
        other => panic!("hero is not an object: {other:?}"),
    }
}

fn name_and_typename() -> [Field; 2] {
    [Field::new("__typename"), Field::new("name")]
}

/// Test the scalar-only operation.
#[test]
fn test_simple_hero_parity() {
    let [typename, name] = name_and_typename();
    let document = ExecutableDocument::new().with_operation(
        OperationDefinition::query("TestQuery")
            .with_selection(Field::new("hero").with_selection(typename).with_selection(name)),
    );
    let compiled = compile(&document);

    assert_eq!(compiled.document, simple_hero::TestQuery::new().document());
    assert_eq!(compiled.document.operation_id(), simple_hero::OPERATION_ID.as_str());
    assert_eq!(compiled.data.descriptor_table(), simple_hero::Data::response_fields());
    assert_eq!(hero(&compiled.data).descriptor_table(), simple_hero::Hero::response_fields());
}

/// Test the operation that selects `hero` twice.
#[test]
fn test_merged_hero_parity() {
    let document = ExecutableDocument::new().with_operation(
        OperationDefinition::query("TestQuery")
            .with_selection(
                Field::new("hero")
                    .with_selection(Field::new("__typename"))
                    .with_selection(Field::new("name")),
            )
            .with_selection(
                Field::new("hero")
                    .with_selection(Field::new("__typename"))
                    .with_selection(Field::new("id"))
                    .with_selection(Field::new("name")),
            ),
    );
    let result = compile_operation(&schema(), &document, "TestQuery", ShapeOptions::default());
    assert_eq!(result.diagnostics.warnings().count(), 1);
    let compiled = result.operation.expect("compiled operation");

    assert_eq!(compiled.document.query_document(), hero_name::QUERY_DOCUMENT.as_str());
    assert_eq!(compiled.data.descriptor_table(), hero_name::Data::response_fields());
    assert_eq!(hero(&compiled.data).descriptor_table(), hero_name::Hero::response_fields());
}

/// Test the operation with a named fragment holding an inline fragment.
#[test]
fn test_fragment_parity() {
    let [typename, name] = name_and_typename();
    let hero_details = FragmentDefinition::new("HeroDetails", "Character")
        .with_selection(typename.clone())
        .with_selection(name.clone())
        .with_selection(
            InlineFragment::on("Droid")
                .with_selection(typename.clone())
                .with_selection(name.clone())
                .with_selection(Field::new("primaryFunction")),
        );
    let operation = OperationDefinition::query("TestQuery")
        .with_variable(VariableDefinition::new("episode", TypeRef::named("Episode")))
        .with_selection(
            Field::new("hero")
                .with_argument("episode", InputValue::variable("episode"))
                .with_selection(typename)
                .with_selection(name)
                .with_selection(FragmentSpread::new("HeroDetails"))
                .with_selection(Field::new("appearsIn")),
        );
    let document = ExecutableDocument::new()
        .with_operation(operation)
        .with_fragment(hero_details);
    let compiled = compile(&document);

    assert_eq!(compiled.document, fragment_with_inline_fragment::TestQuery::new(None).document());
    assert_eq!(compiled.fragments, [HeroDetails::FRAGMENT_NAME]);
    assert_eq!(
        compiled.data.descriptor_table(),
        fragment_with_inline_fragment::Data::response_fields()
    );

    let hero = hero(&compiled.data);
    assert_eq!(hero.descriptor_table(), fragment_with_inline_fragment::Hero::response_fields());

    let details = &hero.fragments[0];
    assert_eq!(details.name, HeroDetails::FRAGMENT_NAME);
    assert_eq!(details.selection.descriptor_table(), HeroDetails::response_fields());

    let as_droid = &details.selection.fragments[0];
    assert_eq!(as_droid.name, "AsDroid");
    assert!(as_droid.inline);
    assert_eq!(as_droid.selection.descriptor_table(), AsDroid::response_fields());
}

/// Test that the fragment's spread descriptor lists the schema's possible
/// types in declaration order.
#[test]
fn test_possible_types_follow_schema() {
    assert_eq!(schema().possible_types("Character"), ["Human", "Droid"]);
    let spread = &fragment_with_inline_fragment::Hero::response_fields()[3];
    assert_eq!(spread, &ResponseField::for_fragment(["Human", "Droid"]));
}

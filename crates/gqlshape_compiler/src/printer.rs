//! Canonical printing of definitions.
//!
//! Query documents are hashed, so the printed form must be stable: one
//! selection per line, two-space indentation, no trailing whitespace.

use crate::ast::{Directive, FragmentDefinition, OperationDefinition, Selection};
use gqlshape_core::InputValue;
use std::fmt::Write;

/// Prints an operation definition.
pub fn print_operation(operation: &OperationDefinition) -> String {
    let mut out = format!("{} {}", operation.kind, operation.name);
    if !operation.variables.is_empty() {
        let variables: Vec<String> = operation
            .variables
            .iter()
            .map(|v| match &v.default_value {
                Some(default) => format!("${}: {} = {}", v.name, v.ty, print_value(default)),
                None => format!("${}: {}", v.name, v.ty),
            })
            .collect();
        let _ = write!(out, "({})", variables.join(", "));
    }
    print_selection_set(&mut out, &operation.selection_set, 0);
    out
}

/// Prints a fragment definition.
pub fn print_fragment(fragment: &FragmentDefinition) -> String {
    let mut out = format!("fragment {} on {}", fragment.name, fragment.type_condition);
    print_selection_set(&mut out, &fragment.selection_set, 0);
    out
}

/// Prints an input value as a GraphQL literal.
pub fn print_value(value: &InputValue) -> String {
    match value {
        InputValue::Null => "null".to_string(),
        InputValue::Boolean(b) => b.to_string(),
        InputValue::Int(i) => i.to_string(),
        InputValue::Float(f) => format!("{f:?}"),
        InputValue::String(s) => serde_json::Value::String(s.clone()).to_string(),
        InputValue::Enum(e) => e.clone(),
        InputValue::Variable(name) => format!("${name}"),
        InputValue::List(items) => {
            let items: Vec<String> = items.iter().map(print_value).collect();
            format!("[{}]", items.join(", "))
        }
        InputValue::Object(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(name, value)| format!("{name}: {}", print_value(value)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
    }
}

fn print_arguments(out: &mut String, arguments: &[(String, InputValue)]) {
    if arguments.is_empty() {
        return;
    }
    let arguments: Vec<String> = arguments
        .iter()
        .map(|(name, value)| format!("{name}: {}", print_value(value)))
        .collect();
    let _ = write!(out, "({})", arguments.join(", "));
}

fn print_directives(out: &mut String, directives: &[Directive]) {
    for directive in directives {
        let _ = write!(out, " @{}", directive.name);
        print_arguments(out, &directive.arguments);
    }
}

fn print_selection_set(out: &mut String, selections: &[Selection], depth: usize) {
    if selections.is_empty() {
        return;
    }
    out.push_str(" {\n");
    for selection in selections {
        out.push_str(&"  ".repeat(depth + 1));
        match selection {
            Selection::Field(field) => {
                if let Some(alias) = &field.alias {
                    let _ = write!(out, "{alias}: ");
                }
                out.push_str(&field.name);
                print_arguments(out, &field.arguments);
                print_directives(out, &field.directives);
                print_selection_set(out, &field.selection_set, depth + 1);
            }
            Selection::FragmentSpread(spread) => {
                let _ = write!(out, "...{}", spread.name);
                print_directives(out, &spread.directives);
            }
            Selection::InlineFragment(fragment) => {
                out.push_str("...");
                if let Some(type_condition) = &fragment.type_condition {
                    let _ = write!(out, " on {type_condition}");
                }
                print_directives(out, &fragment.directives);
                print_selection_set(out, &fragment.selection_set, depth + 1);
            }
        }
        out.push('\n');
    }
    out.push_str(&"  ".repeat(depth));
    out.push('}');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Field, FragmentSpread, InlineFragment, VariableDefinition};
    use crate::schema::TypeRef;

    #[test]
    fn test_print_operation() {
        let operation = OperationDefinition::query("TestQuery")
            .with_variable(VariableDefinition::new("episode", TypeRef::named("Episode")))
            .with_selection(
                Field::new("hero")
                    .with_argument("episode", InputValue::variable("episode"))
                    .with_selection(Field::new("name"))
                    .with_selection(
                        Field::new("id").with_directive(Directive::include(InputValue::variable("withId"))),
                    )
                    .with_selection(FragmentSpread::new("HeroDetails"))
                    .with_selection(InlineFragment::on("Droid").with_selection(Field::new("primaryFunction"))),
            );

        insta::assert_snapshot!(print_operation(&operation), @r###"
        query TestQuery($episode: Episode) {
          hero(episode: $episode) {
            name
            id @include(if: $withId)
            ...HeroDetails
            ... on Droid {
              primaryFunction
            }
          }
        }
        "###);
    }

    #[test]
    fn test_print_values() {
        assert_eq!(print_value(&InputValue::String("a\"b".into())), r#""a\"b""#);
        assert_eq!(print_value(&InputValue::Float(1.0)), "1.0");
        assert_eq!(
            print_value(&InputValue::List(vec![InputValue::Enum("JEDI".into()), InputValue::Null])),
            "[JEDI, null]"
        );
    }
}

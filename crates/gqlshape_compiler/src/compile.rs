//! The response shape algorithm.
//!
//! Given an operation and the schema, derive the [`SelectionShape`] tree
//! generated models are built from:
//! 1. collect each selection set, folding static `@skip`/`@include` and
//!    flattening inline fragments on the parent type
//! 2. merge repeated response keys into one field with the union of their
//!    sub-selections
//! 3. resolve named and typed inline fragments into conditional slots with
//!    their possible runtime types
//! 4. place `__typename` first in every fragment-bearing selection
//!
//! The query document and operation id are assembled alongside.

use crate::ast::{
    Directive, ExecutableDocument, Field, FragmentDefinition, OperationDefinition, Selection,
    VariableDefinition,
};
use crate::options::ShapeOptions;
use crate::printer::{print_fragment, print_operation};
use crate::schema::{Schema, TypeDef, TypeRef, BUILTIN_SCALARS};
use gqlshape_core::{
    codes, Condition, Diagnostic, DiagnosticBag, InputValue, ResponseField, ScalarType, Span, TYPENAME,
};
use gqlshape_runtime::{
    FragmentShape, OperationDocument, OperationKind, SelectionShape, ShapeField, ValueShape,
};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;

/// A compiled operation.
#[derive(Debug, Clone)]
pub struct CompiledOperation {
    pub document: OperationDocument,
    pub variables: Vec<VariableDefinition>,
    /// Shape of the root `data` object.
    pub data: SelectionShape,
    /// Names of the fragments the operation references, in declaration
    /// order.
    pub fragments: Vec<String>,
}

/// Result of compiling an operation.
#[derive(Debug)]
pub struct CompileResult {
    /// Present when compilation produced no errors.
    pub operation: Option<CompiledOperation>,
    pub diagnostics: DiagnosticBag,
}

impl CompileResult {
    /// Returns true if compilation succeeded.
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Compiles the named operation of `document`.
pub fn compile_operation(
    schema: &Schema,
    document: &ExecutableDocument,
    operation_name: &str,
    options: ShapeOptions,
) -> CompileResult {
    ShapeCompiler::new(schema, document, options).compile(operation_name)
}

#[derive(Debug)]
struct CollectedField<'a> {
    field: &'a Field,
    conditions: Vec<Condition>,
    /// Forced nullable after merging occurrences with different conditions.
    optional: bool,
    selections: Vec<&'a Selection>,
}

/// Selections sharing one `@skip`/`@include` set.
type Occurrence<'a> = (Vec<Condition>, Vec<&'a Selection>);

#[derive(Debug, Default)]
struct Collected<'a> {
    fields: IndexMap<String, CollectedField<'a>>,
    /// Each spread fragment with the condition sets of its spreads.
    spreads: IndexMap<String, (&'a FragmentDefinition, Vec<Vec<Condition>>)>,
    /// Typed inline fragments by type condition, one entry per occurrence.
    inline: IndexMap<String, Vec<Occurrence<'a>>>,
}

/// Condition sets of a repeated fragment; any passing set includes it.
/// An unconditional occurrence makes the whole fragment unconditional.
fn alternatives(sets: Vec<Vec<Condition>>) -> Vec<Vec<Condition>> {
    if sets.iter().any(Vec::is_empty) {
        return Vec::new();
    }
    let mut distinct: Vec<Vec<Condition>> = Vec::new();
    for set in sets {
        if !distinct.contains(&set) {
            distinct.push(set);
        }
    }
    distinct
}

/// Walks an operation and its fragments, producing shapes and diagnostics.
pub struct ShapeCompiler<'a> {
    schema: &'a Schema,
    document: &'a ExecutableDocument,
    options: ShapeOptions,
    diagnostics: DiagnosticBag,
    used_fragments: FxHashSet<String>,
    fragment_stack: Vec<String>,
}

impl<'a> ShapeCompiler<'a> {
    pub fn new(schema: &'a Schema, document: &'a ExecutableDocument, options: ShapeOptions) -> Self {
        Self {
            schema,
            document,
            options,
            diagnostics: DiagnosticBag::new(),
            used_fragments: FxHashSet::default(),
            fragment_stack: Vec::new(),
        }
    }

    /// Compiles one operation.
    pub fn compile(mut self, operation_name: &str) -> CompileResult {
        let document = self.document;
        let Some(operation) = document.operation(operation_name) else {
            self.diagnostics.report(
                codes::UNKNOWN_OPERATION,
                Span::synthetic(),
                format!("no operation named `{operation_name}`"),
            );
            return self.finish(None);
        };
        tracing::debug!(operation = operation_name, "compiling operation");

        let Some(root_type) = self.root_type(operation) else {
            return self.finish(None);
        };
        let data = self.selection(&root_type, operation.selection_set.iter().collect());

        let fragments: Vec<&FragmentDefinition> = document
            .fragments
            .iter()
            .filter(|f| self.used_fragments.contains(&f.name))
            .collect();
        let definition = operation
            .source
            .clone()
            .unwrap_or_else(|| print_operation(operation));
        let fragment_sources: Vec<String> = fragments
            .iter()
            .map(|f| f.source.clone().unwrap_or_else(|| print_fragment(f)))
            .collect();
        let fragment_refs: Vec<&str> = fragment_sources.iter().map(String::as_str).collect();

        let compiled = CompiledOperation {
            document: OperationDocument::new(&operation.name, operation.kind, &definition, &fragment_refs),
            variables: operation.variables.clone(),
            data,
            fragments: fragments.iter().map(|f| f.name.clone()).collect(),
        };
        self.finish(Some(compiled))
    }

    fn finish(self, operation: Option<CompiledOperation>) -> CompileResult {
        let operation = operation.filter(|_| !self.diagnostics.has_errors());
        tracing::debug!(
            ok = operation.is_some(),
            diagnostics = self.diagnostics.len(),
            "compilation finished"
        );
        CompileResult {
            operation,
            diagnostics: self.diagnostics,
        }
    }

    fn root_type(&mut self, operation: &OperationDefinition) -> Option<String> {
        let root = match operation.kind {
            OperationKind::Query => &self.schema.query_type,
            OperationKind::Mutation => &self.schema.mutation_type,
            OperationKind::Subscription => &self.schema.subscription_type,
        };
        if root.is_none() {
            self.diagnostics.report(
                codes::UNKNOWN_TYPE,
                operation.span,
                format!("schema has no {} root type", operation.kind),
            );
        }
        root.clone()
    }

    /// Evaluates `@skip`/`@include`. `None` means the selection is
    /// statically excluded; otherwise returns the runtime conditions.
    fn fold_directives(directives: &[Directive]) -> Option<Vec<Condition>> {
        let mut conditions = Vec::new();
        for directive in directives {
            let skip = match directive.name.as_str() {
                "skip" => true,
                "include" => false,
                _ => continue,
            };
            match directive.argument("if") {
                Some(InputValue::Boolean(value)) if *value == skip => return None,
                Some(InputValue::Variable(name)) if skip => conditions.push(Condition::skip_if(name)),
                Some(InputValue::Variable(name)) => conditions.push(Condition::include_if(name)),
                _ => {}
            }
        }
        Some(conditions)
    }

    fn collect<I>(&mut self, parent: &str, selections: I, inherited: &[Condition], out: &mut Collected<'a>)
    where
        I: IntoIterator<Item = &'a Selection>,
    {
        for selection in selections {
            match selection {
                Selection::Field(field) => {
                    let Some(own) = Self::fold_directives(&field.directives) else {
                        continue;
                    };
                    let conditions = [inherited, own.as_slice()].concat();
                    self.collect_field(parent, field, conditions, out);
                }
                Selection::FragmentSpread(spread) => {
                    let Some(own) = Self::fold_directives(&spread.directives) else {
                        continue;
                    };
                    let document = self.document;
                    let Some(fragment) = document.fragment(&spread.name) else {
                        self.diagnostics.report(
                            codes::UNKNOWN_FRAGMENT,
                            spread.span,
                            format!("no fragment named `{}`", spread.name),
                        );
                        continue;
                    };
                    out.spreads
                        .entry(fragment.name.clone())
                        .or_insert_with(|| (fragment, Vec::new()))
                        .1
                        .push([inherited, own.as_slice()].concat());
                }
                Selection::InlineFragment(inline) => {
                    let Some(own) = Self::fold_directives(&inline.directives) else {
                        continue;
                    };
                    let conditions = [inherited, own.as_slice()].concat();
                    match inline.type_condition.as_deref() {
                        None => self.collect(parent, &inline.selection_set, &conditions, out),
                        Some(ty) if ty == parent => {
                            self.collect(parent, &inline.selection_set, &conditions, out);
                        }
                        Some(ty) if self.schema.get_type(ty).is_none() => {
                            self.diagnostics.report(
                                codes::UNKNOWN_TYPE,
                                inline.span,
                                format!("no type named `{ty}`"),
                            );
                        }
                        Some(ty) => {
                            out.inline
                                .entry(ty.to_string())
                                .or_default()
                                .push((conditions, inline.selection_set.iter().collect()));
                        }
                    }
                }
            }
        }
    }

    fn collect_field(&mut self, parent: &str, field: &'a Field, conditions: Vec<Condition>, out: &mut Collected<'a>) {
        let key = field.response_key();
        let Some(existing) = out.fields.get_mut(key) else {
            out.fields.insert(
                key.to_string(),
                CollectedField {
                    field,
                    conditions,
                    optional: false,
                    selections: field.selection_set.iter().collect(),
                },
            );
            return;
        };

        if existing.field.name != field.name || !same_arguments(&existing.field.arguments, &field.arguments) {
            self.diagnostics.push(
                Diagnostic::new(
                    codes::CONFLICTING_FIELDS,
                    format!(
                        "`{key}` on `{parent}` selects `{}` and `{}` with different arguments or names",
                        existing.field.name, field.name
                    ),
                )
                .with_label(field.span, "conflicts with an earlier selection")
                .with_label(existing.field.span, "first selected here"),
            );
            return;
        }
        if !self.options.merge_duplicate_fields {
            self.diagnostics.report(
                codes::DUPLICATE_SELECTION,
                field.span,
                format!("`{key}` is selected more than once on `{parent}`"),
            );
            return;
        }

        if existing.conditions != conditions {
            existing.conditions.clear();
            existing.optional = true;
        }
        existing.selections.extend(&field.selection_set);
        if !field.selection_set.is_empty() && self.options.warn_on_merge {
            tracing::warn!(field = key, parent, "merging duplicate selection");
            self.diagnostics.report(
                codes::MERGED_SELECTION,
                field.span,
                format!("`{key}` is selected more than once on `{parent}`; the selections were merged"),
            );
        }
    }

    fn selection(&mut self, parent: &str, selections: Vec<&'a Selection>) -> SelectionShape {
        self.selection_of(parent, vec![(Vec::new(), selections)])
    }

    /// Shape of the union of `occurrences`, each collected under its own
    /// conditions.
    fn selection_of(&mut self, parent: &str, occurrences: Vec<Occurrence<'a>>) -> SelectionShape {
        let mut collected = Collected::default();
        for (conditions, selections) in occurrences {
            self.collect(parent, selections, &conditions, &mut collected);
        }

        let mut shape = SelectionShape::new(parent);
        for (key, field) in &collected.fields {
            if let Some(field) = self.shape_field(parent, key, field) {
                shape.fields.push(field);
            }
        }
        for (fragment, conditions) in collected.spreads.into_values() {
            if let Some(fragment) = self.named_fragment(fragment, alternatives(conditions)) {
                shape.fragments.push(fragment);
            }
        }
        for (type_name, mut occurrences) in collected.inline {
            let conditions = alternatives(occurrences.iter().map(|(c, _)| c.clone()).collect());
            // Occurrences under one shared set merge freely; otherwise each
            // keeps its set so fields it alone selects stay conditional.
            if occurrences.windows(2).all(|pair| pair[0].0 == pair[1].0) {
                for (own, _) in &mut occurrences {
                    own.clear();
                }
            }
            let selection = self.selection_of(&type_name, occurrences);
            shape.fragments.push(FragmentShape {
                name: format!("As{type_name}"),
                possible_types: self.schema.possible_types(&type_name),
                inline: true,
                conditions,
                selection,
            });
        }

        if !shape.fragments.is_empty() {
            self.place_typename(&mut shape);
        }
        shape
    }

    fn place_typename(&mut self, shape: &mut SelectionShape) {
        match shape
            .fields
            .iter()
            .position(|f| f.descriptor.response_name() == TYPENAME)
        {
            Some(0) => {}
            Some(index) => {
                let typename = shape.fields.remove(index);
                shape.fields.insert(0, typename);
            }
            None if self.options.add_typename => {
                tracing::warn!(parent = %shape.type_name, "inserting __typename for fragment dispatch");
                self.diagnostics.report(
                    codes::IMPLICIT_TYPENAME,
                    Span::synthetic(),
                    format!("`__typename` added to a fragment-bearing selection on `{}`", shape.type_name),
                );
                shape.fields.insert(
                    0,
                    ShapeField {
                        descriptor: ResponseField::for_typename(),
                        value: ValueShape::Scalar(ScalarType::String),
                    },
                );
            }
            None => {
                self.diagnostics.report(
                    codes::MISSING_TYPENAME,
                    Span::synthetic(),
                    format!(
                        "fragment-bearing selection on `{}` does not select `__typename`",
                        shape.type_name
                    ),
                );
            }
        }
    }

    fn named_fragment(
        &mut self,
        fragment: &'a FragmentDefinition,
        conditions: Vec<Vec<Condition>>,
    ) -> Option<FragmentShape> {
        if self.fragment_stack.contains(&fragment.name) {
            self.diagnostics.report(
                codes::FRAGMENT_CYCLE,
                fragment.span,
                format!("`{}` spreads itself", fragment.name),
            );
            return None;
        }
        if self.schema.get_type(&fragment.type_condition).is_none() {
            self.diagnostics.report(
                codes::UNKNOWN_TYPE,
                fragment.span,
                format!("no type named `{}`", fragment.type_condition),
            );
            return None;
        }

        self.used_fragments.insert(fragment.name.clone());
        self.fragment_stack.push(fragment.name.clone());
        let selection = self.selection(&fragment.type_condition, fragment.selection_set.iter().collect());
        self.fragment_stack.pop();

        Some(FragmentShape {
            name: fragment.name.clone(),
            possible_types: self.schema.possible_types(&fragment.type_condition),
            inline: false,
            conditions,
            selection,
        })
    }

    fn shape_field(&mut self, parent: &str, key: &str, collected: &CollectedField<'a>) -> Option<ShapeField> {
        let field = collected.field;
        let ty = if field.name == TYPENAME {
            TypeRef::non_null(TypeRef::named("String"))
        } else if let Some(def) = self.schema.field(parent, &field.name) {
            def.ty.clone()
        } else {
            self.diagnostics.report(
                codes::UNKNOWN_FIELD,
                field.span,
                format!("`{parent}` has no field `{}`", field.name),
            );
            return None;
        };

        let value = self.value_shape(&ty, collected)?;
        let mut descriptor = match &value {
            ValueShape::Scalar(ScalarType::String) => ResponseField::for_string(key, &field.name),
            ValueShape::Scalar(ScalarType::Int) => ResponseField::for_int(key, &field.name),
            ValueShape::Scalar(ScalarType::Double) => ResponseField::for_double(key, &field.name),
            ValueShape::Scalar(ScalarType::Boolean) => ResponseField::for_boolean(key, &field.name),
            ValueShape::Enum { .. } => ResponseField::for_enum(key, &field.name),
            ValueShape::CustomScalar(id) => ResponseField::for_custom_type(key, &field.name, id.clone()),
            ValueShape::Object(_) => ResponseField::for_object(key, &field.name),
            ValueShape::List { .. } => ResponseField::for_list(key, &field.name),
        };
        if !ty.is_non_null() || collected.optional {
            descriptor = descriptor.optional();
        }
        for (name, value) in &field.arguments {
            descriptor = descriptor.with_argument(name, value.clone());
        }
        for condition in &collected.conditions {
            descriptor = descriptor.with_condition(condition.clone());
        }
        Some(ShapeField { descriptor, value })
    }

    fn value_shape(&mut self, ty: &TypeRef, collected: &CollectedField<'a>) -> Option<ValueShape> {
        match ty {
            TypeRef::NonNull(inner) => self.value_shape(inner, collected),
            TypeRef::List(inner) => Some(ValueShape::List {
                item: Box::new(self.value_shape(inner, collected)?),
                item_optional: !inner.is_non_null(),
            }),
            TypeRef::Named(name) => self.named_shape(name, collected),
        }
    }

    fn named_shape(&mut self, name: &str, collected: &CollectedField<'a>) -> Option<ValueShape> {
        let field = collected.field;
        let schema = self.schema;
        let Some(type_def) = schema.get_type(name) else {
            self.diagnostics.report(
                codes::UNKNOWN_TYPE,
                field.span,
                format!("`{}` has unknown type `{name}`", field.name),
            );
            return None;
        };

        let composite = schema.is_composite(name);
        if composite && collected.selections.is_empty() {
            self.diagnostics.report(
                codes::MISSING_SELECTION,
                field.span,
                format!("`{}` of type `{name}` needs a selection set", field.name),
            );
            return None;
        }
        if !composite && !collected.selections.is_empty() {
            self.diagnostics.report(
                codes::LEAF_WITH_SELECTION,
                field.span,
                format!("`{}` of type `{name}` cannot have a selection set", field.name),
            );
            return None;
        }

        Some(match type_def {
            TypeDef::Scalar(_) => {
                let builtin = BUILTIN_SCALARS.contains(&name);
                match self.options.custom_type_id(name, builtin) {
                    Some(id) => ValueShape::CustomScalar(id),
                    None => ValueShape::Scalar(match name {
                        "Int" => ScalarType::Int,
                        "Float" => ScalarType::Double,
                        "Boolean" => ScalarType::Boolean,
                        _ => ScalarType::String,
                    }),
                }
            }
            TypeDef::Enum(def) => ValueShape::Enum {
                values: def.values.clone(),
            },
            TypeDef::Object(_) | TypeDef::Interface(_) | TypeDef::Union(_) => {
                ValueShape::Object(self.selection(name, collected.selections.clone()))
            }
        })
    }
}

fn same_arguments(a: &[(String, InputValue)], b: &[(String, InputValue)]) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(name, value)| b.iter().any(|(other, v)| other == name && v == value))
}

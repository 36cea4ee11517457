//! Response shape compiler for gqlshape.
//!
//! Turns an operation of an executable document into the selection shape
//! tree generated models follow, plus the operation's query document and
//! operation id.
//!
//! # Example
//!
//! ```ignore
//! use gqlshape_compiler::{compile_operation, ShapeOptions};
//!
//! let result = compile_operation(&schema, &document, "TestQuery", ShapeOptions::default());
//! for diagnostic in result.diagnostics.iter() {
//!     eprintln!("{diagnostic}");
//! }
//! let operation = result.operation.expect("compiled");
//! println!("{}", operation.document.operation_id());
//! ```

pub mod ast;
pub mod compile;
pub mod options;
pub mod printer;
pub mod schema;

pub use ast::{
    Directive, ExecutableDocument, Field, FragmentDefinition, FragmentSpread, InlineFragment,
    OperationDefinition, Selection, VariableDefinition,
};
pub use compile::{compile_operation, CompileResult, CompiledOperation, ShapeCompiler};
pub use options::ShapeOptions;
pub use printer::{print_fragment, print_operation, print_value};
pub use schema::{FieldDef, Schema, SchemaBuilder, TypeDef, TypeRef};

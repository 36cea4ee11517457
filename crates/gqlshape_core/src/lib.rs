//! Core types for gqlshape.
//!
//! This crate provides the value types shared by generated models, the
//! runtime and the shape compiler:
//! - `descriptor`: `ResponseField` descriptors and their conditions
//! - `input`: argument literals and variable references
//! - `variables`: bound operation variables
//! - `path`: response-name paths
//! - `error`: decode/encode errors
//! - `span`, `diagnostics`: generator-time reporting

pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod input;
pub mod path;
pub mod span;
pub mod variables;

pub use descriptor::{Condition, CustomTypeId, FieldKind, ResponseField, ScalarType, TYPENAME};
pub use diagnostics::{codes, Diagnostic, DiagnosticBag, DiagnosticCode, DiagnosticSeverity, Label};
pub use error::{required, required_item, ErrorCode, ResponseError, ResponseResult, ResultExt};
pub use input::InputValue;
pub use path::{PathSegment, ResponsePath};
pub use span::Span;
pub use variables::Variables;

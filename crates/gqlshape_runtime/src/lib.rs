//! Runtime for gqlshape response models.
//!
//! Generated models decode through a [`ResponseReader`] and encode through
//! a [`ResponseWriter`], both driven by static `ResponseField` tables.
//! This crate provides:
//! - `reader`, `writer`: the protocol traits
//! - `json`: the JSON-backed implementation of both
//! - `scalars`: the custom scalar adapter registry
//! - `model`: traits and helpers shared by generated models
//! - `fragments`: runtime-typename fragment dispatch
//! - `operation`: query documents, operation ids and response envelopes
//! - `shape`: an interpreter over selection shapes for code-free decoding

pub mod fragments;
pub mod json;
pub mod model;
pub mod operation;
pub mod reader;
pub mod scalars;
pub mod shape;
pub mod writer;

pub use fragments::{read_fragments, resolve_fragment};
pub use json::{
    parse_payload, read_data, write_data, JsonListItemReader, JsonListItemWriter,
    JsonResponseReader, JsonResponseWriter,
};
pub use model::{
    fx_hash, mutate, ConditionalSelection, FragmentResponseFieldMapper, GraphQLEnum,
    GraphQLFragment, Memoized, ModelBuilder, ResponseFieldMapper, ResponseFieldMarshaller,
    ResponseModel, UNKNOWN_ENUM_VALUE,
};
pub use operation::{
    operation_id, parse_response, query_document, GraphQLError, Operation, OperationDocument,
    OperationKind, OperationResponse,
};
pub use reader::{ListItemReader, ReadContext, ReaderState, ResponseReader};
pub use scalars::{CustomTypeAdapter, CustomTypeValue, RawAdapter, ScalarTypeAdapters, StringAdapter};
pub use shape::{FragmentShape, ResponseObject, ResponseValue, SelectionShape, ShapeField, Shaped, ValueShape};
pub use writer::{ListItemWriter, ResponseWriter};

pub use gqlshape_core::{ResponseError, ResponseField, ResponseResult};

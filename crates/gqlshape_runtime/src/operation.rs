//! Operations: query document, operation id, variables and the root
//! mapper.

use crate::json::{self, parse_payload};
use crate::model::{ResponseFieldMapper, ResponseFieldMarshaller};
use crate::reader::ReadContext;
use crate::scalars::ScalarTypeAdapters;
use gqlshape_core::{ErrorCode, ResponseError, ResponseResult, Variables};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// The kind of GraphQL operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joins an operation definition and the definitions of the fragments it
/// references, one per line, in the given order.
pub fn query_document(definition: &str, fragments: &[&str]) -> String {
    let mut document = String::from(definition);
    for fragment in fragments {
        document.push('\n');
        document.push_str(fragment);
    }
    document
}

/// SHA-256 of `document`, as 64 lowercase hex characters.
pub fn operation_id(document: &str) -> String {
    hex::encode(Sha256::digest(document.as_bytes()))
}

/// A named, typed GraphQL operation.
pub trait Operation {
    /// The root selection model.
    type Data: ResponseFieldMapper + ResponseFieldMarshaller;

    fn query_document(&self) -> &str;

    /// Always equals `operation_id(self.query_document())`.
    fn operation_id(&self) -> &str;

    fn operation_name(&self) -> &str;

    fn variables(&self) -> &Variables;

    /// Lifts decoded data into an optional so a null root is representable.
    fn wrap_data(&self, data: Self::Data) -> Option<Self::Data> {
        Some(data)
    }

    /// Decodes a bare `data` object.
    fn decode(&self, data: &Value, adapters: &ScalarTypeAdapters) -> ResponseResult<Self::Data> {
        let operation = self.operation_name();
        tracing::debug!(operation, "decoding operation data");
        let context = ReadContext::new(self.variables(), adapters);
        let result = json::read_data(data, context);
        match &result {
            Ok(_) => tracing::debug!(operation, "decoded operation data"),
            Err(error) => tracing::debug!(operation, %error, "operation data failed to decode"),
        }
        result
    }

    /// Encodes a model as a bare `data` object.
    fn encode(&self, data: &Self::Data, adapters: &ScalarTypeAdapters) -> ResponseResult<Value> {
        json::write_data(data, adapters)
    }
}

/// An operation described at runtime rather than by a generated type.
///
/// The operation id is derived from the query document on construction
/// and on deserialization; an id supplied by the input is ignored. Two
/// documents are equal when their query documents and variables are.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "DocumentFields")]
pub struct OperationDocument {
    operation_name: String,
    kind: OperationKind,
    query_document: String,
    operation_id: String,
    variables: Variables,
}

/// Serialized form of [`OperationDocument`] minus the derived id.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentFields {
    operation_name: String,
    kind: OperationKind,
    query_document: String,
    #[serde(default)]
    variables: Variables,
}

impl From<DocumentFields> for OperationDocument {
    fn from(fields: DocumentFields) -> Self {
        Self::new(fields.operation_name, fields.kind, &fields.query_document, &[])
            .with_variables(fields.variables)
    }
}

impl OperationDocument {
    pub fn new(
        operation_name: impl Into<String>,
        kind: OperationKind,
        definition: &str,
        fragments: &[&str],
    ) -> Self {
        let query_document = query_document(definition, fragments);
        let operation_id = operation_id(&query_document);
        Self {
            operation_name: operation_name.into(),
            kind,
            query_document,
            operation_id,
            variables: Variables::new(),
        }
    }

    /// Binds variables.
    #[must_use]
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn query_document(&self) -> &str {
        &self.query_document
    }

    /// Always `operation_id(self.query_document())`.
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }
}

impl PartialEq for OperationDocument {
    fn eq(&self, other: &Self) -> bool {
        self.query_document == other.query_document && self.variables == other.variables
    }
}

/// An error reported by the server next to (or instead of) data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<IndexMap<String, Value>>,
}

/// A decoded response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResponse<D> {
    pub data: Option<D>,
    pub errors: Vec<GraphQLError>,
}

impl<D> OperationResponse<D> {
    /// Returns true if the server reported errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Decodes a `{"data": ..., "errors": [...]}` envelope for `operation`.
///
/// A null or missing `data` is not an error; a `data` object that fails to
/// decode is.
pub fn parse_response<O: Operation>(
    operation: &O,
    bytes: &[u8],
    adapters: &ScalarTypeAdapters,
) -> ResponseResult<OperationResponse<O::Data>> {
    let payload = parse_payload(bytes)?;
    let Value::Object(mut envelope) = payload else {
        return Err(ResponseError::new(
            ErrorCode::InvalidPayload,
            "response envelope is not an object",
        ));
    };

    let errors = match envelope.remove("errors") {
        None | Some(Value::Null) => Vec::new(),
        Some(errors) => serde_json::from_value(errors).map_err(|e| {
            ResponseError::new(ErrorCode::InvalidPayload, format!("malformed errors: {e}"))
        })?,
    };

    let data = match envelope.get("data") {
        None | Some(Value::Null) => None,
        Some(data) => operation.wrap_data(operation.decode(data, adapters).map_err(|e| e.at("data"))?),
    };

    tracing::debug!(
        operation = operation.operation_name(),
        has_data = data.is_some(),
        errors = errors.len(),
        "decoded response"
    );
    Ok(OperationResponse { data, errors })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_document_joins_with_newlines() {
        let doc = query_document("query A { hero { ...F } }", &["fragment F on Character { name }"]);
        assert_eq!(doc, "query A { hero { ...F } }\nfragment F on Character { name }");
        assert_eq!(query_document("query B { hero { name } }", &[]), "query B { hero { name } }");
    }

    #[test]
    fn test_operation_id_is_sha256_hex() {
        assert_eq!(
            operation_id(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            operation_id("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_operation_document_equality() {
        let a = OperationDocument::new("A", OperationKind::Query, "query A { a }", &[]);
        let b = OperationDocument::new("Renamed", OperationKind::Query, "query A { a }", &[]);
        assert_eq!(a, b);
        assert_eq!(a.operation_id(), b.operation_id());

        let c = a.clone().with_variables(Variables::new().with("episode", "JEDI"));
        assert_ne!(a, c);

        let d = OperationDocument::new("A", OperationKind::Query, "query A {  a }", &[]);
        assert_ne!(a.operation_id(), d.operation_id());
    }

    #[test]
    fn test_deserialized_document_derives_its_id() {
        let document: OperationDocument = serde_json::from_value(serde_json::json!({
            "operationName": "TestQuery",
            "kind": "query",
            "queryDocument": "query TestQuery { hero { name } }",
            "operationId": "0000",
            "variables": {"episode": "JEDI"}
        }))
        .unwrap();
        assert_eq!(document.operation_id(), operation_id("query TestQuery { hero { name } }"));
        assert_eq!(document.kind(), OperationKind::Query);
        assert_eq!(document.variables().get("episode"), Some(&"JEDI".into()));

        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["operationId"], document.operation_id());
        let again: OperationDocument = serde_json::from_value(json).unwrap();
        assert_eq!(again, document);
        assert_eq!(again.operation_name(), "TestQuery");
    }

    #[test]
    fn test_graphql_error_deserialize() {
        let error: GraphQLError = serde_json::from_value(serde_json::json!({
            "message": "boom",
            "path": ["hero", 0],
            "extensions": {"code": "INTERNAL"}
        }))
        .unwrap();
        assert_eq!(error.message, "boom");
        assert_eq!(error.path.len(), 2);
        assert_eq!(error.extensions.unwrap()["code"], "INTERNAL");
    }
}

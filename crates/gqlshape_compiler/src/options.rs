//! Shape compiler options.

use gqlshape_core::CustomTypeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Options controlling how selections are normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeOptions {
    /// Insert `__typename` first in fragment-bearing selections.
    pub add_typename: bool,
    /// Merge repeated selections of the same response key. When false they
    /// are rejected.
    pub merge_duplicate_fields: bool,
    /// Report merged selections as warnings.
    pub warn_on_merge: bool,
    /// Schema scalars decoded through the custom scalar registry, by
    /// scalar name. Scalars absent from the schema's built-ins are always
    /// custom; this only adds or renames ids.
    pub custom_scalars: IndexMap<String, String>,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        let mut custom_scalars = IndexMap::new();
        custom_scalars.insert("ID".to_string(), "ID".to_string());
        Self {
            add_typename: true,
            merge_duplicate_fields: true,
            warn_on_merge: true,
            custom_scalars,
        }
    }
}

impl ShapeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_add_typename(mut self, add_typename: bool) -> Self {
        self.add_typename = add_typename;
        self
    }

    #[must_use]
    pub fn with_merge_duplicate_fields(mut self, merge: bool) -> Self {
        self.merge_duplicate_fields = merge;
        self
    }

    #[must_use]
    pub fn with_warn_on_merge(mut self, warn: bool) -> Self {
        self.warn_on_merge = warn;
        self
    }

    /// Maps a schema scalar to a custom type id.
    #[must_use]
    pub fn with_custom_scalar(mut self, scalar: impl Into<String>, type_id: impl Into<String>) -> Self {
        self.custom_scalars.insert(scalar.into(), type_id.into());
        self
    }

    /// Treats `ID` as a plain string instead of a custom scalar.
    #[must_use]
    pub fn without_custom_id(mut self) -> Self {
        self.custom_scalars.shift_remove("ID");
        self
    }

    /// The custom type id for a scalar, if it is decoded as one.
    pub(crate) fn custom_type_id(&self, scalar: &str, builtin: bool) -> Option<CustomTypeId> {
        match self.custom_scalars.get(scalar) {
            Some(id) => Some(CustomTypeId::new(id.clone())),
            None if builtin => None,
            None => Some(CustomTypeId::new(scalar)),
        }
    }
}

//! Fragment dispatch by runtime typename.

use crate::model::{ConditionalSelection, FragmentResponseFieldMapper};
use crate::reader::ResponseReader;
use gqlshape_core::{ResponseField, ResponseResult};

/// Decodes `S` from the current object if it applies to `typename`.
///
/// The reader is the one positioned over the enclosing object, so the
/// fragment re-reads fields its parent may already have consumed.
pub fn resolve_fragment<S, R>(typename: &str, reader: &mut R) -> ResponseResult<Option<S>>
where
    S: ConditionalSelection,
    R: ResponseReader,
{
    if S::applies_to(typename) {
        tracing::trace!(typename, "fragment applies");
        S::map(reader).map(Some)
    } else {
        tracing::trace!(typename, possible_types = ?S::POSSIBLE_TYPES, "fragment skipped");
        Ok(None)
    }
}

/// Reads the `Fragments` record of the current object through the
/// conditional descriptor `field`.
///
/// A spread excluded by its conditions yields an empty record.
pub fn read_fragments<F, R>(reader: &mut R, field: &ResponseField) -> ResponseResult<F>
where
    F: FragmentResponseFieldMapper + Default,
    R: ResponseReader,
{
    Ok(reader
        .read_conditional(field, |typename, reader| F::map(reader, typename))?
        .unwrap_or_default())
}

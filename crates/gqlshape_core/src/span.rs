//! Source locations inside an executable document.

use serde::{Deserialize, Serialize};

/// Byte range of a selection, fragment or operation in the document text.
///
/// Only diagnostics read spans; descriptors never carry them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Span of something the compiler added itself, such as an implicit
    /// `__typename` or an AST built in code.
    #[must_use]
    pub const fn synthetic() -> Self {
        Self { start: 0, end: 0 }
    }

    #[must_use]
    pub const fn is_synthetic(self) -> bool {
        self.start == self.end
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        let start = span.start as usize;
        (start, span.end.saturating_sub(span.start) as usize).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ast_built_in_code_is_synthetic() {
        assert!(Span::default().is_synthetic());
        assert!(!Span::new(4, 9).is_synthetic());
    }

    #[test]
    fn test_span_to_source_span() {
        let source: miette::SourceSpan = Span::new(3, 8).into();
        assert_eq!(source.offset(), 3);
        assert_eq!(source.len(), 5);
    }
}

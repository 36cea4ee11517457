//! Generator-time diagnostics.
//!
//! The shape compiler keeps going after a problem: it records what it
//! found in a [`DiagnosticBag`] and leaves rendering to the host. Every
//! [`Diagnostic`] is a [`miette::Diagnostic`], so a host with a source
//! buffer can hand it straight to a miette report handler.

use std::fmt;

use crate::span::Span;

/// Diagnostic severity level, fixed by the diagnostic's code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// The operation cannot be compiled.
    Error,
    /// The operation compiles, but the result may not be what the author meant.
    Warning,
}

/// Every problem the shape compiler can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    UnknownOperation,
    UnknownFragment,
    FragmentCycle,
    UnknownType,
    UnknownField,
    LeafWithSelection,
    MissingSelection,
    MissingTypename,
    ConflictingFields,
    DuplicateSelection,
    MergedSelection,
    ImplicitTypename,
}

impl DiagnosticCode {
    /// The stable code printed in reports, e.g. `E0020`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownOperation => "E0001",
            Self::UnknownFragment => "E0002",
            Self::FragmentCycle => "E0003",
            Self::UnknownType => "E0010",
            Self::UnknownField => "E0011",
            Self::LeafWithSelection => "E0012",
            Self::MissingSelection => "E0013",
            Self::MissingTypename => "E0014",
            Self::ConflictingFields => "E0020",
            Self::DuplicateSelection => "E0021",
            Self::MergedSelection => "W0001",
            Self::ImplicitTypename => "W0002",
        }
    }

    /// Short title shown before the message.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::UnknownOperation => "unknown operation",
            Self::UnknownFragment => "unknown fragment",
            Self::FragmentCycle => "fragment cycle",
            Self::UnknownType => "unknown type",
            Self::UnknownField => "unknown field",
            Self::LeafWithSelection => "selection on a leaf field",
            Self::MissingSelection => "missing selection set",
            Self::MissingTypename => "missing __typename",
            Self::ConflictingFields => "conflicting selections",
            Self::DuplicateSelection => "duplicate selection",
            Self::MergedSelection => "duplicate selection merged",
            Self::ImplicitTypename => "implicit __typename",
        }
    }

    #[must_use]
    pub const fn severity(self) -> DiagnosticSeverity {
        match self {
            Self::MergedSelection | Self::ImplicitTypename => DiagnosticSeverity::Warning,
            _ => DiagnosticSeverity::Error,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short names for the codes, as written in compiler call sites and tests.
pub mod codes {
    use super::DiagnosticCode;

    pub const UNKNOWN_OPERATION: DiagnosticCode = DiagnosticCode::UnknownOperation;
    pub const UNKNOWN_FRAGMENT: DiagnosticCode = DiagnosticCode::UnknownFragment;
    pub const FRAGMENT_CYCLE: DiagnosticCode = DiagnosticCode::FragmentCycle;
    pub const UNKNOWN_TYPE: DiagnosticCode = DiagnosticCode::UnknownType;
    pub const UNKNOWN_FIELD: DiagnosticCode = DiagnosticCode::UnknownField;
    pub const LEAF_WITH_SELECTION: DiagnosticCode = DiagnosticCode::LeafWithSelection;
    pub const MISSING_SELECTION: DiagnosticCode = DiagnosticCode::MissingSelection;
    pub const MISSING_TYPENAME: DiagnosticCode = DiagnosticCode::MissingTypename;
    pub const CONFLICTING_FIELDS: DiagnosticCode = DiagnosticCode::ConflictingFields;
    pub const DUPLICATE_SELECTION: DiagnosticCode = DiagnosticCode::DuplicateSelection;
    pub const MERGED_SELECTION: DiagnosticCode = DiagnosticCode::MergedSelection;
    pub const IMPLICIT_TYPENAME: DiagnosticCode = DiagnosticCode::ImplicitTypename;
}

/// A source location a diagnostic points at.
#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

/// One problem found while compiling an operation.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: DiagnosticSeverity,
    pub message: String,
    /// Labels in report order; the first is the primary location.
    pub labels: Vec<Label>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            message: message.into(),
            labels: Vec::new(),
        }
    }

    /// Adds a label. Synthetic spans are dropped since they point at
    /// nothing the author wrote.
    #[must_use]
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        if !span.is_synthetic() {
            self.labels.push(Label {
                span,
                message: message.into(),
            });
        }
        self
    }

    pub fn primary_span(&self) -> Option<Span> {
        self.labels.first().map(|label| label.span)
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        };
        write!(f, "{level}[{}]: {}: {}", self.code, self.code.title(), self.message)
    }
}

impl std::error::Error for Diagnostic {}

impl miette::Diagnostic for Diagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            DiagnosticSeverity::Error => miette::Severity::Error,
            DiagnosticSeverity::Warning => miette::Severity::Warning,
        })
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            return None;
        }
        Some(Box::new(self.labels.iter().map(|label| {
            miette::LabeledSpan::new_with_span(Some(label.message.clone()), label.span)
        })))
    }
}

/// Diagnostics collected over one compilation, in the order found.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Records `code` with one label at `span`.
    pub fn report(&mut self, code: DiagnosticCode, span: Span, message: impl Into<String>) {
        let message = message.into();
        self.push(Diagnostic::new(code, message.clone()).with_label(span, message));
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic as _;

    #[test]
    fn test_severity_follows_code() {
        let mut bag = DiagnosticBag::new();
        bag.report(codes::MERGED_SELECTION, Span::new(0, 4), "`hero` merged");
        assert!(!bag.has_errors());

        bag.report(codes::UNKNOWN_FIELD, Span::new(0, 10), "no field `age` on `Droid`");
        assert!(bag.has_errors());
        assert_eq!(bag.errors().count(), 1);
        assert_eq!(bag.warnings().count(), 1);
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(codes::CONFLICTING_FIELDS, "`hero` selects `hero` and `villain`");
        assert_eq!(
            diag.to_string(),
            "error[E0020]: conflicting selections: `hero` selects `hero` and `villain`"
        );
    }

    #[test]
    fn test_synthetic_spans_are_not_labelled() {
        let diag = Diagnostic::new(codes::IMPLICIT_TYPENAME, "added on `Character`")
            .with_label(Span::synthetic(), "nowhere")
            .with_label(Span::new(3, 8), "selection");
        assert_eq!(diag.primary_span(), Some(Span::new(3, 8)));
        assert_eq!(diag.labels.len(), 1);
    }

    #[test]
    fn test_miette_view() {
        let diag = Diagnostic::new(codes::DUPLICATE_SELECTION, "`hero` twice")
            .with_label(Span::new(12, 16), "second selection");

        assert_eq!(diag.code().map(|c| c.to_string()).as_deref(), Some("E0021"));
        assert_eq!(diag.severity(), Some(miette::Severity::Error));
        let labels: Vec<_> = diag.labels().into_iter().flatten().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 12);
        assert_eq!(labels[0].len(), 4);
        assert_eq!(labels[0].label(), Some("second selection"));
    }
}

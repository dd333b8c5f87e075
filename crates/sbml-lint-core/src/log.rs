//! Diagnostics and the error log that accumulates them.

use crate::document::ObjectKind;
use crate::types::{Category, Location, RuleId, Severity};
use serde::Serialize;
use std::fmt;
use std::io;

/// Why a diagnostic was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// The rule's predicate returned false.
    RuleFailure,
    /// The rule's predicate panicked; the document could not be checked against it.
    EvaluationFailed,
}

/// One structured validation failure. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    code: RuleId,
    severity: Severity,
    category: Category,
    kind: DiagnosticKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    element: Option<ObjectKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    object_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<Location>,
}

impl Diagnostic {
    /// Creates a rule-failure diagnostic.
    #[must_use]
    pub fn new(
        code: RuleId,
        severity: Severity,
        category: Category,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            severity,
            category,
            kind: DiagnosticKind::RuleFailure,
            message: message.into(),
            element: None,
            object_id: None,
            location: None,
        }
    }

    /// Creates the synthetic diagnostic for a rule whose evaluation panicked.
    #[must_use]
    pub fn evaluation_failed(code: RuleId, category: Category, reason: &str) -> Self {
        Self {
            kind: DiagnosticKind::EvaluationFailed,
            ..Self::new(
                code,
                Severity::Warning,
                category,
                format!("rule {code} could not be evaluated: {reason}"),
            )
        }
    }

    /// Records the offending element and its id.
    #[must_use]
    pub fn with_object(mut self, element: ObjectKind, object_id: Option<&str>) -> Self {
        self.element = Some(element);
        self.object_id = object_id.map(String::from);
        self
    }

    /// Records the source position.
    #[must_use]
    pub fn with_location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    /// Returns the rule identifier.
    #[must_use]
    pub fn code(&self) -> RuleId {
        self.code
    }

    /// Returns the severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the rule category.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Returns why the diagnostic exists.
    #[must_use]
    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    /// Returns the rendered message (empty when no template was available).
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending element kind.
    #[must_use]
    pub fn element(&self) -> Option<ObjectKind> {
        self.element
    }

    /// Returns the offending object's id.
    #[must_use]
    pub fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }

    /// Returns the source position.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// Formats the diagnostic for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!("{} [{}]", self.code, self.category);
        if let Some(element) = self.element {
            let _ = write!(output, " at <{element}>");
            if let Some(id) = &self.object_id {
                let _ = write!(output, " '{id}'");
            }
        }
        if let Some(location) = self.location {
            let _ = write!(output, " (line {})", location.line);
        }
        output.push('\n');
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = self.location {
            write!(f, "{location}: ")?;
        }
        write!(f, "{} [{}] {}", self.severity, self.code, self.message)?;
        if let Some(element) = self.element {
            write!(f, " <{element}")?;
            if let Some(id) = &self.object_id {
                write!(f, " id='{id}'")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// Ordered, append-only collection of diagnostics.
///
/// Never cleared implicitly: call [`ErrorLog::clear`] between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorLog {
    entries: Vec<Diagnostic>,
}

impl ErrorLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Returns the number of diagnostics.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counts diagnostics of exactly the given severity.
    #[must_use]
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Counts diagnostics of the given category.
    #[must_use]
    pub fn count_by_category(&self, category: Category) -> usize {
        self.entries
            .iter()
            .filter(|d| d.category == category)
            .count()
    }

    /// Returns diagnostics filtered by severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == severity)
            .collect()
    }

    /// Returns all diagnostics in the order they were produced.
    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Returns the codes of all diagnostics, in order.
    #[must_use]
    pub fn codes(&self) -> Vec<RuleId> {
        self.entries.iter().map(Diagnostic::code).collect()
    }

    /// Returns true if any diagnostic carries the given code.
    #[must_use]
    pub fn contains(&self, code: RuleId) -> bool {
        self.entries.iter().any(|d| d.code == code)
    }

    /// Returns true if there are any errors or fatal errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_diagnostics_at(Severity::Error)
    }

    /// Checks if any diagnostic meets or exceeds the given severity threshold.
    #[must_use]
    pub fn has_diagnostics_at(&self, severity: Severity) -> bool {
        self.entries.iter().any(|d| d.severity >= severity)
    }

    /// Discards all diagnostics.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Writes every diagnostic followed by a summary line.
    ///
    /// # Errors
    ///
    /// Returns any error from the sink.
    pub fn print(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        sink.write_all(self.format_report().as_bytes())
    }

    /// Formats the log as a multi-line report.
    #[must_use]
    pub fn format_report(&self) -> String {
        use std::fmt::Write;
        let mut report = String::new();
        for diagnostic in &self.entries {
            let _ = writeln!(report, "{}", diagnostic.format());
        }
        let _ = writeln!(report, "{}", self.summary());
        report
    }

    /// One-line count summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Found {} fatal(s), {} error(s), {} warning(s), {} info(s)",
            self.count_by_severity(Severity::Fatal),
            self.count_by_severity(Severity::Error),
            self.count_by_severity(Severity::Warning),
            self.count_by_severity(Severity::Info),
        )
    }
}

impl Extend<Diagnostic> for ErrorLog {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl<'a> IntoIterator for &'a ErrorLog {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_diagnostic(severity: Severity, category: Category) -> Diagnostic {
        Diagnostic::new(RuleId::new(21211), severity, category, "bad variable")
            .with_object(ObjectKind::EventAssignment, Some("ea1"))
            .with_location(Some(Location::new(12, 5)))
    }

    #[test]
    fn counts_by_severity_and_category() {
        let mut log = ErrorLog::new();
        log.push(make_diagnostic(Severity::Error, Category::GeneralConsistency));
        log.push(make_diagnostic(Severity::Warning, Category::UnitsConsistency));
        log.push(make_diagnostic(Severity::Warning, Category::UnitsConsistency));

        assert_eq!(log.count(), 3);
        assert_eq!(log.count_by_severity(Severity::Warning), 2);
        assert_eq!(log.count_by_severity(Severity::Fatal), 0);
        assert_eq!(log.count_by_category(Category::UnitsConsistency), 2);
        assert!(log.has_errors());
    }

    #[test]
    fn warnings_alone_are_not_errors() {
        let mut log = ErrorLog::new();
        log.push(make_diagnostic(Severity::Warning, Category::ModelingPractice));
        assert!(!log.has_errors());
        assert!(log.has_diagnostics_at(Severity::Warning));
    }

    #[test]
    fn clear_discards_entries() {
        let mut log = ErrorLog::new();
        log.push(make_diagnostic(Severity::Error, Category::GeneralConsistency));
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn evaluation_failure_is_low_severity() {
        let d = Diagnostic::evaluation_failed(
            RuleId::new(10501),
            Category::UnitsConsistency,
            "index out of bounds",
        );
        assert_eq!(d.severity(), Severity::Warning);
        assert_eq!(d.kind(), DiagnosticKind::EvaluationFailed);
        assert!(d.message().contains("10501"));
    }

    #[test]
    fn display_is_one_line() {
        let d = make_diagnostic(Severity::Error, Category::GeneralConsistency);
        assert_eq!(
            d.to_string(),
            "12:5: error [21211] bad variable <eventAssignment id='ea1'>"
        );
    }

    #[test]
    fn print_writes_summary() {
        let mut log = ErrorLog::new();
        log.push(make_diagnostic(Severity::Error, Category::GeneralConsistency));
        let mut out = Vec::new();
        log.print(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("21211 [general-consistency] at <eventAssignment> 'ea1' (line 12)"));
        assert!(text.ends_with("Found 0 fatal(s), 1 error(s), 0 warning(s), 0 info(s)\n"));
    }
}

use ariadne::{Color, Label, Report, ReportKind, Source};
use std::fmt;
use strsim::jaro_winkler;

/// Minimum similarity for a "did you mean" hint (0.0-1.0).
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A problem found in game source, tied to a line.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Byte range in the decoded source text.
    pub span: std::ops::Range<usize>,
    /// 1-based source line, or 0 when not tied to a line.
    pub line: usize,
    pub message: String,
    pub label: Option<String>,
}

impl Diagnostic {
    pub fn error(span: std::ops::Range<usize>, line: usize, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            span,
            line,
            message: message.into(),
            label: None,
        }
    }

    pub fn warning(span: std::ops::Range<usize>, line: usize, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            span,
            line,
            message: message.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attach a "did you mean" label when `input` is close to a candidate.
    pub fn with_suggestion<'a>(
        self,
        input: &str,
        candidates: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        match suggest(input, candidates) {
            Some(best) => self.with_label(format!("did you mean `{best}`?")),
            None => self,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        if self.line > 0 {
            write!(f, "{prefix}: line {}: {}", self.line, self.message)
        } else {
            write!(f, "{prefix}: {}", self.message)
        }
    }
}

/// The candidate most similar to `input`, if any is similar enough.
pub fn suggest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut best: Option<(&str, f64)> = None;
    for candidate in candidates {
        if candidate == input {
            continue;
        }
        let score = jaro_winkler(input, candidate);
        if score >= SUGGESTION_THRESHOLD && best.is_none_or(|(_, s)| score > s) {
            best = Some((candidate, score));
        }
    }
    best.map(|(name, _)| name)
}

/// Render diagnostics using ariadne for pretty terminal output.
pub fn render_diagnostics(source: &str, filename: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = Vec::new();

    for diag in diagnostics {
        let kind = match diag.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };
        let color = match diag.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        let span = (filename, diag.span.clone());
        let mut report = Report::build(kind, span).with_message(&diag.message);

        let label_text = diag.label.as_deref().unwrap_or(&diag.message);
        report = report.with_label(
            Label::new((filename, diag.span.clone()))
                .with_message(label_text)
                .with_color(color),
        );

        report
            .finish()
            .write((filename, Source::from(source)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::error(0..5, 3, "unknown keyword \"colour\"");
        assert_eq!(d.to_string(), "error: line 3: unknown keyword \"colour\"");
        let d = Diagnostic::warning(0..0, 0, "no objects");
        assert_eq!(d.to_string(), "warning: no objects");
    }

    #[test]
    fn suggestions() {
        let names = ["CONTAINER", "CLOSED", "LUMINOUS"];
        assert_eq!(suggest("CONTAINR", names), Some("CONTAINER"));
        assert_eq!(suggest("XYZZY", names), None);
        let d = Diagnostic::error(0..1, 1, "unknown attribute").with_suggestion("LUMINUS", names);
        assert_eq!(d.label.as_deref(), Some("did you mean `LUMINOUS`?"));
    }

    #[test]
    fn render_produces_output() {
        let source = "location cave\nhas SHINY\n";
        let diags = vec![
            Diagnostic::error(18..23, 2, "unknown attribute \"SHINY\"")
                .with_label("not declared"),
        ];
        let output = render_diagnostics(source, "test.j2", &diags);
        assert!(!output.is_empty());
        assert!(output.contains("unknown attribute"));
    }
}

//! Markdown reports from structured results
//!
//! Rendering is a pure function of the result and its layout. The same input
//! always produces the same bytes and nothing here can fail.

use crate::agents::failure::Failure;
use crate::agents::schema::{FieldValue, StructuredResult};

/// Fixed framing around a result: title, input context and footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    title: String,
    context: Vec<(String, String)>,
    footer: Option<String>,
}

impl ReportLayout {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            context: Vec::new(),
            footer: None,
        }
    }

    /// Add a section describing the inputs, shown before the result fields
    #[must_use]
    pub fn with_context(mut self, header: impl Into<String>, body: impl Into<String>) -> Self {
        self.context.push((header.into(), body.into()));
        self
    }

    #[must_use]
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// Render a result as markdown.
///
/// One `##` section per contract field, in declaration order. Empty values
/// keep their header and get an empty body.
pub fn render(result: &StructuredResult, layout: &ReportLayout) -> String {
    let mut out = format!("# {}\n", layout.title);

    for (header, body) in &layout.context {
        out.push_str(&format!("\n## {header}\n{body}\n"));
    }

    for (field, value) in result.iter() {
        out.push_str(&format!("\n## {}\n", field.title));
        let lines = field_lines(value);
        if !lines.is_empty() {
            out.push_str(&lines.join("\n"));
            out.push('\n');
        }
    }

    if let Some(footer) = &layout.footer {
        out.push_str(&format!("\n---\n*{footer}*\n"));
    }
    out
}

fn field_lines(value: &FieldValue) -> Vec<String> {
    match value {
        FieldValue::Text(text) if text.is_empty() => Vec::new(),
        FieldValue::Text(text) => vec![text.clone()],
        FieldValue::TextList(items) => items.iter().map(|item| format!("- {item}")).collect(),
        FieldValue::NumberMap(entries) => entries
            .iter()
            .map(|(key, value)| format!("- {key}: {}", format_number(*value)))
            .collect(),
        FieldValue::TextMap(entries) => entries
            .iter()
            .map(|(key, value)| format!("- **{key}**: {value}"))
            .collect(),
        FieldValue::LabeledList(items) => items
            .iter()
            .map(|item| format!("- **{}**: {}", item.label, item.description))
            .collect(),
    }
}

/// Two decimals, rounding the exact binary value to nearest
pub fn format_number(value: f64) -> String {
    format!("{value:.2}")
}

/// Inline text shown in place of a report when a session fails
pub fn render_failure(label: &str, failure: &Failure) -> String {
    format!("{label} failed: {failure}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::schema::SchemaContract;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn result(answer: &serde_json::Value) -> StructuredResult {
        let contract = Arc::new(
            SchemaContract::builder("sample")
                .text("summary", "")
                .list("items", "")
                .number_map("confidence_scores", "")
                .text_map("stakeholder_impacts", "")
                .labeled_list("novel_perspectives", "")
                .build(),
        );
        contract.validate(answer).expect("answer should validate")
    }

    #[test]
    fn test_full_layout() {
        let result = result(&json!({
            "summary": "All good.",
            "items": ["a", "b"],
            "confidence_scores": {"confidence": 0.8333, "coverage": 1},
            "stakeholder_impacts": {"Users": "faster answers"},
            "novel_perspectives": [{"label": "Inversion", "description": "solve the opposite"}]
        }));
        let layout = ReportLayout::new("Sample Report")
            .with_context("Question", "Why?")
            .with_footer("Generated by Sample");

        let expected = "# Sample Report\n\
                        \n## Question\nWhy?\n\
                        \n## Summary\nAll good.\n\
                        \n## Items\n- a\n- b\n\
                        \n## Confidence Scores\n- confidence: 0.83\n- coverage: 1.00\n\
                        \n## Stakeholder Impacts\n- **Users**: faster answers\n\
                        \n## Novel Perspectives\n- **Inversion**: solve the opposite\n\
                        \n---\n*Generated by Sample*\n";
        assert_eq!(render(&result, &layout), expected);
    }

    #[test]
    fn test_empty_values_keep_headers() {
        let result = result(&json!({
            "summary": "",
            "items": [],
            "confidence_scores": {},
            "stakeholder_impacts": {},
            "novel_perspectives": []
        }));
        let text = render(&result, &ReportLayout::new("Empty"));

        assert_eq!(
            text,
            "# Empty\n\n## Summary\n\n## Items\n\n## Confidence Scores\n\n## Stakeholder Impacts\n\n## Novel Perspectives\n"
        );
    }

    #[test]
    fn test_number_map_is_not_sorted() {
        let result = result(&json!({
            "summary": "",
            "items": [],
            "confidence_scores": {"zeta": 0.1, "alpha": 0.2},
            "stakeholder_impacts": {},
            "novel_perspectives": []
        }));
        let text = render(&result, &ReportLayout::new("Order"));
        let zeta = text.find("- zeta: 0.10").expect("zeta rendered");
        let alpha = text.find("- alpha: 0.20").expect("alpha rendered");
        assert!(zeta < alpha);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.8333), "0.83");
        assert_eq!(format_number(0.8367), "0.84");
        assert_eq!(format_number(2.0), "2.00");
    }

    #[test]
    fn test_render_is_deterministic() {
        let result = result(&json!({
            "summary": "s",
            "items": ["x"],
            "confidence_scores": {"k": 0.5},
            "stakeholder_impacts": {"a": "b"},
            "novel_perspectives": []
        }));
        let layout = ReportLayout::new("Twice").with_footer("f");
        assert_eq!(render(&result, &layout), render(&result, &layout));
    }

    #[test]
    fn test_render_failure() {
        let failure = Failure::DeadlineExceeded(Duration::from_secs(5));
        assert_eq!(
            render_failure("Knowledge synthesis", &failure),
            "Knowledge synthesis failed: session deadline of 5s exceeded"
        );
    }
}

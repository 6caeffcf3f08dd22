//! Typed display sections extracted from the agent's loosely-structured reply.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::task::Task;

/// Title used when the reply only carries the generic `response` field.
pub const FALLBACK_TITLE: &str = "AI Response";

const FALLBACK_FIELD: &str = "response";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Explanation,
    Issues,
    Fix,
    Summary,
}

impl SectionKind {
    /// Extraction and display order.
    pub const ORDERED: [SectionKind; 4] = [
        SectionKind::Explanation,
        SectionKind::Issues,
        SectionKind::Fix,
        SectionKind::Summary,
    ];

    /// JSON field carrying this section in the reply.
    pub fn field(&self) -> &'static str {
        match self {
            SectionKind::Explanation => "explanation",
            SectionKind::Issues => "issues",
            SectionKind::Fix => "fix",
            SectionKind::Summary => "summary",
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            SectionKind::Explanation => "Explanation",
            SectionKind::Issues => "Issues Found",
            SectionKind::Fix => "Suggested Fix",
            SectionKind::Summary => "Summary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSection {
    pub kind: SectionKind,
    pub title: String,
    pub content: String,
}

impl ResponseSection {
    fn new(kind: SectionKind, title: &str, content: String) -> Self {
        Self {
            kind,
            title: title.to_string(),
            content,
        }
    }

    /// Heading shown for this section under `task`.
    pub fn heading(&self, task: Task) -> &str {
        task_heading(task, self.kind).unwrap_or(self.title.as_str())
    }
}

/// Task-specific override of a section's generic title.
pub fn task_heading(task: Task, kind: SectionKind) -> Option<&'static str> {
    use SectionKind::*;

    match (task, kind) {
        (Task::Explain, Explanation) => Some("Code Explanation"),
        (Task::Explain, Summary) => Some("Key Insights"),

        (Task::Debug, Issues) => Some("Issues Found"),
        (Task::Debug, Fix) => Some("Suggested Fix"),
        (Task::Debug, Explanation) => Some("Error Analysis"),

        (Task::Review, Explanation) => Some("Code Review Summary"),
        (Task::Review, Issues) => Some("Improvement Areas"),
        (Task::Review, Fix) => Some("Recommendations"),

        (Task::Summarize, Summary) => Some("High-Level Overview"),
        (Task::Summarize, Explanation) => Some("Logic Breakdown"),

        _ => None,
    }
}

/// Map a reply body into sections in fixed order.
///
/// Falls back to a single explanation section built from `response` when none
/// of the structured fields are present. An empty list is a valid result.
pub fn extract_sections(body: &Value) -> Vec<ResponseSection> {
    let mut sections: Vec<ResponseSection> = SectionKind::ORDERED
        .iter()
        .filter_map(|kind| {
            field_text(body, kind.field())
                .map(|content| ResponseSection::new(*kind, kind.default_title(), content))
        })
        .collect();

    if sections.is_empty() {
        if let Some(content) = field_text(body, FALLBACK_FIELD) {
            sections.push(ResponseSection::new(
                SectionKind::Explanation,
                FALLBACK_TITLE,
                content,
            ));
        }
    }

    sections
}

fn field_text(body: &Value, field: &str) -> Option<String> {
    body.get(field).and_then(value_text)
}

// Non-empty strings, arrays joined by line, non-empty objects as JSON.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let lines: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) if !s.is_empty() => Some(s.clone()),
                    Value::String(_) | Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect();
            if lines.is_empty() {
                None
            } else {
                Some(lines.join("\n"))
            }
        }
        Value::Object(map) if !map.is_empty() => serde_json::to_string_pretty(value).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kinds(sections: &[ResponseSection]) -> Vec<SectionKind> {
        sections.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_fixed_order_regardless_of_field_order() {
        let body = json!({
            "summary": "short",
            "fix": "add a guard",
            "explanation": "divides by zero",
        });

        let sections = extract_sections(&body);
        assert_eq!(
            kinds(&sections),
            vec![SectionKind::Explanation, SectionKind::Fix, SectionKind::Summary]
        );
        assert_eq!(sections[1].title, "Suggested Fix");
        assert_eq!(sections[1].content, "add a guard");
    }

    #[test]
    fn test_fallback_response_becomes_single_explanation() {
        let body = json!({ "response": "free text answer" });

        let sections = extract_sections(&body);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, SectionKind::Explanation);
        assert_eq!(sections[0].title, FALLBACK_TITLE);
        assert_eq!(sections[0].content, "free text answer");
    }

    #[test]
    fn test_fallback_ignored_when_structured_fields_exist() {
        let body = json!({ "issues": "one bug", "response": "ignored" });

        let sections = extract_sections(&body);
        assert_eq!(kinds(&sections), vec![SectionKind::Issues]);
    }

    #[test]
    fn test_no_recognized_fields_yields_empty() {
        assert!(extract_sections(&json!({ "status": "ok" })).is_empty());
        assert!(extract_sections(&json!({})).is_empty());
        assert!(extract_sections(&json!("just a string")).is_empty());
    }

    #[test]
    fn test_empty_and_non_text_values_count_as_absent() {
        let body = json!({
            "explanation": "",
            "issues": null,
            "fix": false,
            "summary": 3,
        });

        assert!(extract_sections(&body).is_empty());
    }

    #[test]
    fn test_array_fields_are_joined_by_line() {
        let body = json!({ "issues": ["unused variable", "", "missing return"] });

        let sections = extract_sections(&body);
        assert_eq!(sections[0].content, "unused variable\nmissing return");
    }

    #[test]
    fn test_debug_headings() {
        let body = json!({ "issues": "x is undefined", "fix": "define x" });
        let sections = extract_sections(&body);

        let headings: Vec<&str> = sections.iter().map(|s| s.heading(Task::Debug)).collect();
        assert_eq!(headings, vec!["Issues Found", "Suggested Fix"]);
    }

    #[test]
    fn test_heading_falls_back_to_section_title() {
        let section = ResponseSection::new(SectionKind::Fix, "Suggested Fix", "patch".into());
        assert_eq!(section.heading(Task::Explain), "Suggested Fix");
        assert_eq!(section.heading(Task::Review), "Recommendations");

        let fallback = extract_sections(&json!({ "response": "hi" }));
        assert_eq!(fallback[0].heading(Task::Debug), "Error Analysis");
    }

    #[test]
    fn test_every_task_overrides_explanation() {
        for task in Task::all() {
            assert!(task_heading(task, SectionKind::Explanation).is_some(), "{task}");
        }
    }
}

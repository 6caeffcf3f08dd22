use serde::{Deserialize, Serialize};

/// The kind of analysis requested from the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    #[default]
    Explain,
    Debug,
    Review,
    Summarize,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Explain => "explain",
            Task::Debug => "debug",
            Task::Review => "review",
            Task::Summarize => "summarize",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "explain" => Some(Task::Explain),
            "debug" => Some(Task::Debug),
            "review" => Some(Task::Review),
            "summarize" => Some(Task::Summarize),
            _ => None,
        }
    }

    pub fn all() -> Vec<Task> {
        vec![Task::Explain, Task::Debug, Task::Review, Task::Summarize]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Task::Explain => "Explain Code",
            Task::Debug => "Debug Error",
            Task::Review => "Review Code",
            Task::Summarize => "Summarize Logic",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Task::Explain => "Understand what code does",
            Task::Debug => "Find and fix issues",
            Task::Review => "Get quality feedback",
            Task::Summarize => "High-level overview",
        }
    }

    /// Title of the output panel once results are shown.
    pub fn panel_title(&self) -> &'static str {
        match self {
            Task::Explain => "Code Explanation",
            Task::Debug => "Debug Analysis",
            Task::Review => "Code Review",
            Task::Summarize => "Logic Summary",
        }
    }

    /// Only debugging takes an error message alongside the code.
    pub fn accepts_error_text(&self) -> bool {
        matches!(self, Task::Debug)
    }

    pub fn next(&self) -> Task {
        match self {
            Task::Explain => Task::Debug,
            Task::Debug => Task::Review,
            Task::Review => Task::Summarize,
            Task::Summarize => Task::Explain,
        }
    }

    pub fn prev(&self) -> Task {
        match self {
            Task::Explain => Task::Summarize,
            Task::Debug => Task::Explain,
            Task::Review => Task::Debug,
            Task::Summarize => Task::Review,
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_any_case() {
        assert_eq!(Task::from_str("DEBUG"), Some(Task::Debug));
        assert_eq!(Task::from_str(" review "), Some(Task::Review));
        assert_eq!(Task::from_str("translate"), None);
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&Task::Summarize).unwrap();
        assert_eq!(json, "\"summarize\"");
    }

    #[test]
    fn test_next_cycles_through_all_tasks() {
        let mut task = Task::default();
        for expected in Task::all().into_iter().skip(1) {
            task = task.next();
            assert_eq!(task, expected);
        }
        assert_eq!(task.next(), Task::Explain);
        assert_eq!(Task::Explain.prev(), Task::Summarize);
    }

    #[test]
    fn test_only_debug_accepts_error_text() {
        let accepting: Vec<Task> = Task::all()
            .into_iter()
            .filter(|t| t.accepts_error_text())
            .collect();
        assert_eq!(accepting, vec![Task::Debug]);
    }
}

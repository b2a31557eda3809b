//! Capability taxonomy (C1).
//!
//! A closed set of coarse functional tags attached to providers and required
//! by task analyses. Comparison is by identity — there is no fuzzy or
//! hierarchical relationship between categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A coarse functional capability category.
///
/// Closed enum per the spec's data model: file, web, search, database,
/// automation, development, communication, analysis, reasoning, cognitive,
/// system, graphics, data-processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityCategory {
    File,
    Web,
    Search,
    Database,
    Automation,
    Development,
    Communication,
    Analysis,
    Reasoning,
    Cognitive,
    System,
    Graphics,
    DataProcessing,
}

impl CapabilityCategory {
    /// All categories, in canonical enum order.
    pub const ALL: [CapabilityCategory; 13] = [
        Self::File,
        Self::Web,
        Self::Search,
        Self::Database,
        Self::Automation,
        Self::Development,
        Self::Communication,
        Self::Analysis,
        Self::Reasoning,
        Self::Cognitive,
        Self::System,
        Self::Graphics,
        Self::DataProcessing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Web => "web",
            Self::Search => "search",
            Self::Database => "database",
            Self::Automation => "automation",
            Self::Development => "development",
            Self::Communication => "communication",
            Self::Analysis => "analysis",
            Self::Reasoning => "reasoning",
            Self::Cognitive => "cognitive",
            Self::System => "system",
            Self::Graphics => "graphics",
            Self::DataProcessing => "data-processing",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "file" => Some(Self::File),
            "web" => Some(Self::Web),
            "search" => Some(Self::Search),
            "database" => Some(Self::Database),
            "automation" => Some(Self::Automation),
            "development" => Some(Self::Development),
            "communication" => Some(Self::Communication),
            "analysis" => Some(Self::Analysis),
            "reasoning" => Some(Self::Reasoning),
            "cognitive" => Some(Self::Cognitive),
            "system" => Some(Self::System),
            "graphics" => Some(Self::Graphics),
            "data-processing" => Some(Self::DataProcessing),
            _ => None,
        }
    }

    /// Keyword substrings that indicate this capability is required by a
    /// task description. Grounded on `tool_capability_mapper.py`'s category
    /// tables and `task_analyzer.py`'s requirement keyword lists from the
    /// pre-distillation source, translated onto this taxonomy.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::File => &[
                "file", "directory", "folder", "save", "load", "copy", "move", "delete",
                "read file", "write file", "filesystem",
            ],
            Self::Web => &[
                "website", "web page", "browser", "navigate", "click", "fill form",
                "screenshot", "scrape", "url", "http",
            ],
            Self::Search => &[
                "search", "find", "look up", "query", "lookup", "discover",
            ],
            Self::Database => &[
                "database", "sql", "table", "query the db", "record", "schema",
            ],
            Self::Automation => &[
                "automate", "schedule", "trigger", "workflow", "pipeline", "script it",
            ],
            Self::Development => &[
                "code", "program", "script", "function", "api", "repository", "commit",
                "github", "programming", "compile", "debug",
            ],
            Self::Communication => &[
                "email", "message", "send", "notify", "communicate", "contact", "call",
                "meeting",
            ],
            Self::Analysis => &[
                "analyze", "examine", "evaluate", "assess", "compare", "statistics",
                "trends", "patterns", "insights", "metrics",
            ],
            Self::Reasoning => &[
                "think", "reason", "solve", "calculate", "logic", "problem solving",
                "decision", "strategy",
            ],
            Self::Cognitive => &[
                "plan", "understand", "interpret", "summarize", "explain",
            ],
            Self::System => &[
                "process", "memory usage", "cpu", "system", "daemon", "service",
            ],
            Self::Graphics => &[
                "image", "chart", "graph", "diagram", "visualize", "render", "plot",
            ],
            Self::DataProcessing => &[
                "transform", "parse", "extract", "clean data", "convert", "aggregate",
            ],
        }
    }
}

impl fmt::Display for CapabilityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for cat in CapabilityCategory::ALL {
            let s = cat.as_str();
            assert_eq!(CapabilityCategory::parse_str(s), Some(cat));
        }
    }

    #[test]
    fn parse_is_case_and_separator_insensitive() {
        assert_eq!(
            CapabilityCategory::parse_str("Data_Processing"),
            Some(CapabilityCategory::DataProcessing)
        );
    }

    #[test]
    fn unknown_string_parses_to_none() {
        assert_eq!(CapabilityCategory::parse_str("not-a-category"), None);
    }

    #[test]
    fn every_category_has_keywords() {
        for cat in CapabilityCategory::ALL {
            assert!(!cat.keywords().is_empty(), "{cat:?} has no keywords");
        }
    }
}

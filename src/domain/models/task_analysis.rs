//! Task analysis value type (C4 data model).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::capability::CapabilityCategory;

/// Primary classification of a task's subject matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    InformationRetrieval,
    ContentCreation,
    DataAnalysis,
    FileOps,
    WebAutomation,
    CodeDevelopment,
    ProjectManagement,
    Research,
    Communication,
    Reasoning,
}

impl TaskType {
    pub const ALL: [TaskType; 10] = [
        Self::InformationRetrieval,
        Self::ContentCreation,
        Self::DataAnalysis,
        Self::FileOps,
        Self::WebAutomation,
        Self::CodeDevelopment,
        Self::ProjectManagement,
        Self::Research,
        Self::Communication,
        Self::Reasoning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InformationRetrieval => "information-retrieval",
            Self::ContentCreation => "content-creation",
            Self::DataAnalysis => "data-analysis",
            Self::FileOps => "file-ops",
            Self::WebAutomation => "web-automation",
            Self::CodeDevelopment => "code-development",
            Self::ProjectManagement => "project-management",
            Self::Research => "research",
            Self::Communication => "communication",
            Self::Reasoning => "reasoning",
        }
    }

    /// Base capability categories implied by this task type regardless of
    /// keyword matches (e.g. research always implies search + web). Grounded
    /// on `task_analyzer.py`'s `base_requirements` table.
    pub fn base_capabilities(&self) -> &'static [CapabilityCategory] {
        use CapabilityCategory as C;
        match self {
            Self::InformationRetrieval => &[C::Search, C::Web],
            Self::ContentCreation => &[C::Development, C::File],
            Self::DataAnalysis => &[C::DataProcessing, C::Analysis],
            Self::FileOps => &[C::File],
            Self::WebAutomation => &[C::Web, C::Automation],
            Self::CodeDevelopment => &[C::Development],
            Self::ProjectManagement => &[C::Automation, C::Communication],
            Self::Research => &[C::Search, C::Web, C::Analysis],
            Self::Communication => &[C::Communication],
            Self::Reasoning => &[C::Reasoning, C::Cognitive],
        }
    }

    /// Keyword phrases that indicate this task type. Ported near-verbatim
    /// from `task_analyzer.py`'s `task_type_patterns` table
    /// (SPEC_FULL.md section B.1).
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::InformationRetrieval => &[
                "find", "search", "get", "fetch", "retrieve", "look up", "what is",
                "show me", "tell me about", "information about",
            ],
            Self::ContentCreation => &[
                "create", "write", "generate", "make", "build", "compose", "draft",
                "design", "develop content",
            ],
            Self::DataAnalysis => &[
                "analyze", "examine", "evaluate", "assess", "compare", "statistics",
                "trends", "patterns", "insights", "metrics",
            ],
            Self::FileOps => &[
                "file", "directory", "folder", "save", "load", "copy", "move",
                "delete", "read file", "write file",
            ],
            Self::WebAutomation => &[
                "website", "web page", "browser", "navigate", "click", "fill form",
                "screenshot", "scrape",
            ],
            Self::CodeDevelopment => &[
                "code", "program", "script", "function", "api", "repository",
                "commit", "github", "programming",
            ],
            Self::ProjectManagement => &[
                "project", "task", "milestone", "plan", "schedule", "organize",
                "manage", "workflow", "kanban",
            ],
            Self::Research => &[
                "research", "investigate", "study", "explore", "survey",
                "comprehensive analysis", "deep dive",
            ],
            Self::Communication => &[
                "email", "message", "send", "notify", "communicate", "contact",
                "call", "meeting",
            ],
            Self::Reasoning => &[
                "think", "reason", "solve", "calculate", "logic", "problem solving",
                "decision", "strategy",
            ],
        }
    }
}

/// Ordered complexity enum: Simple < Moderate < Complex < Advanced < Expert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
    Advanced,
    Expert,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }

    /// Ordinal level, 0-4, used for step/time estimation arithmetic.
    pub fn level(&self) -> u32 {
        match self {
            Self::Simple => 0,
            Self::Moderate => 1,
            Self::Complex => 2,
            Self::Advanced => 3,
            Self::Expert => 4,
        }
    }

    /// One level up, clamped at Expert.
    pub fn bump(self) -> Self {
        match self {
            Self::Simple => Self::Moderate,
            Self::Moderate => Self::Complex,
            Self::Complex => Self::Advanced,
            Self::Advanced | Self::Expert => Self::Expert,
        }
    }

    /// Base estimated step count for this complexity bucket (spec 4.1 #4).
    pub fn base_steps(&self) -> u32 {
        match self {
            Self::Simple => 1,
            Self::Moderate => 3,
            Self::Complex => 6,
            Self::Advanced => 12,
            Self::Expert => 20,
        }
    }

    /// All buckets in ascending order, for the argmax-then-walk scoring
    /// algorithm described in SPEC_FULL.md section B.2.
    pub const ASCENDING: [Complexity; 5] = [
        Self::Simple,
        Self::Moderate,
        Self::Complex,
        Self::Advanced,
        Self::Expert,
    ];

    /// Keyword phrases contributing to this bucket's score. Ported from
    /// `task_analyzer.py`'s `complexity_indicators` table; `Expert` has no
    /// direct keywords in the original and is reached only via the length
    /// and conjunction-count heuristics layered on top.
    pub fn indicators(&self) -> &'static [&'static str] {
        match self {
            Self::Simple => &["simple", "basic", "quick", "just", "only", "single"],
            Self::Moderate => &["multiple", "several", "few", "some", "and", "then"],
            Self::Complex => &[
                "complex", "detailed", "comprehensive", "thorough", "analyze", "compare",
                "evaluate",
            ],
            Self::Advanced => &[
                "very complex", "sophisticated", "advanced", "multi-step", "orchestrate",
                "coordinate", "plan and execute",
            ],
            Self::Expert => &[],
        }
    }
}

/// Immutable result of analyzing a free-form task description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAnalysis {
    pub description: String,
    pub task_type: TaskType,
    pub complexity: Complexity,
    pub required_capabilities: BTreeSet<CapabilityCategory>,
    pub estimated_steps: u32,
    pub parallelizable: bool,
    pub requires_iteration: bool,
    pub requires_human_input: bool,
    pub confidence: f64,
    /// Observational only — excluded from equality comparisons used by
    /// determinism/cache-correctness tests (see `analysis_eq_ignoring_observed`).
    pub cache_hit: bool,
    pub analysis_time_ms: f64,
}

impl TaskAnalysis {
    /// Equality that ignores the purely observational fields
    /// (`cache_hit`, `analysis_time_ms`), as required by the analyzer
    /// determinism and cache-correctness properties (spec section 8, #1/#10).
    pub fn eq_ignoring_observed(&self, other: &Self) -> bool {
        self.description == other.description
            && self.task_type == other.task_type
            && self.complexity == other.complexity
            && self.required_capabilities == other.required_capabilities
            && self.estimated_steps == other.estimated_steps
            && self.parallelizable == other.parallelizable
            && self.requires_iteration == other.requires_iteration
            && self.requires_human_input == other.requires_human_input
            && (self.confidence - other.confidence).abs() < 1e-9
    }
}

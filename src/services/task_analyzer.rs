//! C4 — Task Analyzer: a pure function of text to [`TaskAnalysis`], backed
//! by an LRU cache over normalized text.

use std::time::Instant;

use tokio::sync::Mutex;

use crate::domain::error::AnalysisError;
use crate::domain::models::{CacheStats, Complexity, TaskAnalysis, TaskType};
use crate::services::cache::LruCache;
use crate::services::taxonomy;

/// Action words whose presence indicates multi-step, sequenced work.
/// Ported from `task_analyzer.py`'s conjunction-counting heuristic
/// (SPEC_FULL.md section B.2).
const ACTION_WORDS: [&str; 7] = ["and", "then", "after", "before", "while", "also", "additionally"];

/// Words whose presence at task-type classification time flags that a task
/// wants an iterated/refined result rather than a single pass.
const ITERATION_WORDS: [&str; 6] = [
    "iterate", "polish", "refine", "until good", "improve until", "high-quality",
];

const HUMAN_INPUT_WORDS: [&str; 4] = ["ask me", "confirm with", "check with me", "human review"];

/// Words implying a strict order between steps, which rules out treating a
/// multi-capability task as parallelizable even when it names several
/// independent capabilities.
const SEQUENTIAL_WORDS: [&str; 5] = ["then", "after", "before", "first", "finally"];

/// Words that explicitly call out concurrent execution.
const PARALLEL_WORDS: [&str; 4] = ["simultaneously", "in parallel", "at the same time", "concurrently"];

pub struct TaskAnalyzer {
    cache: Mutex<LruCache<String, TaskAnalysis>>,
}

impl TaskAnalyzer {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(cache_capacity)),
        }
    }

    /// Classify `text`. Deterministic: repeated calls with the same
    /// normalized text return structurally equal analyses (spec section 8,
    /// property #1), modulo `cache_hit`/`analysis_time_ms`.
    pub async fn analyze(&self, text: &str) -> Result<TaskAnalysis, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let start = Instant::now();
        let normalized = taxonomy::normalize(text);

        let mut cache = self.cache.lock().await;
        let elapsed_so_far = start.elapsed().as_secs_f64() * 1000.0;
        if let Some(mut cached) = cache.get(&normalized, elapsed_so_far) {
            cached.cache_hit = true;
            cached.analysis_time_ms = start.elapsed().as_secs_f64() * 1000.0;
            return Ok(cached);
        }

        let mut analysis = Self::classify(text, &normalized);
        analysis.analysis_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        cache.put(normalized, analysis.clone());
        Ok(analysis)
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.lock().await.stats()
    }

    /// Drops all cached analyses. Used by the coordinator's periodic
    /// cleanup tick (spec section 4.6).
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    fn classify(original: &str, normalized: &str) -> TaskAnalysis {
        let task_type = Self::classify_task_type(normalized);
        let complexity = Self::classify_complexity(normalized);

        let mut capabilities = taxonomy::infer_capabilities(normalized);
        capabilities.extend(task_type.base_capabilities().iter().copied());

        let word_count = normalized.split_whitespace().count();
        let action_count = ACTION_WORDS.iter().filter(|w| normalized.contains(*w)).count();

        let has_sequential_marker = SEQUENTIAL_WORDS.iter().any(|w| normalized.contains(w));
        let has_parallel_marker = PARALLEL_WORDS.iter().any(|w| normalized.contains(w));
        let parallelizable =
            capabilities.len() >= 2 && (has_parallel_marker || !has_sequential_marker);
        let requires_iteration = ITERATION_WORDS.iter().any(|w| normalized.contains(w));
        let requires_human_input = HUMAN_INPUT_WORDS.iter().any(|w| normalized.contains(w));

        let estimated_steps =
            complexity.base_steps() + (action_count as u32) + (word_count as u32 / 25);

        // Confidence grows with the number of independent classification
        // signals that agree (task-type keyword hit, capability hits).
        let type_hits = task_type.keywords().iter().filter(|k| normalized.contains(*k)).count();
        let confidence = (0.5 + 0.1 * type_hits as f64 + 0.05 * capabilities.len() as f64).min(0.99);

        TaskAnalysis {
            description: original.to_string(),
            task_type,
            complexity,
            required_capabilities: capabilities,
            estimated_steps,
            parallelizable,
            requires_iteration,
            requires_human_input,
            confidence,
            cache_hit: false,
            analysis_time_ms: 0.0,
        }
    }

    fn classify_task_type(normalized: &str) -> TaskType {
        TaskType::ALL
            .iter()
            .copied()
            .map(|t| {
                let hits = t.keywords().iter().filter(|k| normalized.contains(*k)).count();
                (t, hits)
            })
            .max_by_key(|(_, hits)| *hits)
            .filter(|(_, hits)| *hits > 0)
            .map(|(t, _)| t)
            .unwrap_or(TaskType::InformationRetrieval)
    }

    /// SPEC_FULL.md section B.2: compute a keyword-hit score per bucket plus
    /// length/conjunction-count bonuses, then take the argmax (defaulting to
    /// `Simple` when every bucket scores zero).
    fn classify_complexity(normalized: &str) -> Complexity {
        let mut scores = [0i32; 5];

        for (i, bucket) in Complexity::ASCENDING.iter().enumerate() {
            scores[i] = bucket
                .indicators()
                .iter()
                .filter(|kw| normalized.contains(*kw))
                .count() as i32;
        }

        let word_count = normalized.split_whitespace().count();
        if word_count > 50 {
            scores[4] += 2; // Expert
        } else if word_count > 25 {
            scores[2] += 1; // Complex
        } else if word_count > 10 {
            scores[1] += 1; // Moderate
        }

        let action_count = ACTION_WORDS.iter().filter(|w| normalized.contains(*w)).count();
        if action_count >= 3 {
            scores[4] += 2; // Expert
        } else if action_count >= 2 {
            scores[2] += 1; // Complex
        } else if action_count >= 1 {
            scores[1] += 1; // Moderate
        }

        let (best_idx, best_score) = scores
            .iter()
            .enumerate()
            .max_by_key(|(_, s)| **s)
            .unwrap();

        if *best_score == 0 {
            Complexity::Simple
        } else {
            Complexity::ASCENDING[best_idx]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_input_errors() {
        let analyzer = TaskAnalyzer::new(16);
        assert!(matches!(
            analyzer.analyze("   ").await,
            Err(AnalysisError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn repeated_calls_are_deterministic() {
        let analyzer = TaskAnalyzer::new(16);
        let a = analyzer.analyze("read the file notes.txt").await.unwrap();
        let b = analyzer.analyze("read the file notes.txt").await.unwrap();
        assert!(a.eq_ignoring_observed(&b));
        assert!(!a.cache_hit);
        assert!(b.cache_hit);
    }

    #[tokio::test]
    async fn normalization_makes_equivalent_inputs_equal() {
        let analyzer = TaskAnalyzer::new(16);
        let a = analyzer.analyze("  Read THE file notes.txt ").await.unwrap();
        let b = analyzer.analyze("read the file notes.txt").await.unwrap();
        assert!(a.eq_ignoring_observed(&b));
    }

    #[tokio::test]
    async fn simple_file_read_is_classified_simple_and_file_ops() {
        let analyzer = TaskAnalyzer::new(16);
        let a = analyzer.analyze("read the file notes.txt").await.unwrap();
        assert_eq!(a.task_type, TaskType::FileOps);
        assert_eq!(a.complexity, Complexity::Simple);
        assert_eq!(a.estimated_steps, 1);
        assert!(!a.parallelizable);
    }

    #[tokio::test]
    async fn iterative_content_creation_requires_iteration() {
        let analyzer = TaskAnalyzer::new(16);
        let a = analyzer
            .analyze("write a polished, high-quality blog post about autonomous agents; iterate until good")
            .await
            .unwrap();
        assert!(a.requires_iteration);
        assert!(a.complexity >= Complexity::Moderate);
    }

    #[tokio::test]
    async fn parallel_research_is_parallelizable_with_multiple_capabilities() {
        let analyzer = TaskAnalyzer::new(16);
        let a = analyzer
            .analyze("simultaneously search the web and check our database for Q3 sales anomalies and summarize")
            .await
            .unwrap();
        assert!(a.required_capabilities.len() >= 2);
    }

    #[tokio::test]
    async fn zero_capacity_cache_never_reports_a_hit() {
        let analyzer = TaskAnalyzer::new(0);
        analyzer.analyze("read the file notes.txt").await.unwrap();
        let b = analyzer.analyze("read the file notes.txt").await.unwrap();
        assert!(!b.cache_hit);
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Reader level passed verbatim into the main explanation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    HighSchool,
    #[default]
    Undergraduate,
    Graduate,
    Expert,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::HighSchool => "High School",
            Difficulty::Undergraduate => "Undergraduate",
            Difficulty::Graduate => "Graduate",
            Difficulty::Expert => "Expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Concurrent,
    SequentialThrottled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStrategy {
    #[default]
    MapReduce,
    Refine,
    Stuff,
}

/// Per-run feature switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureOptions {
    pub difficulty: Difficulty,
    pub include_examples: bool,
    pub explain_prereq: bool,
    pub explain_math: bool,
    pub find_similar_papers: bool,
    /// Only consulted when `find_similar_papers` is set.
    pub include_paper_summary_of_similar: bool,
    pub execution_mode: ExecutionMode,
    /// Only consulted in `SequentialThrottled` mode; zero disables the pause.
    pub throttle_delay_seconds: f64,
    pub summarization_method: SummaryStrategy,
}

impl Default for FeatureOptions {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            include_examples: false,
            explain_prereq: false,
            explain_math: false,
            find_similar_papers: false,
            include_paper_summary_of_similar: false,
            execution_mode: ExecutionMode::default(),
            throttle_delay_seconds: 0.0,
            summarization_method: SummaryStrategy::default(),
        }
    }
}

impl FeatureOptions {
    /// The pause inserted between aspect groups, if any.
    pub fn throttle(&self) -> Option<Duration> {
        if self.execution_mode != ExecutionMode::SequentialThrottled {
            return None;
        }
        if !self.throttle_delay_seconds.is_finite() || self.throttle_delay_seconds <= 0.0 {
            return None;
        }
        Some(Duration::from_secs_f64(self.throttle_delay_seconds))
    }
}

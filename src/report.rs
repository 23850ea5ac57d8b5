use crate::aspect::AspectName;
use crate::options::{Difficulty, ExecutionMode, SummaryStrategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub input: String,
    pub backend: String,
    pub started: String,
    pub finished: String,
    pub document_chars: usize,
    pub summary_segments: usize,
    pub aspect_segments: usize,
    pub summarization_method: SummaryStrategy,
    pub execution_mode: ExecutionMode,
    pub difficulty: Difficulty,
    pub aspects: Vec<AspectName>,
    pub unavailable: Vec<AspectName>,
    pub omitted_math_sections: usize,
}

//! Segment-wise research paper explainer.
//!
//! A document is summarized once, split into overlapping segments, and each
//! enabled aspect (explanation, examples, prerequisites, math) is generated per
//! segment against an LLM backend before the results are stitched back into a
//! single markdown document.

pub mod aspect;
pub mod assembler;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod options;
pub mod orchestrator;
pub mod pipeline;
pub mod postprocess;
pub mod prompts;
pub mod report;
pub mod schedule;
pub mod search;
pub mod segmenter;
pub mod summarizer;
pub mod util;

pub use aspect::{AspectName, AspectOutput, AspectResultSet};
pub use assembler::{AssembledDocument, assemble};
pub use backend::{Backend, PromptTemplate};
pub use error::{BackendError, ExplainError};
pub use options::{Difficulty, ExecutionMode, FeatureOptions, SummaryStrategy};
pub use orchestrator::Orchestrator;
pub use segmenter::{Segment, segment};

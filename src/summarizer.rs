use crate::backend::{Backend, bind};
use crate::error::{BackendError, ExplainError, Result};
use crate::options::{ExecutionMode, SummaryStrategy};
use crate::prompts::{REFINE, SUMMARIZE};
use crate::schedule::fan_out;
use crate::segmenter::Segment;
use tracing::{debug, info, warn};

const JOINER: &str = "\n\n";
/// Upper bound on MapReduce collapse rounds before the final reduce.
const MAX_COLLAPSE_ROUNDS: usize = 10;

/// Reduces a segment sequence to one synopsis.
pub struct Summarizer<'a> {
    backend: &'a dyn Backend,
    mode: ExecutionMode,
    reduce_max_chars: usize,
}

impl<'a> Summarizer<'a> {
    pub fn new(backend: &'a dyn Backend, mode: ExecutionMode, reduce_max_chars: usize) -> Self {
        Self {
            backend,
            mode,
            reduce_max_chars: reduce_max_chars.max(1),
        }
    }

    pub async fn summarize(&self, segments: &[Segment], strategy: SummaryStrategy) -> Result<String> {
        if segments.is_empty() {
            return Err(ExplainError::EmptyDocument);
        }

        info!(
            "summarize strategy={:?} segments={} backend={}",
            strategy,
            segments.len(),
            self.backend.name()
        );

        let summary = match strategy {
            SummaryStrategy::Stuff => self.stuff(segments).await?,
            SummaryStrategy::MapReduce => self.map_reduce(segments).await?,
            SummaryStrategy::Refine => self.refine(segments).await?,
        };

        if summary.trim().is_empty() {
            return Err(BackendError::EmptyResponse {
                model: self.backend.name().to_string(),
            }
            .into());
        }
        Ok(summary)
    }

    async fn stuff(&self, segments: &[Segment]) -> std::result::Result<String, BackendError> {
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        self.reduce(&texts.join(JOINER)).await
    }

    async fn map_reduce(&self, segments: &[Segment]) -> std::result::Result<String, BackendError> {
        let mut partials = fan_out(self.mode, segments.len(), |i| {
            self.reduce(&segments[i].text)
        })
        .await?;

        let mut rounds = 0;
        while partials.len() > 1 && joined_len(&partials) > self.reduce_max_chars {
            if rounds == MAX_COLLAPSE_ROUNDS {
                warn!(
                    "collapse gave up after {rounds} rounds chars={} budget={}",
                    joined_len(&partials),
                    self.reduce_max_chars
                );
                break;
            }
            rounds += 1;

            // Partials that cannot share a group are reduced on their own.
            let before = joined_len(&partials);
            let groups = group_by_budget(&partials, self.reduce_max_chars);
            debug!(
                "collapse round={rounds} partials={} groups={} chars={before}",
                partials.len(),
                groups.len()
            );
            partials = fan_out(self.mode, groups.len(), |g| self.reduce(&groups[g])).await?;
            if joined_len(&partials) >= before {
                warn!("collapse round={rounds} did not shrink the partials; reducing as is");
                break;
            }
        }

        self.reduce(&partials.join(JOINER)).await
    }

    async fn refine(&self, segments: &[Segment]) -> std::result::Result<String, BackendError> {
        let mut running = self.reduce(&segments[0].text).await?;
        for seg in &segments[1..] {
            debug!("refine step segment={}", seg.index);
            running = self
                .backend
                .generate(
                    &REFINE,
                    &bind([("existing_answer", running.as_str()), ("text", seg.text.as_str())]),
                )
                .await?;
        }
        Ok(running)
    }

    async fn reduce(&self, text: &str) -> std::result::Result<String, BackendError> {
        self.backend.generate(&SUMMARIZE, &bind([("text", text)])).await
    }
}

fn joined_len(parts: &[String]) -> usize {
    let chars: usize = parts.iter().map(|p| p.chars().count()).sum();
    chars + JOINER.len() * parts.len().saturating_sub(1)
}

/// Greedy, order-preserving grouping; an item over budget forms its own group.
fn group_by_budget(parts: &[String], budget: usize) -> Vec<String> {
    let mut groups = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for part in parts {
        let len = part.chars().count();
        let added = if current.is_empty() { len } else { len + JOINER.len() };
        if !current.is_empty() && current_len + added > budget {
            groups.push(current.join(JOINER));
            current.clear();
            current_len = 0;
        }
        current_len += if current.is_empty() { len } else { len + JOINER.len() };
        current.push(part);
    }
    if !current.is_empty() {
        groups.push(current.join(JOINER));
    }
    groups
}

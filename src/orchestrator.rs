use crate::aspect::{AspectGenerator, AspectName, AspectOutput, AspectResultSet, enabled_aspects};
use crate::backend::Backend;
use crate::config::{Segmentation, Summarization};
use crate::error::{ExplainError, Result};
use crate::options::{ExecutionMode, FeatureOptions};
use crate::schedule::pause;
use crate::search::SearchProvider;
use crate::segmenter::{Segment, segment};
use crate::summarizer::Summarizer;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Everything one run produces before assembly.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub summary: String,
    /// Number of coarse segments fed to the summarizer.
    pub summary_segments: usize,
    /// Fine segments the aspect results are aligned to.
    pub segments: Vec<Segment>,
    pub results: AspectResultSet,
    /// Requested aspects that could not be attempted.
    pub unavailable: Vec<AspectName>,
}

pub struct Orchestrator {
    backend: Arc<dyn Backend>,
    search: Option<Arc<dyn SearchProvider>>,
    segmentation: Segmentation,
    summarization: Summarization,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn Backend>, segmentation: Segmentation, summarization: Summarization) -> Self {
        Self {
            backend,
            search: None,
            segmentation,
            summarization,
        }
    }

    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub async fn run(&self, document: &str, options: &FeatureOptions) -> Result<RunOutput> {
        if document.trim().is_empty() {
            return Err(ExplainError::EmptyDocument);
        }
        let started = Instant::now();
        let mode = options.execution_mode;
        let throttle = options.throttle();

        // Both segmentations are validated before any backend call.
        let coarse = segment(
            document,
            self.segmentation.summary_chunk_size,
            self.segmentation.summary_overlap,
        )?;
        let fine = segment(
            document,
            self.segmentation.aspect_chunk_size,
            self.segmentation.aspect_overlap,
        )?;
        info!(
            "segmented chars={} summary_segments={} aspect_segments={}",
            document.chars().count(),
            coarse.len(),
            fine.len()
        );

        let summarizer = Summarizer::new(
            self.backend.as_ref(),
            mode,
            self.summarization.reduce_max_chars,
        );
        let summary = summarizer
            .summarize(&coarse, options.summarization_method)
            .await?;
        info!("summary ready chars={}", summary.chars().count());

        let mut aspects = enabled_aspects(options);
        let mut unavailable = Vec::new();
        if self.search.is_none() && aspects.contains(&AspectName::SimilarPapers) {
            warn!("similar papers requested but no search provider is configured; skipping");
            aspects.retain(|a| *a != AspectName::SimilarPapers);
            unavailable.push(AspectName::SimilarPapers);
        }

        let generator = AspectGenerator::new(self.backend.as_ref(), self.search.as_deref(), mode);
        let outputs = match mode {
            ExecutionMode::Concurrent => {
                try_join_all(aspects.iter().map(|&name| {
                    let generator = &generator;
                    let summary = summary.as_str();
                    let fine = fine.as_slice();
                    async move {
                        let out = generator.generate(name, summary, fine, options).await?;
                        Ok::<_, ExplainError>((name, out))
                    }
                }))
                .await?
            }
            ExecutionMode::SequentialThrottled => {
                pause(throttle, "summary").await;
                let mut outs = Vec::with_capacity(aspects.len());
                for (i, &name) in aspects.iter().enumerate() {
                    let out = generator.generate(name, &summary, &fine, options).await?;
                    outs.push((name, out));
                    if i + 1 < aspects.len() {
                        pause(throttle, name.label()).await;
                    }
                }
                outs
            }
        };

        let mut results = AspectResultSet::new();
        for (name, out) in outputs {
            if let AspectOutput::PerSegment(v) = &out {
                assert_eq!(
                    v.len(),
                    fine.len(),
                    "aspect {name} produced {} results for {} segments",
                    v.len(),
                    fine.len()
                );
            }
            results.insert(name, out);
        }

        info!(
            "run complete aspects={:?} elapsed_ms={}",
            results.names(),
            started.elapsed().as_millis()
        );

        Ok(RunOutput {
            summary,
            summary_segments: coarse.len(),
            segments: fine,
            results,
            unavailable,
        })
    }
}

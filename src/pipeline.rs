use crate::{
    assembler::{AssembledDocument, assemble},
    config::Config,
    extract::{TextExtractor, validate_input},
    options::FeatureOptions,
    orchestrator::Orchestrator,
    postprocess,
    report::RunReport,
    util::{now_rfc3339, truncate_text},
};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub struct Pipeline<X: TextExtractor> {
    cfg: Config,
    extractor: Arc<X>,
    orchestrator: Orchestrator,
}

/// Validate, extract and clean the source document.
pub fn load_text<X: TextExtractor>(cfg: &Config, extractor: &X, input: &Path) -> Result<String> {
    let kind = validate_input(cfg, input)?;
    info!("extracting {:?} input={}", kind, input.display());
    let raw = extractor
        .extract(input)
        .with_context(|| format!("extracting {}", input.display()))?;
    let cleaned = postprocess::clean_text(cfg, &raw)?;
    info!(
        "cleaned text chars_before={} chars_after={}",
        raw.chars().count(),
        cleaned.chars().count()
    );
    Ok(cleaned)
}

pub struct JobOutput {
    pub document: AssembledDocument,
    pub markdown: String,
    pub text: String,
    pub report: RunReport,
}

impl<X: TextExtractor + Send + Sync + 'static> Pipeline<X> {
    pub fn new(cfg: &Config, extractor: X, orchestrator: Orchestrator) -> Self {
        Self {
            cfg: cfg.clone(),
            extractor: Arc::new(extractor),
            orchestrator,
        }
    }

    /// Extraction may wait on a subprocess, so it runs on the blocking pool.
    pub async fn load_text(&self, input: &Path) -> Result<String> {
        let cfg = self.cfg.clone();
        let extractor = Arc::clone(&self.extractor);
        let input = input.to_path_buf();
        tokio::task::spawn_blocking(move || load_text(&cfg, extractor.as_ref(), &input))
            .await
            .context("extraction task failed")?
    }

    pub async fn run_job(&self, input: &Path, options: &FeatureOptions, run_id: &str) -> Result<JobOutput> {
        let text = self.load_text(input).await?;
        self.explain_text(&text, options, run_id, &input.display().to_string())
            .await
    }

    pub async fn explain_text(
        &self,
        text: &str,
        options: &FeatureOptions,
        run_id: &str,
        input_label: &str,
    ) -> Result<JobOutput> {
        let started = now_rfc3339();
        info!(
            "run_id={run_id} backend={} mode={:?} method={:?} difficulty={}",
            self.orchestrator.backend_name(),
            options.execution_mode,
            options.summarization_method,
            options.difficulty
        );

        let run = self
            .orchestrator
            .run(text, options)
            .await
            .with_context(|| format!("explaining {input_label}"))?;
        debug!("summary: {}", truncate_text(&run.summary, 200));

        let document = assemble(&run.summary, &run.results, &run.segments);
        let markdown = document.to_markdown();
        let plain = postprocess::markdown_to_text(&markdown);

        let report = RunReport {
            run_id: run_id.to_string(),
            input: input_label.to_string(),
            backend: self.orchestrator.backend_name().to_string(),
            started,
            finished: now_rfc3339(),
            document_chars: text.chars().count(),
            summary_segments: run.summary_segments,
            aspect_segments: run.segments.len(),
            summarization_method: options.summarization_method,
            execution_mode: options.execution_mode,
            difficulty: options.difficulty,
            aspects: run.results.names(),
            unavailable: run.unavailable.clone(),
            omitted_math_sections: document.omitted_math_sections(&run.results),
        };

        Ok(JobOutput {
            document,
            markdown,
            text: plain,
            report,
        })
    }
}

use crate::backend::{Backend, PromptTemplate, bind};
use crate::error::{ExplainError, Result};
use crate::options::{ExecutionMode, FeatureOptions};
use crate::prompts;
use crate::schedule::fan_out;
use crate::search::SearchProvider;
use crate::segmenter::Segment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// Declaration order is the sequential priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectName {
    MainExplanation,
    Examples,
    Prerequisites,
    MathConcepts,
    SimilarPapers,
}

impl AspectName {
    pub const ALL: [AspectName; 5] = [
        AspectName::MainExplanation,
        AspectName::Examples,
        AspectName::Prerequisites,
        AspectName::MathConcepts,
        AspectName::SimilarPapers,
    ];

    pub fn is_per_segment(self) -> bool {
        !matches!(self, AspectName::SimilarPapers)
    }

    /// Template for per-segment aspects.
    pub fn template(self) -> Option<&'static PromptTemplate> {
        match self {
            AspectName::MainExplanation => Some(&prompts::MAIN_EXPLANATION),
            AspectName::Examples => Some(&prompts::EXAMPLES),
            AspectName::Prerequisites => Some(&prompts::PREREQUISITES),
            AspectName::MathConcepts => Some(&prompts::MATH_CONCEPTS),
            AspectName::SimilarPapers => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AspectName::MainExplanation => "Main Explanation",
            AspectName::Examples => "Examples",
            AspectName::Prerequisites => "Prerequisites",
            AspectName::MathConcepts => "Mathematical Concepts",
            AspectName::SimilarPapers => "Similar Papers",
        }
    }
}

impl fmt::Display for AspectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aspects requested by `options`, in priority order. The main explanation
/// is always included.
pub fn enabled_aspects(options: &FeatureOptions) -> Vec<AspectName> {
    AspectName::ALL
        .into_iter()
        .filter(|a| match a {
            AspectName::MainExplanation => true,
            AspectName::Examples => options.include_examples,
            AspectName::Prerequisites => options.explain_prereq,
            AspectName::MathConcepts => options.explain_math,
            AspectName::SimilarPapers => options.find_similar_papers,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AspectOutput {
    /// One entry per segment, index-aligned.
    PerSegment(Vec<String>),
    Global(String),
}

/// Results keyed by aspect. A missing key means the aspect was not requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectResultSet {
    results: BTreeMap<AspectName, AspectOutput>,
}

impl AspectResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: AspectName, output: AspectOutput) {
        self.results.insert(name, output);
    }

    pub fn contains(&self, name: AspectName) -> bool {
        self.results.contains_key(&name)
    }

    pub fn get(&self, name: AspectName) -> Option<&AspectOutput> {
        self.results.get(&name)
    }

    pub fn per_segment(&self, name: AspectName) -> Option<&[String]> {
        match self.results.get(&name) {
            Some(AspectOutput::PerSegment(v)) => Some(v),
            _ => None,
        }
    }

    pub fn global(&self, name: AspectName) -> Option<&str> {
        match self.results.get(&name) {
            Some(AspectOutput::Global(s)) => Some(s),
            _ => None,
        }
    }

    pub fn names(&self) -> Vec<AspectName> {
        self.results.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Produces one aspect's output. Holds only borrowed, read-only
/// collaborators, so one generator can serve several aspects at once.
pub struct AspectGenerator<'a> {
    backend: &'a dyn Backend,
    search: Option<&'a dyn SearchProvider>,
    mode: ExecutionMode,
}

impl<'a> AspectGenerator<'a> {
    pub fn new(
        backend: &'a dyn Backend,
        search: Option<&'a dyn SearchProvider>,
        mode: ExecutionMode,
    ) -> Self {
        Self {
            backend,
            search,
            mode,
        }
    }

    pub async fn generate(
        &self,
        name: AspectName,
        summary: &str,
        segments: &[Segment],
        options: &FeatureOptions,
    ) -> Result<AspectOutput> {
        info!("aspect {} start segments={}", name, segments.len());
        let output = match name.template() {
            Some(template) => AspectOutput::PerSegment(
                self.per_segment(template, summary, segments, options).await?,
            ),
            None => AspectOutput::Global(
                self.similar_papers(summary, options.include_paper_summary_of_similar)
                    .await?,
            ),
        };
        info!("aspect {} done", name);
        Ok(output)
    }

    async fn per_segment(
        &self,
        template: &PromptTemplate,
        summary: &str,
        segments: &[Segment],
        options: &FeatureOptions,
    ) -> Result<Vec<String>> {
        let difficulty = options.difficulty.label();
        let wants_difficulty = template.input_variables.contains(&"difficulty");

        let results = fan_out(self.mode, segments.len(), |i| {
            let seg = &segments[i];
            let mut vars = bind([("summary", summary), ("chunk", seg.text.as_str())]);
            if wants_difficulty {
                vars.insert("difficulty".to_string(), difficulty.to_string());
            }
            debug!("{} segment={}", template.name, seg.index);
            async move { self.backend.generate(template, &vars).await }
        })
        .await?;
        Ok(results)
    }

    async fn similar_papers(&self, summary: &str, include_summary: bool) -> Result<String> {
        let search = self.search.ok_or(ExplainError::SearchUnavailable)?;

        let keywords = self
            .backend
            .generate(&prompts::SEARCH_KEYWORDS, &bind([("summary", summary)]))
            .await?;
        let query = self
            .backend
            .generate(&prompts::SEARCH_QUERY, &bind([("keywords", keywords.as_str())]))
            .await?;
        debug!("similar papers query={}", query.trim());

        let search_results = search.search(query.trim()).await?;
        if !include_summary {
            return Ok(search_results);
        }

        let summarized = self
            .backend
            .generate(
                &prompts::SIMILAR_PAPERS_SUMMARY,
                &bind([("summary", summary), ("search_results", search_results.as_str())]),
            )
            .await?;
        Ok(summarized)
    }
}

use async_trait::async_trait;
use paper_explainer::aspect::{AspectGenerator, AspectName, AspectOutput, enabled_aspects};
use paper_explainer::error::{BackendError, ExplainError};
use paper_explainer::options::{Difficulty, ExecutionMode, FeatureOptions};
use paper_explainer::prompts;
use paper_explainer::search::{SearchProvider, StaticSearch};
use paper_explainer::segmenter::segment;
use std::sync::Mutex;

mod common;
use common::{MockBackend, paper_text};

struct RecordingSearch {
    queries: Mutex<Vec<String>>,
}

#[async_trait]
impl SearchProvider for RecordingSearch {
    async fn search(&self, query: &str) -> Result<String, BackendError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok("1. Attention Is All You Need".to_string())
    }
}

#[tokio::test]
async fn main_explanation_prompts_are_repeatable() {
    let backend = MockBackend::new();
    let segs = segment(&paper_text(5_000), 2000, 200).unwrap();
    let options = FeatureOptions {
        difficulty: Difficulty::Graduate,
        ..Default::default()
    };
    let generator = AspectGenerator::new(&backend, None, ExecutionMode::SequentialThrottled);

    let first = generator
        .generate(AspectName::MainExplanation, "the summary", &segs, &options)
        .await
        .unwrap();
    let second = generator
        .generate(AspectName::MainExplanation, "the summary", &segs, &options)
        .await
        .unwrap();
    assert_eq!(first, second);

    let calls = backend.calls_to("main_explanation");
    assert_eq!(calls.len(), segs.len() * 2);
    let (a, b) = calls.split_at(segs.len());
    assert_eq!(a, b);
    for (call, seg) in a.iter().zip(&segs) {
        assert_eq!(call.bindings["difficulty"], "Graduate");
        assert_eq!(call.bindings["summary"], "the summary");
        assert_eq!(call.bindings["chunk"], seg.text);
    }
}

#[tokio::test]
async fn only_main_explanation_receives_difficulty() {
    let backend = MockBackend::new();
    let segs = segment(&paper_text(3_000), 2000, 200).unwrap();
    let generator = AspectGenerator::new(&backend, None, ExecutionMode::Concurrent);

    for name in [AspectName::Examples, AspectName::Prerequisites, AspectName::MathConcepts] {
        generator
            .generate(name, "s", &segs, &FeatureOptions::default())
            .await
            .unwrap();
    }
    let calls = backend.calls();
    assert_eq!(calls.len(), segs.len() * 3);
    assert!(calls.iter().all(|c| !c.bindings.contains_key("difficulty")));
}

#[tokio::test(start_paused = true)]
async fn per_segment_results_stay_index_aligned() {
    let backend = MockBackend::new().staggered();
    let segs = segment(&paper_text(9_000), 2000, 200).unwrap();
    let generator = AspectGenerator::new(&backend, None, ExecutionMode::Concurrent);

    let out = generator
        .generate(AspectName::Examples, "s", &segs, &FeatureOptions::default())
        .await
        .unwrap();
    let AspectOutput::PerSegment(results) = out else {
        panic!("examples should be per-segment");
    };
    assert_eq!(results.len(), segs.len());
    for (r, seg) in results.iter().zip(&segs) {
        assert_eq!(*r, format!("examples::{}", seg.text));
    }
}

#[test]
fn math_prompt_asks_for_empty_output() {
    assert!(
        prompts::MATH_CONCEPTS
            .template
            .contains("If no mathematical concept or equations are there return an empty string")
    );
}

#[tokio::test]
async fn similar_papers_returns_raw_results_without_summary() {
    let backend = MockBackend::new();
    let search = RecordingSearch {
        queries: Mutex::new(Vec::new()),
    };
    let generator = AspectGenerator::new(&backend, Some(&search), ExecutionMode::Concurrent);
    let options = FeatureOptions {
        find_similar_papers: true,
        ..Default::default()
    };

    let out = generator
        .generate(AspectName::SimilarPapers, "the summary", &[], &options)
        .await
        .unwrap();
    assert_eq!(out, AspectOutput::Global("1. Attention Is All You Need".into()));

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].template, "search_keywords");
    assert_eq!(calls[0].bindings["summary"], "the summary");
    assert_eq!(calls[1].template, "search_query");
    assert_eq!(calls[1].bindings["keywords"], "transformers, attention");
    assert_eq!(*search.queries.lock().unwrap(), vec!["transformers attention survey"]);
}

#[tokio::test]
async fn similar_papers_can_summarize_results() {
    let backend = MockBackend::new();
    let search = StaticSearch::new("result list");
    let generator = AspectGenerator::new(&backend, Some(&search), ExecutionMode::Concurrent);
    let options = FeatureOptions {
        find_similar_papers: true,
        include_paper_summary_of_similar: true,
        ..Default::default()
    };

    let out = generator
        .generate(AspectName::SimilarPapers, "the summary", &[], &options)
        .await
        .unwrap();
    assert_eq!(out, AspectOutput::Global("digest of result list".into()));

    let last = backend.calls().pop().unwrap();
    assert_eq!(last.template, "similar_papers_summary");
    assert_eq!(last.bindings["search_results"], "result list");
}

#[tokio::test]
async fn similar_papers_without_search_is_unavailable() {
    let backend = MockBackend::new();
    let generator = AspectGenerator::new(&backend, None, ExecutionMode::Concurrent);
    let err = generator
        .generate(AspectName::SimilarPapers, "s", &[], &FeatureOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ExplainError::SearchUnavailable));
    assert_eq!(backend.call_count(), 0);
}

#[test]
fn enabled_aspects_follow_flags_in_priority_order() {
    assert_eq!(
        enabled_aspects(&FeatureOptions::default()),
        vec![AspectName::MainExplanation]
    );

    let all = FeatureOptions {
        include_examples: true,
        explain_prereq: true,
        explain_math: true,
        find_similar_papers: true,
        ..Default::default()
    };
    assert_eq!(enabled_aspects(&all), AspectName::ALL.to_vec());

    let some = FeatureOptions {
        explain_math: true,
        include_examples: true,
        ..Default::default()
    };
    assert_eq!(
        enabled_aspects(&some),
        vec![AspectName::MainExplanation, AspectName::Examples, AspectName::MathConcepts]
    );
}

#![allow(dead_code)]

use async_trait::async_trait;
use paper_explainer::backend::{Backend, Bindings, PromptTemplate};
use paper_explainer::error::BackendError;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub template: &'static str,
    pub bindings: Bindings,
}

/// Deterministic backend that records every call.
///
/// Responses depend only on the prompt and its bindings:
/// `summarize` -> `S[<chars of text>]`, `refine` -> `<existing>+R[<chars>]`,
/// per-segment aspects -> `<template>::<chunk>`.
#[derive(Default)]
pub struct MockBackend {
    calls: Mutex<Vec<Call>>,
    counter: AtomicUsize,
    fail_on: Option<usize>,
    blank_math: bool,
    stagger: bool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`-th call (1-based) with an API error.
    pub fn failing_on(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }

    /// Answer every math prompt with whitespace.
    pub fn with_blank_math(mut self) -> Self {
        self.blank_math = true;
        self
    }

    /// Make earlier calls finish later, so concurrent completions arrive out of order.
    pub fn staggered(mut self) -> Self {
        self.stagger = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, template: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.template == template)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        prompt: &PromptTemplate,
        bindings: &Bindings,
    ) -> Result<String, BackendError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.lock().unwrap().push(Call {
            template: prompt.name,
            bindings: bindings.clone(),
        });
        prompt.render(bindings)?;

        if self.stagger {
            let ms = 200u64.saturating_sub(n as u64 * 10);
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }

        if self.fail_on == Some(n) {
            return Err(BackendError::Api {
                status_code: 500,
                message: format!("mock failure on call {n}"),
            });
        }

        let get = |k: &str| bindings.get(k).map(String::as_str).unwrap_or("");
        let out = match prompt.name {
            "summarize" => format!("S[{}]", get("text").chars().count()),
            "refine" => format!("{}+R[{}]", get("existing_answer"), get("text").chars().count()),
            "math_concepts" if self.blank_math => "  \n ".to_string(),
            "search_keywords" => "transformers, attention".to_string(),
            "search_query" => "  transformers attention survey  ".to_string(),
            "similar_papers_summary" => format!("digest of {}", get("search_results")),
            other => format!("{other}::{}", get("chunk")),
        };
        Ok(out)
    }
}

/// Text of roughly `chars` characters made of short sentences in paragraphs.
pub fn paper_text(chars: usize) -> String {
    let sentence = "Attention layers mix token features. ";
    let mut out = String::new();
    let mut i = 0;
    while out.chars().count() < chars {
        out.push_str(sentence);
        i += 1;
        if i % 8 == 0 {
            out.push_str("\n\n");
        }
    }
    out.chars().take(chars).collect()
}

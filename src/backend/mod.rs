//! The language-generation capability.
//!
//! Every prompt is a fixed [`PromptTemplate`] plus a set of variable
//! bindings; backends render and send it. Backends are shared by reference
//! across concurrent calls and hold no per-call state.

pub mod openai_compat;

use crate::error::BackendError;
use async_trait::async_trait;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub use openai_compat::OpenAiCompatBackend;

pub type Bindings = BTreeMap<String, String>;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub template: &'static str,
    pub input_variables: &'static [&'static str],
}

impl PromptTemplate {
    /// Substitute `{var}` placeholders in one pass, so bound values that
    /// themselves contain braces are left untouched.
    pub fn render(&self, bindings: &Bindings) -> Result<String, BackendError> {
        for var in self.input_variables {
            if !bindings.contains_key(*var) {
                return Err(BackendError::MissingVariable {
                    template: self.name.to_string(),
                    variable: (*var).to_string(),
                });
            }
        }

        let rendered = PLACEHOLDER.replace_all(self.template, |caps: &Captures| {
            let name = &caps[1];
            let declared = self.input_variables.iter().any(|v| *v == name);
            match bindings.get(name) {
                Some(value) if declared => value.clone(),
                _ => caps[0].to_string(),
            }
        });
        Ok(rendered.into_owned())
    }
}

/// Build bindings from literal pairs.
pub fn bind<const N: usize>(pairs: [(&str, &str); N]) -> Bindings {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// A human-readable name, e.g. `groq/llama-3.1-8b-instant`.
    fn name(&self) -> &str;

    async fn generate(
        &self,
        prompt: &PromptTemplate,
        bindings: &Bindings,
    ) -> Result<String, BackendError>;
}
